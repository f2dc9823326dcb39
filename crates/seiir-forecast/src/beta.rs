//! Transmission-rate reconstruction and rescaling.
//!
//! [`compute_beta_hat`] turns regression output back into a beta series per
//! location; [`rescale_beta`] blends that series onto the historically fit
//! beta at the forecast start so the handoff between past and future is
//! smooth. [`forecast_beta`] chains the two, which is how the pipeline
//! normally calls in.

use std::collections::BTreeMap;

use seiir_core::{
    BetaPoint, CovariateSeries, ForecastError, LocationId, RegressionCoefficients, Result,
    ScaleParameters,
};

/// Reconstructed beta per location, each series sorted by date.
pub type BetaMap = BTreeMap<LocationId, Vec<BetaPoint>>;

/// Name of the implicit covariate with constant value 1.
pub const INTERCEPT: &str = "intercept";

/// Log-linear reconstruction:
/// `beta_hat = exp(intercept + sum_c coeff_c * covariate_c)` per
/// (location, date).
///
/// Covariates and coefficients are joined on location; a covariate without
/// a matching coefficient fails, as does a location carrying coefficients
/// but no covariate rows (the inner join would silently drop it).
pub fn compute_beta_hat(
    covariates: &CovariateSeries,
    coefficients: &RegressionCoefficients,
) -> Result<BetaMap> {
    let mut betas: BetaMap = BTreeMap::new();

    for row in &covariates.rows {
        let coeffs =
            coefficients
                .get(&row.location)
                .ok_or_else(|| ForecastError::MissingCoefficient {
                    location: row.location,
                    covariate: INTERCEPT.to_string(),
                })?;

        let mut log_beta =
            *coeffs
                .get(INTERCEPT)
                .ok_or_else(|| ForecastError::MissingCoefficient {
                    location: row.location,
                    covariate: INTERCEPT.to_string(),
                })?;
        for (name, value) in &row.values {
            let coeff = coeffs
                .get(name)
                .ok_or_else(|| ForecastError::MissingCoefficient {
                    location: row.location,
                    covariate: name.clone(),
                })?;
            log_beta += coeff * value;
        }

        betas.entry(row.location).or_default().push(BetaPoint {
            date: row.date,
            value: log_beta.exp(),
        });
    }

    for location in coefficients.keys() {
        if !betas.contains_key(location) {
            return Err(ForecastError::MissingCovariates {
                location: *location,
            });
        }
    }

    for points in betas.values_mut() {
        points.sort_by_key(|p| p.date);
    }
    Ok(betas)
}

/// Apply the windowed scale blend to each location's beta-hat series.
///
/// With no window the constant `scale_init` applies throughout. Otherwise
/// the scale runs linearly from `scale_init` at the first point to
/// `scale_final` at 0-indexed position `window_size`, and is held at
/// `scale_final` past the window. A zero window is rejected rather than
/// left to divide by zero.
pub fn rescale_beta(beta_hat: &BetaMap, scales: &ScaleParameters) -> Result<BetaMap> {
    let mut rescaled = BTreeMap::new();

    for (&location, points) in beta_hat {
        let scale = scales
            .get(&location)
            .ok_or(ForecastError::MissingScaleParameters { location })?;

        let scaled: Vec<BetaPoint> = match scale.window_size {
            None => points
                .iter()
                .map(|p| BetaPoint {
                    date: p.date,
                    value: p.value * scale.scale_init,
                })
                .collect(),
            Some(0) => return Err(ForecastError::InvalidWindow { location }),
            Some(w) => {
                let window = f64::from(w);
                points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let factor = if i as f64 <= window {
                            scale.scale_init
                                + (scale.scale_final - scale.scale_init) * i as f64 / window
                        } else {
                            scale.scale_final
                        };
                        BetaPoint {
                            date: p.date,
                            value: p.value * factor,
                        }
                    })
                    .collect()
            }
        };
        rescaled.insert(location, scaled);
    }

    Ok(rescaled)
}

/// Reconstruct and rescale in one call.
pub fn forecast_beta(
    covariates: &CovariateSeries,
    coefficients: &RegressionCoefficients,
    scales: &ScaleParameters,
) -> Result<BetaMap> {
    let beta_hat = compute_beta_hat(covariates, coefficients)?;
    rescale_beta(&beta_hat, scales)
}
