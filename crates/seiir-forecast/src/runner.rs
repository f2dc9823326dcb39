//! Per-location forecast orchestration.
//!
//! Locations are independent units of work: each one looks up its initial
//! condition, rebuilds the model parameters around its own population,
//! integrates, and emits rows. The map over locations runs on the rayon
//! pool and results are merged afterwards, so nothing is shared during
//! integration.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use seiir_core::{
    ForcingPoint, ForcingSeries, ForecastError, ForecastResult, ForecastRow, LocationId,
    LocationInitialConditions, ModelParameters, Result,
};
use seiir_model::{integrate, ModelVariant, SeiirSystem, Solver};

use crate::beta::BetaMap;

/// Per-location constant theta corrections; locations absent from the map
/// default to 0.
pub type ThetaOverrides = BTreeMap<LocationId, f64>;

/// Per-(location, date) vaccination-flow series for the vaccine variant;
/// missing dates default to 0.
pub type PsiSeries = BTreeMap<LocationId, BTreeMap<NaiveDate, f64>>;

/// Assemble per-location forcing from the rescaled beta table, the theta
/// overrides and an optional psi series.
pub fn build_forcing(
    betas: &BetaMap,
    thetas: &ThetaOverrides,
    psis: Option<&PsiSeries>,
) -> Result<Vec<ForcingSeries>> {
    betas
        .iter()
        .map(|(&location, points)| {
            let theta = thetas.get(&location).copied().unwrap_or(0.0);
            let psi_map = psis.and_then(|p| p.get(&location));
            let forcing = points
                .iter()
                .map(|p| ForcingPoint {
                    date: p.date,
                    beta: p.value,
                    theta,
                    psi: psi_map
                        .and_then(|m| m.get(&p.date))
                        .copied()
                        .unwrap_or(0.0),
                })
                .collect();
            ForcingSeries::new(location, forcing)
        })
        .collect()
}

/// Run the selected system for every location and concatenate the
/// trajectories into one table.
///
/// `params.population` is replaced per location by the sum of that
/// location's initial compartments. Rows within a location are in time
/// order; locations are emitted in id order so repeated runs produce
/// identical tables regardless of scheduling.
pub fn run_forecast(
    initial_conditions: &LocationInitialConditions,
    forcing: &[ForcingSeries],
    params: &ModelParameters,
    variant: ModelVariant,
    solver: Solver,
) -> Result<ForecastResult> {
    let mut location_results = forcing
        .par_iter()
        .map(|series| forecast_location(initial_conditions, series, params, variant, solver))
        .collect::<Result<Vec<_>>>()?;

    // Completion order is whatever the pool made of it; sort for output.
    location_results.sort_by_key(|(location, _)| *location);

    let compartments = variant
        .compartments()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rows: Vec<ForecastRow> = location_results
        .into_iter()
        .flat_map(|(_, rows)| rows)
        .collect();

    tracing::info!(
        locations = forcing.len(),
        rows = rows.len(),
        "forecast complete"
    );

    Ok(ForecastResult { compartments, rows })
}

fn forecast_location(
    initial_conditions: &LocationInitialConditions,
    series: &ForcingSeries,
    params: &ModelParameters,
    variant: ModelVariant,
    solver: Solver,
) -> Result<(LocationId, Vec<ForecastRow>)> {
    let location = series.location();
    let init = initial_conditions
        .get(&location)
        .ok_or(ForecastError::MissingInitialCondition { location })?;
    if init.len() != variant.dimension() {
        return Err(ForecastError::StateDimensionMismatch {
            location,
            expected: variant.dimension(),
            actual: init.len(),
        });
    }

    // The population the rates act on is whatever mass the location
    // starts with.
    let total: f64 = init.iter().sum();
    let local_params = params.with_population(total)?;
    let system = SeiirSystem::new(variant, local_params);

    tracing::debug!(location, points = series.points().len(), "integrating");

    let states = match solver {
        Solver::Rk4 => integrate(&system, init, series)?,
    };

    let uses_psi = variant.uses_psi();
    let rows = states
        .into_iter()
        .zip(series.points())
        .zip(series.times())
        .map(|((values, point), t)| ForecastRow {
            location,
            date: point.date,
            values,
            beta: point.beta,
            theta: point.theta,
            psi: uses_psi.then_some(point.psi),
            t,
        })
        .collect();

    Ok((location, rows))
}
