use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Rate and population constants shared by all compartmental systems.
///
/// `delta` is the internal integration sub-step in days; gaps between
/// requested output times larger than `delta` are subdivided by the
/// integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Mixing exponent on the infectious pool, in (0, 1].
    pub alpha: f64,
    /// Incubation rate (E -> I1), per day.
    pub sigma: f64,
    /// First-stage recovery rate (I1 -> I2), per day.
    pub gamma1: f64,
    /// Second-stage recovery rate (I2 -> R), per day.
    pub gamma2: f64,
    /// Total population the rates act on.
    pub population: f64,
    /// Integration sub-step in days.
    pub delta: f64,
}

impl ModelParameters {
    /// Validate and construct. Every constraint is checked here so the
    /// systems and the integrator never see malformed rates.
    pub fn new(
        alpha: f64,
        sigma: f64,
        gamma1: f64,
        gamma2: f64,
        population: f64,
        delta: f64,
    ) -> Result<Self> {
        let params = Self {
            alpha,
            sigma,
            gamma1,
            gamma2,
            population,
            delta,
        };
        params.validate()?;
        Ok(params)
    }

    /// Copy with a per-location population, revalidated.
    pub fn with_population(&self, population: f64) -> Result<Self> {
        Self::new(
            self.alpha,
            self.sigma,
            self.gamma1,
            self.gamma2,
            population,
            self.delta,
        )
    }

    fn validate(&self) -> Result<()> {
        check(
            "alpha",
            self.alpha,
            self.alpha.is_finite() && self.alpha > 0.0 && self.alpha <= 1.0,
            "finite and in (0, 1]",
        )?;
        check(
            "sigma",
            self.sigma,
            self.sigma.is_finite() && self.sigma >= 0.0,
            "finite and >= 0",
        )?;
        check(
            "gamma1",
            self.gamma1,
            self.gamma1.is_finite() && self.gamma1 >= 0.0,
            "finite and >= 0",
        )?;
        check(
            "gamma2",
            self.gamma2,
            self.gamma2.is_finite() && self.gamma2 >= 0.0,
            "finite and >= 0",
        )?;
        check(
            "population",
            self.population,
            self.population.is_finite() && self.population > 0.0,
            "finite and > 0",
        )?;
        check(
            "delta",
            self.delta,
            self.delta.is_finite() && self.delta > 0.0,
            "finite and > 0",
        )
    }
}

fn check(field: &'static str, value: f64, ok: bool, constraint: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter {
            field,
            value,
            constraint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Result<ModelParameters> {
        ModelParameters::new(0.9, 0.2, 0.5, 0.33, 1000.0, 0.1)
    }

    #[test]
    fn test_valid_parameters() {
        let params = valid().unwrap();
        assert_eq!(params.population, 1000.0);
    }

    #[test]
    fn test_alpha_bounds() {
        assert!(ModelParameters::new(0.0, 0.2, 0.5, 0.33, 1000.0, 0.1).is_err());
        assert!(ModelParameters::new(1.2, 0.2, 0.5, 0.33, 1000.0, 0.1).is_err());
        // alpha = 1 is the inclusive upper bound.
        assert!(ModelParameters::new(1.0, 0.2, 0.5, 0.33, 1000.0, 0.1).is_ok());
    }

    #[test]
    fn test_rejects_nonfinite() {
        let err = ModelParameters::new(0.9, f64::NAN, 0.5, 0.33, 1000.0, 0.1).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InvalidParameter { field: "sigma", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_population_and_delta() {
        assert!(ModelParameters::new(0.9, 0.2, 0.5, 0.33, 0.0, 0.1).is_err());
        assert!(ModelParameters::new(0.9, 0.2, 0.5, 0.33, 1000.0, 0.0).is_err());
    }

    #[test]
    fn test_with_population() {
        let params = valid().unwrap().with_population(250.0).unwrap();
        assert_eq!(params.population, 250.0);
        assert!(valid().unwrap().with_population(-1.0).is_err());
    }
}
