//! Error type shared across the forecast workspace.
//!
//! Variants fall into four classes: construction-time validation of model
//! parameters, table alignment (a required location or covariate key is
//! missing), numerical failures during integration, and configuration
//! lookups (unknown variant or solver names). Every location-scoped variant
//! carries the offending [`LocationId`] so a failure deep in a batch still
//! names the location that caused it.

use chrono::NaiveDate;

use crate::types::LocationId;

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Unified error type for the forecast engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    // ---- Validation ----
    #[error("invalid model parameter `{field}`: {value} (must be {constraint})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Vaccine efficacy is a fraction of doses that take effect.
    #[error("vaccine efficacy eta must be within [0, 1], got {value}")]
    InvalidEta { value: f64 },

    // ---- Alignment ----
    #[error("location {location}: no regression coefficient for covariate `{covariate}`")]
    MissingCoefficient {
        location: LocationId,
        covariate: String,
    },

    /// Coefficients exist for the location but no covariate rows do; the
    /// inner join would silently drop the location otherwise.
    #[error("location {location}: coefficients present but no covariate rows")]
    MissingCovariates { location: LocationId },

    #[error("location {location}: no beta scaling parameters")]
    MissingScaleParameters { location: LocationId },

    #[error("location {location}: no initial condition")]
    MissingInitialCondition { location: LocationId },

    #[error(
        "location {location}: initial condition has {actual} compartments, model expects {expected}"
    )]
    StateDimensionMismatch {
        location: LocationId,
        expected: usize,
        actual: usize,
    },

    #[error("location {location}: duplicate date {date} in time series")]
    UnsortedOrDuplicateTime {
        location: LocationId,
        date: NaiveDate,
    },

    #[error("location {location}: time series is empty")]
    EmptySeries { location: LocationId },

    // ---- Numerical ----
    #[error("location {location}: non-finite value in compartment {compartment} at t = {time}")]
    NumericalInstability {
        location: LocationId,
        time: f64,
        compartment: &'static str,
    },

    #[error("location {location}: beta scaling window_size must be positive")]
    InvalidWindow { location: LocationId },

    // ---- Configuration ----
    #[error("unknown model variant `{0}` (expected one of: new_theta, old_theta, vaccine)")]
    UnknownModelVariant(String),

    #[error("unknown solver `{0}` (only fixed-step RK4 is supported)")]
    UnknownSolver(String),
}
