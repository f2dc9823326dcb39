//! Shared data model for the SEIIR forecast workspace.
//!
//! Everything here is plain data: validated parameter records, per-location
//! time series, and the combined result table. The model variants and the
//! integrator live in `seiir-model`; beta reconstruction and the
//! per-location runner live in `seiir-forecast`.

pub mod error;
pub mod types;

pub use error::{ForecastError, Result};
pub use types::{
    BetaPoint, BetaScale, CovariateRow, CovariateSeries, ForcingPoint, ForcingSeries, ForecastRow,
    ForecastResult, LocationId, LocationInitialConditions, ModelParameters, RegressionCoefficients,
    ScaleParameters,
};
