//! Tabular inputs handed over by the regression/data layer.
//!
//! Maps are `BTreeMap` keyed on location (and covariate name) so that
//! iteration order, and with it floating-point summation order, is
//! deterministic across runs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::LocationId;

/// Covariate values for one (location, date) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariateRow {
    pub location: LocationId,
    pub date: NaiveDate,
    pub values: BTreeMap<String, f64>,
}

/// Covariate time series across all locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CovariateSeries {
    pub rows: Vec<CovariateRow>,
}

/// Per-location regression weights keyed by covariate name. The intercept
/// weight is stored under `"intercept"`.
pub type RegressionCoefficients = BTreeMap<LocationId, BTreeMap<String, f64>>;

/// Windowed blend aligning forecasted beta with the historically fit beta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaScale {
    /// Scale applied at the first forecast point.
    pub scale_init: f64,
    /// Scale reached at the end of the window and held afterwards.
    pub scale_final: f64,
    /// Number of points the blend runs over; `None` means the constant
    /// `scale_init` applies throughout.
    #[serde(default)]
    pub window_size: Option<u32>,
}

/// Per-location scaling parameters.
pub type ScaleParameters = BTreeMap<LocationId, BetaScale>;

/// Compartment values at each location's first forecast date, ordered the
/// way the selected model variant orders its compartments.
pub type LocationInitialConditions = BTreeMap<LocationId, Vec<f64>>;
