use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::LocationId;

/// One output row: the compartment state plus the forcing actually applied
/// at that time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub location: LocationId,
    pub date: NaiveDate,
    /// Compartment values, ordered as [`ForecastResult::compartments`].
    pub values: Vec<f64>,
    pub beta: f64,
    pub theta: f64,
    /// Present only for the vaccine variant.
    pub psi: Option<f64>,
    /// Days since the location's first forecast date.
    pub t: f64,
}

/// Combined trajectory table across all locations. Rows within a location
/// are in time order; locations are ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Column names for [`ForecastRow::values`]; 5 names for the theta
    /// variants, 10 for the vaccine variant.
    pub compartments: Vec<String>,
    pub rows: Vec<ForecastRow>,
}
