mod parameters;
mod result;
mod series;
mod tables;

pub use parameters::ModelParameters;
pub use result::{ForecastResult, ForecastRow};
pub use series::{BetaPoint, ForcingPoint, ForcingSeries, LocationId};
pub use tables::{
    BetaScale, CovariateRow, CovariateSeries, LocationInitialConditions, RegressionCoefficients,
    ScaleParameters,
};
