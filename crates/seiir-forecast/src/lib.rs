//! Beta reconstruction and per-location SEIIR forecasting.
//!
//! Data flow: regression covariates and coefficients become a beta-hat
//! series ([`beta::compute_beta_hat`]), which is rescaled onto the
//! historically fit beta ([`beta::rescale_beta`]), married with theta/psi
//! forcing ([`runner::build_forcing`]) and integrated location by location
//! ([`runner::run_forecast`]) into one combined trajectory table.

pub mod beta;
pub mod runner;

pub use beta::{compute_beta_hat, forecast_beta, rescale_beta, BetaMap};
pub use runner::{build_forcing, run_forecast, PsiSeries, ThetaOverrides};
