//! The compartmental derivative systems.
//!
//! Three variants share one calling contract: given the current state and a
//! forcing sample, write the instantaneous derivative into a caller-owned
//! buffer. They differ in how the reporting correction `theta` couples into
//! the flows and in whether a vaccinated sub-population exists. The set is
//! closed by design; a new coupling is a new [`ModelVariant`], not a
//! subclass.

use seiir_core::{ForcingPoint, ForecastError, ModelParameters, Result};

/// Compartment order for the 5-compartment theta variants.
pub const SEIIR_COMPARTMENTS: [&str; 5] = ["S", "E", "I1", "I2", "R"];

/// Compartment order for the vaccine variant: unvaccinated block first,
/// then the vaccinated mirror.
pub const VACCINE_COMPARTMENTS: [&str; 10] = [
    "S", "E", "I1", "I2", "R", "S_v", "E_v", "I1_v", "I2_v", "R_v",
];

/// Positive theta is expressed per million susceptibles in the legacy
/// coupling.
const SEMI_RELATIVE_THETA_SCALE: f64 = 1_000_000.0;

/// Selects one of the closed set of derivative systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelVariant {
    /// Net E/R correction flow ("new theta"). Preferred for new forecasts.
    RelativeTheta,
    /// Legacy theta coupling ("old theta"), retained only so old runs can
    /// be reproduced.
    SemiRelativeTheta,
    /// Ten-compartment system with a vaccinated sub-population; `eta` is
    /// the per-dose efficacy fraction.
    Vaccine { eta: f64 },
}

impl ModelVariant {
    /// Resolve a variant from its configuration name. `eta` is only
    /// consulted for the vaccine variant.
    pub fn from_name(name: &str, eta: f64) -> Result<Self> {
        match name {
            "new_theta" => Ok(Self::RelativeTheta),
            "old_theta" => Ok(Self::SemiRelativeTheta),
            "vaccine" => Self::vaccine(eta),
            other => Err(ForecastError::UnknownModelVariant(other.to_string())),
        }
    }

    /// Vaccine variant with a validated per-dose efficacy.
    pub fn vaccine(eta: f64) -> Result<Self> {
        if !(eta.is_finite() && (0.0..=1.0).contains(&eta)) {
            return Err(ForecastError::InvalidEta { value: eta });
        }
        Ok(Self::Vaccine { eta })
    }

    pub fn compartments(&self) -> &'static [&'static str] {
        match self {
            Self::RelativeTheta | Self::SemiRelativeTheta => &SEIIR_COMPARTMENTS,
            Self::Vaccine { .. } => &VACCINE_COMPARTMENTS,
        }
    }

    pub fn dimension(&self) -> usize {
        self.compartments().len()
    }

    /// Forcing parameter names reported alongside the compartments in the
    /// output table.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            Self::Vaccine { .. } => &["beta", "theta", "psi"],
            _ => &["beta", "theta"],
        }
    }

    pub fn uses_psi(&self) -> bool {
        matches!(self, Self::Vaccine { .. })
    }
}

/// A derivative system bound to its model constants.
#[derive(Debug, Clone)]
pub struct SeiirSystem {
    variant: ModelVariant,
    params: ModelParameters,
}

impl SeiirSystem {
    pub fn new(variant: ModelVariant, params: ModelParameters) -> Self {
        Self { variant, params }
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn dimension(&self) -> usize {
        self.variant.dimension()
    }

    pub fn compartments(&self) -> &'static [&'static str] {
        self.variant.compartments()
    }

    /// Instantaneous derivative of `y` under forcing `p`, written into
    /// `dy`. Pure in `(y, p)`; `dy` is fully overwritten. `y` and `dy`
    /// must both have length [`Self::dimension`].
    pub fn derivative(&self, y: &[f64], p: &ForcingPoint, dy: &mut [f64]) {
        match self.variant {
            ModelVariant::RelativeTheta => relative_theta(&self.params, y, p, dy),
            ModelVariant::SemiRelativeTheta => semi_relative_theta(&self.params, y, p, dy),
            ModelVariant::Vaccine { eta } => vaccine(&self.params, eta, y, p, dy),
        }
    }
}

/// Positive theta drains S into E, negative theta drains E into R.
fn relative_theta(mp: &ModelParameters, y: &[f64], p: &ForcingPoint, dy: &mut [f64]) {
    let (s, e, i1, i2) = (y[0], y[1], y[2], y[3]);

    let theta_plus = p.theta.max(0.0);
    let theta_minus = -p.theta.min(0.0);
    let new_e = p.beta * (s / mp.population) * (i1 + i2).powf(mp.alpha);

    dy[0] = -new_e - theta_plus * s;
    dy[1] = new_e + theta_plus * s - mp.sigma * e - theta_minus * e;
    dy[2] = mp.sigma * e - mp.gamma1 * i1;
    dy[3] = mp.gamma1 * i1 - mp.gamma2 * i2;
    dy[4] = mp.gamma2 * i2 + theta_minus * e;
}

/// Legacy coupling: theta moves mass directly between S/I1 and I1/R, with
/// a floor on the negative flow tied to the I1 balance.
fn semi_relative_theta(mp: &ModelParameters, y: &[f64], p: &ForcingPoint, dy: &mut [f64]) {
    let (s, e, i1, i2) = (y[0], y[1], y[2], y[3]);

    let theta_plus = p.theta.max(0.0) * s / SEMI_RELATIVE_THETA_SCALE;
    let theta_minus = p.theta.min(0.0);
    // The correction only engages when the split is non-degenerate.
    let theta_tilde = if theta_plus != theta_minus { 1.0 } else { 0.0 };
    let theta_minus_alt = (mp.gamma1 - mp.delta) * i1 - mp.sigma * e - theta_plus;
    let effective_theta_minus = theta_minus.max(theta_minus_alt) * theta_tilde;

    let new_e = p.beta * (s / mp.population) * (i1 + i2).powf(mp.alpha);

    dy[0] = -new_e - theta_plus;
    dy[1] = new_e - mp.sigma * e;
    dy[2] = mp.sigma * e - mp.gamma1 * i1 + theta_plus + effective_theta_minus;
    dy[3] = mp.gamma1 * i1 - mp.gamma2 * i2;
    dy[4] = mp.gamma2 * i2 - effective_theta_minus;
}

fn vaccine(mp: &ModelParameters, eta: f64, y: &[f64], p: &ForcingPoint, dy: &mut [f64]) {
    let (s, e, i1, i2, r) = (y[0], y[1], y[2], y[3], y[4]);
    let (s_v, e_v, i1_v, i2_v) = (y[5], y[6], y[7], y[8]);

    let n_v: f64 = y[5..].iter().sum();
    let i = i1 + i2 + i1_v + i2_v;

    let theta_plus = p.theta.max(0.0);
    let theta_minus = -p.theta.min(0.0);

    // With nobody vaccinated yet the eligible fraction is zero, not 0/0.
    let psi_tilde = if n_v > 0.0 { p.psi.min(n_v) / n_v } else { 0.0 };

    let force = p.beta * i.powf(mp.alpha) / mp.population;
    let psi_s = (1.0 - force - theta_plus).min(psi_tilde);
    let psi_e = (1.0 - mp.sigma - theta_minus).min(psi_tilde);
    let psi_i1 = (1.0 - mp.gamma1).min(psi_tilde);
    let psi_i2 = (1.0 - mp.gamma2).min(psi_tilde);
    let psi_r = psi_tilde;

    // Total flow of newly effective doses; the eta fraction lands in R_v.
    let phi = psi_s * s + psi_e * e + psi_i1 * i1 + psi_i2 * i2 + psi_r * r;

    let new_e = force * s + theta_plus * s;
    let new_e_v = force * s_v + theta_plus * s_v;

    dy[0] = -new_e - psi_s * s;
    dy[1] = new_e - mp.sigma * e - theta_minus * e - psi_e * e;
    dy[2] = mp.sigma * e - mp.gamma1 * i1 - psi_i1 * i1;
    dy[3] = mp.gamma1 * i1 - mp.gamma2 * i2 - psi_i2 * i2;
    dy[4] = mp.gamma2 * i2 + theta_minus * e - psi_r * r;
    dy[5] = (1.0 - eta) * psi_s * s - new_e_v;
    dy[6] = new_e_v + (1.0 - eta) * psi_e * e - mp.sigma * e_v - theta_minus * e_v;
    dy[7] = mp.sigma * e_v + (1.0 - eta) * psi_i1 * i1 - mp.gamma1 * i1_v;
    dy[8] = mp.gamma1 * i1_v + (1.0 - eta) * psi_i2 * i2 - mp.gamma2 * i2_v;
    dy[9] = mp.gamma2 * i2_v + theta_minus * e_v + eta * phi;
}
