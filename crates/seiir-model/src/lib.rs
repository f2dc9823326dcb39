//! The SEIIR compartmental systems and their fixed-step integrator.

pub mod rk4;
pub mod system;

pub use rk4::{integrate, Solver};
pub use system::{ModelVariant, SeiirSystem, SEIIR_COMPARTMENTS, VACCINE_COMPARTMENTS};
