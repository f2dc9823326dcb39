use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Opaque integer key identifying a location.
pub type LocationId = i64;

/// One reconstructed transmission-rate sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Forcing parameters applied at one requested output time. `psi` is only
/// consulted by the vaccine variant and is 0 elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForcingPoint {
    pub date: NaiveDate,
    pub beta: f64,
    pub theta: f64,
    pub psi: f64,
}

/// Date-ordered forcing for one location.
///
/// The constructor sorts by date and rejects duplicates, so a series in
/// hand is always safe to hand to the integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcingSeries {
    location: LocationId,
    points: Vec<ForcingPoint>,
}

impl ForcingSeries {
    pub fn new(location: LocationId, mut points: Vec<ForcingPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::EmptySeries { location });
        }
        points.sort_by_key(|p| p.date);
        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(ForecastError::UnsortedOrDuplicateTime {
                    location,
                    date: pair[1].date,
                });
            }
        }
        Ok(Self { location, points })
    }

    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn points(&self) -> &[ForcingPoint] {
        &self.points
    }

    pub fn start_date(&self) -> NaiveDate {
        self.points[0].date
    }

    /// Days since the first date, one entry per point. This is the
    /// integration grid.
    pub fn times(&self) -> Vec<f64> {
        let start = self.start_date();
        self.points
            .iter()
            .map(|p| (p.date - start).num_days() as f64)
            .collect()
    }
}
