//! # Unit Types
//!
//! Lightweight newtype wrappers for the time quantities the estimator moves
//! between. Fabrication time is tracked in minutes per task; labour is billed
//! in hours. Both serialize as bare numbers.
//!
//! Lengths and currency are not wrapped: the length unit is a
//! project-level label (see [`crate::settings::EstimatorSettings`]) and is
//! never converted, and currency is whatever the rate sheet is priced in.
//!
//! ## Example
//!
//! ```rust
//! use fab_core::units::{Hours, Minutes};
//!
//! let time = Minutes(90.0);
//! let hours: Hours = time.into();
//! assert_eq!(hours.0, 1.5);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Minutes in one hour
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Minutes in one day
pub const MINUTES_PER_DAY: f64 = 1440.0;

// ============================================================================
// Time Units
// ============================================================================

/// Duration in minutes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Minutes(pub f64);

/// Duration in hours
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(pub f64);

impl From<Minutes> for Hours {
    fn from(min: Minutes) -> Self {
        Hours(min.0 / MINUTES_PER_HOUR)
    }
}

impl From<Hours> for Minutes {
    fn from(hr: Hours) -> Self {
        Minutes(hr.0 * MINUTES_PER_HOUR)
    }
}

impl Minutes {
    /// Round to whole minutes and split into (days, hours, minutes).
    ///
    /// Negative and non-finite durations collapse to zero.
    pub fn split_dhm(self) -> (u64, u64, u64) {
        let total = if self.0.is_finite() && self.0 > 0.0 {
            self.0.round() as u64
        } else {
            0
        };
        let per_day = MINUTES_PER_DAY as u64;
        let per_hour = MINUTES_PER_HOUR as u64;
        (total / per_day, (total % per_day) / per_hour, total % per_hour)
    }
}

impl Add for Minutes {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Minutes(self.0 + rhs.0)
    }
}

impl Minutes {
    /// Get the raw f64 value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Hours {
    /// Get the raw f64 value
    pub fn value(self) -> f64 {
        self.0
    }
}
