// src/analytics/expiry.rs
//! Time-to-expiry gate
//!
//! Reduces an (expiration, evaluation time) pair to a year fraction
//! `T = whole days / 365`. An evaluation time after expiration is a usage
//! error and is reported as such; it is never clamped to zero.

use super::bs_analytic::DAYS_PER_YEAR;
use crate::error::{BsmError, BsmResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Contract expiration paired with the evaluation time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryClock {
    pub expiration: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl ExpiryClock {
    pub fn new(expiration: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        ExpiryClock { expiration, now }
    }

    /// Clock evaluated at the current wall time
    pub fn from_now(expiration: DateTime<Utc>) -> Self {
        ExpiryClock::new(expiration, Utc::now())
    }

    pub fn time_to_expiry(&self) -> BsmResult<f64> {
        time_to_expiry(self.expiration, self.now)
    }
}

/// Year fraction between `now` and `expiration`
///
/// Partial days are truncated, so a same-day expiry yields `T = 0`, which
/// the analytics reject.
///
/// # Errors
/// `TimeOrderingViolation` when `now` is strictly after `expiration`.
pub fn time_to_expiry(expiration: DateTime<Utc>, now: DateTime<Utc>) -> BsmResult<f64> {
    if now > expiration {
        return Err(BsmError::TimeOrderingViolation { expiration, now });
    }
    Ok((expiration - now).num_days() as f64 / DAYS_PER_YEAR)
}

/// Same as [`time_to_expiry`] for calendar dates taken at midnight UTC
pub fn time_to_expiry_from_dates(expiration: NaiveDate, now: NaiveDate) -> BsmResult<f64> {
    time_to_expiry(
        expiration.and_time(NaiveTime::MIN).and_utc(),
        now.and_time(NaiveTime::MIN).and_utc(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_full_year() {
        let expiration = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let t = time_to_expiry(expiration, now).unwrap();
        assert!((t - 1.0).abs() < 1e-12, "t = {}", t);
    }

    #[test]
    fn test_partial_days_truncate() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let expiration = now + Duration::hours(36);
        let t = time_to_expiry(expiration, now).unwrap();
        assert!((t - 1.0 / 365.0).abs() < 1e-15);
    }

    #[test]
    fn test_same_instant_is_zero() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap();
        assert_eq!(time_to_expiry(now, now).unwrap(), 0.0);
    }

    #[test]
    fn test_evaluation_after_expiration_fails() {
        let expiration = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let result = time_to_expiry_from_dates(expiration, now);
        assert!(matches!(result, Err(BsmError::TimeOrderingViolation { .. })));
    }

    #[test]
    fn test_clock_wrapper() {
        let clock = ExpiryClock::new(
            Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 9, 21, 0, 0, 0).unwrap(),
        );
        let t = clock.time_to_expiry().unwrap();
        assert!((t - 90.0 / 365.0).abs() < 1e-15);
    }
}
