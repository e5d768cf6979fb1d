//! Validity-window filtering.

use chrono::{NaiveDate, Utc};
use sealmail_core::{Identity, Policy};

/// Decides whether an identity's window covers a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityFilter {
    enforce: bool,
    today: NaiveDate,
}

impl ValidityFilter {
    /// Filter that checks windows against `today`.
    pub const fn on(today: NaiveDate) -> Self {
        Self {
            enforce: true,
            today,
        }
    }

    /// Filter that accepts every identity.
    pub const fn disabled() -> Self {
        Self {
            enforce: false,
            today: NaiveDate::MIN,
        }
    }

    /// Filter for `policy`, dated with the current UTC calendar day.
    pub fn for_policy(policy: &Policy) -> Self {
        if policy.validate_dates {
            Self::on(Utc::now().date_naive())
        } else {
            Self::disabled()
        }
    }

    /// True if `identity` may be used today. Absent bounds do not constrain.
    pub fn is_valid(&self, identity: &Identity) -> bool {
        if !self.enforce {
            return true;
        }
        identity.not_before().map_or(true, |start| start <= self.today)
            && identity.not_after().map_or(true, |end| end >= self.today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealmail_core::fixtures::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let filter = ValidityFilter::on(day(2024, 6, 1));
        let exact = recipient1().with_window(Some(day(2024, 6, 1)), Some(day(2024, 6, 1)));
        assert!(filter.is_valid(&exact));

        let expired = recipient1().with_window(None, Some(day(2024, 5, 31)));
        let pending = recipient1().with_window(Some(day(2024, 6, 2)), None);
        assert!(!filter.is_valid(&expired));
        assert!(!filter.is_valid(&pending));
    }

    #[test]
    fn test_unbounded_identity_is_always_valid() {
        assert!(ValidityFilter::on(day(1970, 1, 1)).is_valid(&recipient1()));
        assert!(ValidityFilter::on(day(2999, 1, 1)).is_valid(&recipient1()));
    }

    #[test]
    fn test_disabled_filter_accepts_expired() {
        let expired = recipient1().with_window(None, Some(day(2000, 1, 1)));
        assert!(ValidityFilter::disabled().is_valid(&expired));
        assert!(ValidityFilter::for_policy(&Policy::default()).is_valid(&expired));
        assert!(!ValidityFilter::for_policy(&Policy::default().with_validate_dates(true))
            .is_valid(&expired));
    }
}
