//! Overdue fine calculation.
//!
//! Fines are charged per calendar day: both instants are truncated to their
//! date before differencing, so the time of day never matters. The return
//! instant is always passed in; nothing here reads the clock.

use crate::money::Money;
use chrono::NaiveDateTime;

/// Whole calendar days between the due date and the return date.
///
/// Zero for on-time or early returns.
pub fn days_late(due: NaiveDateTime, returned: NaiveDateTime) -> u32 {
    let days = returned
        .date()
        .signed_duration_since(due.date())
        .num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Fine for returning at `returned` a loan due at `due`, at the default
/// 2.00 per day. The service charges through its configured [`FinePolicy`].
pub fn compute_fine(due: NaiveDateTime, returned: NaiveDateTime) -> Money {
    FinePolicy::default().fine_for(due, returned)
}

/// Per-day fine rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinePolicy {
    pub daily_rate: Money,
}

impl FinePolicy {
    pub fn new(daily_rate: Money) -> Self {
        FinePolicy { daily_rate }
    }

    /// `days_late × daily_rate`; never negative.
    pub fn fine_for(&self, due: NaiveDateTime, returned: NaiveDateTime) -> Money {
        self.daily_rate.times(days_late(due, returned))
    }
}

/// 2.00 per day late.
impl Default for FinePolicy {
    fn default() -> Self {
        FinePolicy::new(Money::from_cents(200))
    }
}
