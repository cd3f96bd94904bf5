//! Circulation rules that can be tuned per deployment.

use crate::error::{CirculationError, Result};
use crate::fine::FinePolicy;
use crate::money::Money;
use chrono::{Days, NaiveDateTime};
use std::env;
use std::str::FromStr;

/// Environment variable overriding the grace period, in days.
pub const GRACE_DAYS_VAR: &str = "LIBRARY_GRACE_DAYS";

/// Environment variable overriding the daily fine, e.g. `2.00`.
pub const DAILY_FINE_VAR: &str = "LIBRARY_DAILY_FINE";

/// Loan period and fine rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CirculationPolicy {
    /// Days from loan date to due date.
    pub grace_period_days: u32,

    /// Charge per calendar day late.
    pub daily_fine: Money,
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        CirculationPolicy {
            grace_period_days: 7,
            daily_fine: FinePolicy::default().daily_rate,
        }
    }
}

impl CirculationPolicy {
    /// Reads overrides from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a policy from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::default();

        if let Some(raw) = lookup(GRACE_DAYS_VAR) {
            policy.grace_period_days = raw.trim().parse().map_err(|_| {
                CirculationError::InvalidConfig(format!(
                    "{} must be a whole number of days, got {:?}",
                    GRACE_DAYS_VAR, raw
                ))
            })?;
        }

        if let Some(raw) = lookup(DAILY_FINE_VAR) {
            let fine = Money::from_str(&raw).map_err(|e| {
                CirculationError::InvalidConfig(format!(
                    "{} must be an amount with at most 2 decimal places, got {:?}: {}",
                    DAILY_FINE_VAR, raw, e
                ))
            })?;
            if fine.is_negative() {
                return Err(CirculationError::InvalidConfig(format!(
                    "{} cannot be negative",
                    DAILY_FINE_VAR
                )));
            }
            policy.daily_fine = fine;
        }

        Ok(policy)
    }

    pub fn fine_policy(&self) -> FinePolicy {
        FinePolicy::new(self.daily_fine)
    }

    /// Due date for a loan made at `loan_date`.
    pub fn due_date(&self, loan_date: NaiveDateTime) -> Result<NaiveDateTime> {
        loan_date
            .checked_add_days(Days::new(u64::from(self.grace_period_days)))
            .ok_or_else(|| {
                CirculationError::InvalidDate(format!(
                    "due date for a loan made at {} is out of range",
                    loan_date
                ))
            })
    }
}
