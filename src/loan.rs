//! Loan records and their open/closed lifecycle.

use crate::error::{CirculationError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Parses `YYYY-MM-DD` (midnight) or `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CirculationError::InvalidDate(trimmed.to_string()))
}

/// Lifecycle state of a loan. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoanState {
    /// Book is out with the student.
    Open,
    /// Book came back; the record is now history.
    Closed,
}

impl fmt::Display for LoanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanState::Open => write!(f, "open"),
            LoanState::Closed => write!(f, "closed"),
        }
    }
}

/// A single loan of one book to one student.
///
/// Everything except `returned_at` is fixed at creation. `returned_at` is set
/// exactly once, when the loan is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    /// Ledger-assigned id, never reused.
    pub id: u32,

    /// Borrowing student.
    pub student: u32,

    /// Code of the lent book, as registered in the catalog.
    pub book: String,

    pub loan_date: NaiveDateTime,

    pub due_date: NaiveDateTime,

    /// When the book came back; `None` while the loan is open.
    pub returned_at: Option<NaiveDateTime>,
}

impl Loan {
    /// Returns `true` while the book has not been returned.
    pub fn is_outstanding(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn state(&self) -> LoanState {
        if self.is_outstanding() {
            LoanState::Open
        } else {
            LoanState::Closed
        }
    }

    /// Closes the loan at the given instant.
    ///
    /// Returns `false` if the loan was already closed; the recorded return
    /// date is never overwritten.
    pub(crate) fn close(&mut self, at: NaiveDateTime) -> bool {
        if !self.is_outstanding() {
            return false;
        }

        self.returned_at = Some(at);
        true
    }
}
