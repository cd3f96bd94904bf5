//! Error types for the circulation manager.

use crate::eligibility::FailureReason;
use thiserror::Error;

/// Result type alias for circulation operations
pub type Result<T> = std::result::Result<T, CirculationError>;

/// Errors that can occur while loading seed data or running circulation
/// commands.
///
/// Business rejections (`*NotFound`, `Validation`) are expected outcomes the
/// caller reports and moves on from. None of these are fatal to the service.
#[derive(Error, Debug)]
pub enum CirculationError {
    /// No student registered under this id
    #[error("Student {0} not found")]
    StudentNotFound(u32),

    /// No book registered under this code
    #[error("Book {0} not found")]
    BookNotFound(String),

    /// No outstanding loan with this id
    #[error("Outstanding loan {0} not found")]
    LoanNotFound(u32),

    /// One or more eligibility conditions failed
    #[error("Loan rejected: {}", format_reasons(.0))]
    Validation(Vec<FailureReason>),

    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid seed or command record
    #[error("Invalid record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Two students share an id
    #[error("Duplicate student ID {0}")]
    DuplicateStudent(u32),

    /// Two books share a code (case-insensitively)
    #[error("Duplicate book code {0}")]
    DuplicateBook(String),

    /// Two loans share an id
    #[error("Duplicate loan ID {0}")]
    DuplicateLoan(u32),

    /// Every loan id up to `u32::MAX` is taken
    #[error("No loan IDs left to assign")]
    LoanIdsExhausted,

    /// Seed collections contradict each other
    #[error("Inconsistent seed data: {0}")]
    InconsistentSeed(String),

    /// Date could not be parsed or is out of range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Bad configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing command line argument
    #[error(
        "Missing arguments. Usage: library-circulation <seed-dir> <commands.csv> \
         [students|books|available|outstanding|loans]"
    )]
    MissingArgument,
}

impl CirculationError {
    /// Returns `true` for the student/book/loan lookup failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CirculationError::StudentNotFound(_)
                | CirculationError::BookNotFound(_)
                | CirculationError::LoanNotFound(_)
        )
    }
}

fn format_reasons(reasons: &[FailureReason]) -> String {
    reasons
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
