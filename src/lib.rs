//! # Library Circulation
//!
//! Tracks students, books and loans for a single school library, and
//! enforces who may borrow what and what a late return costs.
//!
//! ## Design Principles
//!
//! - **Fixed-point money**: fines use 2 decimal places via `rust_decimal`
//! - **Full checklists**: every eligibility condition is reported, not just the first failure
//! - **Strict invariants**: loan counts and shelf availability always match the ledger
//! - **Two-phase transitions**: check first, commit only after confirmation
//! - **No hidden clock**: every mutating operation takes the current instant
//!
//! ## Example
//!
//! ```no_run
//! use library_circulation::{seed, CirculationPolicy};
//! use std::path::Path;
//!
//! let mut desk = seed::load_dir(Path::new("seed"), CirculationPolicy::default()).unwrap();
//! let now = chrono::Local::now().naive_local();
//!
//! let decision = desk.validate_issue(1, "L001").unwrap();
//! if decision.approved() {
//!     let loan = desk.commit_issue(&decision, now).unwrap();
//!     println!("loan {} due {}", loan.id, loan.due_date);
//! }
//! ```

pub mod book;
pub mod catalog;
pub mod circulation;
pub mod command;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod fine;
pub mod ledger;
pub mod loan;
pub mod money;
pub mod report;
pub mod roster;
pub mod seed;
pub mod student;

pub use book::Book;
pub use catalog::Catalog;
pub use circulation::{
    BatchSummary, BookStatus, Circulation, IssueDecision, ReturnQuote, ReturnReceipt,
    StudentStatus,
};
pub use config::CirculationPolicy;
pub use eligibility::{can_borrow, Check, Condition, Eligibility, FailureReason};
pub use error::{CirculationError, Result};
pub use fine::{compute_fine, FinePolicy};
pub use ledger::Ledger;
pub use loan::{Loan, LoanState};
pub use money::{Money, ParseMoneyError};
pub use report::{write_report, Report};
pub use roster::{borrow_limit, Roster};
pub use student::Student;
