//! Borrowing eligibility checklist.
//!
//! Four independent conditions decide whether a student may take a book.
//! All four are always evaluated so the operator sees the whole picture,
//! passing conditions included.

use crate::book::Book;
use crate::money::Money;
use crate::roster::borrow_limit;
use crate::student::Student;
use serde::Serialize;
use std::fmt;

/// One of the four conditions a loan request is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Condition {
    AccountActive,
    NoPendingFines,
    WithinBorrowLimit,
    BookAvailable,
}

/// Why a condition failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// Student account is inactive.
    Inactive,

    /// Any positive balance blocks borrowing.
    OutstandingFines(Money),

    /// Student already holds as many loans as the grade allows.
    BorrowLimitReached { loans: u32, limit: u32 },

    /// Book is lent out.
    BookUnavailable,
}

impl FailureReason {
    pub fn condition(&self) -> Condition {
        match self {
            FailureReason::Inactive => Condition::AccountActive,
            FailureReason::OutstandingFines(_) => Condition::NoPendingFines,
            FailureReason::BorrowLimitReached { .. } => Condition::WithinBorrowLimit,
            FailureReason::BookUnavailable => Condition::BookAvailable,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Inactive => write!(f, "student account is inactive"),
            FailureReason::OutstandingFines(amount) => {
                write!(f, "student has pending fines of ${}", amount)
            }
            FailureReason::BorrowLimitReached { loans, limit } => {
                write!(f, "student reached the borrow limit ({}/{})", loans, limit)
            }
            FailureReason::BookUnavailable => write!(f, "book is not available"),
        }
    }
}

/// Outcome of a single condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub condition: Condition,

    /// `None` when the condition passed.
    pub failure: Option<FailureReason>,
}

impl Check {
    fn evaluate(condition: Condition, failure: Option<FailureReason>) -> Self {
        Check { condition, failure }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// The full checklist for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub checks: Vec<Check>,
}

impl Eligibility {
    /// Approved iff every condition passed.
    pub fn approved(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    /// Failure reasons in checklist order; empty when approved.
    pub fn reasons(&self) -> Vec<FailureReason> {
        self.checks
            .iter()
            .filter_map(|c| c.failure.clone())
            .collect()
    }
}

/// Evaluates the three student-side conditions.
pub fn student_checks(student: &Student) -> Vec<Check> {
    let limit = borrow_limit(student.grade);

    vec![
        Check::evaluate(
            Condition::AccountActive,
            (!student.active).then_some(FailureReason::Inactive),
        ),
        Check::evaluate(
            Condition::NoPendingFines,
            student
                .has_fines()
                .then_some(FailureReason::OutstandingFines(student.fines)),
        ),
        Check::evaluate(
            Condition::WithinBorrowLimit,
            (student.loans >= limit).then_some(FailureReason::BorrowLimitReached {
                loans: student.loans,
                limit,
            }),
        ),
    ]
}

/// Decides whether `student` may borrow `book`.
pub fn can_borrow(student: &Student, book: &Book) -> Eligibility {
    let mut checks = student_checks(student);
    checks.push(Check::evaluate(
        Condition::BookAvailable,
        (!book.available).then_some(FailureReason::BookUnavailable),
    ));
    Eligibility { checks }
}
