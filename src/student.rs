//! Student model and the counters the circulation service maintains on it.

use crate::money::Money;
use serde::Serialize;

/// A registered student.
///
/// # Invariants
///
/// - `loans` equals the number of this student's outstanding loans in the ledger
/// - `fines` is never negative
///
/// # Fines and the active flag
///
/// Charging a fine never touches `active`. A student with a positive balance
/// stays active but fails the fines condition of the eligibility checklist
/// until the balance is cleared outside this system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// School grade; drives the borrow limit.
    pub grade: i32,

    /// Whether the account may borrow at all.
    pub active: bool,

    /// Outstanding fine balance.
    pub fines: Money,

    /// Number of outstanding loans.
    pub loans: u32,
}

impl Student {
    /// Creates an active student with no loans and no fines.
    pub fn new(id: u32, name: impl Into<String>, grade: i32) -> Self {
        Student {
            id,
            name: name.into(),
            grade,
            active: true,
            fines: Money::ZERO,
            loans: 0,
        }
    }

    /// Returns `true` if any fine is pending.
    pub fn has_fines(&self) -> bool {
        self.fines.is_positive()
    }

    /// Records a newly issued loan.
    pub(crate) fn record_issue(&mut self) {
        self.loans += 1;
    }

    /// Records a returned loan and charges its fine.
    ///
    /// The fine is added even when zero. Returns `false` without touching
    /// anything if the student has no outstanding loan to close.
    pub(crate) fn record_return(&mut self, fine: Money) -> bool {
        if self.loans == 0 {
            return false;
        }

        self.loans -= 1;
        self.fines += fine;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_student_is_active_and_clear() {
        let student = Student::new(1, "Ana García", 9);
        assert_eq!(student.id, 1);
        assert!(student.active);
        assert_eq!(student.fines, Money::ZERO);
        assert_eq!(student.loans, 0);
        assert!(!student.has_fines());
    }

    #[test]
    fn test_issue_then_return_with_fine() {
        let mut student = Student::new(1, "Ana García", 9);
        student.record_issue();
        assert_eq!(student.loans, 1);

        assert!(student.record_return(Money::from_cents(2000)));
        assert_eq!(student.loans, 0);
        assert_eq!(student.fines.to_string(), "20.00");
        assert!(student.has_fines());
        assert!(student.active);
    }

    #[test]
    fn test_return_without_loans_is_rejected() {
        let mut student = Student::new(1, "Ana García", 9);
        assert!(!student.record_return(Money::from_cents(200)));
        assert_eq!(student.loans, 0);
        assert_eq!(student.fines, Money::ZERO);
    }

    #[test]
    fn test_fines_accumulate() {
        let mut student = Student::new(2, "Carlos Ruiz", 7);
        student.record_issue();
        student.record_issue();
        student.record_return(Money::from_cents(400));
        student.record_return(Money::ZERO);
        assert_eq!(student.fines.to_string(), "4.00");
    }
}
