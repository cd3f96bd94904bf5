//! Edge case tests for loan issue, return and fines through the public API.

use chrono::{Days, NaiveDate, NaiveDateTime};
use library_circulation::{
    borrow_limit, compute_fine, Book, Catalog, Circulation, CirculationError, Condition,
    FailureReason, Ledger, Money, Roster, Student,
};
use std::str::FromStr;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

fn library(students: Vec<Student>, codes: &[&str]) -> Circulation {
    let mut roster = Roster::new();
    for student in students {
        roster.register(student).unwrap();
    }
    let mut catalog = Catalog::new();
    for code in codes {
        catalog
            .register(Book::new(*code, format!("Title {}", code), "ficcion"))
            .unwrap();
    }
    Circulation::new(roster, catalog, Ledger::new()).unwrap()
}

/// Both invariants, checked independently of `check_invariants`.
fn assert_consistent(desk: &Circulation) {
    for student in desk.students() {
        assert_eq!(
            student.loans as usize,
            desk.outstanding_loans(Some(student.id)).len(),
            "loan count for student {}",
            student.id
        );
    }
    for book in desk.books() {
        let open = desk
            .outstanding_loans(None)
            .iter()
            .filter(|l| l.book == book.code)
            .count();
        assert_eq!(!book.available, open == 1, "availability of {}", book.code);
        assert!(open <= 1);
    }
    assert!(desk.check_invariants());
}

// ==================== FINE EDGE CASES ====================

#[test]
fn test_fine_table() {
    let due = at(2025, 10, 10);
    let day = |n: u64| due.checked_add_days(Days::new(n)).unwrap();

    assert_eq!(compute_fine(due, due), Money::ZERO);
    assert_eq!(
        compute_fine(due, due.checked_sub_days(Days::new(1)).unwrap()),
        Money::ZERO
    );
    assert_eq!(compute_fine(due, day(1)).to_string(), "2.00");
    assert_eq!(compute_fine(due, day(5)).to_string(), "10.00");
}

#[test]
fn test_fine_across_month_and_year_boundaries() {
    assert_eq!(
        compute_fine(at(2025, 12, 30), at(2026, 1, 2)).to_string(),
        "6.00"
    );
    assert_eq!(
        compute_fine(at(2024, 2, 28), at(2024, 3, 1)).to_string(),
        "4.00"
    );
}

#[test]
fn test_return_long_before_due_is_free() {
    let mut desk = library(vec![Student::new(1, "Ana García", 9)], &["L001"]);
    let loan = desk.issue_loan(1, "L001", at(2025, 10, 1)).unwrap();

    // Returned the same day it was issued.
    let receipt = desk.return_loan(loan.id, at(2025, 10, 1)).unwrap();
    assert_eq!(receipt.fine, Money::ZERO);
    assert_eq!(receipt.days_late, 0);
}

// ==================== ELIGIBILITY EDGE CASES ====================

#[test]
fn test_grade_limits_through_the_desk() {
    let codes = ["B1", "B2", "B3", "B4", "B5"];
    let mut desk = library(vec![Student::new(6, "Sexto", 6)], &codes);

    for code in &codes[..4] {
        desk.issue_loan(6, code, at(2025, 10, 1)).unwrap();
    }
    let err = desk.issue_loan(6, "B5", at(2025, 10, 1)).unwrap_err();
    assert!(matches!(
        err,
        CirculationError::Validation(ref reasons)
            if reasons == &vec![FailureReason::BorrowLimitReached { loans: 4, limit: 4 }]
    ));
    assert_eq!(borrow_limit(6), 4);
    assert_consistent(&desk);
}

#[test]
fn test_unlisted_grade_never_borrows() {
    let mut desk = library(vec![Student::new(10, "Bachiller", 10)], &["L001"]);
    let decision = desk.validate_issue(10, "L001").unwrap();
    assert!(!decision.approved());
    assert_eq!(decision.limit, 0);
    assert!(desk.issue_loan(10, "L001", at(2025, 10, 1)).is_err());
}

#[test]
fn test_checklist_reports_passing_conditions_too() {
    let mut student = Student::new(1, "Ana García", 9);
    student.fines = Money::from_str("0.01").unwrap();
    let desk = library(vec![student], &["L001"]);

    let decision = desk.validate_issue(1, "L001").unwrap();
    let checks = &decision.eligibility.checks;
    assert_eq!(checks.len(), 4);

    let failed: Vec<Condition> = checks
        .iter()
        .filter(|c| !c.passed())
        .map(|c| c.condition)
        .collect();
    assert_eq!(failed, vec![Condition::NoPendingFines]);
}

// ==================== LIFECYCLE EDGE CASES ====================

#[test]
fn test_fine_blocks_next_loan_without_deactivating() {
    let mut desk = library(vec![Student::new(1, "Ana García", 9)], &["L001", "L002"]);
    let loan = desk.issue_loan(1, "L001", at(2025, 10, 1)).unwrap();
    desk.return_loan(loan.id, at(2025, 10, 9)).unwrap();

    let ana = desk.find_student(1).unwrap();
    assert!(ana.active);
    assert_eq!(ana.fines.to_string(), "2.00");

    let err = desk.issue_loan(1, "L002", at(2025, 10, 10)).unwrap_err();
    assert!(matches!(
        err,
        CirculationError::Validation(ref reasons)
            if reasons == &vec![FailureReason::OutstandingFines(Money::from_cents(200))]
    ));
    assert_consistent(&desk);
}

#[test]
fn test_book_can_circulate_again_after_return() {
    let mut desk = library(
        vec![Student::new(1, "Ana García", 9), Student::new(3, "María López", 9)],
        &["L001"],
    );
    let first = desk.issue_loan(1, "L001", at(2025, 10, 1)).unwrap();
    assert!(desk.issue_loan(3, "L001", at(2025, 10, 2)).is_err());

    desk.return_loan(first.id, at(2025, 10, 5)).unwrap();
    let second = desk.issue_loan(3, "l001", at(2025, 10, 6)).unwrap();

    assert_eq!(second.id, first.id + 1);
    assert_eq!(desk.loans().len(), 2);
    assert_eq!(desk.outstanding_loans(None).len(), 1);
    assert_consistent(&desk);
}

#[test]
fn test_double_return_fails_with_not_found() {
    let mut desk = library(vec![Student::new(1, "Ana García", 9)], &["L001"]);
    let loan = desk.issue_loan(1, "L001", at(2025, 10, 1)).unwrap();

    desk.return_loan(loan.id, at(2025, 10, 20)).unwrap();
    let err = desk.return_loan(loan.id, at(2025, 10, 21)).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(desk.find_student(1).unwrap().fines.to_string(), "24.00");
    assert_eq!(
        desk.loan_by_id(loan.id).unwrap().returned_at,
        Some(at(2025, 10, 20))
    );
    assert_consistent(&desk);
}

#[test]
fn test_return_unknown_loan() {
    let mut desk = library(vec![Student::new(1, "Ana García", 9)], &["L001"]);
    assert!(matches!(
        desk.return_loan(1, at(2025, 10, 1)),
        Err(CirculationError::LoanNotFound(1))
    ));
    assert!(desk.preview_return(1, at(2025, 10, 1)).is_err());
}

#[test]
fn test_declined_confirmation_is_a_no_op() {
    let mut desk = library(vec![Student::new(1, "Ana García", 9)], &["L001"]);

    // Validate, then the operator walks away.
    let decision = desk.validate_issue(1, "L001").unwrap();
    assert!(decision.approved());
    assert!(desk.loans().is_empty());

    let loan = desk.issue_loan(1, "L001", at(2025, 10, 1)).unwrap();
    let quote = desk.preview_return(loan.id, at(2025, 10, 30)).unwrap();
    assert_eq!(quote.fine.to_string(), "44.00");
    assert!(desk.loan_by_id(loan.id).unwrap().is_outstanding());
    assert!(desk.find_student(1).unwrap().fines.is_zero());
    assert_consistent(&desk);
}

#[test]
fn test_invariants_hold_through_a_busy_day() {
    let mut desk = library(
        vec![
            Student::new(1, "Ana García", 9),
            Student::new(2, "Carlos Ruiz", 7),
            Student::new(3, "María López", 9),
        ],
        &["L001", "L002", "L003", "L004", "L005"],
    );

    let plan: [(u32, &str); 7] = [
        (1, "L001"),
        (2, "L002"),
        (2, "L003"),
        (3, "L001"),
        (1, "L004"),
        (1, "L005"),
        (2, "L005"),
    ];
    let mut issued = Vec::new();
    for (student, code) in plan {
        if let Ok(loan) = desk.issue_loan(student, code, at(2025, 10, 1)) {
            issued.push(loan.id);
        }
        assert_consistent(&desk);
    }
    assert_eq!(issued.len(), 5);

    for (offset, id) in issued.iter().enumerate() {
        desk.return_loan(*id, at(2025, 10, 7 + offset as u32)).unwrap();
        assert_consistent(&desk);
    }

    assert!(desk.outstanding_loans(None).is_empty());
    assert_eq!(desk.list_available().len(), 5);
}
