//! Loan issue and return.
//!
//! The circulation service owns the roster, catalog and ledger and is their
//! only writer. Both transitions come in two phases: a read-only check the
//! caller can show to an operator, then a commit that re-checks and applies
//! every mutation together or none at all.

use crate::book::Book;
use crate::catalog::Catalog;
use crate::command::{CommandKind, CommandRecord};
use crate::config::CirculationPolicy;
use crate::eligibility::{can_borrow, student_checks, Check, Eligibility};
use crate::error::{CirculationError, Result};
use crate::fine::days_late;
use crate::ledger::Ledger;
use crate::loan::Loan;
use crate::money::Money;
use crate::roster::{borrow_limit, Roster};
use crate::student::Student;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::Read;

/// Result of checking a loan request, before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDecision {
    pub student_id: u32,

    /// Book code as registered in the catalog.
    pub book_code: String,

    /// Borrow limit for the student's grade.
    pub limit: u32,

    pub eligibility: Eligibility,
}

impl IssueDecision {
    pub fn approved(&self) -> bool {
        self.eligibility.approved()
    }
}

/// What returning a loan right now would cost, before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnQuote {
    pub loan: Loan,
    pub days_late: u32,
    pub fine: Money,
}

/// Outcome of a committed return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// The loan, now closed.
    pub loan: Loan,
    pub days_late: u32,

    /// Fine charged for this return; zero when on time.
    pub fine: Money,

    /// Student's fine balance after the charge.
    pub balance: Money,
}

/// A student's borrowing situation.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentStatus {
    pub student: Student,
    pub limit: u32,

    /// `limit - loans`; zero or negative means no room left.
    pub remaining: i64,

    /// The student-side conditions of the eligibility checklist.
    pub checks: Vec<Check>,

    pub loans: Vec<Loan>,
}

impl StudentStatus {
    /// Whether the student could request a loan of some available book.
    pub fn can_request(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }
}

/// A book's shelf state and, when lent, who has it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookStatus {
    pub book: Book,
    pub loan: Option<Loan>,
    pub borrower: Option<Student>,
}

/// Counts from a batch of commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub issued: usize,
    pub returned: usize,
    pub rejected: usize,
}

/// The circulation desk.
///
/// # Invariants
///
/// - every student's `loans` equals their outstanding loans in the ledger
/// - a book is unavailable iff exactly one outstanding loan references it
#[derive(Debug, Clone)]
pub struct Circulation {
    roster: Roster,
    catalog: Catalog,
    ledger: Ledger,
    policy: CirculationPolicy,
}

impl Circulation {
    /// Builds the service over existing stores with the default policy.
    ///
    /// See [`Circulation::with_policy`].
    pub fn new(roster: Roster, catalog: Catalog, ledger: Ledger) -> Result<Self> {
        Self::with_policy(roster, catalog, ledger, CirculationPolicy::default())
    }

    /// Builds the service over existing stores.
    ///
    /// Every ledger record must reference a registered student and book, and
    /// no book may have more than one outstanding loan. Student loan counts
    /// and book availability are then derived from the ledger; recorded
    /// values that disagree are overwritten with a warning.
    pub fn with_policy(
        mut roster: Roster,
        mut catalog: Catalog,
        ledger: Ledger,
        policy: CirculationPolicy,
    ) -> Result<Self> {
        let mut open_per_student: HashMap<u32, u32> = HashMap::new();
        let mut open_per_book: HashMap<String, u32> = HashMap::new();

        for loan in ledger.loans() {
            if roster.find_student(loan.student).is_none() {
                return Err(CirculationError::InconsistentSeed(format!(
                    "loan {} references unknown student {}",
                    loan.id, loan.student
                )));
            }
            if catalog.find_book(&loan.book).is_none() {
                return Err(CirculationError::InconsistentSeed(format!(
                    "loan {} references unknown book {}",
                    loan.id, loan.book
                )));
            }

            if loan.is_outstanding() {
                *open_per_student.entry(loan.student).or_default() += 1;
                let open = open_per_book.entry(Book::key(&loan.book)).or_default();
                *open += 1;
                if *open > 1 {
                    return Err(CirculationError::InconsistentSeed(format!(
                        "book {} has more than one outstanding loan",
                        loan.book
                    )));
                }
            }
        }

        for student in roster.students_mut() {
            if student.fines.is_negative() {
                return Err(CirculationError::InconsistentSeed(format!(
                    "student {} has a negative fine balance",
                    student.id
                )));
            }

            let open = open_per_student.get(&student.id).copied().unwrap_or(0);
            if student.loans != open {
                warn!(
                    "Student {} recorded {} loans but the ledger has {} outstanding, using ledger",
                    student.id, student.loans, open
                );
                student.loans = open;
            }
        }

        let codes: Vec<String> = catalog.books().iter().map(|b| b.code.clone()).collect();
        for code in codes {
            let lent = open_per_book.contains_key(&Book::key(&code));
            if let Some(book) = catalog.find_book_mut(&code) {
                if book.available == lent {
                    warn!(
                        "Book {} recorded available={} but the ledger says {}, using ledger",
                        book.code, book.available, !lent
                    );
                    book.available = !lent;
                }
            }
        }

        info!(
            "Circulation ready: {} students, {} books, {} loans ({} outstanding)",
            roster.len(),
            catalog.len(),
            ledger.len(),
            ledger.outstanding_loans(None).len()
        );

        Ok(Circulation {
            roster,
            catalog,
            ledger,
            policy,
        })
    }

    pub fn policy(&self) -> &CirculationPolicy {
        &self.policy
    }

    pub fn find_student(&self, id: u32) -> Option<&Student> {
        self.roster.find_student(id)
    }

    pub fn find_book(&self, code: &str) -> Option<&Book> {
        self.catalog.find_book(code)
    }

    pub fn list_available(&self) -> Vec<&Book> {
        self.catalog.list_available()
    }

    pub fn outstanding_loans(&self, student: Option<u32>) -> Vec<&Loan> {
        self.ledger.outstanding_loans(student)
    }

    pub fn students(&self) -> &[Student] {
        self.roster.students()
    }

    pub fn books(&self) -> &[Book] {
        self.catalog.books()
    }

    pub fn loans(&self) -> &[Loan] {
        self.ledger.loans()
    }

    pub fn loan_by_id(&self, id: u32) -> Option<&Loan> {
        self.ledger.loan_by_id(id)
    }

    /// Borrow limit for a grade.
    pub fn borrow_limit(&self, grade: i32) -> u32 {
        borrow_limit(grade)
    }

    pub fn student_status(&self, id: u32) -> Result<StudentStatus> {
        let student = self
            .roster
            .find_student(id)
            .ok_or(CirculationError::StudentNotFound(id))?;
        let limit = borrow_limit(student.grade);

        Ok(StudentStatus {
            student: student.clone(),
            limit,
            remaining: i64::from(limit) - i64::from(student.loans),
            checks: student_checks(student),
            loans: self
                .ledger
                .outstanding_loans(Some(id))
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    pub fn book_status(&self, code: &str) -> Result<BookStatus> {
        let book = self
            .catalog
            .find_book(code)
            .ok_or_else(|| CirculationError::BookNotFound(code.to_string()))?;
        let loan = self.ledger.outstanding_for_book(&book.code).cloned();
        let borrower = loan
            .as_ref()
            .and_then(|l| self.roster.find_student(l.student))
            .cloned();

        Ok(BookStatus {
            book: book.clone(),
            loan,
            borrower,
        })
    }

    /// Checks a loan request without mutating anything.
    ///
    /// Fails only when the student or book does not exist; a rejected request
    /// is an `Ok` decision whose checklist lists every failed condition.
    pub fn validate_issue(&self, student_id: u32, book_code: &str) -> Result<IssueDecision> {
        let student = self
            .roster
            .find_student(student_id)
            .ok_or(CirculationError::StudentNotFound(student_id))?;
        let book = self
            .catalog
            .find_book(book_code)
            .ok_or_else(|| CirculationError::BookNotFound(book_code.to_string()))?;

        Ok(IssueDecision {
            student_id,
            book_code: book.code.clone(),
            limit: borrow_limit(student.grade),
            eligibility: can_borrow(student, book),
        })
    }

    /// Issues the loan described by a decision the caller confirmed.
    ///
    /// Eligibility is evaluated again against the current state, so a stale
    /// or rejected decision can never produce a loan.
    pub fn commit_issue(&mut self, decision: &IssueDecision, now: NaiveDateTime) -> Result<Loan> {
        let due_date = self.policy.due_date(now)?;

        let student = self
            .roster
            .find_student_mut(decision.student_id)
            .ok_or(CirculationError::StudentNotFound(decision.student_id))?;
        let book = self
            .catalog
            .find_book_mut(&decision.book_code)
            .ok_or_else(|| CirculationError::BookNotFound(decision.book_code.clone()))?;

        let eligibility = can_borrow(student, book);
        if !eligibility.approved() {
            debug!(
                "Loan of {} to student {} rejected: {:?}",
                book.code,
                student.id,
                eligibility.reasons()
            );
            return Err(CirculationError::Validation(eligibility.reasons()));
        }

        let loan = self
            .ledger
            .append(student.id, &book.code, now, due_date)?
            .clone();
        student.record_issue();
        book.available = false;

        debug!(
            "Issued loan {} of {} to student {}, due {}",
            loan.id, loan.book, loan.student, loan.due_date
        );

        Ok(loan)
    }

    /// Validates and commits in one step.
    pub fn issue_loan(
        &mut self,
        student_id: u32,
        book_code: &str,
        now: NaiveDateTime,
    ) -> Result<Loan> {
        let decision = self.validate_issue(student_id, book_code)?;
        self.commit_issue(&decision, now)
    }

    /// Computes what returning an outstanding loan at `now` would charge.
    pub fn preview_return(&self, loan_id: u32, now: NaiveDateTime) -> Result<ReturnQuote> {
        let loan = self
            .ledger
            .outstanding_by_id(loan_id)
            .ok_or(CirculationError::LoanNotFound(loan_id))?;

        Ok(ReturnQuote {
            loan: loan.clone(),
            days_late: days_late(loan.due_date, now),
            fine: self.policy.fine_policy().fine_for(loan.due_date, now),
        })
    }

    /// Closes an outstanding loan at `now` and charges any fine.
    ///
    /// The fine is added to the student's balance even when zero. It never
    /// clears on its own and never deactivates the student.
    pub fn return_loan(&mut self, loan_id: u32, now: NaiveDateTime) -> Result<ReturnReceipt> {
        let quote = self.preview_return(loan_id, now)?;

        let student = self
            .roster
            .find_student_mut(quote.loan.student)
            .ok_or(CirculationError::StudentNotFound(quote.loan.student))?;
        let book = self
            .catalog
            .find_book_mut(&quote.loan.book)
            .ok_or_else(|| CirculationError::BookNotFound(quote.loan.book.clone()))?;
        let loan = self
            .ledger
            .outstanding_by_id_mut(loan_id)
            .ok_or(CirculationError::LoanNotFound(loan_id))?;

        loan.close(now);
        book.available = true;
        if !student.record_return(quote.fine) {
            warn!(
                "Student {} had no loans on record while returning loan {}",
                student.id, loan_id
            );
        }

        let receipt = ReturnReceipt {
            loan: loan.clone(),
            days_late: quote.days_late,
            fine: quote.fine,
            balance: student.fines,
        };

        debug!(
            "Returned loan {} ({} days late, fine {}), student {} balance {}",
            loan_id, receipt.days_late, receipt.fine, student.id, receipt.balance
        );

        Ok(receipt)
    }

    /// Applies issue/return commands from a CSV reader, in order.
    ///
    /// Rows without a date run at `now`. Malformed rows and rejected commands
    /// are logged at warn level and skipped.
    pub fn process_commands<R: Read>(
        &mut self,
        reader: R,
        now: NaiveDateTime,
    ) -> Result<BatchSummary> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut summary = BatchSummary::default();

        for (row_idx, result) in csv_reader.deserialize::<CommandRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let parsed = result
                .map_err(CirculationError::from)
                .and_then(|record| record.parse(row_num));
            let command = match parsed {
                Ok(command) => command,
                Err(e) => {
                    warn!("Row {}: {}", row_num, e);
                    summary.rejected += 1;
                    continue;
                }
            };
            let at = command.date.unwrap_or(now);

            let outcome = match command.kind {
                CommandKind::Issue { student, book } => {
                    self.issue_loan(student, &book, at).map(|loan| {
                        summary.issued += 1;
                        info!(
                            "Row {}: loan {} of {} to student {}",
                            row_num, loan.id, loan.book, loan.student
                        );
                    })
                }
                CommandKind::Return { loan } => self.return_loan(loan, at).map(|receipt| {
                    summary.returned += 1;
                    info!(
                        "Row {}: loan {} returned, fine {}",
                        row_num, receipt.loan.id, receipt.fine
                    );
                }),
            };

            if let Err(e) = outcome {
                warn!("Row {}: {}", row_num, e);
                summary.rejected += 1;
            }
        }

        Ok(summary)
    }

    /// Verifies the loan-count and availability invariants against the ledger.
    pub fn check_invariants(&self) -> bool {
        let counts_match = self.roster.students().iter().all(|s| {
            s.loans as usize == self.ledger.outstanding_loans(Some(s.id)).len()
        });
        let shelves_match = self.catalog.books().iter().all(|b| {
            let open = self
                .ledger
                .outstanding_loans(None)
                .iter()
                .filter(|l| Book::key(&l.book) == Book::key(&b.code))
                .count();
            b.available == (open == 0) && open <= 1
        });
        counts_match && shelves_match
    }
}
