//! Append-only loan history.

use crate::book::Book;
use crate::error::{CirculationError, Result};
use crate::loan::Loan;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Every loan ever issued, in id order.
///
/// Records are never removed. Ids come from a counter that starts at the
/// highest known id + 1 (or 1 for an empty ledger), so they are never reused.
/// Once `u32::MAX` is taken the counter is exhausted and no further loan can
/// be appended.
#[derive(Debug, Clone)]
pub struct Ledger {
    loans: Vec<Loan>,
    index: HashMap<u32, usize>,
    next_id: Option<u32>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            loans: Vec::new(),
            index: HashMap::new(),
            next_id: Some(1),
        }
    }

    /// Adds an existing record (seed history). The id must be unused.
    pub fn insert(&mut self, loan: Loan) -> Result<()> {
        if self.index.contains_key(&loan.id) {
            return Err(CirculationError::DuplicateLoan(loan.id));
        }

        let needs_sort = self.loans.last().is_some_and(|last| last.id > loan.id);
        self.next_id = match (self.next_id, loan.id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
        self.index.insert(loan.id, self.loans.len());
        self.loans.push(loan);

        if needs_sort {
            self.loans.sort_by_key(|l| l.id);
            self.reindex();
        }
        Ok(())
    }

    /// Records a new open loan under the next id and returns it.
    ///
    /// Fails without touching the ledger when the id counter is exhausted.
    pub(crate) fn append(
        &mut self,
        student: u32,
        book: &str,
        loan_date: NaiveDateTime,
        due_date: NaiveDateTime,
    ) -> Result<&Loan> {
        let id = self.next_id.ok_or(CirculationError::LoanIdsExhausted)?;
        self.next_id = id.checked_add(1);

        let pos = self.loans.len();
        self.loans.push(Loan {
            id,
            student,
            book: book.to_string(),
            loan_date,
            due_date,
            returned_at: None,
        });
        self.index.insert(id, pos);
        Ok(&self.loans[pos])
    }

    fn reindex(&mut self) {
        self.index = self
            .loans
            .iter()
            .enumerate()
            .map(|(pos, loan)| (loan.id, pos))
            .collect();
    }

    /// Any loan, open or closed.
    pub fn loan_by_id(&self, id: u32) -> Option<&Loan> {
        self.index.get(&id).and_then(|&pos| self.loans.get(pos))
    }

    /// A loan only if it is still outstanding; what a return looks up.
    pub fn outstanding_by_id(&self, id: u32) -> Option<&Loan> {
        self.loan_by_id(id).filter(|l| l.is_outstanding())
    }

    pub(crate) fn outstanding_by_id_mut(&mut self, id: u32) -> Option<&mut Loan> {
        let pos = *self.index.get(&id)?;
        self.loans.get_mut(pos).filter(|l| l.is_outstanding())
    }

    /// Outstanding loans in id order, optionally for one student.
    pub fn outstanding_loans(&self, student: Option<u32>) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.is_outstanding())
            .filter(|l| student.map_or(true, |id| l.student == id))
            .collect()
    }

    /// The open loan for a book, if it is lent out.
    pub fn outstanding_for_book(&self, code: &str) -> Option<&Loan> {
        let key = Book::key(code);
        self.loans
            .iter()
            .find(|l| l.is_outstanding() && Book::key(&l.book) == key)
    }

    /// Full history in id order.
    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    /// Id the next issued loan will receive, `None` once ids run out.
    pub fn next_id(&self) -> Option<u32> {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
