//! Seed data loading.
//!
//! A seed directory holds `students.csv`, `books.csv` and an optional
//! `loans.csv`. Unlike batch commands, a bad seed row aborts the load: the
//! service cannot start from a partial picture of the library.

use crate::book::Book;
use crate::catalog::Catalog;
use crate::circulation::Circulation;
use crate::config::CirculationPolicy;
use crate::error::{CirculationError, Result};
use crate::ledger::Ledger;
use crate::loan::{parse_timestamp, Loan};
use crate::money::Money;
use crate::roster::Roster;
use crate::student::Student;
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

pub const STUDENTS_FILE: &str = "students.csv";
pub const BOOKS_FILE: &str = "books.csv";
pub const LOANS_FILE: &str = "loans.csv";

/// Row of `students.csv`.
#[derive(Debug, Deserialize)]
pub struct StudentRecord {
    pub id: u32,
    pub name: String,
    pub grade: i32,

    /// Defaults to active when empty
    #[serde(default)]
    pub active: Option<bool>,

    /// Fine balance; empty means none
    #[serde(default)]
    pub fines: Option<String>,

    /// Recorded loan count; checked against the ledger
    #[serde(default)]
    pub loans: Option<u32>,
}

/// Row of `books.csv`.
#[derive(Debug, Deserialize)]
pub struct BookRecord {
    pub code: String,
    pub title: String,
    pub category: String,

    /// Recorded availability; checked against the ledger
    #[serde(default)]
    pub available: Option<bool>,
}

/// Row of `loans.csv`.
#[derive(Debug, Deserialize)]
pub struct LoanRecord {
    pub id: u32,
    pub student: u32,
    pub book: String,
    pub loan_date: String,

    /// Derived from the grace period when empty
    #[serde(default)]
    pub due_date: Option<String>,

    #[serde(default)]
    pub return_date: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Deserializes every row of a seed file, failing on the first bad one.
fn read_records<T, R>(reader: R) -> Result<Vec<(usize, T)>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader
        .deserialize::<T>()
        .enumerate()
        .map(|(row_idx, result)| {
            let row = row_idx + 2; // 1-indexed, accounting for header row
            result
                .map(|record| (row, record))
                .map_err(|e| CirculationError::InvalidRecord {
                    row,
                    message: e.to_string(),
                })
        })
        .collect()
}

pub fn load_roster<R: Read>(reader: R) -> Result<Roster> {
    let mut roster = Roster::new();

    for (row, record) in read_records::<StudentRecord, _>(reader)? {
        let fines = match non_empty(&record.fines) {
            Some(raw) => Money::from_str(raw).map_err(|e| CirculationError::InvalidRecord {
                row,
                message: format!("invalid fines {:?}: {}", raw, e),
            })?,
            None => Money::ZERO,
        };
        if fines.is_negative() {
            return Err(CirculationError::InvalidRecord {
                row,
                message: format!("fines cannot be negative, got {}", fines),
            });
        }

        let mut student = Student::new(record.id, record.name, record.grade);
        student.active = record.active.unwrap_or(true);
        student.fines = fines;
        student.loans = record.loans.unwrap_or(0);

        debug!("Row {}: registering student {}", row, student.id);
        roster.register(student)?;
    }

    Ok(roster)
}

pub fn load_catalog<R: Read>(reader: R) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for (row, record) in read_records::<BookRecord, _>(reader)? {
        if record.code.trim().is_empty() {
            return Err(CirculationError::InvalidRecord {
                row,
                message: "book code is empty".to_string(),
            });
        }

        let mut book = Book::new(record.code.trim(), record.title, record.category);
        book.available = record.available.unwrap_or(true);

        debug!("Row {}: registering book {}", row, book.code);
        catalog.register(book)?;
    }

    Ok(catalog)
}

/// Reads loan history. Book codes are normalized to the catalog's spelling
/// when the book exists.
pub fn load_ledger<R: Read>(
    reader: R,
    catalog: &Catalog,
    policy: &CirculationPolicy,
) -> Result<Ledger> {
    let mut ledger = Ledger::new();

    for (row, record) in read_records::<LoanRecord, _>(reader)? {
        let loan_date = parse_timestamp(&record.loan_date)?;
        let due_date = match non_empty(&record.due_date) {
            Some(raw) => parse_timestamp(raw)?,
            None => policy.due_date(loan_date)?,
        };
        let returned_at = non_empty(&record.return_date)
            .map(parse_timestamp)
            .transpose()?;

        let book = catalog
            .find_book(&record.book)
            .map(|b| b.code.clone())
            .unwrap_or(record.book);

        debug!("Row {}: recording loan {}", row, record.id);
        ledger.insert(Loan {
            id: record.id,
            student: record.student,
            book,
            loan_date,
            due_date,
            returned_at,
        })?;
    }

    Ok(ledger)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Loads a seed directory and builds the circulation service over it.
pub fn load_dir(dir: &Path, policy: CirculationPolicy) -> Result<Circulation> {
    let roster = load_roster(open(&dir.join(STUDENTS_FILE))?)?;
    let catalog = load_catalog(open(&dir.join(BOOKS_FILE))?)?;

    let loans_path = dir.join(LOANS_FILE);
    let ledger = if loans_path.exists() {
        load_ledger(open(&loans_path)?, &catalog, &policy)?
    } else {
        info!(
            "No {} in {}, starting with an empty ledger",
            LOANS_FILE,
            dir.display()
        );
        Ledger::new()
    };

    Circulation::with_policy(roster, catalog, ledger, policy)
}
