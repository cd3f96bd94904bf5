//! CSV listings of the circulation state.

use crate::circulation::Circulation;
use crate::error::{CirculationError, Result};
use crate::loan::Loan;
use crate::roster::borrow_limit;
use chrono::NaiveDateTime;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which listing to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// Every student with counters and limit.
    #[default]
    Students,
    /// The whole catalog.
    Books,
    /// Books on the shelf.
    Available,
    /// Open loans.
    Outstanding,
    /// Full loan history.
    Loans,
}

impl FromStr for Report {
    type Err = CirculationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "students" => Ok(Report::Students),
            "books" => Ok(Report::Books),
            "available" => Ok(Report::Available),
            "outstanding" => Ok(Report::Outstanding),
            "loans" | "history" => Ok(Report::Loans),
            other => Err(CirculationError::InvalidConfig(format!(
                "unknown report {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Report::Students => "students",
            Report::Books => "books",
            Report::Available => "available",
            Report::Outstanding => "outstanding",
            Report::Loans => "loans",
        };
        write!(f, "{}", name)
    }
}

fn format_date(date: NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Writes the requested listing as CSV.
///
/// Rows follow registration order for students and books and id order for
/// loans. Money is written with exactly 2 decimal places.
pub fn write_report<W: Write>(desk: &Circulation, report: Report, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    match report {
        Report::Students => {
            csv_writer.write_record([
                "id", "name", "grade", "active", "fines", "loans", "limit",
            ])?;
            for student in desk.students() {
                csv_writer.write_record([
                    student.id.to_string(),
                    student.name.clone(),
                    student.grade.to_string(),
                    student.active.to_string(),
                    student.fines.to_string(),
                    student.loans.to_string(),
                    borrow_limit(student.grade).to_string(),
                ])?;
            }
        }
        Report::Books | Report::Available => {
            csv_writer.write_record(["code", "title", "category", "available"])?;
            let books: Vec<_> = match report {
                Report::Available => desk.list_available(),
                _ => desk.books().iter().collect(),
            };
            for book in books {
                csv_writer.write_record([
                    book.code.clone(),
                    book.title.clone(),
                    book.category.clone(),
                    book.available.to_string(),
                ])?;
            }
        }
        Report::Outstanding | Report::Loans => {
            csv_writer.write_record([
                "id",
                "student",
                "book",
                "loan_date",
                "due_date",
                "return_date",
                "state",
            ])?;
            let loans: Vec<&Loan> = match report {
                Report::Outstanding => desk.outstanding_loans(None),
                _ => desk.loans().iter().collect(),
            };
            for loan in loans {
                csv_writer.write_record([
                    loan.id.to_string(),
                    loan.student.to_string(),
                    loan.book.clone(),
                    format_date(loan.loan_date),
                    format_date(loan.due_date),
                    loan.returned_at.map(format_date).unwrap_or_default(),
                    loan.state().to_string(),
                ])?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::catalog::Catalog;
    use crate::ledger::Ledger;
    use crate::roster::Roster;
    use crate::student::Student;
    use chrono::NaiveDate;

    fn desk() -> Circulation {
        let mut roster = Roster::new();
        roster.register(Student::new(1, "Ana García", 9)).unwrap();
        let mut catalog = Catalog::new();
        catalog
            .register(Book::new("L001", "Cien años de soledad", "ficcion"))
            .unwrap();
        catalog
            .register(Book::new("L005", "Don Quijote", "ficcion"))
            .unwrap();
        Circulation::new(roster, catalog, Ledger::new()).unwrap()
    }

    fn render(desk: &Circulation, report: Report) -> String {
        let mut output = Vec::new();
        write_report(desk, report, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_report_names() {
        assert_eq!(Report::from_str("Outstanding").unwrap(), Report::Outstanding);
        assert_eq!(Report::from_str("history").unwrap(), Report::Loans);
        assert!(Report::from_str("fines").is_err());
        assert_eq!(Report::default().to_string(), "students");
    }

    #[test]
    fn test_students_report() {
        let output = render(&desk(), Report::Students);
        assert!(output.starts_with("id,name,grade,active,fines,loans,limit\n"));
        assert!(output.contains("1,Ana García,9,true,0.00,0,2"));
    }

    #[test]
    fn test_loan_reports_after_issue() {
        let mut desk = desk();
        let now = NaiveDate::from_ymd_opt(2025, 10, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        desk.issue_loan(1, "L001", now).unwrap();

        let available = render(&desk, Report::Available);
        assert!(!available.contains("L001"));
        assert!(available.contains("L005,Don Quijote,ficcion,true"));

        let outstanding = render(&desk, Report::Outstanding);
        assert!(outstanding.contains("1,1,L001,2025-10-20,2025-10-27,,open"));
    }
}
