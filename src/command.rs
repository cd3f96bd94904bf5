//! Batch command models for CSV parsing.

use crate::error::{CirculationError, Result};
use crate::loan::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Raw command record as read from CSV.
///
/// Columns not used by a command type are left empty.
#[derive(Debug, Deserialize)]
pub struct CommandRecord {
    /// Command type: issue, return
    #[serde(rename = "type")]
    pub kind: String,

    /// Student id (issue)
    #[serde(default)]
    pub student: Option<u32>,

    /// Book code (issue)
    #[serde(default)]
    pub book: Option<String>,

    /// Loan id (return)
    #[serde(default)]
    pub loan: Option<u32>,

    /// When the command happens; empty means "now"
    #[serde(default)]
    pub date: Option<String>,
}

impl CommandRecord {
    /// Parses the raw CSV record into a typed command.
    pub fn parse(&self, row: usize) -> Result<ParsedCommand> {
        let invalid = |message: &str| CirculationError::InvalidRecord {
            row,
            message: message.to_string(),
        };

        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_timestamp(raw)?),
            _ => None,
        };

        let kind = match self.kind.trim().to_lowercase().as_str() {
            "issue" => {
                let student = self.student.ok_or_else(|| invalid("issue requires a student"))?;
                let book = self
                    .book
                    .as_deref()
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .ok_or_else(|| invalid("issue requires a book code"))?;
                CommandKind::Issue {
                    student,
                    book: book.to_string(),
                }
            }
            "return" => {
                let loan = self.loan.ok_or_else(|| invalid("return requires a loan id"))?;
                CommandKind::Return { loan }
            }
            other => return Err(invalid(&format!("unknown command type {:?}", other))),
        };

        Ok(ParsedCommand { kind, date })
    }
}

/// A parsed command ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub kind: CommandKind,

    /// Explicit time of the command, if given.
    pub date: Option<NaiveDateTime>,
}

/// Command variants with associated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Lend a book to a student.
    Issue { student: u32, book: String },

    /// Close an outstanding loan.
    Return { loan: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str) -> CommandRecord {
        CommandRecord {
            kind: kind.to_string(),
            student: None,
            book: None,
            loan: None,
            date: None,
        }
    }

    #[test]
    fn test_parse_issue() {
        let mut raw = record(" Issue ");
        raw.student = Some(1);
        raw.book = Some(" l001 ".to_string());
        raw.date = Some("2025-10-20".to_string());

        let parsed = raw.parse(2).unwrap();
        assert_eq!(
            parsed.kind,
            CommandKind::Issue {
                student: 1,
                book: "l001".to_string()
            }
        );
        assert_eq!(parsed.date, Some(parse_timestamp("2025-10-20").unwrap()));
    }

    #[test]
    fn test_parse_return_without_date() {
        let mut raw = record("return");
        raw.loan = Some(7);
        raw.date = Some("  ".to_string());

        let parsed = raw.parse(2).unwrap();
        assert_eq!(parsed.kind, CommandKind::Return { loan: 7 });
        assert!(parsed.date.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let mut raw = record("issue");
        raw.student = Some(1);
        assert!(matches!(
            raw.parse(3),
            Err(CirculationError::InvalidRecord { row: 3, .. })
        ));

        assert!(record("return").parse(4).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_type_and_bad_date() {
        assert!(matches!(
            record("renew").parse(2),
            Err(CirculationError::InvalidRecord { .. })
        ));

        let mut raw = record("return");
        raw.loan = Some(1);
        raw.date = Some("yesterday".to_string());
        assert!(matches!(raw.parse(2), Err(CirculationError::InvalidDate(_))));
    }
}
