use crate::error::{ReleaseError, Result};

/// Marks the start of every entry in the raw commit log.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Separates the fields of one entry.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// `git log --format` string producing the layout [`parse_log`] reads:
/// subject, body, short hash and full hash.
pub const LOG_FORMAT: &str = "%x1e%s%x1f%b%x1f%h%x1f%H";

const FIELD_COUNT: usize = 4;

/// A single commit taken from the version-control log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub subject: String,
    pub body: String,
    pub short_hash: String,
    pub full_hash: String,
}

impl CommitRecord {
    /// Create a new commit record
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        short_hash: impl Into<String>,
        full_hash: impl Into<String>,
    ) -> Self {
        CommitRecord {
            subject: subject.into(),
            body: body.into(),
            short_hash: short_hash.into(),
            full_hash: full_hash.into(),
        }
    }

    /// Render this record as one entry of the raw log layout
    pub fn to_log_entry(&self) -> String {
        format!(
            "{RECORD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}{FIELD_SEPARATOR}{}\n",
            self.subject, self.body, self.short_hash, self.full_hash
        )
    }
}

/// Parses raw log output into commit records, preserving log order
/// (most recent first).
///
/// Empty input is a valid, empty range. An entry with the wrong number of
/// fields means the log layout changed underneath us and is rejected.
pub fn parse_log(raw: &str) -> Result<Vec<CommitRecord>> {
    raw.split(RECORD_SEPARATOR)
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<CommitRecord> {
    let fields: Vec<&str> = entry.split(FIELD_SEPARATOR).map(str::trim).collect();

    match fields.as_slice() {
        [subject, body, short_hash, full_hash] => {
            if short_hash.is_empty() || full_hash.is_empty() {
                return Err(ReleaseError::parse(entry, "missing commit hash"));
            }
            Ok(CommitRecord::new(*subject, *body, *short_hash, *full_hash))
        }
        _ => Err(ReleaseError::parse(
            entry,
            format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        )),
    }
}
