use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::AdmissionEntry;
use super::numeric::{leading_decimal, leading_integer};
use super::rules::NO_CONSENT_MARKER;

/// Data rows narrower than this are dropped.
pub const MIN_COLUMNS: usize = 8;

const DEFAULT_PRIORITY: u32 = 1;

/// Parse a tab-separated competition list, header row first.
///
/// Rows with fewer than [`MIN_COLUMNS`] columns are skipped and numeric cells
/// that do not parse fall back to defaults, so this never fails.
pub fn parse_admission_list(raw: &str) -> Vec<AdmissionEntry> {
    let parsed = parse_admission_list_with_diagnostics(raw);
    if !parsed.skipped.is_empty() {
        debug!(
            skipped = parsed.skipped.len(),
            parsed = parsed.entries.len(),
            "dropped malformed admission list rows"
        );
    }
    parsed.entries
}

/// Same as [`parse_admission_list`] but also reports which rows were dropped.
pub fn parse_admission_list_with_diagnostics(raw: &str) -> ParsedAdmissionList {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(raw.trim().as_bytes());

    let mut parsed = ParsedAdmissionList::default();

    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(index as u64 + 2);
                let columns: Vec<&str> = record.iter().collect();
                if columns.len() < MIN_COLUMNS {
                    parsed.skipped.push(SkippedRow {
                        line,
                        columns: columns.len(),
                        reason: SkipReason::TooFewColumns,
                    });
                    continue;
                }
                parsed.entries.push(entry_from_columns(&columns));
            }
            Err(err) => {
                let line = err
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(index as u64 + 2);
                parsed.skipped.push(SkippedRow {
                    line,
                    columns: 0,
                    reason: SkipReason::Unreadable(err.to_string()),
                });
            }
        }
    }

    parsed
}

fn entry_from_columns(columns: &[&str]) -> AdmissionEntry {
    let order_number = leading_integer(columns[0])
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0);
    let priority = leading_integer(columns[1])
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value >= 1)
        .unwrap_or(DEFAULT_PRIORITY);
    let consent_submitted = non_empty(columns[2])
        .unwrap_or(NO_CONSENT_MARKER)
        .to_string();

    AdmissionEntry {
        order_number,
        priority,
        consent_submitted,
        total_score: score(columns[3]),
        exam_score: score(columns[4]),
        achievement_score: score(columns[5]),
        status: columns[6].to_string(),
        participant_id: columns[7].to_string(),
        selection_date: columns.get(8).and_then(|value| non_empty(value)).map(str::to_string),
    }
}

fn score(value: &str) -> f64 {
    leading_decimal(value).unwrap_or(0.0)
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Entries together with the rows the parser had to drop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAdmissionList {
    pub entries: Vec<AdmissionEntry>,
    pub skipped: Vec<SkippedRow>,
}

/// A dropped row; `line` is 1-based within the trimmed input, header included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: u64,
    pub columns: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooFewColumns,
    Unreadable(String),
}

impl SkipReason {
    pub fn summary(&self) -> String {
        match self {
            SkipReason::TooFewColumns => {
                format!("fewer than {MIN_COLUMNS} tab-separated columns")
            }
            SkipReason::Unreadable(detail) => format!("unreadable row: {detail}"),
        }
    }
}
