use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::rules::NO_CONSENT_MARKER;

/// One row of a published competition list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionEntry {
    /// Position as printed in the source list; never used for ranking.
    pub order_number: u32,
    /// Declared priority among the applicant's programs, lower is preferred.
    pub priority: u32,
    /// Raw consent column as published.
    pub consent_submitted: String,
    pub total_score: f64,
    pub exam_score: f64,
    pub achievement_score: f64,
    pub status: String,
    pub participant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_date: Option<String>,
}

impl AdmissionEntry {
    pub fn consent(&self) -> ConsentStatus {
        ConsentStatus::classify(&self.consent_submitted)
    }
}

/// Interpretation of the consent column.
///
/// Only the em-dash marker counts as "not submitted"; any other text keeps the
/// applicant in the consenting pool, recognised or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentStatus {
    Submitted,
    NotSubmitted,
    Unknown,
}

impl ConsentStatus {
    const AFFIRMATIVE: [&'static str; 6] = ["yes", "да", "+", "submitted", "подано", "true"];

    pub fn classify(raw: &str) -> Self {
        if raw == NO_CONSENT_MARKER {
            return Self::NotSubmitted;
        }

        let lowered = raw.trim().to_lowercase();
        if Self::AFFIRMATIVE.contains(&lowered.as_str()) {
            Self::Submitted
        } else {
            Self::Unknown
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::NotSubmitted => "Not submitted",
            Self::Unknown => "Unknown",
        }
    }
}

/// Standing of one participant within a program's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResult {
    pub general_position: usize,
    pub priority_position: usize,
    pub admission_chance: u8,
    pub total_participants: usize,
    pub participants_with_consent: usize,
}

impl PositionResult {
    pub fn band(&self) -> ChanceBand {
        ChanceBand::for_chance(self.admission_chance)
    }
}

/// Coarse grouping of an admission chance used for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceBand {
    High,
    Medium,
    Low,
}

impl ChanceBand {
    pub const HIGH_THRESHOLD: u8 = 70;
    pub const MEDIUM_THRESHOLD: u8 = 40;

    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn for_chance(chance: u8) -> Self {
        if chance >= Self::HIGH_THRESHOLD {
            Self::High
        } else if chance >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Identifier wrapper for tracked universities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniversityId(pub String);

/// Identifier wrapper for tracked programs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub String);

impl fmt::Display for UniversityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub id: UniversityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Registration payload for a university; the id is assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUniversity {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A program the applicant follows, with the identifier they appear under in its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub university_id: UniversityId,
    pub name: String,
    pub budget_seats: u32,
    pub participant_id: String,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgram {
    pub university_id: UniversityId,
    pub name: String,
    pub budget_seats: u32,
    pub participant_id: String,
}

/// Date-stamped calculation kept in a program's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub program_id: ProgramId,
    pub recorded_on: NaiveDate,
    pub result: PositionResult,
    pub band: ChanceBand,
}

impl PositionSnapshot {
    pub fn new(program_id: ProgramId, recorded_on: NaiveDate, result: PositionResult) -> Self {
        Self {
            program_id,
            recorded_on,
            band: result.band(),
            result,
        }
    }
}
