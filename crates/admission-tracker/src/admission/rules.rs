use serde::{Deserialize, Serialize};

use super::domain::AdmissionEntry;

/// Status literal marking a row as taking part in the competition.
pub const COMPETING_STATUS: &str = "participating in competition";
/// The same status as printed by Russian-language lists. Not matched unless
/// the rules opt in with [`CompetitionRules::with_russian_lists`].
pub const COMPETING_STATUS_RU: &str = "Участвуете в конкурсе";
/// Consent column value meaning the original documents were not submitted.
pub const NO_CONSENT_MARKER: &str = "—";

/// Literal-matching rules that decide who is ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionRules {
    pub competing_statuses: Vec<String>,
    pub no_consent_marker: String,
}

impl Default for CompetitionRules {
    fn default() -> Self {
        Self {
            competing_statuses: vec![COMPETING_STATUS.to_string()],
            no_consent_marker: NO_CONSENT_MARKER.to_string(),
        }
    }
}

impl CompetitionRules {
    /// Default rules that also rank rows carrying [`COMPETING_STATUS_RU`].
    pub fn with_russian_lists() -> Self {
        Self::default().with_competing_status(COMPETING_STATUS_RU)
    }

    pub fn with_competing_status(mut self, status: impl Into<String>) -> Self {
        let status = status.into();
        if !self.competing_statuses.contains(&status) {
            self.competing_statuses.push(status);
        }
        self
    }

    /// Exact comparison; no trimming or case folding.
    pub fn is_competing(&self, status: &str) -> bool {
        self.competing_statuses.iter().any(|known| known == status)
    }

    pub fn has_consent(&self, entry: &AdmissionEntry) -> bool {
        entry.consent_submitted != self.no_consent_marker
    }
}
