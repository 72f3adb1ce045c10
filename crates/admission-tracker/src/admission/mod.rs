//! Admission list parsing, position ranking, and snapshot tracking.
//!
//! [`parse_admission_list`] and [`calculate_position`] are pure and perform no
//! I/O. The service, repository, and router layers wrap them for applications
//! that keep a history of imports per program.

pub mod domain;
mod numeric;
pub mod parser;
pub mod position;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    AdmissionEntry, ChanceBand, ConsentStatus, NewProgram, NewUniversity, PositionResult,
    PositionSnapshot, Program, ProgramId, University, UniversityId,
};
pub use parser::{
    parse_admission_list, parse_admission_list_with_diagnostics, ParsedAdmissionList, SkipReason,
    SkippedRow,
};
pub use position::{admission_chance, calculate_position, calculate_position_with};
pub use repository::{RepositoryError, TrackerRepository};
pub use router::{admission_router, ImportRequest, PositionRequest, PositionResponse};
pub use rules::{CompetitionRules, COMPETING_STATUS, NO_CONSENT_MARKER};
pub use service::{AdmissionTrackerService, ImportOutcome, TrackerServiceError};
pub use summary::{chance_change, PortfolioSummary};
