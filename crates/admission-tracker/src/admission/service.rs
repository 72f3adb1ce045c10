use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    ChanceBand, NewProgram, NewUniversity, PositionResult, PositionSnapshot, Program, ProgramId,
    University, UniversityId,
};
use super::parser::{parse_admission_list_with_diagnostics, SkippedRow};
use super::position::calculate_position_with;
use super::repository::{RepositoryError, TrackerRepository};
use super::rules::CompetitionRules;
use super::summary::{chance_change, PortfolioSummary};

/// Service composing the parser, the calculator, and snapshot storage.
pub struct AdmissionTrackerService<R> {
    repository: Arc<R>,
    rules: Arc<CompetitionRules>,
}

static UNIVERSITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PROGRAM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_university_id() -> UniversityId {
    let id = UNIVERSITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UniversityId(format!("uni-{id:06}"))
}

fn next_program_id() -> ProgramId {
    let id = PROGRAM_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProgramId(format!("prog-{id:06}"))
}

impl<R> AdmissionTrackerService<R>
where
    R: TrackerRepository + 'static,
{
    pub fn new(repository: Arc<R>, rules: CompetitionRules) -> Self {
        Self {
            repository,
            rules: Arc::new(rules),
        }
    }

    pub fn rules(&self) -> &CompetitionRules {
        &self.rules
    }

    pub fn register_university(
        &self,
        university: NewUniversity,
    ) -> Result<University, TrackerServiceError> {
        let name = university.name.trim();
        if name.is_empty() {
            return Err(TrackerServiceError::InvalidUniversity(
                "name must not be empty".to_string(),
            ));
        }

        let record = University {
            id: next_university_id(),
            name: name.to_string(),
            url: university.url.filter(|url| !url.trim().is_empty()),
        };

        Ok(self.repository.insert_university(record)?)
    }

    /// Register a program under an existing university.
    pub fn register_program(&self, program: NewProgram) -> Result<Program, TrackerServiceError> {
        let NewProgram {
            university_id,
            name,
            budget_seats,
            participant_id,
        } = program;

        if name.trim().is_empty() {
            return Err(TrackerServiceError::InvalidProgram(
                "name must not be empty".to_string(),
            ));
        }
        if participant_id.trim().is_empty() {
            return Err(TrackerServiceError::InvalidProgram(
                "participant id must not be empty".to_string(),
            ));
        }

        if self.repository.fetch_university(&university_id)?.is_none() {
            return Err(TrackerServiceError::UnknownUniversity(university_id));
        }

        let record = Program {
            id: next_program_id(),
            university_id,
            name: name.trim().to_string(),
            budget_seats,
            participant_id: participant_id.trim().to_string(),
            last_updated: None,
        };

        Ok(self.repository.insert_program(record)?)
    }

    pub fn program(&self, program_id: &ProgramId) -> Result<Program, TrackerServiceError> {
        self.repository
            .fetch_program(program_id)?
            .ok_or_else(|| TrackerServiceError::UnknownProgram(program_id.clone()))
    }

    /// Parse a freshly imported list, rank the program's participant, and
    /// append a snapshot when they are found in it.
    pub fn import_list(
        &self,
        program_id: &ProgramId,
        raw_list: &str,
        recorded_at: NaiveDateTime,
    ) -> Result<ImportOutcome, TrackerServiceError> {
        let mut program = self.program(program_id)?;

        let parsed = parse_admission_list_with_diagnostics(raw_list);
        let position = calculate_position_with(
            &self.rules,
            &parsed.entries,
            &program.participant_id,
            program.budget_seats,
        );

        program.last_updated = Some(recorded_at);
        self.repository.update_program(program)?;

        // Appended last: a failed update must not leave a snapshot behind.
        if let Some(result) = position {
            self.repository.append_snapshot(PositionSnapshot::new(
                program_id.clone(),
                recorded_at.date(),
                result,
            ))?;
        }

        let change = match position {
            Some(_) => chance_change(&self.repository.history(program_id)?),
            None => None,
        };

        info!(
            program = %program_id.0,
            entries = parsed.entries.len(),
            skipped = parsed.skipped.len(),
            found = position.is_some(),
            "imported admission list"
        );

        Ok(ImportOutcome {
            program_id: program_id.clone(),
            entries_parsed: parsed.entries.len(),
            skipped: parsed.skipped,
            band: position.map(|result| result.band()),
            position,
            change,
        })
    }

    pub fn history(
        &self,
        program_id: &ProgramId,
    ) -> Result<Vec<PositionSnapshot>, TrackerServiceError> {
        self.program(program_id)?;
        Ok(self.repository.history(program_id)?)
    }

    pub fn latest(
        &self,
        program_id: &ProgramId,
    ) -> Result<Option<PositionSnapshot>, TrackerServiceError> {
        Ok(self.history(program_id)?.pop())
    }

    /// Chance movement "vs last update", in percentage points.
    pub fn chance_change(&self, program_id: &ProgramId) -> Result<Option<i16>, TrackerServiceError> {
        Ok(chance_change(&self.history(program_id)?))
    }

    pub fn portfolio_summary(&self) -> Result<PortfolioSummary, TrackerServiceError> {
        let programs = self.repository.programs()?;
        let mut latest = Vec::with_capacity(programs.len());
        for program in &programs {
            if let Some(snapshot) = self.repository.history(&program.id)?.pop() {
                latest.push(snapshot.result);
            }
        }

        Ok(PortfolioSummary::from_latest(programs.len(), &latest))
    }

    pub fn delete_program(&self, program_id: &ProgramId) -> Result<(), TrackerServiceError> {
        self.program(program_id)?;
        Ok(self.repository.delete_program(program_id)?)
    }

    /// Remove a university together with its programs and their history.
    pub fn delete_university(
        &self,
        university_id: &UniversityId,
    ) -> Result<(), TrackerServiceError> {
        if self.repository.fetch_university(university_id)?.is_none() {
            return Err(TrackerServiceError::UnknownUniversity(
                university_id.clone(),
            ));
        }

        for program in self.repository.programs()? {
            if &program.university_id == university_id {
                self.repository.delete_program(&program.id)?;
            }
        }

        Ok(self.repository.delete_university(university_id)?)
    }
}

/// Result of importing one list for a tracked program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub program_id: ProgramId,
    pub entries_parsed: usize,
    pub skipped: Vec<SkippedRow>,
    /// `None` when the participant is not competing in this list.
    pub position: Option<PositionResult>,
    pub band: Option<ChanceBand>,
    pub change: Option<i16>,
}

/// Error raised by the tracker service.
#[derive(Debug, thiserror::Error)]
pub enum TrackerServiceError {
    #[error("university {0} is not registered")]
    UnknownUniversity(UniversityId),
    #[error("program {0} is not registered")]
    UnknownProgram(ProgramId),
    #[error("invalid university: {0}")]
    InvalidUniversity(String),
    #[error("invalid program: {0}")]
    InvalidProgram(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
