use super::domain::{PositionSnapshot, Program, ProgramId, University, UniversityId};

/// Storage abstraction so the tracker service can be exercised in isolation.
///
/// Snapshots are append-only; deleting a program drops its history with it.
pub trait TrackerRepository: Send + Sync {
    fn insert_university(&self, university: University) -> Result<University, RepositoryError>;
    fn fetch_university(&self, id: &UniversityId) -> Result<Option<University>, RepositoryError>;
    fn delete_university(&self, id: &UniversityId) -> Result<(), RepositoryError>;
    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError>;
    fn update_program(&self, program: Program) -> Result<(), RepositoryError>;
    fn fetch_program(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError>;
    fn programs(&self) -> Result<Vec<Program>, RepositoryError>;
    fn delete_program(&self, id: &ProgramId) -> Result<(), RepositoryError>;
    fn append_snapshot(&self, snapshot: PositionSnapshot) -> Result<(), RepositoryError>;
    /// Snapshots for one program in the order they were appended.
    fn history(&self, id: &ProgramId) -> Result<Vec<PositionSnapshot>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
