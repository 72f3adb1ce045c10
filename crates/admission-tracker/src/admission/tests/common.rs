use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::admission::domain::{
    AdmissionEntry, NewProgram, NewUniversity, PositionSnapshot, Program, ProgramId, University,
    UniversityId,
};
use crate::admission::repository::{RepositoryError, TrackerRepository};
use crate::admission::rules::{CompetitionRules, COMPETING_STATUS};
use crate::admission::{admission_router, AdmissionTrackerService};

pub(super) const HEADER: &str =
    "No\tPriority\tConsent\tTotal\tExam\tAchievements\tStatus\tParticipant\tSelection date";

pub(super) fn row(order: u32, priority: u32, consent: &str, total: f64, id: &str) -> String {
    row_with_status(order, priority, consent, total, COMPETING_STATUS, id)
}

pub(super) fn row_with_status(
    order: u32,
    priority: u32,
    consent: &str,
    total: f64,
    status: &str,
    id: &str,
) -> String {
    format!(
        "{order}\t{priority}\t{consent}\t{total}\t{exam}\t10\t{status}\t{id}\t2025-07-28",
        exam = total - 10.0
    )
}

pub(super) fn list(rows: &[String]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text
}

pub(super) fn entry(id: &str, total: f64, priority: u32, consent: &str) -> AdmissionEntry {
    AdmissionEntry {
        order_number: 0,
        priority,
        consent_submitted: consent.to_string(),
        total_score: total,
        exam_score: total,
        achievement_score: 0.0,
        status: COMPETING_STATUS.to_string(),
        participant_id: id.to_string(),
        selection_date: None,
    }
}

pub(super) fn withdrawn(id: &str, total: f64, priority: u32) -> AdmissionEntry {
    AdmissionEntry {
        status: "withdrew application".to_string(),
        ..entry(id, total, priority, "Yes")
    }
}

/// Ten competing applicants, `P-05` is the tracked one.
pub(super) fn ranked_list() -> String {
    let rows: Vec<String> = (1..=10)
        .map(|n| row(n, n, "Yes", 300.0 - f64::from(n), &format!("P-{n:02}")))
        .collect();
    list(&rows)
}

pub(super) fn recorded(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, day)
        .expect("valid date")
        .and_hms_opt(9, 30, 0)
        .expect("valid time")
}

pub(super) fn build_service() -> (AdmissionTrackerService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AdmissionTrackerService::new(repository.clone(), CompetitionRules::default());
    (service, repository)
}

pub(super) fn register_program(
    service: &AdmissionTrackerService<MemoryRepository>,
    budget_seats: u32,
    participant_id: &str,
) -> Program {
    let university = service
        .register_university(NewUniversity {
            name: "State Technical University".to_string(),
            url: Some("https://example.edu".to_string()),
        })
        .expect("university registers");
    service
        .register_program(NewProgram {
            university_id: university.id,
            name: "Applied Mathematics".to_string(),
            budget_seats,
            participant_id: participant_id.to_string(),
        })
        .expect("program registers")
}

#[derive(Default)]
struct MemoryState {
    universities: HashMap<UniversityId, University>,
    programs: HashMap<ProgramId, Program>,
    history: HashMap<ProgramId, Vec<PositionSnapshot>>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl TrackerRepository for MemoryRepository {
    fn insert_university(&self, university: University) -> Result<University, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.universities.contains_key(&university.id) {
            return Err(RepositoryError::Conflict);
        }
        guard
            .universities
            .insert(university.id.clone(), university.clone());
        Ok(university)
    }

    fn fetch_university(&self, id: &UniversityId) -> Result<Option<University>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.universities.get(id).cloned())
    }

    fn delete_university(&self, id: &UniversityId) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.universities.remove(id);
        Ok(())
    }

    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.programs.contains_key(&program.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.programs.insert(program.id.clone(), program.clone());
        Ok(program)
    }

    fn update_program(&self, program: Program) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.programs.insert(program.id.clone(), program);
        Ok(())
    }

    fn fetch_program(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.programs.get(id).cloned())
    }

    fn programs(&self) -> Result<Vec<Program>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        let mut programs: Vec<Program> = guard.programs.values().cloned().collect();
        programs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(programs)
    }

    fn delete_program(&self, id: &ProgramId) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.programs.remove(id);
        guard.history.remove(id);
        Ok(())
    }

    fn append_snapshot(&self, snapshot: PositionSnapshot) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard
            .history
            .entry(snapshot.program_id.clone())
            .or_default()
            .push(snapshot);
        Ok(())
    }

    fn history(&self, id: &ProgramId) -> Result<Vec<PositionSnapshot>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.history.get(id).cloned().unwrap_or_default())
    }
}

pub(super) struct UnavailableRepository;

impl TrackerRepository for UnavailableRepository {
    fn insert_university(&self, _university: University) -> Result<University, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_university(&self, _id: &UniversityId) -> Result<Option<University>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_university(&self, _id: &UniversityId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_program(&self, _program: Program) -> Result<Program, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_program(&self, _program: Program) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_program(&self, _id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn programs(&self) -> Result<Vec<Program>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_program(&self, _id: &ProgramId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn append_snapshot(&self, _snapshot: PositionSnapshot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _id: &ProgramId) -> Result<Vec<PositionSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Delegates to a [`MemoryRepository`] but refuses every program update.
pub(super) struct FailingUpdateRepository {
    pub(super) inner: MemoryRepository,
}

impl TrackerRepository for FailingUpdateRepository {
    fn insert_university(&self, university: University) -> Result<University, RepositoryError> {
        self.inner.insert_university(university)
    }

    fn fetch_university(&self, id: &UniversityId) -> Result<Option<University>, RepositoryError> {
        self.inner.fetch_university(id)
    }

    fn delete_university(&self, id: &UniversityId) -> Result<(), RepositoryError> {
        self.inner.delete_university(id)
    }

    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError> {
        self.inner.insert_program(program)
    }

    fn update_program(&self, _program: Program) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("write rejected".to_string()))
    }

    fn fetch_program(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        self.inner.fetch_program(id)
    }

    fn programs(&self) -> Result<Vec<Program>, RepositoryError> {
        self.inner.programs()
    }

    fn delete_program(&self, id: &ProgramId) -> Result<(), RepositoryError> {
        self.inner.delete_program(id)
    }

    fn append_snapshot(&self, snapshot: PositionSnapshot) -> Result<(), RepositoryError> {
        self.inner.append_snapshot(snapshot)
    }

    fn history(&self, id: &ProgramId) -> Result<Vec<PositionSnapshot>, RepositoryError> {
        self.inner.history(id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn admission_router_with_service(
    service: AdmissionTrackerService<MemoryRepository>,
) -> axum::Router {
    admission_router(Arc::new(service))
}
