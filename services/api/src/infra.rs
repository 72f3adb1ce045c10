use admission_tracker::admission::{
    PositionSnapshot, Program, ProgramId, RepositoryError, TrackerRepository, University,
    UniversityId,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct TrackerTables {
    universities: HashMap<UniversityId, University>,
    programs: HashMap<ProgramId, Program>,
    history: HashMap<ProgramId, Vec<PositionSnapshot>>,
}

/// Process-local storage; everything is lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryTrackerRepository {
    tables: Arc<Mutex<TrackerTables>>,
}

impl TrackerRepository for InMemoryTrackerRepository {
    fn insert_university(&self, university: University) -> Result<University, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if guard.universities.contains_key(&university.id) {
            return Err(RepositoryError::Conflict);
        }
        guard
            .universities
            .insert(university.id.clone(), university.clone());
        Ok(university)
    }

    fn fetch_university(&self, id: &UniversityId) -> Result<Option<University>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.universities.get(id).cloned())
    }

    fn delete_university(&self, id: &UniversityId) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        match guard.universities.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if guard.programs.contains_key(&program.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.programs.insert(program.id.clone(), program.clone());
        Ok(program)
    }

    fn update_program(&self, program: Program) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if guard.programs.contains_key(&program.id) {
            guard.programs.insert(program.id.clone(), program);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch_program(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.programs.get(id).cloned())
    }

    fn programs(&self) -> Result<Vec<Program>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        let mut programs: Vec<Program> = guard.programs.values().cloned().collect();
        programs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(programs)
    }

    fn delete_program(&self, id: &ProgramId) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        guard.history.remove(id);
        match guard.programs.remove(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn append_snapshot(&self, snapshot: PositionSnapshot) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        if !guard.programs.contains_key(&snapshot.program_id) {
            return Err(RepositoryError::NotFound);
        }
        guard
            .history
            .entry(snapshot.program_id.clone())
            .or_default()
            .push(snapshot);
        Ok(())
    }

    fn history(&self, id: &ProgramId) -> Result<Vec<PositionSnapshot>, RepositoryError> {
        let guard = self.tables.lock().expect("repository mutex poisoned");
        Ok(guard.history.get(id).cloned().unwrap_or_default())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
