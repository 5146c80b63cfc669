//! Registration and edit operations behind the worker forms.

use crate::db::{worker_repo, Database};
use crate::error::{Result, WorkflowError};

use super::diff::{diff, ChangeSet};
use super::model::{RegistrationSummary, WorkerForm};
use super::validate::validate;

#[derive(Clone)]
pub struct WorkerService {
    db: Database,
}

impl WorkerService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a new worker with employment and child rows in one transaction.
    pub fn register(&self, form: &WorkerForm) -> Result<RegistrationSummary> {
        let _span = tracing::info_span!("worker.register").entered();
        validate(form)?;

        let dependants = form.effective_dependants();
        let history = form.effective_work_history();

        let summary = self.db.with_transaction(|tx| {
            let worker_id = worker_repo::insert_personal(tx, &form.personal, !dependants.is_empty())?;
            let employment_row_id = worker_repo::upsert_employment(tx, worker_id, &form.employment)?;
            let dependant_ids = worker_repo::replace_dependants(tx, worker_id, dependants)?;
            let work_history_ids = worker_repo::replace_work_history(tx, worker_id, history)?;
            Ok::<_, crate::ClaimdeskError>(RegistrationSummary {
                worker_id,
                employment_row_id,
                dependant_ids,
                work_history_ids,
            })
        })?;

        log::info!(
            "Registered worker {} with {} dependants and {} history rows",
            summary.worker_id,
            summary.dependant_ids.len(),
            summary.work_history_ids.len()
        );
        Ok(summary)
    }

    /// Loads the stored snapshot in form shape.
    pub fn load(&self, worker_id: i64) -> Result<WorkerForm> {
        let form = self.db.with_conn(|conn| {
            let Some((personal, _)) = worker_repo::find_personal(conn, worker_id)? else {
                return Ok(None);
            };
            let employment = worker_repo::find_employment(conn, worker_id)?.unwrap_or_default();
            let dependants = worker_repo::list_dependants(conn, worker_id)?;
            let work_history = worker_repo::list_work_history(conn, worker_id)?;
            Ok(Some(WorkerForm {
                personal,
                employment,
                has_dependants: !dependants.is_empty(),
                dependants,
                has_history: !work_history.is_empty(),
                work_history,
            }))
        })?;
        form.ok_or_else(|| WorkflowError::WorkerNotFound(worker_id).into())
    }

    /// Changes the edit would apply, for the confirmation table.
    pub fn preview_edit(&self, worker_id: i64, edited: &WorkerForm) -> Result<ChangeSet> {
        let original = self.load(worker_id)?;
        Ok(diff(&original, edited))
    }

    /// Commits an edit: personal update, employment upsert, and whole-set
    /// replacement of dependants and work history. Returns the applied changes.
    pub fn save_edit(&self, worker_id: i64, edited: &WorkerForm) -> Result<ChangeSet> {
        let _span = tracing::info_span!("worker.save_edit", worker_id).entered();
        validate(edited)?;
        let changes = self.preview_edit(worker_id, edited)?;

        let dependants = edited.effective_dependants();
        let history = edited.effective_work_history();

        self.db.with_transaction(|tx| {
            if worker_repo::update_personal(tx, worker_id, &edited.personal, !dependants.is_empty())?
                == 0
            {
                return Err(WorkflowError::WorkerNotFound(worker_id).into());
            }
            worker_repo::upsert_employment(tx, worker_id, &edited.employment)?;
            worker_repo::replace_dependants(tx, worker_id, dependants)?;
            worker_repo::replace_work_history(tx, worker_id, history)?;
            Ok::<_, crate::ClaimdeskError>(())
        })?;

        log::info!(
            "Saved worker {} ({} changed fields)",
            worker_id,
            changes.rows.len()
        );
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClaimdeskError, ValidationError};
    use crate::worker::model::{Dependant, WorkHistoryEntry};

    fn form() -> WorkerForm {
        let mut form = WorkerForm::default();
        form.personal.worker_first_name = "Peter".into();
        form.personal.worker_last_name = "Tau".into();
        form.personal.worker_dob = "1990-04-12".into();
        form.personal.worker_gender = "M".into();
        form.personal.worker_married = "1".into();
        form.personal.spouse_first_name = Some("Anna".into());
        form.employment.employer_cppsid = Some("CPPS-1".into());
        form.employment.average_weekly_wage = Some(420.5);
        form
    }

    #[test]
    fn test_register_rejects_missing_fields() {
        let service = WorkerService::new(Database::open_in_memory().unwrap());
        let err = service.register(&WorkerForm::default()).unwrap_err();
        assert!(matches!(
            err,
            ClaimdeskError::Validation(ValidationError::MissingFields(_))
        ));
    }

    #[test]
    fn test_register_then_load_round_trip() {
        let service = WorkerService::new(Database::open_in_memory().unwrap());
        let mut input = form();
        input.has_dependants = true;
        input.dependants = vec![Dependant {
            dependant_first_name: "Lina".into(),
            dependant_last_name: "Tau".into(),
            ..Default::default()
        }];

        let summary = service.register(&input).unwrap();
        assert_eq!(summary.dependant_ids.len(), 1);
        assert!(summary.work_history_ids.is_empty());

        let loaded = service.load(summary.worker_id).unwrap();
        assert_eq!(loaded.personal, input.personal);
        assert_eq!(loaded.employment, input.employment);
        assert_eq!(loaded.dependants, input.dependants);
        assert!(loaded.has_dependants);
        assert!(!loaded.has_history);
    }

    #[test]
    fn test_save_edit_replaces_child_sets() {
        let service = WorkerService::new(Database::open_in_memory().unwrap());
        let mut input = form();
        input.has_history = true;
        input.work_history = vec![
            WorkHistoryEntry {
                organization_name: "Ok Tedi".into(),
                ..Default::default()
            },
            WorkHistoryEntry {
                organization_name: "Porgera".into(),
                ..Default::default()
            },
        ];
        let id = service.register(&input).unwrap().worker_id;

        let mut edited = service.load(id).unwrap();
        edited.personal.worker_married = "0".into();
        edited.work_history.truncate(1);

        let changes = service.save_edit(id, &edited).unwrap();
        assert_eq!(changes.find("Marital Status").unwrap().to, "Single");
        assert_eq!(changes.find("Work History (rows)").unwrap().to, "1");

        let reloaded = service.load(id).unwrap();
        assert_eq!(reloaded.work_history.len(), 1);
        assert_eq!(reloaded.personal.worker_married, "0");
        assert!(service.preview_edit(id, &reloaded).unwrap().is_empty());
    }

    #[test]
    fn test_save_edit_unknown_worker() {
        let service = WorkerService::new(Database::open_in_memory().unwrap());
        let err = service.save_edit(77, &form()).unwrap_err();
        assert!(matches!(
            err,
            ClaimdeskError::Workflow(WorkflowError::WorkerNotFound(77))
        ));
    }
}
