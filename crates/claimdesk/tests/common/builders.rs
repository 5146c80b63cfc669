//! Builders for worker forms and claim fixtures.

#![allow(dead_code)]

use claimdesk::db::claim_repo::ClaimRow;
use claimdesk::db::review_repo::ReviewTable;
use claimdesk::worker::{Dependant, WorkHistoryEntry, WorkerForm};

use super::harness::EMPLOYER_CPPSID;

/// Builder for a valid `WorkerForm`.
pub struct WorkerFormBuilder {
    form: WorkerForm,
}

impl WorkerFormBuilder {
    pub fn new(first: &str, last: &str) -> Self {
        let mut form = WorkerForm::default();
        form.personal.worker_first_name = first.to_string();
        form.personal.worker_last_name = last.to_string();
        form.personal.worker_dob = "1985-07-19".to_string();
        form.personal.worker_gender = "M".to_string();
        form.personal.worker_married = "0".to_string();
        form.personal.worker_place_of_origin_village = Some("Wau".to_string());
        form.employment.employer_cppsid = Some(EMPLOYER_CPPSID.to_string());
        form.employment.occupation = Some("Machine operator".to_string());
        Self { form }
    }

    pub fn married_to(mut self, spouse_first: &str) -> Self {
        self.form.personal.worker_married = "1".to_string();
        self.form.personal.spouse_first_name = Some(spouse_first.to_string());
        self
    }

    pub fn dependant(mut self, first: &str, relation: &str) -> Self {
        self.form.has_dependants = true;
        self.form.dependants.push(Dependant {
            dependant_first_name: first.to_string(),
            dependant_last_name: self.form.personal.worker_last_name.clone(),
            dependant_type: Some(relation.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn worked_at(mut self, organization: &str, from: &str, to: &str) -> Self {
        self.form.has_history = true;
        self.form.work_history.push(WorkHistoryEntry {
            organization_name: organization.to_string(),
            worker_joining_date: Some(from.to_string()),
            worker_ending_date: Some(to.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn without_employer(mut self) -> Self {
        self.form.employment.employer_cppsid = None;
        self
    }

    pub fn build(self) -> WorkerForm {
        self.form
    }
}

/// Builder for a claim plus its stage rows and compensation components.
pub struct ClaimBuilder {
    pub row: ClaimRow,
    pub components: Vec<f64>,
    pub stages: Vec<(ReviewTable, Option<String>)>,
}

impl ClaimBuilder {
    pub fn new(irn: i64, worker_id: i64, incident_type: &str) -> Self {
        Self {
            row: ClaimRow {
                irn,
                display_irn: Some(format!("CRN-{:04}", irn)),
                worker_id,
                incident_type: incident_type.to_string(),
                claim_type: Some("Form11".to_string()),
                incident_date: Some("2024-02-14".to_string()),
                incident_location: Some("Lae wharf".to_string()),
                ..Default::default()
            },
            components: Vec::new(),
            stages: Vec::new(),
        }
    }

    pub fn component(mut self, amount: f64) -> Self {
        self.components.push(amount);
        self
    }

    /// Adds a row at `table`, optionally with an initial status.
    pub fn at_stage(mut self, table: ReviewTable, status: Option<&str>) -> Self {
        self.stages.push((table, status.map(String::from)));
        self
    }
}
