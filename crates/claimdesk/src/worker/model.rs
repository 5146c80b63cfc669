//! Worker registration data as captured by the registration and edit forms.
//!
//! Serde names are the backend column names; the change diff keys on them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonalDetails {
    pub worker_first_name: String,
    pub worker_last_name: String,
    pub worker_alias_name: Option<String>,
    #[serde(rename = "WorkerDOB")]
    pub worker_dob: String,
    pub worker_gender: String,
    /// `"0"` single, `"1"` married.
    pub worker_married: String,
    pub worker_handed: Option<String>,
    pub worker_place_of_origin_village: Option<String>,
    pub worker_place_of_origin_district: Option<String>,
    pub worker_place_of_origin_province: Option<String>,
    pub worker_address1: Option<String>,
    pub worker_address2: Option<String>,
    pub worker_city: Option<String>,
    pub worker_province: Option<String>,
    #[serde(rename = "WorkerPOBox")]
    pub worker_po_box: Option<String>,
    pub worker_email: Option<String>,
    pub worker_mobile: Option<String>,
    pub worker_landline: Option<String>,
    pub spouse_first_name: Option<String>,
    pub spouse_last_name: Option<String>,
    #[serde(rename = "SpouseDOB")]
    pub spouse_dob: Option<String>,
    pub spouse_address1: Option<String>,
    pub spouse_city: Option<String>,
    pub spouse_province: Option<String>,
    pub spouse_mobile: Option<String>,
}

impl PersonalDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.worker_first_name, self.worker_last_name)
    }

    pub fn is_married(&self) -> bool {
        self.worker_married.trim() == "1"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmploymentDetails {
    #[serde(rename = "EmploymentID")]
    pub employment_id: Option<String>,
    pub occupation: Option<String>,
    pub place_of_employment: Option<String>,
    pub nature_of_employment: Option<String>,
    pub average_weekly_wage: Option<f64>,
    pub weekly_payment_rate: Option<f64>,
    pub worked_under_sub_contractor: bool,
    pub sub_contractor_organization_name: Option<String>,
    pub sub_contractor_location: Option<String>,
    pub sub_contractor_nature_of_business: Option<String>,
    #[serde(rename = "EmployerCPPSID")]
    pub employer_cppsid: Option<String>,
    #[serde(rename = "InsuranceProviderIPACode")]
    pub insurance_provider_ipa_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dependant {
    pub dependant_first_name: String,
    pub dependant_last_name: String,
    #[serde(rename = "DependantDOB")]
    pub dependant_dob: Option<String>,
    /// Child, Sibling, Parent, Spouse, Other.
    pub dependant_type: Option<String>,
    pub dependant_gender: Option<String>,
    pub dependant_address1: Option<String>,
    pub dependant_city: Option<String>,
    pub dependant_province: Option<String>,
    pub dependant_mobile: Option<String>,
    pub dependant_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WorkHistoryEntry {
    pub organization_name: String,
    pub organization_address1: Option<String>,
    pub organization_city: Option<String>,
    pub organization_province: Option<String>,
    pub worker_joining_date: Option<String>,
    pub worker_ending_date: Option<String>,
}

/// Everything the tabbed worker form collects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerForm {
    pub personal: PersonalDetails,
    pub employment: EmploymentDetails,
    #[serde(rename = "WorkerHaveDependants")]
    pub has_dependants: bool,
    pub dependants: Vec<Dependant>,
    #[serde(rename = "WorkerHasHistory")]
    pub has_history: bool,
    pub work_history: Vec<WorkHistoryEntry>,
}

impl WorkerForm {
    /// Dependants that will actually be persisted.
    pub fn effective_dependants(&self) -> &[Dependant] {
        if self.has_dependants {
            &self.dependants
        } else {
            &[]
        }
    }

    /// Work-history rows that will actually be persisted.
    pub fn effective_work_history(&self) -> &[WorkHistoryEntry] {
        if self.has_history {
            &self.work_history
        } else {
            &[]
        }
    }
}

/// Ids created by a new registration, shown to the clerk afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSummary {
    pub worker_id: i64,
    pub employment_row_id: i64,
    pub dependant_ids: Vec<i64>,
    pub work_history_ids: Vec<i64>,
}
