//! Test harness for isolated test execution.
//!
//! The `TestHarness` owns a temporary directory holding the SQLite file and
//! the certificate output directory, a config pointing at both, and the
//! reference data every workflow test needs.

#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::types::Value;
use tempfile::TempDir;

use claimdesk::db::master_repo::{self, EmployerRow, InsurerRow};
use claimdesk::db::staff_repo::{self, StaffRow};
use claimdesk::db::{claim_repo, review_repo};
use claimdesk::{Config, Database, PermissionGroup, Session, WorkflowService};

use super::builders::ClaimBuilder;

pub const CHIEF_COMMISSIONER: i64 = 1;
pub const COMMISSIONER: i64 = 2;
pub const REGISTRAR: i64 = 3;
pub const CLAIMS_MANAGER: i64 = 4;
pub const EMPLOYER_CPPSID: &str = "CPPS-100";

pub struct TestHarness {
    temp_dir: TempDir,
    pub output_dir: PathBuf,
    pub config: Config,
    pub db: Database,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let output_dir = temp_dir.path().join("output");
        let db_path = temp_dir.path().join("data").join("claimdesk.db");

        let mut config = Config::with_chief_commissioner(CHIEF_COMMISSIONER);
        config.database_path = Some(db_path.to_string_lossy().into_owned());
        config.output_directory = output_dir.to_string_lossy().into_owned();
        config.storage_public_base_url = "https://storage.example.org/claims".to_string();

        let db = Database::open(&db_path).expect("Failed to open database");
        let harness = Self {
            temp_dir,
            output_dir,
            config,
            db,
        };
        harness.seed_reference_data();
        harness
    }

    fn seed_reference_data(&self) {
        self.db
            .with_conn(|conn| {
                for (id, first, last, region) in [
                    (CHIEF_COMMISSIONER, "Grace", "Wani", None),
                    (COMMISSIONER, "Tom", "Kaupa", None),
                    (REGISTRAR, "Ruth", "Siune", None),
                    (CLAIMS_MANAGER, "Paul", "Mek", Some("Momase")),
                ] {
                    staff_repo::insert(
                        conn,
                        &StaffRow {
                            staff_id: id,
                            user_id: Some(format!("user-{}", id)),
                            first_name: first.to_string(),
                            last_name: last.to_string(),
                            designation: None,
                            incharge_region: region.map(String::from),
                        },
                    )?;
                }
                master_repo::insert_insurer(
                    conn,
                    &InsurerRow {
                        ipa_code: "IPA-7".to_string(),
                        organization_name: "Highlands Assurance".to_string(),
                        ..Default::default()
                    },
                )?;
                master_repo::insert_employer(
                    conn,
                    &EmployerRow {
                        cppsid: EMPLOYER_CPPSID.to_string(),
                        organization_name: "Markham Valley Farms".to_string(),
                        city: Some("Lae".to_string()),
                        insurance_provider_ipa_code: Some("IPA-7".to_string()),
                        ..Default::default()
                    },
                )?;
                Ok(())
            })
            .expect("Failed to seed reference data");
    }

    pub fn session(&self, staff_id: i64) -> Session {
        Session::new(format!("user-{}", staff_id), staff_id, PermissionGroup::Other(1))
    }

    pub fn workflow(&self) -> WorkflowService {
        WorkflowService::new(self.db.clone(), self.config.clone())
    }

    /// Inserts the claim and the stage rows the builder asked for.
    pub fn add_claim(&self, claim: ClaimBuilder) -> i64 {
        let irn = claim.row.irn;
        self.db
            .with_conn(|conn| {
                claim_repo::insert(conn, &claim.row)?;
                for amount in &claim.components {
                    claim_repo::insert_component(conn, irn, "Compensation", *amount)?;
                }
                for (table, status) in &claim.stages {
                    let mut fields = vec![(
                        "IncidentType",
                        text(&claim.row.incident_type),
                    )];
                    if let Some(status) = status {
                        fields.push((table.status_column, text(status)));
                    }
                    if table.table == review_repo::AWARD_COMMISSIONER_REVIEW.table {
                        fields.push(("ClaimType", text("Form11")));
                    }
                    if table.table == review_repo::CPM_REVIEW.table {
                        fields.push(("RegionName", text("Momase")));
                    }
                    review_repo::insert_fields(conn, table.table, irn, &fields)?;
                }
                Ok(())
            })
            .expect("Failed to add claim");
        irn
    }

    pub fn status(&self, table: review_repo::ReviewTable, irn: i64) -> Option<String> {
        self.db
            .with_conn(|conn| review_repo::find_status(conn, &table, irn))
            .expect("Failed to read status")
            .flatten()
    }

    pub fn text_column(&self, table: &str, column: &str, irn: i64) -> Option<String> {
        let sql = format!("SELECT {} FROM {} WHERE IRN = ?1", column, table);
        self.db
            .with_conn(|conn| Ok(conn.query_row(&sql, [irn], |r| r.get(0))?))
            .expect("Failed to read column")
    }

    pub fn row_count(&self, table: &str, irn: i64) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE IRN = ?1", table);
        self.db
            .with_conn(|conn| Ok(conn.query_row(&sql, [irn], |r| r.get(0))?))
            .expect("Failed to count rows")
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}
