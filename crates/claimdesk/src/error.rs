use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimdeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

/// Local checks run before anything is written.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required fields missing: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Claim {irn} has no row in {stage}")]
    NotFound { stage: String, irn: i64 },

    #[error("Claim {irn} is locked by staff {by} in {stage}")]
    Locked { stage: String, irn: i64, by: i64 },

    #[error("Staff {staff_id} does not hold the lock on claim {irn} in {stage}")]
    NotLockOwner {
        stage: String,
        irn: i64,
        staff_id: i64,
    },

    #[error("Decision '{decision}' is not available in {stage}")]
    UnsupportedDecision { stage: String, decision: String },

    #[error("No current employer recorded for worker {worker_id}")]
    MissingEmployer { worker_id: i64 },

    #[error("Worker {0} not found")]
    WorkerNotFound(i64),
}

#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Claim {0} not found")]
    ClaimNotFound(i64),

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),

    #[error("Failed to load asset '{name}': {reason}")]
    Asset { name: String, reason: String },

    #[error("Failed to build PDF: {0}")]
    Pdf(String),

    #[error("Failed to write certificate '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build PDF: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, ClaimdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_names() {
        let err = ValidationError::MissingFields(vec!["First Name".into(), "Gender".into()]);
        assert_eq!(err.to_string(), "Required fields missing: First Name, Gender");
    }

    #[test]
    fn test_wraps_into_top_level() {
        let err: ClaimdeskError = WorkflowError::WorkerNotFound(3).into();
        assert_eq!(err.to_string(), "Workflow error: Worker 3 not found");
    }
}
