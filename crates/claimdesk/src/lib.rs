pub mod attachments;
pub mod certificate;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod logging;
mod pdf;
pub mod search;
pub mod session;
pub mod worker;
pub mod workflow;

pub use attachments::{AttachmentReport, AttachmentStatusRow, CompletionStats};
pub use config::{load_config, load_config_from_str, Config};
pub use db::{Database, DatabaseError};
pub use error::{
    CertificateError, ClaimdeskError, ConfigError, ExportError, Result, ValidationError,
    WorkflowError,
};
pub use history::{DecisionRow, PaymentRecord};
pub use search::SearchService;
pub use session::{PermissionGroup, Session};
pub use worker::{ChangeSet, WorkerForm, WorkerService};
pub use workflow::{
    Decision, DecisionOutcome, DecisionSubmission, ReviewContext, ReviewStage, WorkflowService,
};
