//! Worker registration and edit forms.

pub mod diff;
pub mod model;
pub mod service;
pub mod validate;

pub use diff::{diff, ChangeRow, ChangeSet, Tab};
pub use model::{
    Dependant, EmploymentDetails, PersonalDetails, RegistrationSummary, WorkHistoryEntry,
    WorkerForm,
};
pub use service::WorkerService;
pub use validate::validate;
