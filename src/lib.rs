// Assignflow Library - Material Assignment Workflow
// This exposes the core components for testing and host integration

pub mod auth;
pub mod config;
pub mod materials;
pub mod roster;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use auth::{CredentialError, EnvTokenProvider, StaticTokenProvider, TokenProvider};
pub use config::{config, AssignflowConfig};
pub use materials::{
    Attachment, HttpMaterialsClient, MaterialsApi, SubmissionError, SubmissionReceipt,
    SubmissionRequest,
};
pub use roster::{GradeLevel, HttpRosterClient, RecipientRecord, RosterApi, RosterError};
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use workflow::{
    ReviewSummary, SubmissionOutcome, TransitionError, WorkflowController, WorkflowError,
    WorkflowState, WorkflowStep,
};
