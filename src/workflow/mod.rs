// Material Assignment Workflow - Testable State Machine
//
// The state machine is pure and synchronous; the controller layers the async
// collaborators (roster fetch, submission) on top via injected interfaces.

pub mod controller;
pub mod state_machine;

pub use controller::{WorkflowController, WorkflowError};
pub use state_machine::{
    ReviewSummary, SubmissionOutcome, TransitionError, TransitionRecord, WorkflowEvent,
    WorkflowState, WorkflowStep,
};
