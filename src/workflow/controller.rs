use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::materials::{
    Attachment, MaterialsApi, SubmissionError, SubmissionReceipt, SubmissionRequest,
};
use crate::roster::{GradeLevel, RosterApi, RosterError};

use super::state_machine::{ReviewSummary, TransitionError, WorkflowState, WorkflowStep};

/// Anything the controller can surface to a host. Every variant is
/// recoverable; the worst case is a stuck, retryable Review step.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("a roster fetch is already in progress")]
    FetchInFlight,
    #[error("a submission is already in progress")]
    SubmitInFlight,
}

/// Drives the workflow state machine and wires in the two async
/// collaborators: the roster fetch on entering or changing the audience step,
/// and the one-shot submission from Review.
///
/// Collaborators are injected; the controller never reaches into ambient
/// singletons. Hosts should consult `is_fetching` / `is_submitting` to
/// disable the class selector and submit action while a call is outstanding.
pub struct WorkflowController<R, M> {
    state: WorkflowState,
    roster_api: R,
    materials_api: M,
    fetching: Arc<AtomicBool>,
    submitting: Arc<AtomicBool>,
}

/// Clears the in-flight flag when dropped, so a collaborator call whose
/// future is dropped mid-await (host timeout, teardown) cannot leave the
/// controller wedged behind a flag that never resets.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn begin(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag: flag.clone() }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<R, M> WorkflowController<R, M>
where
    R: RosterApi,
    M: MaterialsApi,
{
    pub fn new(roster_api: R, materials_api: M) -> Self {
        Self {
            state: WorkflowState::new(),
            roster_api,
            materials_api,
            fetching: Arc::new(AtomicBool::new(false)),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn step(&self) -> WorkflowStep {
        self.state.step()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::SeqCst)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn summary(&self) -> Option<ReviewSummary> {
        self.state.summary()
    }

    /// Advance one step. Entering AudienceSelect with a chosen class and no
    /// roster triggers a fetch; a fetch failure leaves the step entered and
    /// the roster empty, which blocks further progress until retried.
    pub async fn advance(&mut self) -> Result<WorkflowStep, WorkflowError> {
        let step = self.state.advance()?;
        if step == WorkflowStep::AudienceSelect && self.state.needs_roster() {
            self.refresh_roster().await?;
        }
        Ok(self.state.step())
    }

    pub fn retreat(&mut self) -> Result<WorkflowStep, TransitionError> {
        self.state.retreat()
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn select_subject(&mut self, subject: impl Into<String>) -> Result<(), TransitionError> {
        self.state.select_subject(subject)
    }

    /// Choose the target class and fetch its roster. Selecting the class that
    /// is already loaded is a no-op; staleness within a session is tolerated.
    pub async fn set_target_class(&mut self, class: GradeLevel) -> Result<(), WorkflowError> {
        if self.state.target_class() == Some(class) && !self.state.roster().is_empty() {
            return Ok(());
        }
        self.state.set_target_class(class)?;
        self.refresh_roster().await
    }

    pub fn toggle_recipient(&mut self, id: &str) -> Result<(), TransitionError> {
        self.state.toggle_recipient(id)
    }

    pub fn select_all_recipients(&mut self) -> Result<(), TransitionError> {
        self.state.select_all_recipients()
    }

    pub fn clear_all_recipients(&mut self) -> Result<(), TransitionError> {
        self.state.clear_all_recipients()
    }

    pub fn attach_file(&mut self, attachment: Attachment) -> Result<(), TransitionError> {
        self.state.attach_file(attachment)
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), TransitionError> {
        self.state.set_comment(comment)
    }

    /// Fetch the roster for the currently chosen class and apply the
    /// select-all-by-default policy. On failure the roster is cleared and the
    /// error surfaced; the workflow stays retryable.
    pub async fn refresh_roster(&mut self) -> Result<(), WorkflowError> {
        if self.is_fetching() {
            return Err(WorkflowError::FetchInFlight);
        }
        let Some(class) = self.state.target_class() else {
            return Ok(());
        };

        let guard = InFlightGuard::begin(&self.fetching);
        let outcome = self.roster_api.fetch_roster(class).await;
        drop(guard);

        match outcome {
            Ok(roster) => {
                self.state.load_roster(roster)?;
                Ok(())
            }
            Err(err) => {
                warn!(class = %class, error = %err, "Roster fetch failed");
                self.state.clear_roster()?;
                Err(err.into())
            }
        }
    }

    /// Issue the one-shot upload from Review. The payload is an owned
    /// snapshot taken before the call, so the in-flight request always
    /// carries exactly the fields visible at the moment of invocation.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, WorkflowError> {
        if self.is_submitting() {
            return Err(WorkflowError::SubmitInFlight);
        }
        if self.state.step() != WorkflowStep::Review {
            return Err(TransitionError::SubmitRequired.into());
        }
        let request = self.snapshot()?;

        let guard = InFlightGuard::begin(&self.submitting);
        let outcome = self.materials_api.submit(&request).await;
        drop(guard);

        match outcome {
            Ok(receipt) => {
                self.state.mark_submission_success()?;
                info!(
                    idempotency_key = %receipt.idempotency_key,
                    "Assignment submitted"
                );
                Ok(receipt)
            }
            Err(err) => {
                self.state.mark_submission_failure(err.to_string())?;
                Err(err.into())
            }
        }
    }

    fn snapshot(&self) -> Result<SubmissionRequest, TransitionError> {
        let subject = self
            .state
            .subject()
            .ok_or(TransitionError::MissingSubject)?
            .to_string();
        let recipient_ids = self.state.selected_in_roster_order();
        if recipient_ids.is_empty() {
            return Err(TransitionError::NoRecipientsSelected);
        }
        let attachment = self
            .state
            .attachment()
            .cloned()
            .ok_or(TransitionError::MissingAttachment)?;
        Ok(SubmissionRequest {
            subject,
            comment: self.state.comment().to_string(),
            recipient_ids,
            attachment,
        })
    }
}
