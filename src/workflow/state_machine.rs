use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::info;

use crate::materials::Attachment;
use crate::roster::{GradeLevel, RecipientRecord};

/// The five-step material-assignment chain. Linear: forward one step at a
/// time, backward one step at a time, Complete terminal except for `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowStep {
    SubjectSelect,
    AudienceSelect,
    FileAttach,
    Review,
    Complete,
}

impl WorkflowStep {
    pub fn next(self) -> Option<WorkflowStep> {
        match self {
            WorkflowStep::SubjectSelect => Some(WorkflowStep::AudienceSelect),
            WorkflowStep::AudienceSelect => Some(WorkflowStep::FileAttach),
            WorkflowStep::FileAttach => Some(WorkflowStep::Review),
            WorkflowStep::Review => Some(WorkflowStep::Complete),
            WorkflowStep::Complete => None,
        }
    }

    pub fn previous(self) -> Option<WorkflowStep> {
        match self {
            WorkflowStep::SubjectSelect => None,
            WorkflowStep::AudienceSelect => Some(WorkflowStep::SubjectSelect),
            WorkflowStep::FileAttach => Some(WorkflowStep::AudienceSelect),
            WorkflowStep::Review => Some(WorkflowStep::FileAttach),
            WorkflowStep::Complete => Some(WorkflowStep::Review),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == WorkflowStep::Complete
    }
}

/// Validation failures are local and non-fatal: they block the transition and
/// carry a user-facing message, nothing more.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("select a subject before continuing")]
    MissingSubject,
    #[error("select at least one recipient before continuing")]
    NoRecipientsSelected,
    #[error("attach a file before continuing")]
    MissingAttachment,
    #[error("recipient {id} is not in the current roster")]
    UnknownRecipient { id: String },
    #[error("already at the first step")]
    AtFirstStep,
    #[error("submit the assignment to complete the workflow")]
    SubmitRequired,
    #[error("submission is complete; reset to start a new one")]
    WorkflowComplete,
}

/// Outcome of one submission attempt. Success and failure are mutually
/// exclusive and terminal for the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionOutcome {
    Success,
    Failure { reason: String },
}

/// Accepted workflow mutations, recorded on the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowEvent {
    Advanced,
    Retreated,
    Reset,
    SubjectSelected { subject: String },
    TargetClassChanged { class: GradeLevel },
    RosterLoaded { count: usize },
    RosterCleared,
    RecipientToggled { id: String, selected: bool },
    AllRecipientsSelected,
    AllRecipientsCleared,
    FileAttached { file_name: String },
    CommentSet,
    SubmissionSucceeded,
    SubmissionFailed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: WorkflowStep,
    pub to: WorkflowStep,
    pub event: WorkflowEvent,
    pub timestamp: DateTime<Utc>,
}

/// In-memory state of one material assignment. Created fresh per assignment
/// screen; discarded on successful submission acknowledgement or explicit
/// cancel. Nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    step: WorkflowStep,
    subject: Option<String>,
    target_class: Option<GradeLevel>,
    roster: Vec<RecipientRecord>,
    selected_recipients: BTreeSet<String>,
    attachment: Option<Attachment>,
    comment: String,
    submission_result: Option<SubmissionOutcome>,
    history: Vec<TransitionRecord>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of the Review step for a host UI to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub subject: String,
    pub target_class: GradeLevel,
    pub recipient_count: usize,
    pub file_name: String,
    pub comment: String,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            step: WorkflowStep::SubjectSelect,
            subject: None,
            target_class: None,
            roster: Vec::new(),
            selected_recipients: BTreeSet::new(),
            attachment: None,
            comment: String::new(),
            submission_result: None,
            history: Vec::new(),
        }
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn target_class(&self) -> Option<GradeLevel> {
        self.target_class
    }

    pub fn roster(&self) -> &[RecipientRecord] {
        &self.roster
    }

    pub fn selected_recipients(&self) -> &BTreeSet<String> {
        &self.selected_recipients
    }

    /// Selected recipient ids in roster order, for the submission payload.
    pub fn selected_in_roster_order(&self) -> Vec<String> {
        self.roster
            .iter()
            .filter(|record| self.selected_recipients.contains(&record.id))
            .map(|record| record.id.clone())
            .collect()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn submission_result(&self) -> Option<&SubmissionOutcome> {
        self.submission_result.as_ref()
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    /// Whether the controller should trigger a roster fetch: a class is
    /// chosen but no roster has been loaded for it.
    pub fn needs_roster(&self) -> bool {
        self.target_class.is_some() && self.roster.is_empty()
    }

    pub fn summary(&self) -> Option<ReviewSummary> {
        let subject = self.subject.clone()?;
        let target_class = self.target_class?;
        let attachment = self.attachment.as_ref()?;
        Some(ReviewSummary {
            subject,
            target_class,
            recipient_count: self.selected_recipients.len(),
            file_name: attachment.file_name.clone(),
            comment: self.comment.clone(),
        })
    }

    fn record(&mut self, from: WorkflowStep, event: WorkflowEvent) {
        let record = TransitionRecord {
            from,
            to: self.step,
            event,
            timestamp: Utc::now(),
        };
        info!(
            from = ?record.from,
            to = ?record.to,
            event = ?record.event,
            "Workflow transition"
        );
        self.history.push(record);
    }

    fn guard_editable(&self) -> Result<(), TransitionError> {
        if self.step.is_terminal() {
            return Err(TransitionError::WorkflowComplete);
        }
        Ok(())
    }

    /// Move forward one step, gated on the current step's required fields.
    pub fn advance(&mut self) -> Result<WorkflowStep, TransitionError> {
        match self.step {
            WorkflowStep::SubjectSelect => {
                if self.subject.is_none() {
                    return Err(TransitionError::MissingSubject);
                }
            }
            WorkflowStep::AudienceSelect => {
                if self.selected_recipients.is_empty() {
                    return Err(TransitionError::NoRecipientsSelected);
                }
            }
            WorkflowStep::FileAttach => {
                if self.attachment.is_none() {
                    return Err(TransitionError::MissingAttachment);
                }
            }
            // Review exits only through a completed submission.
            WorkflowStep::Review => return Err(TransitionError::SubmitRequired),
            WorkflowStep::Complete => return Err(TransitionError::WorkflowComplete),
        }
        let from = self.step;
        // The match above covers every step with a successor.
        self.step = from.next().unwrap_or(from);
        self.record(from, WorkflowEvent::Advanced);
        Ok(self.step)
    }

    /// Move back one step. No validation, and already-entered data is kept:
    /// "back" is not "reset".
    pub fn retreat(&mut self) -> Result<WorkflowStep, TransitionError> {
        if self.step.is_terminal() {
            return Err(TransitionError::WorkflowComplete);
        }
        let from = self.step;
        self.step = from.previous().ok_or(TransitionError::AtFirstStep)?;
        self.record(from, WorkflowEvent::Retreated);
        Ok(self.step)
    }

    /// Clear all fields and return to the first step. The audit trail is
    /// retained for diagnostics.
    pub fn reset(&mut self) {
        let from = self.step;
        self.step = WorkflowStep::SubjectSelect;
        self.subject = None;
        self.target_class = None;
        self.roster.clear();
        self.selected_recipients.clear();
        self.attachment = None;
        self.comment.clear();
        self.submission_result = None;
        self.record(from, WorkflowEvent::Reset);
    }

    pub fn select_subject(&mut self, subject: impl Into<String>) -> Result<(), TransitionError> {
        self.guard_editable()?;
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(TransitionError::MissingSubject);
        }
        self.subject = Some(subject.clone());
        let from = self.step;
        self.record(from, WorkflowEvent::SubjectSelected { subject });
        Ok(())
    }

    /// Choose the target class. Changing it invalidates the roster and
    /// silently drops the current selection; the controller refetches. A
    /// class change at or after the audience step re-enters AudienceSelect,
    /// since the audience entered for the old class no longer applies.
    pub fn set_target_class(&mut self, class: GradeLevel) -> Result<(), TransitionError> {
        self.guard_editable()?;
        if self.target_class == Some(class) {
            return Ok(());
        }
        let from = self.step;
        self.target_class = Some(class);
        self.roster.clear();
        self.selected_recipients.clear();
        if self.step > WorkflowStep::AudienceSelect {
            self.step = WorkflowStep::AudienceSelect;
        }
        self.record(from, WorkflowEvent::TargetClassChanged { class });
        Ok(())
    }

    /// Replace the roster with a freshly fetched one. Every recipient starts
    /// selected ("select all by default").
    pub fn load_roster(&mut self, roster: Vec<RecipientRecord>) -> Result<(), TransitionError> {
        self.guard_editable()?;
        self.selected_recipients = roster.iter().map(|record| record.id.clone()).collect();
        let count = roster.len();
        self.roster = roster;
        let from = self.step;
        self.record(from, WorkflowEvent::RosterLoaded { count });
        Ok(())
    }

    /// Drop the roster after a failed fetch. The workflow stays retryable;
    /// forward progress is blocked by the empty selection.
    pub fn clear_roster(&mut self) -> Result<(), TransitionError> {
        self.guard_editable()?;
        self.roster.clear();
        self.selected_recipients.clear();
        let from = self.step;
        self.record(from, WorkflowEvent::RosterCleared);
        Ok(())
    }

    pub fn toggle_recipient(&mut self, id: &str) -> Result<(), TransitionError> {
        self.guard_editable()?;
        if !self.roster.iter().any(|record| record.id == id) {
            return Err(TransitionError::UnknownRecipient { id: id.to_string() });
        }
        let selected = if self.selected_recipients.remove(id) {
            false
        } else {
            self.selected_recipients.insert(id.to_string());
            true
        };
        let from = self.step;
        self.record(
            from,
            WorkflowEvent::RecipientToggled {
                id: id.to_string(),
                selected,
            },
        );
        Ok(())
    }

    pub fn select_all_recipients(&mut self) -> Result<(), TransitionError> {
        self.guard_editable()?;
        self.selected_recipients = self
            .roster
            .iter()
            .map(|record| record.id.clone())
            .collect();
        let from = self.step;
        self.record(from, WorkflowEvent::AllRecipientsSelected);
        Ok(())
    }

    pub fn clear_all_recipients(&mut self) -> Result<(), TransitionError> {
        self.guard_editable()?;
        self.selected_recipients.clear();
        let from = self.step;
        self.record(from, WorkflowEvent::AllRecipientsCleared);
        Ok(())
    }

    /// Bind a file to the submission, replacing any previous attachment.
    pub fn attach_file(&mut self, attachment: Attachment) -> Result<(), TransitionError> {
        self.guard_editable()?;
        let file_name = attachment.file_name.clone();
        self.attachment = Some(attachment);
        let from = self.step;
        self.record(from, WorkflowEvent::FileAttached { file_name });
        Ok(())
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<(), TransitionError> {
        self.guard_editable()?;
        self.comment = comment.into();
        let from = self.step;
        self.record(from, WorkflowEvent::CommentSet);
        Ok(())
    }

    /// Applied by the controller after the upload call returned 2xx. Moves to
    /// Complete and clears the attachment so the same file object cannot be
    /// resubmitted by accident.
    pub fn mark_submission_success(&mut self) -> Result<(), TransitionError> {
        if self.step != WorkflowStep::Review {
            return Err(TransitionError::SubmitRequired);
        }
        let from = self.step;
        self.submission_result = Some(SubmissionOutcome::Success);
        self.attachment = None;
        self.step = WorkflowStep::Complete;
        self.record(from, WorkflowEvent::SubmissionSucceeded);
        Ok(())
    }

    /// Applied by the controller after a failed upload call. The step stays
    /// at Review and every field is preserved so nothing is lost on retry.
    pub fn mark_submission_failure(
        &mut self,
        reason: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if self.step != WorkflowStep::Review {
            return Err(TransitionError::SubmitRequired);
        }
        let reason = reason.into();
        self.submission_result = Some(SubmissionOutcome::Failure {
            reason: reason.clone(),
        });
        let from = self.step;
        self.record(from, WorkflowEvent::SubmissionFailed { reason });
        Ok(())
    }
}
