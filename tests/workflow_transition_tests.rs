//! Pure state-machine properties of the material assignment workflow.
//!
//! No I/O here: these tests exercise the transition rules directly, the way
//! a host UI would drive them.

use assignflow::materials::Attachment;
use assignflow::roster::{GradeLevel, RecipientRecord};
use assignflow::workflow::{TransitionError, WorkflowState, WorkflowStep};
use proptest::prelude::*;

fn recipient(id: &str) -> RecipientRecord {
    RecipientRecord {
        id: id.to_string(),
        name: format!("Student {id}"),
        class: "6th std".to_string(),
    }
}

fn state_with_roster(ids: &[&str]) -> WorkflowState {
    let mut state = WorkflowState::new();
    state.select_subject("Mathematics").unwrap();
    state.advance().unwrap();
    state.set_target_class(GradeLevel::Std6).unwrap();
    state
        .load_roster(ids.iter().map(|id| recipient(id)).collect())
        .unwrap();
    state
}

#[test]
fn step_is_monotonic_under_failed_validation() {
    let mut state = WorkflowState::new();
    for _ in 0..3 {
        assert_eq!(state.advance(), Err(TransitionError::MissingSubject));
        assert_eq!(state.step(), WorkflowStep::SubjectSelect);
    }
}

#[test]
fn default_all_selection_matches_roster_exactly() {
    let state = state_with_roster(&["a", "b", "c", "d"]);
    assert_eq!(state.selected_recipients().len(), 4);
    let roster_ids: Vec<&str> = state.roster().iter().map(|r| r.id.as_str()).collect();
    for id in state.selected_recipients() {
        assert!(roster_ids.contains(&id.as_str()));
    }
}

#[test]
fn single_attachment_policy() {
    let mut state = state_with_roster(&["a"]);
    state.advance().unwrap();
    state.attach_file(Attachment::new("a.pdf", vec![1])).unwrap();
    state.attach_file(Attachment::new("b.pdf", vec![2])).unwrap();
    let attachment = state.attachment().unwrap();
    assert_eq!(attachment.file_name, "b.pdf");
    assert_eq!(attachment.bytes, vec![2]);
}

#[test]
fn retreat_then_advance_is_lossless() {
    let mut state = state_with_roster(&["a", "b"]);
    state.toggle_recipient("b").unwrap();
    state.advance().unwrap();
    state
        .attach_file(Attachment::new("notes.pdf", vec![9]))
        .unwrap();
    state.set_comment("revision notes").unwrap();

    let snapshot = state.clone();
    state.retreat().unwrap();
    state.advance().unwrap();

    assert_eq!(state.step(), snapshot.step());
    assert_eq!(state.subject(), snapshot.subject());
    assert_eq!(state.target_class(), snapshot.target_class());
    assert_eq!(state.selected_recipients(), snapshot.selected_recipients());
    assert_eq!(state.attachment(), snapshot.attachment());
    assert_eq!(state.comment(), snapshot.comment());
}

#[test]
fn empty_roster_blocks_audience_exit_until_class_changes() {
    let mut state = WorkflowState::new();
    state.select_subject("Science").unwrap();
    state.advance().unwrap();
    state.set_target_class(GradeLevel::Std4).unwrap();
    state.load_roster(Vec::new()).unwrap();

    assert_eq!(state.advance(), Err(TransitionError::NoRecipientsSelected));

    state.set_target_class(GradeLevel::Std5).unwrap();
    state
        .load_roster(vec![recipient("a"), recipient("b")])
        .unwrap();
    assert_eq!(state.advance(), Ok(WorkflowStep::FileAttach));
}

/// Operations a user can fire at the audience step, for the containment
/// property below.
#[derive(Debug, Clone)]
enum AudienceOp {
    Toggle(String),
    ChangeClass(GradeLevel),
    Reload(Vec<String>),
    SelectAll,
    ClearAll,
}

fn audience_op() -> impl Strategy<Value = AudienceOp> {
    let id = prop::sample::select(vec!["a", "b", "c", "d", "e", "zz"]);
    let grade = prop::sample::select(GradeLevel::ALL.to_vec());
    let ids = prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 0..4);
    prop_oneof![
        id.prop_map(|id| AudienceOp::Toggle(id.to_string())),
        grade.prop_map(AudienceOp::ChangeClass),
        ids.prop_map(|ids| AudienceOp::Reload(
            ids.into_iter().map(str::to_string).collect()
        )),
        Just(AudienceOp::SelectAll),
        Just(AudienceOp::ClearAll),
    ]
}

proptest! {
    /// Property: selected_recipients is a subset of roster ids after any
    /// sequence of toggles, class changes, and reloads.
    #[test]
    fn selection_stays_within_roster(ops in prop::collection::vec(audience_op(), 1..40)) {
        let mut state = state_with_roster(&["a", "b", "c"]);
        for op in ops {
            match op {
                AudienceOp::Toggle(id) => {
                    let _ = state.toggle_recipient(&id);
                }
                AudienceOp::ChangeClass(grade) => {
                    state.set_target_class(grade).unwrap();
                }
                AudienceOp::Reload(ids) => {
                    state
                        .load_roster(ids.iter().map(|id| recipient(id)).collect())
                        .unwrap();
                }
                AudienceOp::SelectAll => state.select_all_recipients().unwrap(),
                AudienceOp::ClearAll => state.clear_all_recipients().unwrap(),
            }
            let roster_ids: Vec<&str> =
                state.roster().iter().map(|r| r.id.as_str()).collect();
            for id in state.selected_recipients() {
                prop_assert!(roster_ids.contains(&id.as_str()));
            }
        }
    }
}
