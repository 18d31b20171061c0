pub mod client;
pub mod types;

pub use client::{HttpRosterClient, RosterApi, RosterError};
pub use types::{GradeLevel, ParseGradeError, RecipientRecord};
