pub mod client;
pub mod types;

pub use client::{HttpMaterialsClient, MaterialsApi, SubmissionError};
pub use types::{Attachment, SubmissionReceipt, SubmissionRequest};
