//! Submission of a completed signing session
//!
//! Takes the payload a wizard session assembled and pushes it to the
//! document service: upload the document, create one signature request
//! per placed field, and in self-sign mode execute the signing step for
//! each request immediately. Transport implementations live with their
//! callers; this crate defines the service trait and the sequential
//! pipeline that drives it.

pub mod pipeline;
pub mod progress;
pub mod recording;
pub mod service;

pub use pipeline::{submit, CreatedRequest, SubmissionOutcome, SubmitError};
pub use progress::SubmissionEvent;
pub use recording::{FailurePoint, RecordingService, ServiceCall};
pub use service::{
    DocumentId, DocumentService, NewSignatureRequest, ProgressSink, RequestId, ServiceError,
};
