//! Submission progress events
//!
//! Emitted by the pipeline as each sequential step completes, so the
//! caller can render upload percentage and per-field progress.

use signpost_core::AnnotationId;

use crate::service::{DocumentId, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    /// Upload progressed to `percent` (0–100).
    UploadProgress { percent: u8 },
    /// The document was stored.
    Uploaded { document_id: DocumentId },
    /// A signature request was created for the annotation at `index` in
    /// store order.
    RequestCreated { index: usize, annotation_id: AnnotationId, request_id: RequestId },
    /// The request was signed on the spot (self-sign mode only).
    Signed { index: usize, request_id: RequestId },
    /// Every annotation was processed.
    Completed { request_count: usize },
}
