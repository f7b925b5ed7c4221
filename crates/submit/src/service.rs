//! Document service boundary
//!
//! The external service that stores documents, records signature
//! requests, and executes signing. Transport is out of scope; the
//! pipeline only sees this trait. All geometry crossing this boundary is
//! normalized; preview pixels never leave the core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use signpost_core::{AnnotationKind, NormalizedRect, Signer, SignerId};
use std::fmt;

/// Server-assigned id of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned id of a signature request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One signature request as it crosses the service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSignatureRequest {
    pub document_id: DocumentId,
    pub signer_id: SignerId,
    pub kind: AnnotationKind,
    /// 1-based page index.
    pub page: u32,
    /// Placement as fractions of the page dimensions.
    pub rect: NormalizedRect,
    pub text: Option<String>,
}

/// Failure reported by the document service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service rejected the call: {0}")]
    Rejected(String),
}

/// Incremental upload progress, 0–100.
pub type ProgressSink<'a> = &'a mut (dyn FnMut(u8) + Send);

/// The external document service.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Store the document and return its id. `progress` receives upload
    /// percentages in the 0–100 range.
    async fn upload_document(
        &self,
        bytes: &[u8],
        title: &str,
        progress: ProgressSink<'_>,
    ) -> Result<DocumentId, ServiceError>;

    /// Record a signature request for one placed field.
    async fn create_signature_request(
        &self,
        request: &NewSignatureRequest,
    ) -> Result<RequestId, ServiceError>;

    /// Execute the signing step for an existing request as the current
    /// user.
    async fn execute_sign(&self, request_id: &RequestId) -> Result<(), ServiceError>;

    /// Candidate signers for the roster search.
    async fn list_candidate_users(&self, exclude_self: bool) -> Result<Vec<Signer>, ServiceError>;

    /// The authenticated user driving the wizard.
    async fn current_user(&self) -> Result<Signer, ServiceError>;
}
