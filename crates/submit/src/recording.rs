//! In-memory document service
//!
//! Records every call in order and hands out deterministic ids. Used by
//! the CLI dry-run command and by the pipeline tests, with optional
//! failure injection at any step.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use signpost_core::Signer;

use crate::service::{
    DocumentId, DocumentService, NewSignatureRequest, ProgressSink, RequestId, ServiceError,
};

/// One recorded service call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    Upload { title: String, byte_len: usize },
    CreateRequest(NewSignatureRequest),
    Sign(RequestId),
}

/// Where an injected failure fires. Indexes count calls of that step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Upload,
    CreateRequest { index: usize },
    Sign { index: usize },
}

pub struct RecordingService {
    me: Signer,
    candidates: Vec<Signer>,
    fail_at: Option<FailurePoint>,
    calls: Mutex<Vec<ServiceCall>>,
    created: Mutex<usize>,
    signed: Mutex<usize>,
}

impl RecordingService {
    pub fn new(me: Signer) -> Self {
        Self {
            me,
            candidates: Vec::new(),
            fail_at: None,
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(0),
            signed: Mutex::new(0),
        }
    }

    /// Users returned by candidate lookup, in addition to the current
    /// user.
    pub fn with_candidates(mut self, candidates: Vec<Signer>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Make the service fail at one specific step.
    pub fn fail_at(mut self, point: FailurePoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<ServiceCall> {
        lock(&self.calls).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DocumentService for RecordingService {
    async fn upload_document(
        &self,
        bytes: &[u8],
        title: &str,
        progress: ProgressSink<'_>,
    ) -> Result<DocumentId, ServiceError> {
        lock(&self.calls)
            .push(ServiceCall::Upload { title: title.to_owned(), byte_len: bytes.len() });

        if self.fail_at == Some(FailurePoint::Upload) {
            return Err(ServiceError::Transport("injected upload failure".to_owned()));
        }

        for percent in [25, 50, 75, 100] {
            progress(percent);
        }

        Ok(DocumentId("doc-1".to_owned()))
    }

    async fn create_signature_request(
        &self,
        request: &NewSignatureRequest,
    ) -> Result<RequestId, ServiceError> {
        lock(&self.calls).push(ServiceCall::CreateRequest(request.clone()));

        let mut created = lock(&self.created);
        if self.fail_at == Some(FailurePoint::CreateRequest { index: *created }) {
            return Err(ServiceError::Rejected("injected create failure".to_owned()));
        }

        *created += 1;
        Ok(RequestId(format!("req-{created}")))
    }

    async fn execute_sign(&self, request_id: &RequestId) -> Result<(), ServiceError> {
        lock(&self.calls).push(ServiceCall::Sign(request_id.clone()));

        let mut signed = lock(&self.signed);
        if self.fail_at == Some(FailurePoint::Sign { index: *signed }) {
            return Err(ServiceError::Rejected("injected sign failure".to_owned()));
        }

        *signed += 1;
        Ok(())
    }

    async fn list_candidate_users(&self, exclude_self: bool) -> Result<Vec<Signer>, ServiceError> {
        let mut users = self.candidates.clone();
        if !exclude_self {
            users.insert(0, self.me.clone());
        }
        Ok(users)
    }

    async fn current_user(&self) -> Result<Signer, ServiceError> {
        Ok(self.me.clone())
    }
}
