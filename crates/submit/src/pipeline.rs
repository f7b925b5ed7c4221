//! Submission pipeline
//!
//! Turns a completed wizard payload into persisted server state: one
//! upload, then one signature request per annotation in store order, each
//! immediately signed in self-sign mode. Strictly sequential: a
//! self-signed field must be created and signed before the next field is
//! attempted, which also keeps progress reporting accurate. There is no
//! mid-flight cancellation and no rollback; the caller prevents
//! double-submission by disabling the submit affordance while a run is in
//! flight.

use signpost_core::{
    AnnotationId, AnnotationKind, NormalizedRect, SignMode, Signer, SignerId, WizardPayload,
};

use crate::progress::SubmissionEvent;
use crate::service::{DocumentId, DocumentService, NewSignatureRequest, RequestId, ServiceError};

/// One server-side request produced during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedRequest {
    /// Position of the source annotation in store order.
    pub index: usize,
    pub annotation_id: AnnotationId,
    pub request_id: RequestId,
    pub signed: bool,
}

/// Result of a fully successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub document_id: DocumentId,
    pub requests: Vec<CreatedRequest>,
}

/// A failed run. Requests created before the failure are valid server
/// state and are reported, not rolled back, so the caller can reconcile
/// or warn before a (duplicate-creating) retry.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The payload is missing something submission needs; nothing was
    /// sent.
    #[error("payload is not ready for submission: {0}")]
    IncompletePayload(&'static str),

    /// Upload failed; no requests were created and a retry is safe.
    #[error("document upload failed: {source}")]
    Upload {
        #[source]
        source: ServiceError,
    },

    /// Creating the request for the annotation at `index` failed.
    #[error("creating signature request for annotation {index} failed: {source}")]
    CreateRequest {
        index: usize,
        annotation_id: AnnotationId,
        created: Vec<CreatedRequest>,
        #[source]
        source: ServiceError,
    },

    /// Signing the already-created request at `index` failed.
    #[error("signing request for annotation {index} failed: {source}")]
    Sign {
        index: usize,
        annotation_id: AnnotationId,
        created: Vec<CreatedRequest>,
        #[source]
        source: ServiceError,
    },
}

/// Submit a completed payload through `service`, emitting progress via
/// `on_event`.
pub async fn submit<S>(
    payload: &WizardPayload,
    current_user: &Signer,
    service: &S,
    mut on_event: impl FnMut(SubmissionEvent) + Send,
) -> Result<SubmissionOutcome, SubmitError>
where
    S: DocumentService + ?Sized,
{
    let mode = payload.mode().ok_or(SubmitError::IncompletePayload("signing mode not chosen"))?;
    let document =
        payload.document().ok_or(SubmitError::IncompletePayload("no document attached"))?;
    if payload.annotations().is_empty() {
        return Err(SubmitError::IncompletePayload("no fields placed"));
    }
    if payload.annotations().iter().any(|a| a.kind().requires_signer() && a.signer().is_none()) {
        return Err(SubmitError::IncompletePayload("signature field without a signer"));
    }

    let title = payload.effective_title().unwrap_or(document.file_name());
    // Self-sign applies to every field kind, date and text included,
    // not just signature-typed fields.
    let self_sign = mode == SignMode::SelfSign;

    tracing::info!(
        ?mode,
        title,
        annotation_count = payload.annotations().len(),
        byte_len = document.byte_len(),
        "starting submission"
    );

    let document_id = {
        let mut forward = |percent: u8| {
            on_event(SubmissionEvent::UploadProgress { percent: percent.min(100) });
        };
        service.upload_document(document.bytes(), title, &mut forward).await.map_err(|source| {
            tracing::error!(error = %source, "document upload failed");
            SubmitError::Upload { source }
        })?
    };

    tracing::info!(%document_id, "document uploaded");
    on_event(SubmissionEvent::Uploaded { document_id: document_id.clone() });

    let mut created: Vec<CreatedRequest> = Vec::with_capacity(payload.annotations().len());

    for (index, annotation) in payload.annotations().iter().enumerate() {
        // Normalize against the frame stored with the annotation, never
        // the preview size at submission time.
        let rect = NormalizedRect::from_preview(
            annotation.position(),
            annotation.size(),
            annotation.frame(),
        );

        let request = NewSignatureRequest {
            document_id: document_id.clone(),
            signer_id: request_signer(annotation.signer().map(|s| &s.id), current_user),
            kind: annotation.kind(),
            page: annotation.page(),
            rect,
            text: (annotation.kind() == AnnotationKind::Text)
                .then(|| annotation.text().to_owned()),
        };

        let annotation_id = annotation.id();
        let request_id = match service.create_signature_request(&request).await {
            Ok(request_id) => request_id,
            Err(source) => {
                tracing::error!(index, %annotation_id, error = %source, "request creation failed");
                return Err(SubmitError::CreateRequest {
                    index,
                    annotation_id,
                    created,
                    source,
                });
            }
        };

        tracing::debug!(index, %annotation_id, %request_id, "signature request created");
        on_event(SubmissionEvent::RequestCreated {
            index,
            annotation_id,
            request_id: request_id.clone(),
        });
        created.push(CreatedRequest { index, annotation_id, request_id: request_id.clone(), signed: false });

        if self_sign {
            if let Err(source) = service.execute_sign(&request_id).await {
                tracing::error!(index, %request_id, error = %source, "self-sign failed");
                return Err(SubmitError::Sign { index, annotation_id, created, source });
            }

            if let Some(last) = created.last_mut() {
                last.signed = true;
            }
            tracing::debug!(index, %request_id, "request signed");
            on_event(SubmissionEvent::Signed { index, request_id });
        }
    }

    tracing::info!(request_count = created.len(), "submission complete");
    on_event(SubmissionEvent::Completed { request_count: created.len() });

    Ok(SubmissionOutcome { document_id, requests: created })
}

/// The signer a request is filed against: the annotation's own signer
/// when it has one, otherwise the user driving the wizard (date and text
/// fields carry no signer of their own).
fn request_signer(annotation_signer: Option<&SignerId>, current_user: &Signer) -> SignerId {
    annotation_signer.cloned().unwrap_or_else(|| current_user.id.clone())
}
