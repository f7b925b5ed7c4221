//! Signpost Core Library
//!
//! Domain model for the signature-placement wizard: geometry
//! normalization, the annotation store, signer assignment, and the step
//! state machine. Pure and synchronous; submission lives in
//! `signpost-submit`.

pub mod annotation;
pub mod document;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod signer;
pub mod wizard;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationSet, SignerRef};
pub use document::DocumentSource;
pub use error::CoreError;
pub use geometry::{NormalizedRect, PreviewPoint, PreviewSize, ReferenceFrame};
pub use gesture::GestureController;
pub use signer::{SignMode, Signer, SignerId, SignerRoster};
pub use wizard::{WizardPayload, WizardSession, WizardStep};
