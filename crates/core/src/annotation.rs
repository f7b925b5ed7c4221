//! Annotation data model and ordered store
//!
//! An annotation is one typed field (signature, initial, date, or free
//! text) placed on one page of the document. Coordinates are preview
//! pixels and every annotation carries the reference frame they were
//! written against; the two always change together.

use serde::{Deserialize, Serialize};

use crate::geometry::{PreviewPoint, PreviewSize, ReferenceFrame};
use crate::signer::{Signer, SignerId};

/// Unique identifier for an annotation.
///
/// Locally generated, never reused within a wizard session. Annotations
/// have no server-side identity until submission.
pub type AnnotationId = uuid::Uuid;

/// The kind of field an annotation places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Signature,
    Initial,
    Date,
    Text,
}

impl AnnotationKind {
    /// Whether placing this kind requires a resolvable signer.
    pub fn requires_signer(self) -> bool {
        matches!(self, Self::Signature | Self::Initial)
    }

    /// Smallest preview size this kind may shrink to.
    pub fn min_size(self) -> PreviewSize {
        match self {
            Self::Signature => PreviewSize::new(50.0, 24.0),
            Self::Initial => PreviewSize::new(40.0, 24.0),
            Self::Date => PreviewSize::new(60.0, 20.0),
            Self::Text => PreviewSize::new(50.0, 20.0),
        }
    }

    /// Preview size a freshly placed field starts at.
    pub fn default_size(self) -> PreviewSize {
        match self {
            Self::Signature => PreviewSize::new(160.0, 64.0),
            Self::Initial => PreviewSize::new(96.0, 48.0),
            Self::Date => PreviewSize::new(120.0, 32.0),
            Self::Text => PreviewSize::new(180.0, 44.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Signature => "Signature",
            Self::Initial => "Initial",
            Self::Date => "Date",
            Self::Text => "Text",
        }
    }
}

/// Identity of the signer an annotation is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerRef {
    pub id: SignerId,
    pub name: String,
}

impl From<&Signer> for SignerRef {
    fn from(signer: &Signer) -> Self {
        Self { id: signer.id.clone(), name: signer.name.clone() }
    }
}

/// One placed field on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    kind: AnnotationKind,
    /// 1-based page index within the document.
    page: u32,
    position: PreviewPoint,
    size: PreviewSize,
    /// Preview page dimensions when `position`/`size` were last written.
    frame: ReferenceFrame,
    signer: Option<SignerRef>,
    /// Free-form content; meaningful for `Text` only.
    text: String,
}

impl Annotation {
    /// Create a field at `position` with the kind's default size.
    pub fn new(kind: AnnotationKind, page: u32, position: PreviewPoint, frame: ReferenceFrame) -> Self {
        Self {
            id: AnnotationId::new_v4(),
            kind,
            page,
            position,
            size: kind.default_size(),
            frame,
            signer: None,
            text: String::new(),
        }
    }

    /// Attribute the field to a signer. Required before a
    /// signature/initial field can enter the store.
    pub fn with_signer(mut self, signer: SignerRef) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn position(&self) -> PreviewPoint {
        self.position
    }

    pub fn size(&self) -> PreviewSize {
        self.size
    }

    pub fn frame(&self) -> ReferenceFrame {
        self.frame
    }

    pub fn signer(&self) -> Option<&SignerRef> {
        self.signer.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered collection of annotations for one wizard session.
///
/// Insertion order is display/processing order only; it carries no
/// semantic weight. Mutations against absent ids are no-ops, never
/// errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    items: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation.
    ///
    /// Rejected (store unchanged, returns `false`) when the kind requires
    /// a signer and none is attached. Size is floored to the kind
    /// minimum on entry.
    pub fn add(&mut self, mut annotation: Annotation) -> bool {
        if annotation.kind.requires_signer() && annotation.signer.is_none() {
            return false;
        }

        annotation.size = annotation.size.max(annotation.kind.min_size());
        self.items.push(annotation);
        true
    }

    /// Update position and reference frame together.
    pub fn move_to(&mut self, id: AnnotationId, position: PreviewPoint, frame: ReferenceFrame) -> bool {
        let Some(annotation) = self.get_mut(id) else {
            return false;
        };

        annotation.position = position;
        annotation.frame = frame;
        true
    }

    /// Update size and reference frame together, flooring to the kind
    /// minimum.
    pub fn resize(&mut self, id: AnnotationId, size: PreviewSize, frame: ReferenceFrame) -> bool {
        let Some(annotation) = self.get_mut(id) else {
            return false;
        };

        annotation.size = size.max(annotation.kind.min_size());
        annotation.frame = frame;
        true
    }

    /// Replace the free-form content of a text field. No-op for every
    /// other kind.
    pub fn set_text(&mut self, id: AnnotationId, text: impl Into<String>) -> bool {
        let Some(annotation) = self.get_mut(id) else {
            return false;
        };

        if annotation.kind != AnnotationKind::Text {
            return false;
        }

        annotation.text = text.into();
        true
    }

    /// Delete by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.items.iter_mut().find(|a| a.id == id)
    }

    /// Order-preserving view of one page, used for rendering.
    pub fn for_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.items.iter().filter(move |a| a.page == page)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
