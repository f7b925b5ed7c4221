//! Wizard state machine
//!
//! One `WizardSession` owns the evolving payload for one signing session
//! and is the only writer to it. Steps are linear once a mode is chosen;
//! every illegal transition or out-of-step mutation is a silent no-op so
//! the machine is safe to call regardless of what the UI gated.

use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationId, AnnotationKind, AnnotationSet, SignerRef};
use crate::document::DocumentSource;
use crate::error::CoreError;
use crate::geometry::{PreviewPoint, PreviewSize, ReferenceFrame};
use crate::signer::{
    resolve_active_signer, signature_tools_enabled, SignMode, Signer, SignerId, SignerRoster,
};

/// The ordered wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Choose between self-signing and requesting signatures.
    ModeSelect,
    /// Pick the document, title it, and (request mode) assemble signers.
    Intake,
    /// Place annotation fields on the rendered pages.
    Placement,
    /// Review and submit.
    Confirm,
}

impl WizardStep {
    fn next(self) -> Option<WizardStep> {
        match self {
            Self::ModeSelect => Some(Self::Intake),
            Self::Intake => Some(Self::Placement),
            Self::Placement => Some(Self::Confirm),
            Self::Confirm => None,
        }
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            Self::ModeSelect => None,
            Self::Intake => Some(Self::ModeSelect),
            Self::Placement => Some(Self::Intake),
            Self::Confirm => Some(Self::Placement),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ModeSelect => "Choose mode",
            Self::Intake => "Select document",
            Self::Placement => "Place fields",
            Self::Confirm => "Confirm",
        }
    }
}

/// Everything one signing session accumulates before submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardPayload {
    pub(crate) mode: Option<SignMode>,
    pub(crate) document: Option<DocumentSource>,
    pub(crate) title: Option<String>,
    pub(crate) signers: SignerRoster,
    pub(crate) annotations: AnnotationSet,
}

impl WizardPayload {
    pub fn mode(&self) -> Option<SignMode> {
        self.mode
    }

    pub fn document(&self) -> Option<&DocumentSource> {
        self.document.as_ref()
    }

    /// The user-entered title, falling back to the document file name.
    pub fn effective_title(&self) -> Option<&str> {
        self.title.as_deref().or_else(|| self.document.as_ref().map(|d| d.default_title()))
    }

    pub fn signers(&self) -> &SignerRoster {
        &self.signers
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }
}

/// One user's pass through the signing wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSession {
    step: WizardStep,
    payload: WizardPayload,
    current_user: Signer,
    active_signer: Option<SignerId>,
}

impl WizardSession {
    pub fn new(current_user: Signer) -> Self {
        Self {
            step: WizardStep::ModeSelect,
            payload: WizardPayload::default(),
            current_user,
            active_signer: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn payload(&self) -> &WizardPayload {
        &self.payload
    }

    pub fn current_user(&self) -> &Signer {
        &self.current_user
    }

    /// Discard everything and return to mode selection.
    pub fn restart(&mut self) {
        self.step = WizardStep::ModeSelect;
        self.payload = WizardPayload::default();
        self.active_signer = None;
    }

    // -- navigation --

    /// Choose the signing mode. Legal only on the mode-select step;
    /// advances to intake on success.
    pub fn select_mode(&mut self, mode: SignMode) -> bool {
        if self.step != WizardStep::ModeSelect {
            return false;
        }

        self.payload.mode = Some(mode);
        self.step = WizardStep::Intake;
        true
    }

    /// Whether the current step's completion predicate holds.
    pub fn step_complete(&self) -> bool {
        match self.step {
            WizardStep::ModeSelect => self.payload.mode.is_some(),
            WizardStep::Intake => {
                self.payload.document.is_some()
                    && (self.payload.mode != Some(SignMode::Request)
                        || !self.payload.signers.is_empty())
            }
            WizardStep::Placement => !self.payload.annotations.is_empty(),
            WizardStep::Confirm => true,
        }
    }

    /// Advance one step. No-op when the completion predicate fails or the
    /// session is already on the terminal step.
    pub fn next(&mut self) -> bool {
        if !self.step_complete() {
            return false;
        }

        let Some(next) = self.step.next() else {
            return false;
        };

        self.step = next;
        true
    }

    /// Go back one step. Leaving intake for mode selection discards the
    /// mode together with everything that depended on it (signers, active
    /// selection, placed annotations) so the payload is never left
    /// inconsistent.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.step.previous() else {
            return false;
        };

        if previous == WizardStep::ModeSelect {
            self.payload.mode = None;
            self.payload.signers.clear();
            self.payload.annotations.clear();
            self.active_signer = None;
        }

        self.step = previous;
        true
    }

    // -- intake --

    /// Set the document being signed. Legal only during intake.
    pub fn attach_document(&mut self, document: DocumentSource) -> bool {
        if self.step != WizardStep::Intake {
            return false;
        }

        self.payload.document = Some(document);
        true
    }

    /// Set the display title. Legal only during intake; a blank title
    /// reverts to the document file name.
    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        if self.step != WizardStep::Intake {
            return false;
        }

        let title = title.into();
        self.payload.title = if title.trim().is_empty() { None } else { Some(title) };
        true
    }

    /// Add a candidate signer during intake. Only request-mode sessions
    /// collect signers; duplicate ids are rejected.
    pub fn add_signer(&mut self, signer: Signer) -> Result<(), CoreError> {
        if self.payload.mode != Some(SignMode::Request) || self.step != WizardStep::Intake {
            return Err(CoreError::SignersNotAccepted);
        }

        self.payload.signers.insert(signer)
    }

    /// Remove a candidate signer during intake. Absent ids are a no-op.
    pub fn remove_signer(&mut self, id: &SignerId) -> Option<Signer> {
        if self.payload.mode != Some(SignMode::Request) || self.step != WizardStep::Intake {
            return None;
        }

        if self.active_signer.as_ref() == Some(id) {
            self.active_signer = None;
        }

        self.payload.signers.remove(id)
    }

    // -- placement --

    /// Choose which roster member new signature/initial fields attribute
    /// to. Unknown ids are a caller bug; previously placed fields are
    /// never retagged.
    pub fn select_signer(&mut self, id: SignerId) -> Result<(), CoreError> {
        if self.payload.mode != Some(SignMode::Request) {
            return Err(CoreError::SignersNotAccepted);
        }

        if !self.payload.signers.contains(&id) {
            return Err(CoreError::UnknownSigner(id));
        }

        self.active_signer = Some(id);
        Ok(())
    }

    /// The signer new signature/initial fields will be attributed to.
    pub fn active_signer(&self) -> Option<&Signer> {
        let mode = self.payload.mode?;
        resolve_active_signer(
            mode,
            &self.current_user,
            &self.payload.signers,
            self.active_signer.as_ref(),
        )
    }

    /// Whether signature/initial tools should be offered right now.
    pub fn signature_tools_enabled(&self) -> bool {
        match self.payload.mode {
            Some(mode) => {
                signature_tools_enabled(mode, &self.payload.signers, self.active_signer.as_ref())
            }
            None => false,
        }
    }

    /// Place a new field at `position` on `page` (1-based), sized to the
    /// kind default. Returns the new id, or `None` when the session is
    /// not on the placement step, the page index is invalid, or the kind
    /// requires a signer and none is resolvable.
    pub fn place_annotation(
        &mut self,
        kind: AnnotationKind,
        page: u32,
        position: PreviewPoint,
        frame: ReferenceFrame,
    ) -> Option<AnnotationId> {
        if self.step != WizardStep::Placement || page == 0 {
            return None;
        }

        let mut annotation = Annotation::new(kind, page, position, frame);
        if kind.requires_signer() {
            let signer = self.active_signer()?;
            annotation = annotation.with_signer(SignerRef::from(signer));
        }

        let id = annotation.id();
        self.payload.annotations.add(annotation).then_some(id)
    }

    pub fn move_annotation(
        &mut self,
        id: AnnotationId,
        position: PreviewPoint,
        frame: ReferenceFrame,
    ) -> bool {
        self.step == WizardStep::Placement && self.payload.annotations.move_to(id, position, frame)
    }

    pub fn resize_annotation(
        &mut self,
        id: AnnotationId,
        size: PreviewSize,
        frame: ReferenceFrame,
    ) -> bool {
        self.step == WizardStep::Placement && self.payload.annotations.resize(id, size, frame)
    }

    pub fn set_annotation_text(&mut self, id: AnnotationId, text: impl Into<String>) -> bool {
        self.step == WizardStep::Placement && self.payload.annotations.set_text(id, text)
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> bool {
        self.step == WizardStep::Placement && self.payload.annotations.remove(id).is_some()
    }

    /// Mutable access to the annotation store for gesture handling.
    /// Available only while placement is active.
    pub fn annotations_mut(&mut self) -> Option<&mut AnnotationSet> {
        (self.step == WizardStep::Placement).then_some(&mut self.payload.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Signer {
        Signer::new("me", "Current User", "me@example.com")
    }

    fn frame() -> ReferenceFrame {
        ReferenceFrame::new(600.0, 800.0)
    }

    fn document() -> DocumentSource {
        DocumentSource::new("contract.pdf", b"%PDF-1.4 test".to_vec())
    }

    fn session_at_placement_self() -> WizardSession {
        let mut session = WizardSession::new(user());
        assert!(session.select_mode(SignMode::SelfSign));
        assert!(session.attach_document(document()));
        assert!(session.next());
        session
    }

    #[test]
    fn starts_on_mode_select_with_empty_payload() {
        let session = WizardSession::new(user());
        assert_eq!(session.step(), WizardStep::ModeSelect);
        assert_eq!(session.payload().mode(), None);
        assert!(!session.step_complete());
    }

    #[test]
    fn select_mode_advances_to_intake() {
        let mut session = WizardSession::new(user());
        assert!(session.select_mode(SignMode::SelfSign));
        assert_eq!(session.step(), WizardStep::Intake);
        assert_eq!(session.payload().mode(), Some(SignMode::SelfSign));
    }

    #[test]
    fn select_mode_outside_mode_select_is_noop() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::SelfSign);

        assert!(!session.select_mode(SignMode::Request));
        assert_eq!(session.payload().mode(), Some(SignMode::SelfSign));
        assert_eq!(session.step(), WizardStep::Intake);
    }

    #[test]
    fn next_is_noop_until_intake_is_complete() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::SelfSign);

        assert!(!session.next());
        assert_eq!(session.step(), WizardStep::Intake);

        session.attach_document(document());
        assert!(session.next());
        assert_eq!(session.step(), WizardStep::Placement);
    }

    #[test]
    fn request_mode_intake_requires_signers() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::Request);
        session.attach_document(document());

        assert!(!session.next(), "no signers collected yet");

        session.add_signer(Signer::new("a", "Alice", "alice@example.com")).unwrap();
        assert!(session.next());
        assert_eq!(session.step(), WizardStep::Placement);
    }

    #[test]
    fn placement_requires_at_least_one_annotation() {
        let mut session = session_at_placement_self();

        assert!(!session.next());

        session
            .place_annotation(AnnotationKind::Signature, 1, PreviewPoint::new(10.0, 10.0), frame())
            .expect("self mode places signatures freely");
        assert!(session.next());
        assert_eq!(session.step(), WizardStep::Confirm);
    }

    #[test]
    fn next_is_noop_on_terminal_step() {
        let mut session = session_at_placement_self();
        session.place_annotation(AnnotationKind::Date, 1, PreviewPoint::new(0.0, 0.0), frame());
        session.next();
        assert_eq!(session.step(), WizardStep::Confirm);

        assert!(!session.next());
        assert_eq!(session.step(), WizardStep::Confirm);
    }

    #[test]
    fn back_from_mode_select_is_noop() {
        let mut session = WizardSession::new(user());
        assert!(!session.back());
        assert_eq!(session.step(), WizardStep::ModeSelect);
    }

    #[test]
    fn back_to_mode_select_discards_mode_dependent_state() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::Request);
        session.attach_document(document());
        session.add_signer(Signer::new("a", "Alice", "alice@example.com")).unwrap();
        session.next();
        session.select_signer(SignerId::from("a")).unwrap();
        session.place_annotation(AnnotationKind::Signature, 1, PreviewPoint::new(5.0, 5.0), frame());

        assert!(session.back()); // placement -> intake
        assert!(session.back()); // intake -> mode select

        assert_eq!(session.step(), WizardStep::ModeSelect);
        assert_eq!(session.payload().mode(), None);
        assert!(session.payload().signers().is_empty());
        assert!(session.payload().annotations().is_empty());
        // The chosen document survives a mode change.
        assert!(session.payload().document().is_some());
    }

    #[test]
    fn title_defaults_to_file_name() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::SelfSign);
        session.attach_document(document());

        assert_eq!(session.payload().effective_title(), Some("contract.pdf"));

        session.set_title("Q3 lease agreement");
        assert_eq!(session.payload().effective_title(), Some("Q3 lease agreement"));

        session.set_title("   ");
        assert_eq!(session.payload().effective_title(), Some("contract.pdf"));
    }

    #[test]
    fn self_mode_rejects_signer_roster_edits() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::SelfSign);

        let result = session.add_signer(Signer::new("a", "Alice", "alice@example.com"));
        assert_eq!(result, Err(CoreError::SignersNotAccepted));
    }

    #[test]
    fn request_mode_blocks_signature_placement_until_selection() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::Request);
        session.attach_document(document());
        session.add_signer(Signer::new("a", "Alice", "alice@example.com")).unwrap();
        session.next();

        assert!(!session.signature_tools_enabled());
        let placed = session.place_annotation(
            AnnotationKind::Signature,
            1,
            PreviewPoint::new(10.0, 10.0),
            frame(),
        );
        assert!(placed.is_none());
        assert!(session.payload().annotations().is_empty());

        session.select_signer(SignerId::from("a")).unwrap();
        assert!(session.signature_tools_enabled());
        let placed = session.place_annotation(
            AnnotationKind::Signature,
            1,
            PreviewPoint::new(10.0, 10.0),
            frame(),
        );
        assert!(placed.is_some());

        let annotation = session.payload().annotations().iter().next().unwrap();
        assert_eq!(annotation.signer().unwrap().id.as_str(), "a");
    }

    #[test]
    fn switching_active_signer_does_not_retag_placed_fields() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::Request);
        session.attach_document(document());
        session.add_signer(Signer::new("a", "Alice", "alice@example.com")).unwrap();
        session.add_signer(Signer::new("b", "Bob", "bob@example.com")).unwrap();
        session.next();

        session.select_signer(SignerId::from("a")).unwrap();
        let first = session
            .place_annotation(AnnotationKind::Signature, 1, PreviewPoint::new(1.0, 1.0), frame())
            .unwrap();

        session.select_signer(SignerId::from("b")).unwrap();
        session
            .place_annotation(AnnotationKind::Signature, 1, PreviewPoint::new(2.0, 2.0), frame())
            .unwrap();

        let annotations = session.payload().annotations();
        assert_eq!(annotations.get(first).unwrap().signer().unwrap().id.as_str(), "a");
    }

    #[test]
    fn select_unknown_signer_is_an_error() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::Request);
        session.attach_document(document());
        session.add_signer(Signer::new("a", "Alice", "alice@example.com")).unwrap();

        let result = session.select_signer(SignerId::from("ghost"));
        assert_eq!(result, Err(CoreError::UnknownSigner(SignerId::from("ghost"))));
        assert!(session.active_signer().is_none());
    }

    #[test]
    fn placement_mutators_are_noops_outside_placement_step() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::SelfSign);

        let placed = session.place_annotation(
            AnnotationKind::Date,
            1,
            PreviewPoint::new(0.0, 0.0),
            frame(),
        );
        assert!(placed.is_none());

        let mut session = session_at_placement_self();
        let id = session
            .place_annotation(AnnotationKind::Date, 1, PreviewPoint::new(0.0, 0.0), frame())
            .unwrap();
        session.next();

        assert!(!session.move_annotation(id, PreviewPoint::new(9.0, 9.0), frame()));
        assert!(!session.remove_annotation(id));
        assert_eq!(session.payload().annotations().len(), 1);
    }

    #[test]
    fn gesture_controller_writes_through_the_session_store() {
        use crate::gesture::GestureController;

        let mut session = session_at_placement_self();
        let id = session
            .place_annotation(AnnotationKind::Date, 1, PreviewPoint::new(100.0, 100.0), frame())
            .unwrap();

        let mut gestures = GestureController::new();
        let annotations = session.annotations_mut().expect("placement is active");
        assert!(gestures.begin_drag(annotations, id, PreviewPoint::new(110.0, 110.0)));
        assert!(gestures.update(annotations, PreviewPoint::new(210.0, 160.0), frame()));
        assert_eq!(gestures.finish(), Some(id));

        assert_eq!(session.payload().annotations().get(id).unwrap().position().x, 200.0);
    }

    #[test]
    fn page_zero_is_rejected() {
        let mut session = session_at_placement_self();
        let placed =
            session.place_annotation(AnnotationKind::Date, 0, PreviewPoint::new(0.0, 0.0), frame());
        assert!(placed.is_none());
    }

    #[test]
    fn payload_survives_a_serde_round_trip() {
        let mut session = WizardSession::new(user());
        session.select_mode(SignMode::Request);
        session.attach_document(document());
        session.set_title("Q3 lease agreement");
        session.add_signer(Signer::new("a", "Alice", "alice@example.com")).unwrap();
        session.next();
        session.select_signer(SignerId::from("a")).unwrap();
        session.place_annotation(AnnotationKind::Signature, 1, PreviewPoint::new(5.0, 5.0), frame());

        let json = serde_json::to_string(session.payload()).expect("payload serializes");
        let restored: WizardPayload = serde_json::from_str(&json).expect("payload deserializes");

        assert_eq!(&restored, session.payload());
    }

    #[test]
    fn restart_clears_everything() {
        let mut session = session_at_placement_self();
        session.place_annotation(AnnotationKind::Date, 1, PreviewPoint::new(0.0, 0.0), frame());

        session.restart();

        assert_eq!(session.step(), WizardStep::ModeSelect);
        assert_eq!(session.payload(), &WizardPayload::default());
    }
}
