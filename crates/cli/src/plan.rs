//! Placement plans
//!
//! A placement plan is the CLI's JSON description of one signing
//! session: the mode, the document, the signers, and the fields to
//! place. Loading a plan replays it through a real wizard session, so
//! every step gate and placement rule applies exactly as it would
//! interactively.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use signpost_core::{
    AnnotationKind, DocumentSource, PreviewPoint, PreviewSize, ReferenceFrame, SignMode, Signer,
    SignerId, WizardSession,
};

#[derive(Debug, Deserialize)]
pub struct PlacementPlan {
    pub mode: SignMode,
    /// Path to the document, relative to the plan file.
    pub document: PathBuf,
    pub title: Option<String>,
    pub current_user: PlannedSigner,
    #[serde(default)]
    pub signers: Vec<PlannedSigner>,
    pub annotations: Vec<PlannedAnnotation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannedSigner {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&PlannedSigner> for Signer {
    fn from(planned: &PlannedSigner) -> Self {
        Signer::new(planned.id.as_str(), planned.name.clone(), planned.email.clone())
    }
}

/// One field to place, in preview pixels against the given frame.
#[derive(Debug, Deserialize)]
pub struct PlannedAnnotation {
    pub kind: AnnotationKind,
    pub page: u32,
    pub x: f32,
    pub y: f32,
    /// Omitted dimensions fall back to the kind default.
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub frame_width: f32,
    pub frame_height: f32,
    pub signer_id: Option<String>,
    pub text: Option<String>,
}

impl PlacementPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse plan {}", path.display()))
    }

    /// The document path, resolved against the plan file's directory.
    pub fn document_path(&self, plan_path: &Path) -> PathBuf {
        if self.document.is_absolute() {
            self.document.clone()
        } else {
            plan_path.parent().unwrap_or_else(|| Path::new(".")).join(&self.document)
        }
    }
}

/// Replay a plan through a wizard session, step by step.
///
/// Fails with the first rule the plan breaks, phrased against the
/// annotation index so the plan author can find it.
pub fn replay(plan: &PlacementPlan, document: DocumentSource) -> Result<WizardSession> {
    let mut session = WizardSession::new(Signer::from(&plan.current_user));

    if !session.select_mode(plan.mode) {
        bail!("could not choose the signing mode");
    }

    session.attach_document(document);
    if let Some(title) = &plan.title {
        session.set_title(title.clone());
    }

    for signer in &plan.signers {
        session
            .add_signer(Signer::from(signer))
            .with_context(|| format!("could not add signer {:?}", signer.id))?;
    }

    if !session.next() {
        match plan.mode {
            SignMode::Request => bail!("request mode needs at least one signer"),
            SignMode::SelfSign => bail!("document step is incomplete"),
        }
    }

    for (index, planned) in plan.annotations.iter().enumerate() {
        place(&mut session, plan.mode, planned)
            .with_context(|| format!("annotation {index} could not be placed"))?;
    }

    if !session.next() {
        bail!("plan places no fields");
    }

    Ok(session)
}

fn place(session: &mut WizardSession, mode: SignMode, planned: &PlannedAnnotation) -> Result<()> {
    if let Some(signer_id) = &planned.signer_id {
        if mode != SignMode::Request {
            bail!("signer_id {signer_id:?} is only meaningful in request mode");
        }
        session.select_signer(SignerId::from(signer_id.as_str()))?;
    } else if mode == SignMode::Request && planned.kind.requires_signer() {
        bail!("{} fields need a signer_id in request mode", planned.kind.label());
    }

    let frame = ReferenceFrame::new(planned.frame_width, planned.frame_height);
    let position = PreviewPoint::new(planned.x, planned.y);

    let Some(id) = session.place_annotation(planned.kind, planned.page, position, frame) else {
        bail!("placement was rejected (page {})", planned.page);
    };

    if planned.width.is_some() || planned.height.is_some() {
        let default = planned.kind.default_size();
        let size = PreviewSize::new(
            planned.width.unwrap_or(default.width),
            planned.height.unwrap_or(default.height),
        );
        session.resize_annotation(id, size, frame);
    }

    if let Some(text) = &planned.text {
        if !session.set_annotation_text(id, text.clone()) {
            bail!("text content is only valid on text fields");
        }
    }

    Ok(())
}
