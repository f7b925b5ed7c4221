//! Signer identity, roster, and active-signer resolution
//!
//! The roster is the pool of candidate signers assembled during document
//! intake (request mode only). Active-signer resolution decides which
//! signer a newly placed signature/initial field is attributed to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Server-assigned user id, opaque to the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignerId(pub String);

impl SignerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SignerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for SignerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A user who can be assigned signature fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub id: SignerId,
    pub name: String,
    pub email: String,
}

impl Signer {
    pub fn new(id: impl Into<SignerId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), email: email.into() }
    }
}

/// How the document will be signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignMode {
    /// The document owner places and signs every field in one pass.
    SelfSign,
    /// Other users are assigned fields and sign later.
    Request,
}

impl SignMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::SelfSign => "Sign it yourself",
            Self::Request => "Request signatures",
        }
    }
}

/// Ordered set of candidate signers, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerRoster {
    signers: Vec<Signer>,
}

impl SignerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signer. Duplicate ids are rejected and leave the roster
    /// unchanged.
    pub fn insert(&mut self, signer: Signer) -> Result<(), CoreError> {
        if self.contains(&signer.id) {
            return Err(CoreError::DuplicateSigner(signer.id));
        }
        self.signers.push(signer);
        Ok(())
    }

    /// Remove a signer by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: &SignerId) -> Option<Signer> {
        let index = self.signers.iter().position(|s| &s.id == id)?;
        Some(self.signers.remove(index))
    }

    pub fn get(&self, id: &SignerId) -> Option<&Signer> {
        self.signers.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SignerId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signer> {
        self.signers.iter()
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    pub fn clear(&mut self) {
        self.signers.clear();
    }
}

/// Resolve the signer newly placed signature/initial fields attribute to.
///
/// Self-sign mode always resolves to the current user. Request mode
/// resolves to the explicitly selected roster member, or nothing if no
/// selection has been made yet. Selection never retags fields that were
/// already placed.
pub fn resolve_active_signer<'a>(
    mode: SignMode,
    current_user: &'a Signer,
    roster: &'a SignerRoster,
    selected: Option<&SignerId>,
) -> Option<&'a Signer> {
    match mode {
        SignMode::SelfSign => Some(current_user),
        SignMode::Request => selected.and_then(|id| roster.get(id)),
    }
}

/// Whether signature/initial placement tools should be offered.
pub fn signature_tools_enabled(
    mode: SignMode,
    roster: &SignerRoster,
    selected: Option<&SignerId>,
) -> bool {
    match mode {
        SignMode::SelfSign => true,
        SignMode::Request => selected.is_some_and(|id| roster.contains(id)),
    }
}
