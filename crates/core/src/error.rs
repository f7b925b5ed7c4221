//! Core error type
//!
//! Only caller-bug conditions surface as errors; illegal wizard
//! transitions and store mutations against absent ids are silent no-ops
//! handled at the call site.

use crate::signer::SignerId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A signer with the same id is already on the roster.
    #[error("signer '{0}' is already on the roster")]
    DuplicateSigner(SignerId),

    /// The selected signer is not on the roster. The assignment layer
    /// never invents signers.
    #[error("signer '{0}' is not on the roster")]
    UnknownSigner(SignerId),

    /// Roster operations are only meaningful in request mode.
    #[error("signers are only collected in request mode")]
    SignersNotAccepted,
}
