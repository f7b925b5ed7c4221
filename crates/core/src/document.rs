//! Selected document
//!
//! The wizard holds the raw file until submission; parsing and rendering
//! belong to the external engine.

use serde::{Deserialize, Serialize};

/// The file chosen during document intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    file_name: String,
    bytes: Vec<u8>,
}

impl DocumentSource {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Display title used when the user has not typed one.
    pub fn default_title(&self) -> &str {
        &self.file_name
    }
}
