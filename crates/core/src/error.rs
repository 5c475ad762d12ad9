//! Error types for the noisy-gradient core.

use thiserror::Error;

/// Errors produced while building or inspecting an artwork.
#[derive(Debug, Error)]
pub enum ArtError {
    /// Width or height was zero.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration field held a value outside its allowed range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A serialized scene could not be read back.
    #[error("invalid scene document: {0}")]
    InvalidScene(String),
}

impl ArtError {
    pub(crate) fn parameter(name: &str, reason: impl Into<String>) -> Self {
        ArtError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<quick_xml::Error> for ArtError {
    fn from(e: quick_xml::Error) -> Self {
        ArtError::InvalidScene(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ArtError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        ArtError::InvalidScene(e.to_string())
    }
}
