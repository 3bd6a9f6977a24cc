//! Error types for the annotation canvas engine.

use thiserror::Error;

/// Errors that can occur inside the engine.
///
/// These never cross the notification callbacks; public mutators report
/// failure as "no change happened". The error type exists for the fallible
/// boundaries (image decode, record validation) and for hosts that want the
/// detail.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Image bytes could not be decoded
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// Annotation record carries geometry the model rejects
    #[error("invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of what was wrong with the geometry
        message: String,
    },
}

impl EngineError {
    /// Create an invalid geometry error with a message.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }
}
