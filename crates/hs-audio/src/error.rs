use std::fmt;

use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Malformed or unsupported audio container.
    #[error("Erreur de décodage : {0}")]
    Decode(String),

    /// Failure in resample / filter / normalize / decompose.
    #[error("Feature extraction failed ({stage}) : {reason}")]
    FeatureExtraction {
        /// Pipeline stage that failed.
        stage: &'static str,
        /// Underlying cause.
        reason: String,
    },
}

impl AudioError {
    pub(crate) fn extraction(stage: &'static str, reason: &(impl fmt::Display + ?Sized)) -> Self {
        Self::FeatureExtraction {
            stage,
            reason: reason.to_string(),
        }
    }
}
