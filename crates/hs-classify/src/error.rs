use std::fmt;

use hs_audio::AudioError;
use hs_core::error::InferenceError;
use thiserror::Error;

/// Le modèle n'a pas pu être chargé. Fatal au démarrage.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Unreadable, corrupted or inconsistent artifact.
    #[error("Impossible de charger le modèle {source_name} : {reason}")]
    Load {
        /// Path or in-memory origin of the artifact.
        source_name: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl ModelError {
    pub(crate) fn load(source_name: &str, reason: &(impl fmt::Display + ?Sized)) -> Self {
        Self::Load {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Per-request failure. The shared model is untouched and the caller may
/// continue with another input.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The bundle handed to the service is inconsistent.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Decoding or feature extraction failed.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Scaling, inference or label decoding failed.
    #[error("Erreur de classification : {0}")]
    Classification(#[from] InferenceError),
}
