use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// A signal violating the `AudioSignal` invariants.
    #[error("Signal invalide : {0}")]
    InvalidSignal(String),
}

/// Errors raised by a model capability (scaler, classifier, label decoder).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Input width does not match what the component was fitted on.
    #[error("Nombre de features incorrect : attendu {expected}, reçu {actual}")]
    FeatureLength {
        /// Width the component expects.
        expected: usize,
        /// Width it was given.
        actual: usize,
    },

    /// A label decoder was asked for a class it does not know.
    #[error("Classe inconnue : {0}")]
    UnknownClass(String),

    /// Non-finite value produced or consumed.
    #[error("Valeur non finie dans {0}")]
    NonFinite(&'static str),

    /// Fitted parameters that cannot be evaluated (bad node or feature index).
    #[error("Modèle incohérent : {0}")]
    Malformed(String),
}
