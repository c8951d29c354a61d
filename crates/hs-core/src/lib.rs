// Configuration, types, and shared structures for heartsound.
//
// This crate contains all shared types, capability traits, and configuration
// logic used across the heartsound workspace.

pub mod config;
pub mod error;
pub mod label;
pub mod signal;
pub mod traits;

pub use config::{PipelineConfig, WaveletBasis, WaveletConfig};
pub use error::{CoreError, InferenceError};
pub use label::{ClassLabel, ClassificationResult, HeartCondition};
pub use signal::{AudioSignal, FeatureVector};
