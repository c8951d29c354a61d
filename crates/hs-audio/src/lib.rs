// Audio decoding, conditioning, and wavelet feature extraction for heartsound.

pub mod decode;
pub mod error;
pub mod features;
pub mod filter;
pub mod preprocess;
pub mod resample;
pub mod wavelet;

pub use error::AudioError;
pub use features::FeatureExtractor;
pub use preprocess::{PreparedStages, Preprocessor};

#[cfg(test)]
pub(crate) mod fixtures;
