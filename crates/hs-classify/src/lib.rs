// Model artifact loading and classification dispatch for heartsound.

pub mod bundle;
pub mod encoder;
pub mod error;
pub mod linear;
pub mod scaler;
mod score;
pub mod service;
pub mod tree;

pub use bundle::{ClassifierHandle, ModelBundle};
pub use error::{ClassifyError, ModelError};
pub use service::ClassificationService;
