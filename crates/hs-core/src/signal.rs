use serde::Serialize;

use crate::error::CoreError;

/// Mono signal at a known sample rate.
///
/// Never mutated once built: each pipeline stage produces a new value.
///
/// # Example
/// ```
/// use hs_core::signal::AudioSignal;
/// let signal = AudioSignal::new(vec![0.0; 1000], 1000).unwrap();
/// assert_eq!(signal.len(), 1000);
/// assert!((signal.duration_secs() - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSignal {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl AudioSignal {
    /// Crée un signal en vérifiant les invariants (rate > 0, non vide).
    ///
    /// # Errors
    /// Returns `CoreError::InvalidSignal` if `samples` is empty or `sample_rate` is 0.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Result<Self, CoreError> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSignal("sample rate must be > 0".into()));
        }
        if samples.is_empty() {
            return Err(CoreError::InvalidSignal("signal has no samples".into()));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Échantillons, dans l'ordre temporel.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Nombre d'échantillons (toujours > 0).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Durée en secondes.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Fixed-length feature vector handed to the classifier.
///
/// # Example
/// ```
/// use hs_core::signal::FeatureVector;
/// let fv = FeatureVector::with_length(vec![1.0, 2.0, 3.0], 5);
/// assert_eq!(fv.as_slice(), &[1.0, 2.0, 3.0, 0.0, 0.0]);
/// let fv = FeatureVector::with_length(vec![1.0, 2.0, 3.0], 2);
/// assert_eq!(fv.as_slice(), &[1.0, 2.0]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Force `values` to exactly `length` entries: the tail is truncated or
    /// zero-padded, nothing else.
    #[must_use]
    pub fn with_length(mut values: Vec<f64>, length: usize) -> Self {
        values.resize(length, 0.0);
        Self(values)
    }

    /// Feature values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Nombre de features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for a zero-length vector.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
