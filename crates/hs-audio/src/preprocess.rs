use hs_core::config::PipelineConfig;
use hs_core::signal::AudioSignal;

use crate::error::AudioError;
use crate::filter::ButterworthHighpass;
use crate::resample::resample;

/// Every intermediate signal of [`Preprocessor::stages`].
#[derive(Clone, Debug)]
pub struct PreparedStages {
    /// After resampling to the analysis rate.
    pub resampled: AudioSignal,
    /// After zero-phase high-pass filtering.
    pub filtered: AudioSignal,
    /// After z-score normalization.
    pub normalized: AudioSignal,
    /// After truncation / zero-padding: the signal fed to feature extraction.
    pub prepared: AudioSignal,
}

/// Conditionne un signal avant la décomposition en ondelettes.
///
/// Ordre fixe : high-pass zero-phase → z-score → troncature / zero-pad.
/// The filter is designed once at construction and reused for every call.
///
/// # Example
/// ```
/// use hs_core::config::PipelineConfig;
/// use hs_core::signal::AudioSignal;
/// use hs_audio::preprocess::Preprocessor;
///
/// let pre = Preprocessor::new(&PipelineConfig::default()).unwrap();
/// let raw = AudioSignal::new(vec![0.0; 16_000], 4000).unwrap();
/// let prepared = pre.prepare(&raw).unwrap();
/// assert_eq!(prepared.len(), 3000);
/// assert_eq!(prepared.sample_rate(), 1000);
/// ```
#[derive(Clone, Debug)]
pub struct Preprocessor {
    target_rate: u32,
    target_length: usize,
    highpass: ButterworthHighpass,
}

impl Preprocessor {
    /// Build from the pipeline configuration.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if the filter cannot be designed.
    pub fn new(config: &PipelineConfig) -> Result<Self, AudioError> {
        let highpass = ButterworthHighpass::new(config.filter_order, config.critical_frequency())?;
        Ok(Self {
            target_rate: config.target_sample_rate,
            target_length: config.target_length,
            highpass,
        })
    }

    /// Resample a decoded signal, then [`condition`](Self::condition) it.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if any stage fails.
    pub fn prepare(&self, raw: &AudioSignal) -> Result<AudioSignal, AudioError> {
        let resampled = resample(raw, self.target_rate)?;
        self.condition(&resampled)
    }

    /// Filter, normalize and shape a signal already at the analysis rate.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if the rate is wrong or the
    /// signal is too short for the zero-phase filter.
    pub fn condition(&self, resampled: &AudioSignal) -> Result<AudioSignal, AudioError> {
        let filtered = self.filter(resampled)?;
        let normalized = zscore(filtered.samples());
        self.rebuild(fit_length(&normalized, self.target_length))
    }

    /// Same pipeline as [`prepare`](Self::prepare), keeping every stage.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if any stage fails.
    pub fn stages(&self, raw: &AudioSignal) -> Result<PreparedStages, AudioError> {
        let resampled = resample(raw, self.target_rate)?;
        let filtered = self.filter(&resampled)?;
        let normalized = self.rebuild(zscore(filtered.samples()))?;
        let fitted = fit_length(normalized.samples(), self.target_length);
        let prepared = self.rebuild(fitted)?;
        Ok(PreparedStages {
            resampled,
            filtered,
            normalized,
            prepared,
        })
    }

    fn filter(&self, resampled: &AudioSignal) -> Result<AudioSignal, AudioError> {
        if resampled.sample_rate() != self.target_rate {
            return Err(AudioError::extraction(
                "highpass",
                &format!(
                    "expected {}Hz input, got {}Hz",
                    self.target_rate,
                    resampled.sample_rate()
                ),
            ));
        }
        let filtered = self.highpass.filtfilt(resampled.samples())?;
        self.rebuild(filtered)
    }

    fn rebuild(&self, samples: Vec<f64>) -> Result<AudioSignal, AudioError> {
        AudioSignal::new(samples, self.target_rate)
            .map_err(|e| AudioError::extraction("preprocess", &e))
    }
}

/// Z-score normalization with the population standard deviation.
///
/// A zero standard deviation (constant or silent signal) returns the input
/// unchanged: no mean subtraction, no division.
///
/// # Example
/// ```
/// use hs_audio::preprocess::zscore;
/// let z = zscore(&[1.0, 2.0, 3.0, 4.0]);
/// let mean: f64 = z.iter().sum::<f64>() / 4.0;
/// assert!(mean.abs() < 1e-12);
/// assert_eq!(zscore(&[0.5; 8]), vec![0.5; 8]);
/// ```
#[must_use]
pub fn zscore(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 {
        samples.iter().map(|v| (v - mean) / std).collect()
    } else {
        samples.to_vec()
    }
}

/// Truncate to the first `len` samples or zero-pad the end up to `len`.
///
/// # Example
/// ```
/// use hs_audio::preprocess::fit_length;
/// assert_eq!(fit_length(&[1.0, 2.0, 3.0], 2), vec![1.0, 2.0]);
/// assert_eq!(fit_length(&[1.0], 3), vec![1.0, 0.0, 0.0]);
/// ```
#[must_use]
pub fn fit_length(samples: &[f64], len: usize) -> Vec<f64> {
    let mut out = samples[..samples.len().min(len)].to_vec();
    out.resize(len, 0.0);
    out
}
