use hs_core::config::WaveletConfig;
use hs_core::signal::{AudioSignal, FeatureVector};

use crate::error::AudioError;
use crate::wavelet::wavedec;

/// Turns a prepared signal into a fixed-width wavelet feature vector.
///
/// The detail bands of a multilevel decomposition are concatenated
/// (coarsest first, approximation dropped) and the tail is truncated or
/// zero-padded to `feature_length`.
///
/// # Example
/// ```
/// use hs_core::config::WaveletConfig;
/// use hs_core::signal::AudioSignal;
/// use hs_audio::features::FeatureExtractor;
///
/// let extractor = FeatureExtractor::new(WaveletConfig::default(), 3020);
/// let prepared = AudioSignal::new(vec![0.0; 3000], 1000).unwrap();
/// let features = extractor.extract(&prepared).unwrap();
/// assert_eq!(features.len(), 3020);
/// assert!(features.as_slice().iter().all(|&v| v == 0.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FeatureExtractor {
    wavelet: WaveletConfig,
    feature_length: usize,
}

impl FeatureExtractor {
    /// Extracteur pour une base, un niveau et une largeur de sortie donnés.
    #[must_use]
    pub fn new(wavelet: WaveletConfig, feature_length: usize) -> Self {
        Self {
            wavelet,
            feature_length,
        }
    }

    /// Basis and level of the decomposition.
    #[must_use]
    pub fn wavelet(&self) -> WaveletConfig {
        self.wavelet
    }

    /// Width of every vector this extractor produces.
    #[must_use]
    pub fn feature_length(&self) -> usize {
        self.feature_length
    }

    /// Decompose and shape a prepared signal.
    ///
    /// # Errors
    /// Returns `AudioError::FeatureExtraction` if the decomposition fails or
    /// yields non-finite coefficients.
    pub fn extract(&self, prepared: &AudioSignal) -> Result<FeatureVector, AudioError> {
        self.extract_samples(prepared.samples())
    }

    /// Same as [`extract`](Self::extract) on raw samples.
    ///
    /// # Errors
    /// See [`extract`](Self::extract).
    pub fn extract_samples(&self, samples: &[f64]) -> Result<FeatureVector, AudioError> {
        let decomposition = wavedec(samples, &self.wavelet)?;
        let details = decomposition.concat_details();
        if details.iter().any(|v| !v.is_finite()) {
            return Err(AudioError::extraction(
                "wavelet",
                "non-finite detail coefficient",
            ));
        }

        if details.len() != self.feature_length {
            log::debug!(
                "Wavelet details: {} coefficients, shaped to {}",
                details.len(),
                self.feature_length
            );
        }
        Ok(FeatureVector::with_length(details, self.feature_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_wav;
    use crate::fixtures::{tone_i16, wav_i16};
    use crate::preprocess::Preprocessor;
    use hs_core::config::{PipelineConfig, WaveletBasis};

    fn pipeline(bytes: &[u8], extractor: &FeatureExtractor) -> FeatureVector {
        let signal = decode_wav(bytes).unwrap();
        let prepared = Preprocessor::new(&PipelineConfig::default())
            .unwrap()
            .prepare(&signal)
            .unwrap();
        extractor.extract(&prepared).unwrap()
    }

    fn default_extractor() -> FeatureExtractor {
        FeatureExtractor::new(WaveletConfig::default(), 3020)
    }

    #[test]
    fn silent_recording_gives_zero_vector() {
        let bytes = wav_i16(&[0; 3000], 1, 1000);
        let features = pipeline(&bytes, &default_extractor());
        assert_eq!(features.len(), 3020);
        assert!(features.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn length_is_fixed_across_durations() {
        let extractor = default_extractor();
        for &secs in &[0.5, 1.0, 2.9, 3.0, 3.1, 5.0, 10.0] {
            let features = pipeline(&tone_i16(4000, secs), &extractor);
            assert_eq!(features.len(), 3020, "{secs}s");
            assert!(features.as_slice().iter().any(|&v| v != 0.0));
        }
    }

    #[test]
    fn model_width_wins_over_natural_width() {
        let prepared = AudioSignal::new(vec![0.5; 3000], 1000).unwrap();

        let short = FeatureExtractor::new(WaveletConfig::default(), 100);
        assert_eq!(short.extract(&prepared).unwrap().len(), 100);

        let db4 = WaveletConfig {
            basis: WaveletBasis::Db4,
            level: 5,
        };
        let extractor = FeatureExtractor::new(db4, 3020);
        assert_eq!(extractor.wavelet(), db4);
        assert_eq!(extractor.feature_length(), 3020);
        let padded = extractor.extract(&prepared).unwrap();
        assert_eq!(padded.len(), 3020);
        assert!(padded.as_slice()[2933..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn stereo_matches_channel_zero_mono() {
        let mono: Vec<i16> = (0..8000)
            .map(|i| ((f64::from(i) * 0.07).sin() * 12_000.0) as i16)
            .collect();
        let stereo: Vec<i16> = mono.iter().flat_map(|&s| [s, s / 3 + 7]).collect();

        let extractor = default_extractor();
        let a = pipeline(&wav_i16(&mono, 1, 4000), &extractor);
        let b = pipeline(&wav_i16(&stereo, 2, 4000), &extractor);
        assert_eq!(a, b);
    }

    #[test]
    fn deterministic() {
        let bytes = tone_i16(2000, 4.0);
        let extractor = default_extractor();
        assert_eq!(pipeline(&bytes, &extractor), pipeline(&bytes, &extractor));
    }
}
