use std::path::Path;
use std::sync::Arc;

use hs_audio::decode::{decode_file, decode_wav};
use hs_audio::{FeatureExtractor, Preprocessor};
use hs_core::config::PipelineConfig;
use hs_core::error::InferenceError;
use hs_core::label::ClassificationResult;
use hs_core::signal::{AudioSignal, FeatureVector};

use crate::bundle::ModelBundle;
use crate::error::{ClassifyError, ModelError};

/// Orchestre décodage → prétraitement → features → inférence.
///
/// Holds the shared read-only model and the filter designed at construction.
/// Calls are independent: a failed call leaves nothing behind and the service
/// can be reused (or shared across threads) for the next input.
pub struct ClassificationService {
    bundle: Arc<ModelBundle>,
    preprocessor: Preprocessor,
    extractor: FeatureExtractor,
}

impl ClassificationService {
    /// Features are extracted with the bundle's wavelet and width; the rest of
    /// the preprocessing comes from `config`.
    ///
    /// # Errors
    /// Returns `ClassifyError::Model` if the bundle is inconsistent (bad tree
    /// nodes, widths that disagree...), or `ClassifyError::Audio` if the
    /// configured filter cannot be designed.
    pub fn new(bundle: Arc<ModelBundle>, config: &PipelineConfig) -> Result<Self, ClassifyError> {
        bundle
            .check()
            .map_err(|reason| ModelError::load("<bundle>", &reason))?;
        let preprocessor = Preprocessor::new(config)?;
        let extractor = FeatureExtractor::new(bundle.wavelet(), bundle.expected_feature_length());
        Ok(Self {
            bundle,
            preprocessor,
            extractor,
        })
    }

    #[must_use]
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Classify a WAV file.
    ///
    /// # Errors
    /// Returns the first stage failure; see [`ClassifyError`].
    pub fn classify_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ClassificationResult, ClassifyError> {
        let signal = decode_file(path)?;
        self.classify_signal(&signal)
    }

    /// Classify in-memory WAV bytes.
    ///
    /// # Errors
    /// Returns the first stage failure; see [`ClassifyError`].
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<ClassificationResult, ClassifyError> {
        let signal = decode_wav(bytes)?;
        self.classify_signal(&signal)
    }

    /// Classify a decoded signal at any sample rate.
    ///
    /// # Errors
    /// Returns the first stage failure; see [`ClassifyError`].
    pub fn classify_signal(
        &self,
        signal: &AudioSignal,
    ) -> Result<ClassificationResult, ClassifyError> {
        let features = self.features(signal)?;
        self.classify_features(&features)
    }

    /// Feature vector exactly as the classifier will see it (before scaling).
    ///
    /// # Errors
    /// Returns `ClassifyError::Audio` if resampling, filtering or the
    /// decomposition fails.
    pub fn features(&self, signal: &AudioSignal) -> Result<FeatureVector, ClassifyError> {
        let prepared = self.preprocessor.prepare(signal)?;
        let features = self.extractor.extract(&prepared)?;
        log::debug!(
            "{} samples @ {}Hz -> {} features",
            signal.len(),
            signal.sample_rate(),
            features.len()
        );
        Ok(features)
    }

    /// Scale, predict, decode, and attach the confidence when available.
    ///
    /// # Errors
    /// Returns `ClassifyError::Classification` if the width is wrong or the
    /// scaler, classifier or label decoder fails.
    pub fn classify_features(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassificationResult, ClassifyError> {
        let expected = self.bundle.expected_feature_length();
        if features.len() != expected {
            return Err(InferenceError::FeatureLength {
                expected,
                actual: features.len(),
            }
            .into());
        }

        let scaled;
        let input = match self.bundle.scaler() {
            Some(scaler) => {
                scaled = scaler.transform(features.as_slice())?;
                scaled.as_slice()
            }
            None => features.as_slice(),
        };

        let classifier = self.bundle.classifier();
        let raw = classifier.predict(input)?;
        let label = match self.bundle.label_decoder() {
            Some(decoder) => decoder.decode(&raw)?,
            None => raw.to_string(),
        };

        let confidence = match classifier.predict_proba(input) {
            Some(proba) => {
                let proba = proba?;
                let max = proba.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if !max.is_finite() {
                    return Err(InferenceError::NonFinite("predict_proba").into());
                }
                Some(max * 100.0)
            }
            None => None,
        };

        let result = ClassificationResult::new(label, confidence);
        log::debug!("Prediction: {raw} -> {result}");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::ClassifierHandle;
    use crate::encoder::LabelEncoder;
    use crate::scaler::StandardScaler;
    use crate::tree::{RandomForest, TreeNodes};
    use hs_audio::AudioError;
    use hs_core::label::ClassLabel;
    use hs_core::traits::{Classifier, ProbabilisticClassifier};
    use std::io::Cursor;

    /// Always predicts the same class; probabilities put 0.8 on it.
    struct Fixed(ClassLabel);

    impl Classifier for Fixed {
        fn predict(&self, _features: &[f64]) -> Result<ClassLabel, InferenceError> {
            Ok(self.0.clone())
        }
        fn kind(&self) -> &'static str {
            "fixed"
        }
        fn n_features(&self) -> Option<usize> {
            None
        }
    }

    impl ProbabilisticClassifier for Fixed {
        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![0.1, 0.8, 0.1])
        }
    }

    fn service(bundle: ModelBundle) -> ClassificationService {
        let config = PipelineConfig::default();
        let bundle = Arc::new(bundle);
        ClassificationService::new(bundle, &config).unwrap()
    }

    fn plain(label: ClassLabel) -> ModelBundle {
        ModelBundle::new(ClassifierHandle::Plain(Box::new(Fixed(label))))
    }

    fn probabilistic(label: ClassLabel) -> ModelBundle {
        ModelBundle::new(ClassifierHandle::Probabilistic(Box::new(Fixed(label))))
    }

    fn zeros() -> FeatureVector {
        FeatureVector::with_length(vec![], 3020)
    }

    fn normal() -> ClassLabel {
        ClassLabel::Name("N".into())
    }

    fn wav(samples: &[i16], channels: u16, sample_rate: u32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes
    }

    fn murmur(sample_rate: u32, secs: f64) -> Vec<i16> {
        let n = (f64::from(sample_rate) * secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(sample_rate);
                ((2.0 * std::f64::consts::PI * 90.0 * t).sin() * 9000.0) as i16
            })
            .collect()
    }

    #[test]
    fn plain_classifier_has_no_confidence() {
        let svc = service(plain(normal()));
        let result = svc.classify_features(&zeros()).unwrap();
        assert_eq!(result.label, "N");
        assert_eq!(result.confidence, None);
    }

    #[test]
    fn probabilistic_classifier_reports_max_probability() {
        let svc = service(probabilistic(normal()));
        let result = svc.classify_features(&zeros()).unwrap();
        assert_eq!(result.label, "N");
        assert!((result.confidence.unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn raw_index_without_decoder_is_shown_as_is() {
        let svc = service(plain(ClassLabel::Index(3)));
        let result = svc.classify_features(&zeros()).unwrap();
        assert_eq!(result.label, "3");
    }

    #[test]
    fn decoder_maps_index_to_code() {
        let codes = ["AS", "MR", "MS", "MVP", "N"].map(String::from).to_vec();
        let bundle = plain(ClassLabel::Index(3))
            .with_label_decoder(Box::new(LabelEncoder::new(codes)));
        let result = service(bundle).classify_features(&zeros()).unwrap();
        assert_eq!(result.label, "MVP");
        assert_eq!(result.description(), "Mitral Valve Prolapse");
    }

    #[test]
    fn inference_failures_are_classification_errors() {
        let undecodable = plain(ClassLabel::Index(9))
            .with_label_decoder(Box::new(LabelEncoder::new(vec!["N".into()])));
        let svc = service(undecodable);
        let err = svc.classify_features(&zeros()).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Classification(InferenceError::UnknownClass(_))
        ));

        let svc = service(plain(normal()));
        let narrow = FeatureVector::with_length(vec![], 10);
        assert!(matches!(
            svc.classify_features(&narrow),
            Err(ClassifyError::Classification(InferenceError::FeatureLength {
                expected: 3020,
                actual: 10
            }))
        ));
    }

    #[test]
    fn builder_bundles_are_checked_before_use() {
        let config = PipelineConfig::default();

        let mut dangling = TreeNodes {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.0, -2.0, -2.0],
            value: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        dangling.children_left[0] = 7;
        let forest = RandomForest::new(
            vec![ClassLabel::Name("AS".into()), normal()],
            3020,
            vec![dangling],
        );
        let bundle = ModelBundle::new(ClassifierHandle::Probabilistic(Box::new(forest)));
        let err = ClassificationService::new(Arc::new(bundle), &config)
            .err()
            .unwrap();
        assert!(matches!(err, ClassifyError::Model(_)));
        assert!(err.to_string().contains("enfant"), "{err}");

        let scaler = StandardScaler::new(vec![0.0; 10], vec![1.0; 10]);
        let narrow_scaler = plain(normal()).with_scaler(Box::new(scaler));
        assert!(matches!(
            ClassificationService::new(Arc::new(narrow_scaler), &config),
            Err(ClassifyError::Model(_))
        ));
    }

    #[test]
    fn audio_failures_keep_their_kind() {
        let svc = service(plain(normal()));
        assert!(matches!(
            svc.classify_bytes(b"RIFF garbage"),
            Err(ClassifyError::Audio(AudioError::Decode(_)))
        ));
        assert!(matches!(
            svc.classify_bytes(&wav(&[100; 8], 1, 1000)),
            Err(ClassifyError::Audio(AudioError::FeatureExtraction { .. }))
        ));
        // Service still usable after failures
        let clean = wav(&murmur(2000, 3.0), 1, 2000);
        assert!(svc.classify_bytes(&clean).is_ok());
    }

    #[test]
    fn end_to_end_with_a_forest_artifact() {
        // Root split on the first detail coefficient of cD5: <= 0 -> index 4 (N)
        let json = r#"{
            "classifier": {
                "kind": "random_forest",
                "classes": [0, 1, 2, 3, 4],
                "n_features": 3020,
                "estimators": [{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -2, -2],
                    "threshold": [0.0, -2.0, -2.0],
                    "value": [[1, 1, 1, 1, 1], [0, 0, 0, 1, 3], [2, 0, 0, 0, 0]]
                }]
            },
            "label_encoder": {"classes": ["AS", "MR", "MS", "MVP", "N"]},
            "feature_shape": 3020,
            "accuracy": 0.9
        }"#;
        let config = PipelineConfig::default();
        let svc = service(ModelBundle::from_json(json, &config).unwrap());

        let silent = wav(&[0; 3000], 1, 1000);
        let result = svc.classify_bytes(&silent).unwrap();
        assert_eq!(result.label, "N");
        assert!((result.confidence.unwrap() - 75.0).abs() < 1e-9);
        assert_eq!(result.to_string(), "Normal (N) [confidence: 75.0%]");

        // Repeated runs are identical
        let bytes = wav(&murmur(4000, 5.0), 1, 4000);
        let a = svc.classify_bytes(&bytes).unwrap();
        let b = svc.classify_bytes(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stereo_and_channel_zero_classify_alike() {
        let mono = murmur(2000, 4.0);
        let stereo: Vec<i16> = mono.iter().flat_map(|&s| [s, -s / 2]).collect();
        let svc = service(plain(normal()));

        let signal_mono = decode_wav(&wav(&mono, 1, 2000)).unwrap();
        let signal_stereo = decode_wav(&wav(&stereo, 2, 2000)).unwrap();
        assert_eq!(
            svc.features(&signal_mono).unwrap(),
            svc.features(&signal_stereo).unwrap()
        );
    }

    #[test]
    fn shared_across_threads() {
        let svc = Arc::new(service(probabilistic(normal())));
        let bytes = Arc::new(wav(&murmur(1000, 2.0), 1, 1000));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let svc = Arc::clone(&svc);
                let bytes = Arc::clone(&bytes);
                std::thread::spawn(move || svc.classify_bytes(&bytes).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().label, "N");
        }
    }
}
