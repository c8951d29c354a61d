use std::fmt;
use std::path::Path;

use hs_core::config::{PipelineConfig, WaveletConfig};
use hs_core::error::InferenceError;
use hs_core::label::ClassLabel;
use hs_core::traits::{Classifier, FeatureScaler, LabelDecoder, ProbabilisticClassifier};
use serde::{Deserialize, Serialize};

use crate::encoder::LabelEncoder;
use crate::error::ModelError;
use crate::linear::{LinearSvc, LogisticRegression};
use crate::scaler::{MinMaxScaler, StandardScaler};
use crate::tree::{DecisionTree, RandomForest};

/// Classifieur chargé, avec sa capacité probabiliste résolue une fois pour toutes.
pub enum ClassifierHandle {
    /// `predict` only.
    Plain(Box<dyn Classifier>),
    /// `predict` and `predict_proba`.
    Probabilistic(Box<dyn ProbabilisticClassifier>),
}

impl ClassifierHandle {
    /// Raw prediction.
    ///
    /// # Errors
    /// Propagates the classifier's error.
    pub fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError> {
        match self {
            Self::Plain(c) => c.predict(features),
            Self::Probabilistic(c) => c.predict(features),
        }
    }

    /// Class probabilities, `None` for a classifier without the capability.
    #[must_use]
    pub fn predict_proba(&self, features: &[f64]) -> Option<Result<Vec<f64>, InferenceError>> {
        match self {
            Self::Plain(_) => None,
            Self::Probabilistic(c) => Some(c.predict_proba(features)),
        }
    }

    #[must_use]
    pub fn has_proba(&self) -> bool {
        matches!(self, Self::Probabilistic(_))
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plain(c) => c.kind(),
            Self::Probabilistic(c) => c.kind(),
        }
    }

    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Self::Plain(c) => c.n_features(),
            Self::Probabilistic(c) => c.n_features(),
        }
    }

    /// # Errors
    /// Describes the first structural inconsistency of the classifier.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Plain(c) => c.validate(),
            Self::Probabilistic(c) => c.validate(),
        }
    }
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("kind", &self.kind())
            .field("proba", &self.has_proba())
            .finish()
    }
}

/// Modèle entraîné : classifieur, scaler et décodeur optionnels, largeur des
/// features et ondelette attendues.
///
/// Chargé une seule fois au démarrage puis partagé en lecture seule
/// (`Arc<ModelBundle>`). Aucun accès mutable après construction.
///
/// # Example
/// ```
/// use hs_classify::bundle::ModelBundle;
/// use hs_core::config::PipelineConfig;
///
/// let json = r#"{
///     "classifier": {
///         "kind": "linear_svc",
///         "classes": [0, 1],
///         "coef": [[1.0, -1.0]],
///         "intercept": [0.0]
///     },
///     "label_encoder": { "classes": ["AS", "N"] },
///     "feature_shape": 2,
///     "accuracy": 0.91
/// }"#;
/// let bundle = ModelBundle::from_json(json, &PipelineConfig::default()).unwrap();
/// assert_eq!(bundle.expected_feature_length(), 2);
/// assert!(!bundle.classifier().has_proba());
/// assert!(bundle.label_decoder().is_some());
/// ```
pub struct ModelBundle {
    classifier: ClassifierHandle,
    scaler: Option<Box<dyn FeatureScaler>>,
    label_decoder: Option<Box<dyn LabelDecoder>>,
    expected_feature_length: usize,
    wavelet: WaveletConfig,
    accuracy: Option<f64>,
}

impl ModelBundle {
    /// Bundle with the classifier alone and the default feature layout.
    #[must_use]
    pub fn new(classifier: ClassifierHandle) -> Self {
        let defaults = PipelineConfig::default();
        Self {
            classifier,
            scaler: None,
            label_decoder: None,
            expected_feature_length: defaults.default_feature_length,
            wavelet: defaults.wavelet,
            accuracy: None,
        }
    }

    #[must_use]
    pub fn with_scaler(mut self, scaler: Box<dyn FeatureScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    #[must_use]
    pub fn with_label_decoder(mut self, decoder: Box<dyn LabelDecoder>) -> Self {
        self.label_decoder = Some(decoder);
        self
    }

    #[must_use]
    pub fn with_expected_feature_length(mut self, length: usize) -> Self {
        self.expected_feature_length = length;
        self
    }

    #[must_use]
    pub fn with_wavelet(mut self, wavelet: WaveletConfig) -> Self {
        self.wavelet = wavelet;
        self
    }

    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Charge un artefact JSON depuis le disque.
    ///
    /// `defaults` fournit la largeur des features et l'ondelette quand
    /// l'artefact ne les précise pas.
    ///
    /// # Errors
    /// Returns `ModelError::Load` if the file is unreadable, not valid JSON,
    /// or describes an inconsistent model.
    pub fn load(path: &Path, defaults: &PipelineConfig) -> Result<Self, ModelError> {
        let name = path.display().to_string();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelError::load(&name, &e))?;
        Self::parse(&json, &name, defaults)
    }

    /// Same as [`load`](Self::load) from an in-memory JSON document.
    ///
    /// # Errors
    /// See [`load`](Self::load).
    pub fn from_json(json: &str, defaults: &PipelineConfig) -> Result<Self, ModelError> {
        Self::parse(json, "<json>", defaults)
    }

    fn parse(json: &str, name: &str, defaults: &PipelineConfig) -> Result<Self, ModelError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ModelError::load(name, &e))?;

        // Bundle object or bare classifier
        let file = if value.get("classifier").is_some() {
            serde_json::from_value::<BundleFile>(value)
                .map_err(|e| ModelError::load(name, &e))?
        } else {
            let classifier = serde_json::from_value::<ClassifierSpec>(value)
                .map_err(|e| ModelError::load(name, &e))?;
            BundleFile::bare(classifier)
        };

        let bundle = file
            .resolve(defaults)
            .map_err(|reason| ModelError::load(name, &reason))?;
        bundle
            .check()
            .map_err(|reason| ModelError::load(name, &reason))?;

        match bundle.accuracy {
            Some(acc) => log::info!("Modèle chargé depuis {name} (accuracy : {acc})"),
            None => log::info!("Modèle chargé depuis {name} (accuracy : N/A)"),
        }
        log::debug!("{}", bundle.summary());
        Ok(bundle)
    }

    /// Consistency of every part and width agreement between the declared
    /// length, the scaler and the classifier.
    ///
    /// Run on every loaded artifact; a bundle assembled with the builders is
    /// checked by `ClassificationService::new`.
    ///
    /// # Errors
    /// Describes the first inconsistency.
    pub fn check(&self) -> Result<(), String> {
        self.classifier
            .validate()
            .map_err(|e| format!("classifieur : {e}"))?;
        if let Some(scaler) = &self.scaler {
            scaler.validate().map_err(|e| format!("scaler : {e}"))?;
        }

        let expected = self.expected_feature_length;
        if expected == 0 {
            return Err("largeur de features nulle".into());
        }
        if let Some(scaler) = &self.scaler
            && scaler.n_features() != expected
        {
            return Err(format!(
                "scaler ajusté sur {} features, {expected} attendues",
                scaler.n_features()
            ));
        }
        if let Some(n) = self.classifier.n_features()
            && n != expected
        {
            return Err(format!(
                "classifieur ajusté sur {n} features, {expected} attendues"
            ));
        }
        if self.wavelet.level == 0 {
            return Err("ondelette : level doit être > 0".into());
        }
        Ok(())
    }

    #[must_use]
    pub fn classifier(&self) -> &ClassifierHandle {
        &self.classifier
    }

    #[must_use]
    pub fn scaler(&self) -> Option<&dyn FeatureScaler> {
        self.scaler.as_deref()
    }

    #[must_use]
    pub fn label_decoder(&self) -> Option<&dyn LabelDecoder> {
        self.label_decoder.as_deref()
    }

    /// Width of the vectors the classifier consumes.
    #[must_use]
    pub fn expected_feature_length(&self) -> usize {
        self.expected_feature_length
    }

    /// Wavelet basis and level the features must be extracted with.
    #[must_use]
    pub fn wavelet(&self) -> WaveletConfig {
        self.wavelet
    }

    /// Training accuracy recorded in the artifact.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// Serializable description for `inspect`.
    #[must_use]
    pub fn summary(&self) -> BundleSummary {
        BundleSummary {
            classifier: self.classifier.kind(),
            predict_proba: self.classifier.has_proba(),
            scaler: self.scaler.as_ref().map(|s| s.kind()),
            classes: self.label_decoder.as_ref().map(|d| d.classes().to_vec()),
            expected_feature_length: self.expected_feature_length,
            wavelet: self.wavelet,
            accuracy: self.accuracy,
        }
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("summary", &self.summary())
            .finish()
    }
}

/// What a loaded bundle can do.
///
/// Sortie de `heartsound inspect`, en texte (`Display`) ou en JSON.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BundleSummary {
    /// Classifier kind (`random_forest`, `linear_svc`...).
    pub classifier: &'static str,
    /// Whether a confidence can be reported.
    pub predict_proba: bool,
    /// Scaler kind, if any.
    pub scaler: Option<&'static str>,
    /// Class codes of the label decoder, if any.
    pub classes: Option<Vec<String>>,
    /// Largeur attendue par le classifieur.
    pub expected_feature_length: usize,
    /// Basis and level used to extract features for this model.
    pub wavelet: WaveletConfig,
    /// Training accuracy recorded in the artifact.
    pub accuracy: Option<f64>,
}

impl fmt::Display for BundleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classifieur     : {}", self.classifier)?;
        writeln!(f, "predict_proba   : {}", self.predict_proba)?;
        writeln!(f, "Scaler          : {}", self.scaler.unwrap_or("aucun"))?;
        match &self.classes {
            Some(classes) => writeln!(f, "Label encoder   : {}", classes.join(", "))?,
            None => writeln!(f, "Label encoder   : aucun")?,
        }
        writeln!(f, "Features        : {}", self.expected_feature_length)?;
        writeln!(
            f,
            "Ondelette       : {} (niveau {})",
            self.wavelet.basis, self.wavelet.level
        )?;
        match self.accuracy {
            Some(acc) => write!(f, "Accuracy        : {acc}"),
            None => write!(f, "Accuracy        : N/A"),
        }
    }
}

/// Artefact sous forme de dictionnaire de composants.
#[derive(Deserialize)]
struct BundleFile {
    classifier: ClassifierSpec,
    #[serde(default)]
    scaler: Option<ScalerSpec>,
    #[serde(default)]
    label_encoder: Option<LabelEncoder>,
    #[serde(default)]
    feature_shape: Option<usize>,
    #[serde(default)]
    accuracy: Option<f64>,
    #[serde(default)]
    wavelet: Option<WaveletConfig>,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ClassifierSpec {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
    LogisticRegression(LogisticRegression),
    LinearSvc(LinearSvc),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScalerSpec {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl BundleFile {
    fn bare(classifier: ClassifierSpec) -> Self {
        Self {
            classifier,
            scaler: None,
            label_encoder: None,
            feature_shape: None,
            accuracy: None,
            wavelet: None,
        }
    }

    fn resolve(self, defaults: &PipelineConfig) -> Result<ModelBundle, String> {
        if let Some(encoder) = &self.label_encoder {
            encoder.validate()?;
        }
        let n_decoded = self.label_encoder.as_ref().map(|e| e.classes().len());
        let classifier = self.classifier.into_handle(n_decoded)?;

        let scaler: Option<Box<dyn FeatureScaler>> = match self.scaler {
            Some(ScalerSpec::Standard(s)) => Some(Box::new(s)),
            Some(ScalerSpec::MinMax(s)) => Some(Box::new(s)),
            None => None,
        };

        Ok(ModelBundle {
            classifier,
            scaler,
            label_decoder: self
                .label_encoder
                .map(|e| Box::new(e) as Box<dyn LabelDecoder>),
            // 0 vaut absence, comme une forme vide
            expected_feature_length: self
                .feature_shape
                .filter(|&n| n > 0)
                .unwrap_or(defaults.default_feature_length),
            wavelet: self.wavelet.unwrap_or(defaults.wavelet),
            accuracy: self.accuracy,
        })
    }
}

impl ClassifierSpec {
    fn classes(&self) -> &[ClassLabel] {
        match self {
            Self::RandomForest(c) => c.classes(),
            Self::DecisionTree(c) => c.classes(),
            Self::LogisticRegression(c) => c.classes(),
            Self::LinearSvc(c) => c.classes(),
        }
    }

    /// Wrap; `n_decoded` is the label encoder's class count. Structure is
    /// validated afterwards by `ModelBundle::check`.
    fn into_handle(self, n_decoded: Option<usize>) -> Result<ClassifierHandle, String> {
        // With an encoder, every class the model can emit must decode
        if let Some(n) = n_decoded {
            for class in self.classes() {
                let decodable = match class {
                    ClassLabel::Index(i) => usize::try_from(*i).is_ok_and(|i| i < n),
                    ClassLabel::Name(_) => false,
                };
                if !decodable {
                    return Err(format!(
                        "classe {class} non décodable par le label_encoder ({n} classes)"
                    ));
                }
            }
        }

        Ok(match self {
            Self::RandomForest(c) => ClassifierHandle::Probabilistic(Box::new(c)),
            Self::DecisionTree(c) => ClassifierHandle::Probabilistic(Box::new(c)),
            Self::LogisticRegression(c) => ClassifierHandle::Probabilistic(Box::new(c)),
            Self::LinearSvc(c) => ClassifierHandle::Plain(Box::new(c)),
        })
    }
}
