use crate::error::InferenceError;
use crate::label::ClassLabel;

/// Produit une prédiction brute à partir d'un vecteur de features.
///
/// Implémenté par : `RandomForest`, `DecisionTree`, `LogisticRegression`, `LinearSvc`.
///
/// # Example
/// ```
/// use hs_core::traits::Classifier;
/// use hs_core::label::ClassLabel;
/// use hs_core::error::InferenceError;
///
/// struct AlwaysNormal;
/// impl Classifier for AlwaysNormal {
///     fn predict(&self, _features: &[f64]) -> Result<ClassLabel, InferenceError> {
///         Ok(ClassLabel::Name("N".into()))
///     }
///     fn kind(&self) -> &'static str { "always_normal" }
///     fn n_features(&self) -> Option<usize> { None }
/// }
/// assert_eq!(AlwaysNormal.predict(&[0.0]).unwrap(), ClassLabel::Name("N".into()));
/// ```
pub trait Classifier: Send + Sync {
    /// Predict the raw class for one feature vector.
    ///
    /// # Errors
    /// Returns an error if the input width is wrong or the model is inconsistent.
    fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError>;

    /// Nom lisible du type de modèle (debug/inspect).
    fn kind(&self) -> &'static str;

    /// Input width the classifier was fitted on, when it records one.
    fn n_features(&self) -> Option<usize>;

    /// Structural consistency of the fitted parameters.
    ///
    /// # Errors
    /// Describes the first inconsistency found.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A classifier that can also report per-class probabilities.
///
/// The capability is resolved once when the bundle is loaded; callers never
/// probe for it per request.
pub trait ProbabilisticClassifier: Classifier {
    /// Class probabilities, in class order, summing to 1.
    ///
    /// # Errors
    /// Same conditions as [`Classifier::predict`].
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Transforme les features avant l'inférence (standardisation, min-max...).
///
/// # Example
/// ```
/// use hs_core::traits::FeatureScaler;
/// use hs_core::error::InferenceError;
///
/// struct Doubler;
/// impl FeatureScaler for Doubler {
///     fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
///         Ok(features.iter().map(|v| v * 2.0).collect())
///     }
///     fn kind(&self) -> &'static str { "doubler" }
///     fn n_features(&self) -> usize { 0 }
/// }
/// assert_eq!(Doubler.transform(&[1.5]).unwrap(), vec![3.0]);
/// ```
pub trait FeatureScaler: Send + Sync {
    /// Return a transformed copy; the input is left untouched.
    ///
    /// # Errors
    /// Returns an error if the input width differs from the fitted width.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Nom lisible du scaler.
    fn kind(&self) -> &'static str;

    /// Width the scaler was fitted on.
    fn n_features(&self) -> usize;

    /// # Errors
    /// Describes the first inconsistency in the fitted parameters.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Maps a raw prediction back to a class code.
pub trait LabelDecoder: Send + Sync {
    /// Decode one raw prediction.
    ///
    /// # Errors
    /// Returns `InferenceError::UnknownClass` when the prediction is out of range.
    fn decode(&self, raw: &ClassLabel) -> Result<String, InferenceError>;

    /// Known class codes, in encoded order.
    fn classes(&self) -> &[String];
}
