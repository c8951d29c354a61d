use hs_core::error::InferenceError;
use hs_core::label::ClassLabel;
use hs_core::traits::{Classifier, ProbabilisticClassifier};
use serde::Deserialize;

use crate::score::{check_classes, check_width, pick};

/// Coefficients d'un modèle linéaire : une ligne par classe, ou une seule
/// ligne pour un problème binaire (score positif → seconde classe).
#[derive(Clone, Debug, Deserialize)]
pub struct LinearWeights {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LinearWeights {
    fn n_features(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    fn validate(&self, n_classes: usize) -> Result<(), String> {
        let rows = self.coef.len();
        let binary = n_classes == 2 && rows == 1;
        if !binary && rows != n_classes {
            return Err(format!(
                "{rows} lignes de coefficients pour {n_classes} classes"
            ));
        }
        if self.intercept.len() != rows {
            return Err(format!(
                "{} intercepts pour {rows} lignes de coefficients",
                self.intercept.len()
            ));
        }
        let width = self.n_features();
        if width == 0 {
            return Err("coefficients vides".into());
        }
        if self.coef.iter().any(|row| row.len() != width) {
            return Err("lignes de coefficients de tailles différentes".into());
        }
        if self
            .coef
            .iter()
            .flatten()
            .chain(&self.intercept)
            .any(|v| !v.is_finite())
        {
            return Err("coefficient non fini".into());
        }
        Ok(())
    }

    /// One decision score per row.
    fn decision(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.n_features(), x)?;
        Ok(self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| dot(row, x) + b)
            .collect())
    }

    /// Per-class scores, expanding a binary single row to `[-s, s]`.
    fn class_scores(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let scores = self.decision(x)?;
        Ok(match scores.as_slice() {
            [s] => vec![-s, *s],
            _ => scores,
        })
    }
}

/// Régression logistique multinomiale (softmax), ou binaire (sigmoïde).
///
/// # Example
/// ```
/// use hs_classify::linear::{LinearWeights, LogisticRegression};
/// use hs_core::label::ClassLabel;
/// use hs_core::traits::{Classifier, ProbabilisticClassifier};
///
/// let weights = LinearWeights { coef: vec![vec![2.0]], intercept: vec![0.0] };
/// let model = LogisticRegression::new(vec![ClassLabel::Index(0), ClassLabel::Index(1)], weights);
/// assert_eq!(model.predict(&[1.0]).unwrap(), ClassLabel::Index(1));
/// let p = model.predict_proba(&[0.0]).unwrap();
/// assert_eq!(p, vec![0.5, 0.5]);
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<ClassLabel>,
    #[serde(flatten)]
    weights: LinearWeights,
}

impl LogisticRegression {
    #[must_use]
    pub fn new(classes: Vec<ClassLabel>, weights: LinearWeights) -> Self {
        Self { classes, weights }
    }

    #[must_use]
    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError> {
        let proba = self.predict_proba(features)?;
        pick(&self.classes, &proba, "logistic_regression")
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.weights.n_features())
    }

    fn validate(&self) -> Result<(), String> {
        check_classes(&self.classes)?;
        self.weights.validate(self.classes.len())
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let scores = self.weights.decision(features)?;
        let proba = if let [s] = scores.as_slice() {
            let p = 1.0 / (1.0 + (-s).exp());
            vec![1.0 - p, p]
        } else {
            softmax(&scores)
        };
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFinite("logistic_regression"));
        }
        Ok(proba)
    }
}

/// SVM linéaire : décision par arg-max des scores, sans probabilités.
#[derive(Clone, Debug, Deserialize)]
pub struct LinearSvc {
    classes: Vec<ClassLabel>,
    #[serde(flatten)]
    weights: LinearWeights,
}

impl LinearSvc {
    #[must_use]
    pub fn new(classes: Vec<ClassLabel>, weights: LinearWeights) -> Self {
        Self { classes, weights }
    }

    #[must_use]
    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }
}

impl Classifier for LinearSvc {
    fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError> {
        let scores = self.weights.class_scores(features)?;
        pick(&self.classes, &scores, "linear_svc")
    }

    fn kind(&self) -> &'static str {
        "linear_svc"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.weights.n_features())
    }

    fn validate(&self) -> Result<(), String> {
        check_classes(&self.classes)?;
        self.weights.validate(self.classes.len())
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Max-shifted softmax.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / total).collect()
}
