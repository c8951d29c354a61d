use hs_core::error::InferenceError;
use hs_core::label::ClassLabel;
use hs_core::traits::{Classifier, ProbabilisticClassifier};
use serde::Deserialize;

use crate::score::{check_classes, check_width, pick};

/// Leaf marker in `children_left` / `children_right`.
const LEAF: i64 = -1;

/// Arbre binaire en tableaux parallèles, un nœud par indice.
///
/// Internal node `i` sends `x` left when `x[feature[i]] <= threshold[i]`.
/// `value[i]` holds the per-class weights seen at node `i`; only leaves are
/// read at prediction time.
#[derive(Clone, Debug, Deserialize)]
pub struct TreeNodes {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl TreeNodes {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    pub(crate) fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("arbre vide".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("tableaux de nœuds de tailles différentes (n={n})"));
        }

        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "nœud {node} : {} poids pour {n_classes} classes",
                    self.value[node].len()
                ));
            }
            if self.is_leaf(node) {
                if self.children_right[node] != LEAF {
                    return Err(format!("feuille {node} avec un enfant droit"));
                }
                let total: f64 = self.value[node].iter().sum();
                if self.value[node].iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                    return Err(format!("feuille {node} sans poids valide"));
                }
                continue;
            }
            // Children after their parent: traversal always terminates
            for child in [self.children_left[node], self.children_right[node]] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("nœud {node} : enfant {child} invalide"));
                }
            }
            let f = self.feature[node];
            if f < 0 || f >= n_features as i64 {
                return Err(format!(
                    "nœud {node} : feature {f} hors de [0, {n_features})"
                ));
            }
            if !self.threshold[node].is_finite() {
                return Err(format!("nœud {node} : seuil non fini"));
            }
        }
        Ok(())
    }

    /// Index of the leaf reached by `x`.
    ///
    /// Indices are checked on the way down, so unvalidated nodes give an
    /// error instead of a panic. Children must come after their parent,
    /// which bounds the walk.
    fn leaf(&self, x: &[f64]) -> Result<usize, InferenceError> {
        let mut node = 0;
        loop {
            let (Some(&left), Some(&right), Some(&feature), Some(&threshold)) = (
                self.children_left.get(node),
                self.children_right.get(node),
                self.feature.get(node),
                self.threshold.get(node),
            ) else {
                return Err(malformed(node, "hors de l'arbre"));
            };
            if left == LEAF {
                return Ok(node);
            }
            let value = usize::try_from(feature)
                .ok()
                .and_then(|f| x.get(f))
                .ok_or_else(|| malformed(node, "feature hors de l'entrée"))?;
            let next = if *value <= threshold { left } else { right };
            node = match usize::try_from(next) {
                Ok(child) if child > node => child,
                _ => return Err(malformed(node, "enfant invalide")),
            };
        }
    }

    /// Normalized class distribution of the leaf reached by `x`.
    fn proba(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let leaf = self.leaf(x)?;
        let weights = self.value.get(leaf).map_or(&[][..], Vec::as_slice);
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(InferenceError::Malformed(format!(
                "feuille {leaf} sans poids valide"
            )));
        }
        Ok(weights.iter().map(|w| w / total).collect())
    }
}

fn malformed(node: usize, what: &str) -> InferenceError {
    InferenceError::Malformed(format!("nœud {node} : {what}"))
}

/// A single fitted decision tree.
#[derive(Clone, Debug, Deserialize)]
pub struct DecisionTree {
    classes: Vec<ClassLabel>,
    n_features: usize,
    tree: TreeNodes,
}

impl DecisionTree {
    #[must_use]
    pub fn new(classes: Vec<ClassLabel>, n_features: usize, tree: TreeNodes) -> Self {
        Self {
            classes,
            n_features,
            tree,
        }
    }

    #[must_use]
    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError> {
        let proba = self.predict_proba(features)?;
        pick(&self.classes, &proba, "decision_tree")
    }

    fn kind(&self) -> &'static str {
        "decision_tree"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn validate(&self) -> Result<(), String> {
        check_classes(&self.classes)?;
        self.tree.validate(self.n_features, self.classes.len())
    }
}

impl ProbabilisticClassifier for DecisionTree {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.n_features, features)?;
        self.tree.proba(features)
    }
}

/// Ensemble d'arbres ; la probabilité est la moyenne des distributions des feuilles.
///
/// # Example
/// ```
/// use hs_classify::tree::{RandomForest, TreeNodes};
/// use hs_core::label::ClassLabel;
/// use hs_core::traits::{Classifier, ProbabilisticClassifier};
///
/// // x[0] <= 0.5 -> class "N", otherwise "AS"
/// let stump = TreeNodes {
///     children_left: vec![1, -1, -1],
///     children_right: vec![2, -1, -1],
///     feature: vec![0, -2, -2],
///     threshold: vec![0.5, -2.0, -2.0],
///     value: vec![vec![5.0, 5.0], vec![0.0, 4.0], vec![5.0, 1.0]],
/// };
/// let classes = vec![ClassLabel::Name("AS".into()), ClassLabel::Name("N".into())];
/// let forest = RandomForest::new(classes, 1, vec![stump]);
/// assert!(forest.validate().is_ok());
/// assert_eq!(forest.predict(&[0.1]).unwrap(), ClassLabel::Name("N".into()));
/// assert_eq!(forest.predict_proba(&[0.9]).unwrap(), vec![5.0 / 6.0, 1.0 / 6.0]);
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct RandomForest {
    classes: Vec<ClassLabel>,
    n_features: usize,
    estimators: Vec<TreeNodes>,
}

impl RandomForest {
    #[must_use]
    pub fn new(classes: Vec<ClassLabel>, n_features: usize, estimators: Vec<TreeNodes>) -> Self {
        Self {
            classes,
            n_features,
            estimators,
        }
    }

    #[must_use]
    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &[f64]) -> Result<ClassLabel, InferenceError> {
        let proba = self.predict_proba(features)?;
        pick(&self.classes, &proba, "random_forest")
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn validate(&self) -> Result<(), String> {
        check_classes(&self.classes)?;
        if self.estimators.is_empty() {
            return Err("forêt sans arbre".into());
        }
        for (i, tree) in self.estimators.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("arbre {i} : {e}"))?;
        }
        Ok(())
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.n_features, features)?;
        let mut sum = vec![0.0; self.classes.len()];
        for tree in &self.estimators {
            for (acc, p) in sum.iter_mut().zip(tree.proba(features)?) {
                *acc += p;
            }
        }
        let n = self.estimators.len() as f64;
        Ok(sum.into_iter().map(|p| p / n).collect())
    }
}
