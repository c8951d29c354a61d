use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Les cinq classes du jeu de données PCG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeartCondition {
    /// `AS`
    AorticStenosis,
    /// `MR`
    MitralRegurgitation,
    /// `MS`
    MitralStenosis,
    /// `MVP`
    MitralValveProlapse,
    /// `N`
    Normal,
}

impl HeartCondition {
    /// Every class, in code order.
    pub const ALL: [Self; 5] = [
        Self::AorticStenosis,
        Self::MitralRegurgitation,
        Self::MitralStenosis,
        Self::MitralValveProlapse,
        Self::Normal,
    ];

    /// Short class code as found in the training labels.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::AorticStenosis => "AS",
            Self::MitralRegurgitation => "MR",
            Self::MitralStenosis => "MS",
            Self::MitralValveProlapse => "MVP",
            Self::Normal => "N",
        }
    }

    /// Human-readable diagnosis.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::AorticStenosis => "Aortic Stenosis",
            Self::MitralRegurgitation => "Mitral Regurgitation",
            Self::MitralStenosis => "Mitral Stenosis",
            Self::MitralValveProlapse => "Mitral Valve Prolapse",
            Self::Normal => "Normal",
        }
    }
}

impl FromStr for HeartCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("unknown class code: {s}"))
    }
}

impl fmt::Display for HeartCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw classifier output: a class index (label-encoded training) or a class name.
///
/// # Example
/// ```
/// use hs_core::label::ClassLabel;
/// assert_eq!(ClassLabel::Index(4).to_string(), "4");
/// assert_eq!(ClassLabel::Name("N".into()).to_string(), "N");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ClassLabel {
    /// Encoded class index.
    Index(i64),
    /// Class name.
    Name(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

/// Résultat d'une classification, construit par requête.
///
/// # Example
/// ```
/// use hs_core::label::{ClassificationResult, HeartCondition};
/// let r = ClassificationResult::new("MVP", Some(87.5));
/// assert_eq!(r.condition(), Some(HeartCondition::MitralValveProlapse));
/// assert_eq!(r.description(), "Mitral Valve Prolapse");
/// assert!(!r.is_normal());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Class code as produced by the model (decoded when a decoder exists).
    pub label: String,
    /// Max class probability in percent, when the classifier exposes one.
    pub confidence: Option<f64>,
}

impl ClassificationResult {
    /// Builds a result; confidence is clamped to [0, 100].
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.map(|c| c.clamp(0.0, 100.0)),
        }
    }

    /// Known condition for this label, if it is one of the five codes.
    #[must_use]
    pub fn condition(&self) -> Option<HeartCondition> {
        self.label.parse().ok()
    }

    /// Description de la classe, ou le label brut s'il est inconnu.
    #[must_use]
    pub fn description(&self) -> &str {
        match self.condition() {
            Some(c) => c.description(),
            None => &self.label,
        }
    }

    /// `true` when the label is the normal class.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.condition() == Some(HeartCondition::Normal)
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.label)?;
        if let Some(c) = self.confidence {
            write!(f, " [confidence: {c:.1}%]")?;
        }
        Ok(())
    }
}
