use hs_core::error::InferenceError;
use hs_core::label::ClassLabel;
use hs_core::traits::LabelDecoder;
use serde::Deserialize;

/// Décode un indice de classe vers son code (`0 → "AS"`, ...).
///
/// # Example
/// ```
/// use hs_classify::encoder::LabelEncoder;
/// use hs_core::label::ClassLabel;
/// use hs_core::traits::LabelDecoder;
///
/// let encoder = LabelEncoder::new(vec!["AS".into(), "MR".into(), "N".into()]);
/// assert_eq!(encoder.decode(&ClassLabel::Index(2)).unwrap(), "N");
/// assert!(encoder.decode(&ClassLabel::Index(3)).is_err());
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    #[must_use]
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// # Errors
    /// Rejects an empty or duplicated class list.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("label_encoder sans classe".into());
        }
        for (i, c) in self.classes.iter().enumerate() {
            if self.classes[..i].contains(c) {
                return Err(format!("label_encoder : classe dupliquée {c}"));
            }
        }
        Ok(())
    }
}

impl LabelDecoder for LabelEncoder {
    fn decode(&self, raw: &ClassLabel) -> Result<String, InferenceError> {
        match raw {
            ClassLabel::Index(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| self.classes.get(i))
                .cloned()
                .ok_or_else(|| InferenceError::UnknownClass(raw.to_string())),
            // Encoders map indices only, as at training time
            ClassLabel::Name(_) => Err(InferenceError::UnknownClass(raw.to_string())),
        }
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }
}
