use hs_core::error::InferenceError;
use hs_core::label::ClassLabel;

/// Reject inputs whose width differs from the fitted width.
pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(InferenceError::FeatureLength {
            expected,
            actual: features.len(),
        })
    }
}

/// Index of the largest value; the first one wins on ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Class at the arg-max of `scores`.
pub(crate) fn pick(
    classes: &[ClassLabel],
    scores: &[f64],
    stage: &'static str,
) -> Result<ClassLabel, InferenceError> {
    if scores.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::NonFinite(stage));
    }
    classes
        .get(argmax(scores))
        .cloned()
        .ok_or_else(|| InferenceError::UnknownClass(stage.to_string()))
}

/// Shared sanity checks for a fitted model's class list.
pub(crate) fn check_classes(classes: &[ClassLabel]) -> Result<(), String> {
    if classes.is_empty() {
        return Err("liste de classes vide".into());
    }
    for (i, c) in classes.iter().enumerate() {
        if classes[..i].contains(c) {
            return Err(format!("classe dupliquée : {c}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_first_wins() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[1.0]), 0);
    }

    #[test]
    fn pick_rejects_nan() {
        let classes = [ClassLabel::Index(0), ClassLabel::Index(1)];
        assert_eq!(
            pick(&classes, &[f64::NAN, 0.0], "test"),
            Err(InferenceError::NonFinite("test"))
        );
        assert_eq!(
            pick(&classes, &[0.1, 0.9], "test"),
            Ok(ClassLabel::Index(1))
        );
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let classes = [ClassLabel::Name("N".into()), ClassLabel::Name("N".into())];
        assert!(check_classes(&classes).is_err());
        assert!(check_classes(&[]).is_err());
    }
}
