use hs_core::error::InferenceError;
use hs_core::traits::FeatureScaler;
use serde::Deserialize;

use crate::score::check_width;

/// `(x - mean) / scale`, par feature.
///
/// A zero scale (constant feature at fit time) is treated as 1.
///
/// # Example
/// ```
/// use hs_classify::scaler::StandardScaler;
/// use hs_core::traits::FeatureScaler;
///
/// let scaler = StandardScaler::new(vec![1.0, 0.0], vec![2.0, 0.0]);
/// assert_eq!(scaler.transform(&[3.0, 5.0]).unwrap(), vec![1.0, 5.0]);
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    #[must_use]
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.mean.len(), features)?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect())
    }

    fn kind(&self) -> &'static str {
        "standard"
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn validate(&self) -> Result<(), String> {
        validate_pair(&self.mean, &self.scale, "mean", "scale")
    }
}

/// `x * scale + min`, par feature (ramène l'intervalle d'entraînement sur la cible).
#[derive(Clone, Debug, Deserialize)]
pub struct MinMaxScaler {
    scale: Vec<f64>,
    min: Vec<f64>,
}

impl MinMaxScaler {
    #[must_use]
    pub fn new(scale: Vec<f64>, min: Vec<f64>) -> Self {
        Self { scale, min }
    }
}

impl FeatureScaler for MinMaxScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(self.scale.len(), features)?;
        Ok(features
            .iter()
            .zip(self.scale.iter().zip(&self.min))
            .map(|(x, (s, m))| x * s + m)
            .collect())
    }

    fn kind(&self) -> &'static str {
        "min_max"
    }

    fn n_features(&self) -> usize {
        self.scale.len()
    }

    fn validate(&self) -> Result<(), String> {
        validate_pair(&self.scale, &self.min, "scale", "min")
    }
}

fn validate_pair(a: &[f64], b: &[f64], a_name: &str, b_name: &str) -> Result<(), String> {
    if a.is_empty() {
        return Err(format!("{a_name} vide"));
    }
    if a.len() != b.len() {
        return Err(format!(
            "{a_name} ({}) et {b_name} ({}) de tailles différentes",
            a.len(),
            b.len()
        ));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(format!("valeur non finie dans {a_name}/{b_name}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scaler_standardizes() {
        let scaler = StandardScaler::new(vec![0.5, -1.0, 2.0], vec![0.25, 2.0, 1.0]);
        scaler.validate().unwrap();
        let out = scaler.transform(&[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(out, vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn min_max_maps_range() {
        // fitted on [2, 6] -> [0, 1]: scale 0.25, min -0.5
        let scaler = MinMaxScaler::new(vec![0.25], vec![-0.5]);
        assert_eq!(scaler.transform(&[2.0]).unwrap(), vec![0.0]);
        assert_eq!(scaler.transform(&[6.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn width_and_shape_checks() {
        let scaler = StandardScaler::new(vec![0.0; 4], vec![1.0; 4]);
        assert_eq!(scaler.n_features(), 4);
        assert!(scaler.transform(&[0.0; 3]).is_err());
        let short_scale = StandardScaler::new(vec![0.0; 2], vec![1.0]);
        assert!(short_scale.validate().is_err());
        let nan_scale = MinMaxScaler::new(vec![f64::NAN], vec![0.0]);
        assert!(nan_scale.validate().is_err());
    }

    #[test]
    fn input_is_not_modified() {
        let scaler = StandardScaler::new(vec![1.0], vec![2.0]);
        let features = [5.0];
        let _ = scaler.transform(&features).unwrap();
        assert_eq!(features, [5.0]);
    }
}
