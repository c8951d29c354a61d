use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Ondelette utilisée pour la décomposition DWT.
///
/// Must match the basis the model was trained with: a mismatch yields features
/// of the right shape but the wrong content, silently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveletBasis {
    /// Coiflet order 5 (30 taps).
    #[default]
    Coif5,
    /// Daubechies order 4 (8 taps).
    Db4,
    /// Daubechies order 8 (16 taps).
    Db8,
}

impl fmt::Display for WaveletBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Coif5 => "coif5",
            Self::Db4 => "db4",
            Self::Db8 => "db8",
        })
    }
}

/// Wavelet basis and decomposition depth.
///
/// # Example
/// ```
/// use hs_core::config::{WaveletBasis, WaveletConfig};
/// let w = WaveletConfig::default();
/// assert_eq!(w.basis, WaveletBasis::Coif5);
/// assert_eq!(w.level, 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WaveletConfig {
    /// Ondelette.
    #[serde(default)]
    pub basis: WaveletBasis,
    /// Nombre de niveaux de décomposition.
    #[serde(default = "default_level")]
    pub level: usize,
}

fn default_level() -> usize {
    5
}

impl Default for WaveletConfig {
    fn default() -> Self {
        Self {
            basis: WaveletBasis::Coif5,
            level: default_level(),
        }
    }
}

/// Configuration complète du pipeline de features.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut qui reproduit
/// le prétraitement utilisé à l'entraînement.
///
/// # Example
/// ```
/// use hs_core::config::PipelineConfig;
/// let config = PipelineConfig::default();
/// assert_eq!(config.target_sample_rate, 1000);
/// assert_eq!(config.target_length, 3000);
/// assert!((config.critical_frequency() - 0.04).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    // === Rééchantillonnage ===
    /// Analysis rate in Hz.
    pub target_sample_rate: u32,

    // === Filtrage ===
    /// High-pass cutoff in Hz.
    pub highpass_cutoff_hz: f64,
    /// Butterworth order.
    pub filter_order: usize,

    // === Mise en forme ===
    /// Prepared signal length in samples (3 s at 1 kHz).
    pub target_length: usize,

    // === Features ===
    /// Wavelet used when the model bundle does not name one.
    pub wavelet: WaveletConfig,
    /// Feature width used when the model bundle does not record one.
    pub default_feature_length: usize,

    // === Modèle ===
    /// Model artifact loaded at startup.
    pub model_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 1000,
            highpass_cutoff_hz: 20.0,
            filter_order: 4,
            target_length: 3000,
            wavelet: WaveletConfig::default(),
            default_feature_length: 3020,
            model_path: PathBuf::from("heart_sound_model.json"),
        }
    }
}

impl PipelineConfig {
    /// Cutoff normalized against Nyquist.
    #[must_use]
    pub fn critical_frequency(&self) -> f64 {
        self.highpass_cutoff_hz / (f64::from(self.target_sample_rate) / 2.0)
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns `CoreError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.target_sample_rate == 0 {
            return Err(CoreError::Config("target_sample_rate doit être > 0".into()));
        }
        let wn = self.critical_frequency();
        if !(wn > 0.0 && wn < 1.0) {
            return Err(CoreError::Config(format!(
                "highpass_cutoff_hz {} hors de ]0, Nyquist[",
                self.highpass_cutoff_hz
            )));
        }
        if self.filter_order == 0 {
            return Err(CoreError::Config("filter_order doit être > 0".into()));
        }
        if self.target_length == 0 {
            return Err(CoreError::Config("target_length doit être > 0".into()));
        }
        if self.wavelet.level == 0 {
            return Err(CoreError::Config("wavelet.level doit être > 0".into()));
        }
        if self.default_feature_length == 0 {
            return Err(CoreError::Config(
                "default_feature_length doit être > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    pipeline: Option<PipelineSection>,
    wavelet: Option<WaveletSection>,
    model: Option<ModelSection>,
}

/// Pipeline section, all fields optional for partial override.
#[derive(Deserialize)]
struct PipelineSection {
    target_sample_rate: Option<u32>,
    highpass_cutoff_hz: Option<f64>,
    filter_order: Option<usize>,
    target_length: Option<usize>,
    default_feature_length: Option<usize>,
}

#[derive(Deserialize)]
struct WaveletSection {
    basis: Option<WaveletBasis>,
    level: Option<usize>,
}

#[derive(Deserialize)]
struct ModelSection {
    path: Option<PathBuf>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or fails validation.
///
/// # Example
/// ```no_run
/// use hs_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/heartsound.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = PipelineConfig::default();

    if let Some(p) = file.pipeline {
        if let Some(v) = p.target_sample_rate {
            config.target_sample_rate = v;
        }
        if let Some(v) = p.highpass_cutoff_hz {
            config.highpass_cutoff_hz = v;
        }
        if let Some(v) = p.filter_order {
            config.filter_order = v;
        }
        if let Some(v) = p.target_length {
            config.target_length = v;
        }
        if let Some(v) = p.default_feature_length {
            config.default_feature_length = v;
        }
    }

    if let Some(w) = file.wavelet {
        if let Some(v) = w.basis {
            config.wavelet.basis = v;
        }
        if let Some(v) = w.level {
            config.wavelet.level = v;
        }
    }

    if let Some(m) = file.model
        && let Some(v) = m.path
    {
        config.model_path = v;
    }

    config
        .validate()
        .with_context(|| format!("Configuration rejetée : {}", path.display()))?;
    log::debug!("Configuration chargée depuis {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_toml("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let file = write_toml(
            r#"
[wavelet]
basis = "db4"

[model]
path = "models/rf.json"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.wavelet.basis, WaveletBasis::Db4);
        assert_eq!(config.wavelet.level, 5);
        assert_eq!(config.model_path, PathBuf::from("models/rf.json"));
        assert_eq!(config.target_length, 3000);
    }

    #[test]
    fn cutoff_above_nyquist_is_rejected() {
        let file = write_toml("[pipeline]\nhighpass_cutoff_hz = 600.0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn zero_level_is_rejected() {
        let config = PipelineConfig {
            wavelet: WaveletConfig {
                basis: WaveletBasis::Coif5,
                level: 0,
            },
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_basis_fails_to_parse() {
        let file = write_toml("[wavelet]\nbasis = \"haar\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/heartsound.toml");
        assert!(load_config(missing).is_err());
    }
}
