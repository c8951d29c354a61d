use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use hs_audio::decode::decode_file;
use hs_audio::{FeatureExtractor, Preprocessor};
use hs_classify::{ClassificationService, ClassifyError, ModelBundle};
use hs_core::config::PipelineConfig;
use hs_core::label::ClassificationResult;
use rayon::prelude::*;

/// Charge le modèle une seule fois. Échec fatal : pas de classification sans modèle.
///
/// # Errors
/// Returns an error if the artifact cannot be loaded.
pub fn load_bundle(model: Option<&Path>, config: &PipelineConfig) -> Result<Arc<ModelBundle>> {
    let path = model.unwrap_or(config.model_path.as_path());
    let bundle = ModelBundle::load(path, config)
        .with_context(|| format!("Modèle inutilisable : {}", path.display()))?;
    Ok(Arc::new(bundle))
}

/// Classify every file in parallel, keeping input order.
pub fn classify_all(
    service: &ClassificationService,
    files: &[PathBuf],
) -> Vec<(PathBuf, Result<ClassificationResult, ClassifyError>)> {
    files
        .par_iter()
        .map(|file| (file.clone(), service.classify_file(file)))
        .collect()
}

/// `heartsound classify`.
///
/// # Errors
/// Returns an error if the model cannot be loaded, or if at least one file
/// could not be classified (after reporting every file).
pub fn classify(
    files: &[PathBuf],
    model: Option<&Path>,
    json: bool,
    config: &PipelineConfig,
) -> Result<()> {
    let bundle = load_bundle(model, config)?;
    let service = ClassificationService::new(bundle, config)?;

    let mut failed = 0usize;
    for (file, outcome) in classify_all(&service, files) {
        match outcome {
            Ok(result) => {
                if json {
                    println!("{}", report_json(&file, &result));
                } else {
                    println!("{}: {result}", file.display());
                }
            }
            Err(e) => {
                failed += 1;
                log::warn!("{} : {e}", file.display());
                if json {
                    let report = serde_json::json!({
                        "file": file.display().to_string(),
                        "error": e.to_string(),
                    });
                    println!("{report}");
                }
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed}/{} fichier(s) non classifié(s)", files.len());
    }
    Ok(())
}

fn report_json(file: &Path, result: &ClassificationResult) -> serde_json::Value {
    serde_json::json!({
        "file": file.display().to_string(),
        "label": result.label,
        "description": result.description(),
        "confidence": result.confidence,
    })
}

/// `heartsound features`.
///
/// # Errors
/// Returns an error if decoding, extraction, the model or the output file fails.
pub fn features(
    file: &Path,
    out: Option<&Path>,
    model: Option<&Path>,
    config: &PipelineConfig,
) -> Result<()> {
    let signal = decode_file(file)?;

    let vector = if let Some(model) = model {
        let service = ClassificationService::new(load_bundle(Some(model), config)?, config)?;
        service.features(&signal)?
    } else {
        let prepared = Preprocessor::new(config)?.prepare(&signal)?;
        let extractor = FeatureExtractor::new(config.wavelet, config.default_feature_length);
        extractor.extract(&prepared)?
    };
    log::info!(
        "{} : {} features ({} s @ {} Hz)",
        file.display(),
        vector.len(),
        signal.duration_secs(),
        signal.sample_rate()
    );

    let json = serde_json::to_string(&vector)?;
    match out {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// `heartsound inspect`.
///
/// # Errors
/// Returns an error if the model cannot be loaded.
pub fn inspect(model: Option<&Path>, json: bool, config: &PipelineConfig) -> Result<()> {
    let bundle = load_bundle(model, config)?;
    let summary = bundle.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
