use anyhow::Result;
use clap::Parser;
use hs_core::config::PipelineConfig;

pub mod cli;
pub mod commands;

use cli::Command;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging (RUST_LOG prioritaire sur --log-level)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    // 3. Charger la config
    let config = resolve_config(&cli)?;

    // 4. Exécuter la commande
    match &cli.command {
        Command::Classify { files, model, json } => {
            commands::classify(files, model.as_deref(), *json, &config)
        }
        Command::Features { file, out, model } => {
            commands::features(file, out.as_deref(), model.as_deref(), &config)
        }
        Command::Inspect { model, json } => commands::inspect(model.as_deref(), *json, &config),
    }
}

/// Config file if present, defaults otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<PipelineConfig> {
    if cli.config.exists() {
        hs_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(PipelineConfig::default())
    }
}
