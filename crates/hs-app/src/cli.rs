use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// heartsound : classification de sons cardiaques (phonocardiogrammes).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier de configuration TOML. Défaut : config/heartsound.toml.
    #[arg(short, long, default_value = "config/heartsound.toml", global = true)]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace. `RUST_LOG` est prioritaire.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classifier un ou plusieurs enregistrements WAV.
    Classify {
        /// Fichiers WAV (traités en parallèle).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Artefact du modèle (JSON). Défaut : `[model] path` de la config.
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Une ligne JSON par fichier au lieu du texte.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Extraire le vecteur de features d'un enregistrement.
    Features {
        /// Fichier WAV.
        file: PathBuf,

        /// Écrire le JSON dans ce fichier plutôt que sur stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Prendre l'ondelette et la largeur de ce modèle plutôt que de la config.
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Afficher les capacités du modèle chargé.
    Inspect {
        /// Artefact du modèle (JSON). Défaut : `[model] path` de la config.
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Sortie JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
