//! Sous-commandes et options partagées

pub mod check;
pub mod fix;

use crate::BuiltinTable;
use anyhow::{bail, Context, Result};
use bio::io::fasta;
use cdsfix_core::{CodonTable, FixerConfig, GcWindowConfig};
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};

const DEFAULT_GC_MIN: f64 = 0.3;
const DEFAULT_GC_MAX: f64 = 0.7;

/// Options de détection communes à `fix` et `check`
#[derive(Args, Debug, Clone)]
pub struct DetectorArgs {
    /// Fichier de configuration (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Motif à supprimer (répétable, codes IUPAC acceptés)
    #[arg(short, long)]
    pub remove: Vec<String>,

    /// Longueur de fenêtre pour les répétitions
    #[arg(long)]
    pub repeat_window: Option<usize>,

    /// Désactiver le contrôle des répétitions
    #[arg(long, conflicts_with = "repeat_window")]
    pub no_repeats: bool,

    /// Désactiver le contrôle des homopolymères
    #[arg(long)]
    pub no_homopolymers: bool,

    /// Fenêtre de contrôle du GC (en nucléotides)
    #[arg(long)]
    pub gc_window: Option<usize>,

    /// GC minimal par fenêtre (0.0-1.0, défaut 0.3)
    #[arg(long, requires = "gc_window")]
    pub gc_min: Option<f64>,

    /// GC maximal par fenêtre (0.0-1.0, défaut 0.7)
    #[arg(long, requires = "gc_window")]
    pub gc_max: Option<f64>,

    /// Table de codons personnalisée (JSON)
    #[arg(long)]
    pub codon_table: Option<PathBuf>,

    /// Table de codons intégrée
    #[arg(short, long, value_enum, default_value = "ecoli")]
    pub table: BuiltinTable,
}

impl DetectorArgs {
    /// Fusionne le fichier de configuration et les options de la ligne de commande
    pub fn fixer_config(&self) -> Result<FixerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => FixerConfig::default(),
        };

        config.forbidden_sequences.extend(self.remove.iter().cloned());
        if let Some(window) = self.repeat_window {
            config.repeat_window = Some(window);
        }
        if self.no_repeats {
            config.repeat_window = None;
        }
        if self.no_homopolymers {
            config.homopolymer_patterns.clear();
        }
        if let Some(window) = self.gc_window {
            config.gc_window = Some(GcWindowConfig {
                window,
                gc_min: self.gc_min.unwrap_or(DEFAULT_GC_MIN),
                gc_max: self.gc_max.unwrap_or(DEFAULT_GC_MAX),
            });
        }

        Ok(config)
    }

    /// Charge la table de codons demandée
    pub fn codon_table(&self) -> Result<CodonTable> {
        match &self.codon_table {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
                Ok(CodonTable::from_reader(file)?)
            }
            None => Ok(match self.table {
                BuiltinTable::Standard => CodonTable::standard(),
                BuiltinTable::Ecoli => CodonTable::escherichia_coli(),
            }),
        }
    }
}

/// Charge une configuration via le crate `config` (format déduit de l'extension)
fn load_config(path: &Path) -> Result<FixerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .with_context(|| format!("Configuration illisible: {}", path.display()))?;

    Ok(settings.try_deserialize()?)
}

/// Séquence lue en entrée
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub id: String,
    pub sequence: String,
}

/// Lit le premier enregistrement FASTA, ou une séquence brute
pub fn read_record(path: &Path) -> Result<InputRecord> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let default_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sequence".to_string());

    parse_record(&content, &default_id)
}

fn parse_record(content: &str, default_id: &str) -> Result<InputRecord> {
    let content = content.trim_start();

    let (id, raw) = if content.starts_with('>') {
        // Seul le premier enregistrement est utilisé
        let record = fasta::Reader::new(content.as_bytes())
            .records()
            .next()
            .context("Enregistrement FASTA manquant")?
            .context("FASTA invalide")?;
        let sequence = String::from_utf8_lossy(record.seq()).into_owned();
        (record.id().to_string(), sequence)
    } else {
        (default_id.to_string(), content.to_string())
    };

    let sequence: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if sequence.is_empty() {
        bail!("Aucune séquence trouvée en entrée");
    }

    Ok(InputRecord { id, sequence })
}

/// Écrit une séquence au format FASTA (`>id description`)
pub fn write_fasta(path: &Path, id: &str, description: &str, sequence: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;

    let mut writer = fasta::Writer::new(file);
    writer.write(id, Some(description), sequence.as_bytes())?;
    writer.flush()?;

    Ok(())
}
