//! CLI pour la correction de CDS avant synthèse

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod display;

use commands::{check, fix, DetectorArgs};

#[derive(Parser)]
#[command(name = "cdsfix")]
#[command(about = "Correction de séquences codantes par codons synonymes", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Niveau de verbosité
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Corrige une CDS jusqu'à convergence
    Fix {
        /// Fichier FASTA ou séquence brute
        #[arg(short, long)]
        input: PathBuf,

        /// Fichier FASTA de sortie
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Nombre maximal d'itérations
        #[arg(short = 'n', long)]
        max_iterations: Option<usize>,

        #[command(flatten)]
        detectors: DetectorArgs,

        /// Format du rapport
        #[arg(short, long, value_enum, default_value = "table")]
        format: ReportFormat,
    },

    /// Liste les problèmes détectés sans rien modifier
    Check {
        /// Fichier FASTA ou séquence brute
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        detectors: DetectorArgs,

        /// Format du rapport
        #[arg(short, long, value_enum, default_value = "table")]
        format: ReportFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinTable {
    Standard,
    Ecoli,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let directive = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    cdsfix_core::init_logging(directive);

    let success = match cli.command {
        Commands::Fix {
            input,
            output,
            max_iterations,
            detectors,
            format,
        } => fix::run(input, output, max_iterations, detectors, format)?,
        Commands::Check {
            input,
            detectors,
            format,
        } => check::run(input, detectors, format)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Crée une barre de progression spinner
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap());
    pb.set_message(msg.to_string());
    pb
}
