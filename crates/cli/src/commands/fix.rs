//! Commande de correction

use super::{read_record, write_fasta, DetectorArgs};
use crate::display::report;
use crate::{create_spinner, ReportFormat};
use anyhow::{Context, Result};
use cdsfix_core::{CdsFixer, FixStatus};
use std::path::PathBuf;

/// Corrige la séquence; renvoie `true` si elle a convergé
pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    max_iterations: Option<usize>,
    args: DetectorArgs,
    format: ReportFormat,
) -> Result<bool> {
    let record = read_record(&input)?;

    let mut config = args.fixer_config()?;
    if let Some(max) = max_iterations {
        config.max_iterations = max;
    }
    let fixer = CdsFixer::from_config(args.codon_table()?, &config)?;

    if format == ReportFormat::Table {
        println!("🧬 Correction de: {} ({} nt)", record.id, record.sequence.len());
    }

    let spinner = create_spinner("Correction en cours...");
    let result = fixer.fix(&record.sequence);
    spinner.finish_and_clear();

    // Un résultat partiel reste exploitable: on l'affiche et on l'écrit
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) if err.partial_outcome().is_some() => err
            .into_partial_outcome()
            .context("Résultat partiel manquant")?,
        Err(err) => return Err(err.into()),
    };

    if let Some(path) = &output {
        let description = format!(
            "status={} iterations={} run={}",
            outcome.status, outcome.iterations, outcome.run_id
        );
        write_fasta(path, &record.id, &description, &outcome.sequence)?;
    }

    match format {
        ReportFormat::Table => {
            report::print_outcome(&record.sequence, &outcome)?;
            if let Some(path) = &output {
                println!("\n📁 Séquence écrite: {}", path.display());
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(outcome.status == FixStatus::Converged)
}
