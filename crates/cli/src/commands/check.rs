//! Commande de vérification (un seul balayage)

use super::{read_record, DetectorArgs};
use crate::display::report;
use crate::ReportFormat;
use anyhow::Result;
use cdsfix_core::CdsFixer;
use std::path::PathBuf;

/// Liste les problèmes; renvoie `true` si la séquence est déjà propre
pub fn run(input: PathBuf, args: DetectorArgs, format: ReportFormat) -> Result<bool> {
    let record = read_record(&input)?;
    let fixer = CdsFixer::from_config(args.codon_table()?, &args.fixer_config()?)?;
    let suggestions = fixer.scan(&record.sequence)?;

    match format {
        ReportFormat::Table => {
            println!("🔍 Vérification de: {} ({} nt)", record.id, record.sequence.len());
            report::print_stats("Séquence", &record.sequence)?;
            if suggestions.is_empty() {
                println!("\n✅ Aucun problème détecté");
            } else {
                println!("\n⚠️  {} problème(s) détecté(s):", suggestions.len());
                println!("{}", report::suggestion_table(&suggestions));
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
    }

    Ok(suggestions.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuiltinTable;

    fn detector_args(remove: &[&str]) -> DetectorArgs {
        DetectorArgs {
            config: None,
            remove: remove.iter().map(|s| s.to_string()).collect(),
            repeat_window: None,
            no_repeats: false,
            no_homopolymers: false,
            gc_window: None,
            gc_min: None,
            gc_max: None,
            codon_table: None,
            table: BuiltinTable::Standard,
        }
    }

    #[test]
    fn test_check_reports_problems() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cds.txt");
        std::fs::write(&input, "ATGGGTCTCAAATAA\n").unwrap();

        let clean = run(input.clone(), detector_args(&[]), ReportFormat::Table).unwrap();
        assert!(clean);

        let clean = run(input, detector_args(&["GGTCTC"]), ReportFormat::Json).unwrap();
        assert!(!clean);
    }

    #[test]
    fn test_check_without_detectors_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cds.txt");
        std::fs::write(&input, "ATGAAATAA").unwrap();

        let mut args = detector_args(&[]);
        args.no_repeats = true;
        args.no_homopolymers = true;
        assert!(run(input, args, ReportFormat::Json).is_err());
    }
}
