//! Rapport de correction: statut, journal des changements, statistiques

use anyhow::Result;
use cdsfix_core::sequence::parse_nucleotides;
use cdsfix_core::{ChangeRecord, FixOutcome, FixStatus, SequenceStats, Suggestion};
use console::style;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Étape")]
    step: usize,
    #[tabled(rename = "Codon")]
    position: usize,
    #[tabled(rename = "Avant")]
    from: String,
    #[tabled(rename = "Après")]
    to: String,
    #[tabled(rename = "Raison")]
    reason: String,
}

#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "Début")]
    start: usize,
    #[tabled(rename = "Fin")]
    end: usize,
    #[tabled(rename = "Biais GC")]
    bias: String,
    #[tabled(rename = "Raison")]
    reason: String,
}

/// Tableau du journal des changements
pub fn change_table(changes: &[ChangeRecord]) -> String {
    let rows = changes.iter().map(|c| ChangeRow {
        step: c.step,
        position: c.position,
        from: c.from.to_string(),
        to: c.to.to_string(),
        reason: c.reason.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Tableau des régions signalées (bornes en codons, fin exclue)
pub fn suggestion_table(suggestions: &[Suggestion]) -> String {
    let rows = suggestions.iter().map(|s| SuggestionRow {
        start: s.start,
        end: s.end,
        bias: s.bias.to_string(),
        reason: s.reason.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

fn status_line(status: FixStatus) -> String {
    match status {
        FixStatus::Converged => format!("✅ {}", style(status).green().bold()),
        FixStatus::Exhausted => format!("⚠️  {}", style(status).yellow().bold()),
        FixStatus::Cancelled | FixStatus::ConfigurationError => {
            format!("❌ {}", style(status).red().bold())
        }
    }
}

/// Affiche les statistiques d'une séquence
pub fn print_stats(label: &str, sequence: &str) -> Result<()> {
    let bases = parse_nucleotides(sequence)?;
    println!("\n📊 {}", style(label).bold());
    println!("{}", SequenceStats::compute(&bases).format_table());
    Ok(())
}

/// Affiche le rapport complet d'une correction
pub fn print_outcome(original: &str, outcome: &FixOutcome) -> Result<()> {
    println!("\nStatut      : {}", status_line(outcome.status));
    println!("Itérations  : {}", outcome.iterations);
    println!("Changements : {}", outcome.changes.len());
    println!("Durée       : {} ms", (outcome.finished_at - outcome.started_at).num_milliseconds());
    println!("Checksum    : {}", style(&outcome.checksum).dim());

    if !outcome.changes.is_empty() {
        println!("\n{}", change_table(&outcome.changes));
    }

    if !outcome.remaining.is_empty() {
        println!("\n⚠️  Problèmes restants:");
        println!("{}", suggestion_table(&outcome.remaining));
    }

    print_stats("Avant", original)?;
    print_stats("Après", &outcome.sequence)?;

    Ok(())
}
