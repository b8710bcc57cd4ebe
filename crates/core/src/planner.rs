//! Planification des substitutions de codons synonymes
//!
//! Pour chaque codon couvert par au moins une suggestion, le planificateur
//! choisit le synonyme de plus fort poids (le codon courant exclu), filtré
//! par le biais GC demandé. Les égalités de poids sont départagées par
//! l'ordre lexicographique des codons. Un codon sans candidat reste inchangé.

use crate::codon_table::{CodonTable, CodonUsage};
use crate::detectors::{GcBias, Suggestion};
use crate::error::{Result, SynthesisError};
use crate::history::{ChangeRecord, SequenceState};
use crate::sequence::Codon;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Remplacements d'une itération et changements à journaliser
#[derive(Debug, Clone, Default)]
pub struct SubstitutionPlan {
    pub replacements: BTreeMap<usize, Codon>,
    pub changes: Vec<ChangeRecord>,
}

impl SubstitutionPlan {
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

/// Planificateur glouton de substitutions synonymes
pub struct CodonSubstitutionPlanner<'a> {
    table: &'a CodonTable,
}

impl<'a> CodonSubstitutionPlanner<'a> {
    pub fn new(table: &'a CodonTable) -> Self {
        Self { table }
    }

    /// Vérifie qu'une suggestion référence une région valide
    pub fn check_suggestion(suggestion: &Suggestion, len: usize) -> Result<()> {
        if suggestion.start >= suggestion.end || suggestion.end > len {
            return Err(SynthesisError::InternalInconsistency(format!(
                "Suggestion hors séquence: [{}, {}) pour {} codons ({})",
                suggestion.start, suggestion.end, len, suggestion.reason
            )));
        }
        Ok(())
    }

    /// Construit le plan de l'itération `step`
    pub fn plan(
        &self,
        state: &SequenceState,
        suggestions: &[Suggestion],
        step: usize,
    ) -> Result<SubstitutionPlan> {
        let mut covering: BTreeMap<usize, Vec<&Suggestion>> = BTreeMap::new();
        for suggestion in suggestions {
            Self::check_suggestion(suggestion, state.len())?;
            for position in suggestion.start..suggestion.end {
                covering.entry(position).or_default().push(suggestion);
            }
        }

        let mut plan = SubstitutionPlan::default();
        for (position, suggestions) in covering {
            let current = state.codons()[position];
            let bias = effective_bias(&suggestions);

            let Some(choice) = self.choose(&current, bias)? else {
                tracing::debug!(
                    position,
                    codon = %current,
                    ?bias,
                    "Aucun codon synonyme disponible"
                );
                continue;
            };

            let reason = suggestions
                .iter()
                .find(|s| s.bias == bias)
                .unwrap_or(&suggestions[0])
                .reason
                .clone();

            plan.replacements.insert(position, choice.codon);
            plan.changes.push(ChangeRecord {
                position,
                step,
                from: current,
                to: choice.codon,
                reason,
            });
        }

        Ok(plan)
    }

    /// Meilleur synonyme pour un codon selon le biais GC
    pub fn choose(&self, current: &Codon, bias: GcBias) -> Result<Option<CodonUsage>> {
        let current_gc = current.gc_count();
        let candidate = self
            .table
            .synonyms(current)?
            .iter()
            .filter(|usage| usage.codon != *current)
            .filter(|usage| match bias {
                GcBias::None => true,
                GcBias::PreferGc => usage.gc_count > current_gc,
                GcBias::PreferAt => usage.gc_count < current_gc,
            })
            .min_by(|a, b| by_preference(a, b))
            .copied();

        Ok(candidate)
    }
}

/// Biais retenu pour une position: unanime parmi les suggestions biaisées
fn effective_bias(suggestions: &[&Suggestion]) -> GcBias {
    let wants_gc = suggestions.iter().any(|s| s.bias == GcBias::PreferGc);
    let wants_at = suggestions.iter().any(|s| s.bias == GcBias::PreferAt);

    match (wants_gc, wants_at) {
        (true, false) => GcBias::PreferGc,
        (false, true) => GcBias::PreferAt,
        _ => GcBias::None,
    }
}

/// Poids décroissant puis codon croissant
fn by_preference(a: &CodonUsage, b: &CodonUsage) -> Ordering {
    b.weight.cmp(&a.weight).then_with(|| a.codon.cmp(&b.codon))
}
