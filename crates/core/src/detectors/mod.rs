//! Détecteurs de séquences problématiques
//!
//! Chaque détecteur est une fonction pure sur un instantané immuable de la
//! séquence et produit des suggestions alignées sur les codons. Les
//! détecteurs d'une itération tournent en parallèle et ne voient jamais la
//! sortie des autres.

pub mod exact_match;
pub mod gc_content;
pub mod repeat;

pub use exact_match::ExactMatchRemover;
pub use gc_content::GcContentRemover;
pub use repeat::RepeatRemover;

use crate::sequence::IupacBase;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction souhaitée pour le contenu GC d'un remplacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GcBias {
    #[default]
    None,
    PreferGc,
    PreferAt,
}

impl fmt::Display for GcBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcBias::None => write!(f, "-"),
            GcBias::PreferGc => write!(f, "GC"),
            GcBias::PreferAt => write!(f, "AT"),
        }
    }
}

/// Région de codons signalée par un détecteur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Premier codon de la région
    pub start: usize,
    /// Fin de la région (exclusive, en codons)
    pub end: usize,
    /// Biais GC demandé pour les remplacements
    pub bias: GcBias,
    /// Motif du signalement
    pub reason: String,
}

impl Suggestion {
    pub fn new(start: usize, end: usize, bias: GcBias, reason: impl Into<String>) -> Self {
        Self {
            start,
            end,
            bias,
            reason: reason.into(),
        }
    }

    /// Vérifie si la région couvre un codon
    pub fn covers(&self, position: usize) -> bool {
        (self.start..self.end).contains(&position)
    }
}

/// Détecteur de problèmes sur un instantané de séquence
pub trait ProblemDetector: Send + Sync {
    /// Nom court du détecteur (pour les logs)
    fn name(&self) -> &str;

    /// Analyse la séquence (nucléotides) et rend les régions à corriger
    fn detect(&self, sequence: &[IupacBase]) -> Vec<Suggestion>;
}

/// Convertit un intervalle nucléotidique [start, end) en région de codons
///
/// Le début est arrondi au codon inférieur, la fin au codon supérieur quand
/// elle tombe au milieu d'un codon. La région est bornée au nombre de codons;
/// une région vide est rejetée.
pub fn codon_region(start: usize, end: usize, codon_count: usize) -> Option<(usize, usize)> {
    let first = start / 3;
    let last = if end % 3 == 0 { end / 3 } else { end / 3 + 1 };
    let last = last.min(codon_count);

    if last <= first {
        tracing::warn!(
            start,
            end,
            codon_count,
            "Région de codons vide rejetée"
        );
        return None;
    }

    Some((first, last))
}

/// Lance tous les détecteurs en parallèle et attend qu'ils aient tous fini
///
/// Les suggestions sont concaténées dans l'ordre des détecteurs; l'ordre
/// interne de chaque détecteur est conservé.
pub fn scan(detectors: &[Box<dyn ProblemDetector>], snapshot: &[IupacBase]) -> Vec<Suggestion> {
    let per_detector: Vec<Vec<Suggestion>> = detectors
        .par_iter()
        .map(|detector| {
            let suggestions = detector.detect(snapshot);
            tracing::debug!(
                detector = detector.name(),
                count = suggestions.len(),
                "Détecteur terminé"
            );
            suggestions
        })
        .collect();

    per_detector.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codon_region_rounding() {
        // Aligné des deux côtés
        assert_eq!(codon_region(3, 9, 10), Some((1, 3)));
        // Fin au milieu d'un codon: étendue d'un codon
        assert_eq!(codon_region(3, 11, 10), Some((1, 4)));
        // Début au milieu d'un codon: arrondi inférieur
        assert_eq!(codon_region(4, 12, 10), Some((1, 4)));
    }

    #[test]
    fn test_codon_region_is_clamped() {
        assert_eq!(codon_region(27, 31, 10), Some((9, 10)));
        assert_eq!(codon_region(30, 33, 10), None);
    }

    struct Fixed(Vec<Suggestion>);

    impl ProblemDetector for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _sequence: &[IupacBase]) -> Vec<Suggestion> {
            self.0.clone()
        }
    }

    #[test]
    fn test_scan_preserves_detector_order() {
        let detectors: Vec<Box<dyn ProblemDetector>> = vec![
            Box::new(Fixed(vec![
                Suggestion::new(2, 3, GcBias::None, "a"),
                Suggestion::new(0, 1, GcBias::None, "b"),
            ])),
            Box::new(Fixed(vec![])),
            Box::new(Fixed(vec![Suggestion::new(1, 2, GcBias::PreferGc, "c")])),
        ];

        let suggestions = scan(&detectors, &[]);
        let reasons: Vec<&str> = suggestions.iter().map(|s| s.reason.as_str()).collect();
        assert_eq!(reasons, vec!["a", "b", "c"]);
    }
}
