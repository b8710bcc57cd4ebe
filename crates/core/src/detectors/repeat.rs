//! Détection des répétitions (k-mers vus plus d'une fois)

use super::{codon_region, GcBias, ProblemDetector, Suggestion};
use crate::error::{Result, SynthesisError};
use crate::sequence::IupacBase;
use std::collections::HashSet;

pub const REPEAT_REASON: &str = "Repeat sequence";

/// Signale chaque réapparition d'une fenêtre de `window_length` nucléotides
pub struct RepeatRemover {
    window_length: usize,
}

impl RepeatRemover {
    pub fn new(window_length: usize) -> Result<Self> {
        if window_length == 0 {
            return Err(SynthesisError::Configuration(
                "Longueur de fenêtre de répétition nulle".to_string(),
            ));
        }
        Ok(Self { window_length })
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }
}

impl ProblemDetector for RepeatRemover {
    fn name(&self) -> &str {
        REPEAT_REASON
    }

    fn detect(&self, sequence: &[IupacBase]) -> Vec<Suggestion> {
        let codon_count = sequence.len() / 3;
        let mut seen: HashSet<&[IupacBase]> = HashSet::new();
        let mut suggestions = Vec::new();

        for (offset, window) in sequence.windows(self.window_length).enumerate() {
            if !seen.insert(window) {
                let end = offset + self.window_length;
                if let Some((start, end)) = codon_region(offset, end, codon_count) {
                    suggestions.push(Suggestion::new(start, end, GcBias::None, REPEAT_REASON));
                }
            }
        }

        suggestions
    }
}
