//! Contrôle du contenu GC par fenêtre glissante

use super::{codon_region, GcBias, ProblemDetector, Suggestion};
use crate::error::{Result, SynthesisError};
use crate::sequence::IupacBase;

pub const GC_REASON: &str = "GC content";

/// Signale les fenêtres dont le ratio GC sort de [gc_min, gc_max]
///
/// Les fenêtres démarrent sur chaque codon. Une fenêtre trop pauvre en GC
/// demande `PreferGc`, une fenêtre trop riche `PreferAt`; les fenêtres
/// voisines de même biais sont fusionnées en une seule région.
#[derive(Debug, Clone)]
pub struct GcContentRemover {
    window_length: usize,
    gc_min: f64,
    gc_max: f64,
}

impl GcContentRemover {
    pub fn new(window_length: usize, gc_min: f64, gc_max: f64) -> Result<Self> {
        if window_length == 0 {
            return Err(SynthesisError::Configuration(
                "Longueur de fenêtre GC nulle".to_string(),
            ));
        }
        let in_range = |ratio: f64| (0.0..=1.0).contains(&ratio);
        if !in_range(gc_min) || !in_range(gc_max) || gc_min > gc_max {
            return Err(SynthesisError::Configuration(format!(
                "Plage GC invalide: [{:.2}, {:.2}]",
                gc_min, gc_max
            )));
        }

        Ok(Self {
            window_length,
            gc_min,
            gc_max,
        })
    }

    fn classify(&self, window: &[IupacBase]) -> GcBias {
        let gc_count = window.iter().filter(|b| b.is_gc()).count();
        let gc_ratio = gc_count as f64 / window.len() as f64;

        if gc_ratio < self.gc_min {
            GcBias::PreferGc
        } else if gc_ratio > self.gc_max {
            GcBias::PreferAt
        } else {
            GcBias::None
        }
    }
}

impl ProblemDetector for GcContentRemover {
    fn name(&self) -> &str {
        GC_REASON
    }

    fn detect(&self, sequence: &[IupacBase]) -> Vec<Suggestion> {
        let codon_count = sequence.len() / 3;
        let mut suggestions = Vec::new();
        if sequence.len() < self.window_length {
            return suggestions;
        }

        // Région en cours: (biais, début, fin) en nucléotides
        let mut pending: Option<(GcBias, usize, usize)> = None;
        let flush = |region: (GcBias, usize, usize), out: &mut Vec<Suggestion>| {
            let (bias, start, end) = region;
            if let Some((start, end)) = codon_region(start, end, codon_count) {
                out.push(Suggestion::new(start, end, bias, GC_REASON));
            }
        };

        for offset in (0..=sequence.len() - self.window_length).step_by(3) {
            let end = offset + self.window_length;
            let bias = self.classify(&sequence[offset..end]);

            pending = match (pending, bias) {
                (current, GcBias::None) => {
                    if let Some(region) = current {
                        flush(region, &mut suggestions);
                    }
                    None
                }
                (Some((current_bias, start, current_end)), bias)
                    if current_bias == bias && offset <= current_end =>
                {
                    Some((bias, start, end))
                }
                (current, bias) => {
                    if let Some(region) = current {
                        flush(region, &mut suggestions);
                    }
                    Some((bias, offset, end))
                }
            };
        }

        if let Some(region) = pending {
            flush(region, &mut suggestions);
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::parse_nucleotides;

    #[test]
    fn test_low_gc_window_prefers_gc() {
        let remover = GcContentRemover::new(6, 0.3, 0.7).unwrap();
        let sequence = parse_nucleotides("GCAGCAAAATTTGCAGCA").unwrap();
        let suggestions = remover.detect(&sequence);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].bias, GcBias::PreferGc);
        assert_eq!((suggestions[0].start, suggestions[0].end), (2, 4));
    }

    #[test]
    fn test_high_gc_window_prefers_at() {
        let remover = GcContentRemover::new(6, 0.3, 0.7).unwrap();
        let sequence = parse_nucleotides("AAAGCGGCCTTT").unwrap();
        let suggestions = remover.detect(&sequence);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].bias, GcBias::PreferAt);
        assert_eq!((suggestions[0].start, suggestions[0].end), (1, 3));
    }

    #[test]
    fn test_adjacent_windows_are_merged() {
        let remover = GcContentRemover::new(6, 0.3, 0.7).unwrap();
        let sequence = parse_nucleotides("AAATTTAAATTT").unwrap();
        let suggestions = remover.detect(&sequence);

        assert_eq!(suggestions.len(), 1);
        assert_eq!((suggestions[0].start, suggestions[0].end), (0, 4));
    }

    #[test]
    fn test_short_sequence_not_scanned() {
        let remover = GcContentRemover::new(30, 0.4, 0.6).unwrap();
        assert!(remover.detect(&parse_nucleotides("AAATTT").unwrap()).is_empty());
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(GcContentRemover::new(0, 0.4, 0.6).is_err());
        assert!(GcContentRemover::new(30, 0.7, 0.6).is_err());
        assert!(GcContentRemover::new(30, -0.1, 0.6).is_err());
        assert!(GcContentRemover::new(30, 0.4, f64::NAN).is_err());
    }
}
