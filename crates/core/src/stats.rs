//! Statistiques de séquence (avant/après correction)

use crate::sequence::IupacBase;
use serde::Serialize;

/// Trouve la longueur maximale d'homopolymer dans une séquence
pub fn find_max_homopolymer(bases: &[IupacBase]) -> usize {
    if bases.is_empty() {
        return 0;
    }

    let mut max_run = 1;
    let mut current_run = 1;

    for window in bases.windows(2) {
        if window[0] == window[1] {
            current_run += 1;
            max_run = max_run.max(current_run);
        } else {
            current_run = 1;
        }
    }

    max_run
}

/// Statistiques de séquence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceStats {
    pub length: usize,
    pub count_a: usize,
    pub count_c: usize,
    pub count_g: usize,
    pub count_t: usize,
    pub gc_ratio: f64,
    pub max_homopolymer: usize,
}

impl SequenceStats {
    /// Calcule les statistiques d'une séquence
    pub fn compute(bases: &[IupacBase]) -> Self {
        let mut counts = [0usize; 4]; // A, C, G, T
        for base in bases {
            match base {
                IupacBase::A => counts[0] += 1,
                IupacBase::C => counts[1] += 1,
                IupacBase::G => counts[2] += 1,
                IupacBase::T => counts[3] += 1,
                _ => {}
            }
        }

        let gc_ratio = if bases.is_empty() {
            0.0
        } else {
            (counts[1] + counts[2]) as f64 / bases.len() as f64
        };

        Self {
            length: bases.len(),
            count_a: counts[0],
            count_c: counts[1],
            count_g: counts[2],
            count_t: counts[3],
            gc_ratio,
            max_homopolymer: find_max_homopolymer(bases),
        }
    }

    /// Affiche les statistiques sous forme de tableau
    pub fn format_table(&self) -> String {
        let percent = |count: usize| {
            if self.length == 0 {
                0.0
            } else {
                100.0 * count as f64 / self.length as f64
            }
        };

        format!(
            "┌────────────────────────────────────┐\n\
             │ Statistiques de Séquence           │\n\
             ├────────────────────────────────────┤\n\
             │ Longueur    : {:>6} bases        │\n\
             │ A           : {:>6} ({:>5.1}%)    │\n\
             │ C           : {:>6} ({:>5.1}%)    │\n\
             │ G           : {:>6} ({:>5.1}%)    │\n\
             │ T           : {:>6} ({:>5.1}%)    │\n\
             │ GC Ratio    : {:>6.1}%            │\n\
             │ Max Homopoly: {:>6}               │\n\
             └────────────────────────────────────┘",
            self.length,
            self.count_a,
            percent(self.count_a),
            self.count_c,
            percent(self.count_c),
            self.count_g,
            percent(self.count_g),
            self.count_t,
            percent(self.count_t),
            100.0 * self.gc_ratio,
            self.max_homopolymer,
        )
    }
}
