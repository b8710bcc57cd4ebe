//! Suppression de motifs interdits (sites de restriction, homopolymères...)

use super::{codon_region, GcBias, ProblemDetector, Suggestion};
use crate::error::Result;
use crate::sequence::{bases_to_string, parse_pattern, reverse_complement, IupacBase};

/// Signale chaque occurrence d'un motif ou de son reverse complément
pub struct ExactMatchRemover {
    /// Motifs à rechercher, reverse compléments compris
    sites: Vec<Vec<IupacBase>>,
    reason: String,
}

impl ExactMatchRemover {
    /// Crée un détecteur; un motif vide ou non IUPAC est une erreur
    pub fn new<S: AsRef<str>>(patterns: &[S], reason: impl Into<String>) -> Result<Self> {
        let mut sites = Vec::with_capacity(patterns.len() * 2);

        for pattern in patterns {
            let forward = parse_pattern(pattern.as_ref())?;
            let reverse = reverse_complement(&forward)?;
            let palindromic = forward == reverse;

            sites.push(forward);
            if !palindromic {
                sites.push(reverse);
            }
        }

        Ok(Self {
            sites,
            reason: reason.into(),
        })
    }

    /// Motifs effectivement recherchés
    pub fn sites(&self) -> Vec<String> {
        self.sites.iter().map(|site| bases_to_string(site)).collect()
    }

    fn occurrences<'a>(
        site: &'a [IupacBase],
        sequence: &'a [IupacBase],
    ) -> impl Iterator<Item = usize> + 'a {
        sequence
            .windows(site.len())
            .enumerate()
            .filter(move |(_, window)| {
                site.iter().zip(window.iter()).all(|(code, base)| code.matches(*base))
            })
            .map(|(offset, _)| offset)
    }
}

impl ProblemDetector for ExactMatchRemover {
    fn name(&self) -> &str {
        &self.reason
    }

    fn detect(&self, sequence: &[IupacBase]) -> Vec<Suggestion> {
        let codon_count = sequence.len() / 3;
        let mut suggestions = Vec::new();

        for site in &self.sites {
            for offset in Self::occurrences(site, sequence) {
                let region = codon_region(offset, offset + site.len(), codon_count);
                if let Some((start, end)) = region {
                    let reason = self.reason.clone();
                    suggestions.push(Suggestion::new(start, end, GcBias::None, reason));
                }
            }
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::parse_nucleotides;

    fn detect(patterns: &[&str], sequence: &str) -> Vec<Suggestion> {
        let remover = ExactMatchRemover::new(patterns, "test").unwrap();
        remover.detect(&parse_nucleotides(sequence).unwrap())
    }

    #[test]
    fn test_finds_forward_and_reverse_complement() {
        let remover = ExactMatchRemover::new(&["GGTCTC"], "BsaI").unwrap();
        assert_eq!(remover.sites(), vec!["GGTCTC", "GAGACC"]);

        // GGTCTC aligné sur le codon 1, GAGACC décalé d'une base en 4
        let suggestions = detect(&["GGTCTC"], "ATGGGTCTCAAAAGAGACCTAA");
        assert_eq!(suggestions.len(), 2);
        assert_eq!((suggestions[0].start, suggestions[0].end), (1, 3));
        assert_eq!((suggestions[1].start, suggestions[1].end), (4, 7));
        assert!(suggestions.iter().all(|s| s.bias == GcBias::None));
    }

    #[test]
    fn test_palindrome_scanned_once() {
        let remover = ExactMatchRemover::new(&["GAATTC"], "EcoRI").unwrap();
        assert_eq!(remover.sites(), vec!["GAATTC"]);
        assert_eq!(detect(&["GAATTC"], "ATGGAATTCTAA").len(), 1);
    }

    #[test]
    fn test_overlapping_occurrences() {
        // 9 A consécutifs: deux occurrences de AAAAAAAA
        let suggestions = detect(&["AAAAAAAA"], "ATGAAAAAAAAAGCTTAA");
        assert_eq!(suggestions.len(), 2);
        assert_eq!((suggestions[0].start, suggestions[0].end), (1, 4));
        assert_eq!((suggestions[1].start, suggestions[1].end), (1, 4));
    }

    #[test]
    fn test_wildcards() {
        // GCNGC correspond à GCAGC
        let suggestions = detect(&["GCNGC"], "ATGGCAGCTTAA");
        assert_eq!(suggestions.len(), 1);
        assert_eq!((suggestions[0].start, suggestions[0].end), (1, 3));
    }

    #[test]
    fn test_pattern_longer_than_sequence() {
        assert!(detect(&["ACGTACGTACGT"], "ATGTAA").is_empty());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(ExactMatchRemover::new(&[""], "x").is_err());
        assert!(ExactMatchRemover::new(&["GAXTC"], "x").is_err());
    }
}
