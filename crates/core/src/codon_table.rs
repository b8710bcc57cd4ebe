//! Table des codons: acides aminés, codons synonymes et poids d'usage
//!
//! La table est immuable pendant une correction. Elle est construite soit à
//! partir d'une description (JSON ou code), soit depuis une des tables
//! intégrées (code génétique standard, usage des codons d'E. coli K-12).

use crate::error::{Result, SynthesisError};
use crate::sequence::Codon;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;

/// Code génétique standard avec l'usage des codons d'E. coli K-12
/// (fréquence pour mille × 10)
const ECOLI_USAGE: [(&str, char, u32); 64] = [
    ("TTT", 'F', 221), ("TTC", 'F', 160), ("TTA", 'L', 143), ("TTG", 'L', 130),
    ("CTT", 'L', 119), ("CTC", 'L', 102), ("CTA", 'L', 42), ("CTG", 'L', 484),
    ("ATT", 'I', 298), ("ATC", 'I', 237), ("ATA", 'I', 68), ("ATG", 'M', 264),
    ("GTT", 'V', 198), ("GTC", 'V', 143), ("GTA", 'V', 116), ("GTG", 'V', 244),
    ("TCT", 'S', 104), ("TCC", 'S', 91), ("TCA", 'S', 89), ("TCG", 'S', 85),
    ("CCT", 'P', 84), ("CCC", 'P', 64), ("CCA", 'P', 66), ("CCG", 'P', 209),
    ("ACT", 'T', 131), ("ACC", 'T', 220), ("ACA", 'T', 130), ("ACG", 'T', 137),
    ("GCT", 'A', 189), ("GCC", 'A', 242), ("GCA", 'A', 212), ("GCG", 'A', 301),
    ("TAT", 'Y', 175), ("TAC", 'Y', 122), ("TAA", '*', 20), ("TAG", '*', 3),
    ("CAT", 'H', 125), ("CAC", 'H', 93), ("CAA", 'Q', 146), ("CAG", 'Q', 284),
    ("AAT", 'N', 206), ("AAC", 'N', 214), ("AAA", 'K', 353), ("AAG", 'K', 124),
    ("GAT", 'D', 327), ("GAC", 'D', 192), ("GAA", 'E', 391), ("GAG", 'E', 187),
    ("TGT", 'C', 52), ("TGC", 'C', 61), ("TGA", '*', 10), ("TGG", 'W', 139),
    ("CGT", 'R', 200), ("CGC", 'R', 197), ("CGA", 'R', 38), ("CGG", 'R', 59),
    ("AGT", 'S', 99), ("AGC", 'S', 152), ("AGA", 'R', 36), ("AGG", 'R', 21),
    ("GGT", 'G', 255), ("GGC", 'G', 271), ("GGA", 'G', 95), ("GGG", 'G', 110),
];

/// Description d'un codon (format d'entrée)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodonSpec {
    /// Triplet de nucléotides
    pub triplet: String,
    /// Poids d'usage (plus grand = préféré)
    pub weight: u32,
}

/// Description d'un acide aminé et de ses codons (format d'entrée)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AminoAcidSpec {
    /// Lettre de l'acide aminé ('*' pour stop)
    pub letter: char,
    /// Codons synonymes
    pub codons: Vec<CodonSpec>,
}

#[derive(Debug, Deserialize)]
struct CodonTableSpec {
    amino_acids: Vec<AminoAcidSpec>,
}

/// Codon avec son poids d'usage et son contenu GC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodonUsage {
    pub codon: Codon,
    pub weight: u32,
    pub gc_count: usize,
}

/// Table acide aminé → codons synonymes
#[derive(Debug, Clone)]
pub struct CodonTable {
    amino_acids: BTreeMap<char, Vec<CodonUsage>>,
    by_codon: HashMap<Codon, char>,
}

impl CodonTable {
    /// Construit et valide une table
    pub fn new(specs: Vec<AminoAcidSpec>) -> Result<Self> {
        let mut amino_acids = BTreeMap::new();
        let mut by_codon = HashMap::new();

        for spec in specs {
            let letter = spec.letter.to_ascii_uppercase();
            if !(letter.is_ascii_uppercase() || letter == '*') {
                return Err(SynthesisError::Configuration(format!(
                    "Lettre d'acide aminé invalide: {:?}",
                    spec.letter
                )));
            }
            if spec.codons.is_empty() {
                return Err(SynthesisError::Configuration(format!(
                    "Acide aminé {} sans codon",
                    letter
                )));
            }
            if amino_acids.contains_key(&letter) {
                return Err(SynthesisError::Configuration(format!(
                    "Acide aminé {} défini deux fois",
                    letter
                )));
            }

            let mut usages = Vec::with_capacity(spec.codons.len());
            for codon_spec in spec.codons {
                let codon: Codon = codon_spec.triplet.parse()?;
                if let Some(previous) = by_codon.insert(codon, letter) {
                    return Err(SynthesisError::Configuration(format!(
                        "Codon {} attribué à {} et à {}",
                        codon, previous, letter
                    )));
                }
                usages.push(CodonUsage {
                    codon,
                    weight: codon_spec.weight,
                    gc_count: codon.gc_count(),
                });
            }
            amino_acids.insert(letter, usages);
        }

        if amino_acids.is_empty() {
            return Err(SynthesisError::Configuration("Table de codons vide".to_string()));
        }

        Ok(Self { amino_acids, by_codon })
    }

    /// Charge une table depuis du JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: CodonTableSpec = serde_json::from_str(json)?;
        Self::new(spec.amino_acids)
    }

    /// Charge une table depuis un lecteur JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let spec: CodonTableSpec = serde_json::from_reader(reader)?;
        Self::new(spec.amino_acids)
    }

    /// Code génétique standard, tous les poids à 1
    pub fn standard() -> Self {
        Self::builtin(|_| 1)
    }

    /// Code génétique standard pondéré par l'usage d'E. coli K-12
    pub fn escherichia_coli() -> Self {
        Self::builtin(|weight| weight)
    }

    fn builtin(weight: impl Fn(u32) -> u32) -> Self {
        let mut grouped: BTreeMap<char, Vec<CodonSpec>> = BTreeMap::new();
        for (triplet, letter, usage) in ECOLI_USAGE {
            grouped.entry(letter).or_default().push(CodonSpec {
                triplet: triplet.to_string(),
                weight: weight(usage),
            });
        }
        let specs = grouped
            .into_iter()
            .map(|(letter, codons)| AminoAcidSpec { letter, codons })
            .collect();

        // Table constante, toujours valide
        match Self::new(specs) {
            Ok(table) => table,
            Err(e) => unreachable!("table intégrée invalide: {}", e),
        }
    }

    /// Acide aminé codé par un codon
    pub fn amino_acid(&self, codon: &Codon) -> Option<char> {
        self.by_codon.get(codon).copied()
    }

    /// Poids d'usage d'un codon
    pub fn weight(&self, codon: &Codon) -> Option<u32> {
        let letter = self.amino_acid(codon)?;
        self.codons_for(letter)?
            .iter()
            .find(|usage| usage.codon == *codon)
            .map(|usage| usage.weight)
    }

    /// Codons d'un acide aminé
    pub fn codons_for(&self, letter: char) -> Option<&[CodonUsage]> {
        self.amino_acids.get(&letter).map(Vec::as_slice)
    }

    /// Codons synonymes d'un codon (lui compris)
    pub fn synonyms(&self, codon: &Codon) -> Result<&[CodonUsage]> {
        self.amino_acid(codon)
            .and_then(|letter| self.codons_for(letter))
            .ok_or_else(|| SynthesisError::UnknownCodon(codon.to_string()))
    }

    /// Traduit des codons en protéine
    pub fn translate(&self, codons: &[Codon]) -> Result<String> {
        codons
            .iter()
            .map(|codon| {
                self.amino_acid(codon)
                    .ok_or_else(|| SynthesisError::UnknownCodon(codon.to_string()))
            })
            .collect()
    }

    /// Lettres d'acides aminés de la table
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.amino_acids.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> Codon {
        s.parse().unwrap()
    }

    #[test]
    fn test_standard_table_covers_all_codons() {
        let table = CodonTable::standard();
        assert_eq!(table.letters().count(), 21);
        assert_eq!(table.amino_acid(&codon("ATG")), Some('M'));
        assert_eq!(table.amino_acid(&codon("TGA")), Some('*'));
        assert_eq!(table.synonyms(&codon("CTG")).unwrap().len(), 6);
        assert_eq!(table.weight(&codon("GCG")), Some(1));
    }

    #[test]
    fn test_ecoli_weights() {
        let table = CodonTable::escherichia_coli();
        assert_eq!(table.weight(&codon("CTG")), Some(484));
        assert_eq!(table.weight(&codon("AAG")), Some(124));
        let lys = table.codons_for('K').unwrap();
        assert_eq!(lys.len(), 2);
        assert_eq!(lys[0].gc_count, 0);
        assert_eq!(lys[1].gc_count, 1);
    }

    #[test]
    fn test_translate() {
        let table = CodonTable::standard();
        let codons = vec![codon("ATG"), codon("AAA"), codon("TAA")];
        assert_eq!(table.translate(&codons).unwrap(), "MK*");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "amino_acids": [
                {"letter": "K", "codons": [{"triplet": "AAA", "weight": 3}, {"triplet": "aag", "weight": 1}]},
                {"letter": "M", "codons": [{"triplet": "ATG", "weight": 1}]}
            ]
        }"#;
        let table = CodonTable::from_json(json).unwrap();
        assert_eq!(table.amino_acid(&codon("AAG")), Some('K'));
        assert_eq!(table.weight(&codon("AAA")), Some(3));
        assert!(table.synonyms(&codon("GCT")).is_err());
    }

    #[test]
    fn test_amino_acid_without_codons_is_rejected() {
        let json = r#"{"amino_acids": [{"letter": "W", "codons": []}]}"#;
        let err = CodonTable::from_json(json).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let json = r#"{"amino_acids": [{"letter": "W", "codons": [{"triplet": "TGG"}]}]}"#;
        assert!(matches!(
            CodonTable::from_json(json),
            Err(SynthesisError::Serialization(_))
        ));
    }

    #[test]
    fn test_codon_assigned_twice_is_rejected() {
        let specs = vec![
            AminoAcidSpec {
                letter: 'K',
                codons: vec![CodonSpec { triplet: "AAA".to_string(), weight: 1 }],
            },
            AminoAcidSpec {
                letter: 'N',
                codons: vec![CodonSpec { triplet: "AAA".to_string(), weight: 1 }],
            },
        ];
        assert!(CodonTable::new(specs).is_err());
    }
}
