//! Alphabet nucléotidique, codons et utilitaires de séquence

use crate::error::{Result, SynthesisError};
use bio::alphabets::dna;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Codes IUPAC pour les nucléotides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IupacBase {
    A,  // Adénine
    C,  // Cytosine
    G,  // Guanine
    T,  // Thymine
    R,  // A ou G (purine)
    Y,  // C ou T (pyrimidine)
    S,  // G ou C (strong)
    W,  // A ou T (weak)
    K,  // G ou T (keto)
    M,  // A ou C (amino)
    B,  // C ou G ou T
    D,  // A ou G ou T
    H,  // A ou C ou T
    V,  // A ou C ou G
    N,  // Any base
}

impl IupacBase {
    /// Convertit un caractère en base IUPAC
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'A' => Ok(IupacBase::A),
            'C' => Ok(IupacBase::C),
            'G' => Ok(IupacBase::G),
            'T' => Ok(IupacBase::T),
            'R' => Ok(IupacBase::R),
            'Y' => Ok(IupacBase::Y),
            'S' => Ok(IupacBase::S),
            'W' => Ok(IupacBase::W),
            'K' => Ok(IupacBase::K),
            'M' => Ok(IupacBase::M),
            'B' => Ok(IupacBase::B),
            'D' => Ok(IupacBase::D),
            'H' => Ok(IupacBase::H),
            'V' => Ok(IupacBase::V),
            'N' => Ok(IupacBase::N),
            _ => Err(SynthesisError::InvalidBase(c)),
        }
    }

    /// Convertit une base en caractère
    pub fn as_char(self) -> char {
        match self {
            IupacBase::A => 'A',
            IupacBase::C => 'C',
            IupacBase::G => 'G',
            IupacBase::T => 'T',
            IupacBase::R => 'R',
            IupacBase::Y => 'Y',
            IupacBase::S => 'S',
            IupacBase::W => 'W',
            IupacBase::K => 'K',
            IupacBase::M => 'M',
            IupacBase::B => 'B',
            IupacBase::D => 'D',
            IupacBase::H => 'H',
            IupacBase::V => 'V',
            IupacBase::N => 'N',
        }
    }

    /// Ensemble des bases concrètes représentées (bits A=1, C=2, G=4, T=8)
    fn mask(self) -> u8 {
        match self {
            IupacBase::A => 0b0001,
            IupacBase::C => 0b0010,
            IupacBase::G => 0b0100,
            IupacBase::T => 0b1000,
            IupacBase::R => 0b0101,
            IupacBase::Y => 0b1010,
            IupacBase::S => 0b0110,
            IupacBase::W => 0b1001,
            IupacBase::K => 0b1100,
            IupacBase::M => 0b0011,
            IupacBase::B => 0b1110,
            IupacBase::D => 0b1101,
            IupacBase::H => 0b1011,
            IupacBase::V => 0b0111,
            IupacBase::N => 0b1111,
        }
    }

    /// Vérifie si c'est une base concrète (A, C, G ou T)
    pub fn is_standard(self) -> bool {
        matches!(self, IupacBase::A | IupacBase::C | IupacBase::G | IupacBase::T)
    }

    /// Vérifie si la base est G ou C
    pub fn is_gc(self) -> bool {
        matches!(self, IupacBase::G | IupacBase::C | IupacBase::S)
    }

    /// Vérifie si ce code (motif) accepte la base donnée
    pub fn matches(self, base: IupacBase) -> bool {
        self.mask() & base.mask() == base.mask()
    }
}

impl fmt::Display for IupacBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for IupacBase {
    type Error = SynthesisError;

    fn try_from(c: char) -> Result<Self> {
        IupacBase::from_char(c)
    }
}

/// Codon: triplet de bases concrètes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Codon([IupacBase; 3]);

impl Codon {
    /// Crée un codon, uniquement à partir de bases A/C/G/T
    pub fn new(bases: [IupacBase; 3]) -> Result<Self> {
        if let Some(base) = bases.iter().find(|b| !b.is_standard()) {
            return Err(SynthesisError::InvalidBase(base.as_char()));
        }
        Ok(Self(bases))
    }

    /// Bases du codon
    pub fn bases(&self) -> &[IupacBase; 3] {
        &self.0
    }

    /// Nombre de G/C dans le codon (0 à 3)
    pub fn gc_count(&self) -> usize {
        self.0.iter().filter(|b| b.is_gc()).count()
    }
}

impl FromStr for Codon {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self> {
        let bases = s
            .chars()
            .map(IupacBase::from_char)
            .collect::<Result<Vec<_>>>()?;
        let bases: [IupacBase; 3] = bases
            .try_into()
            .map_err(|_| SynthesisError::Configuration(format!("Codon invalide: {:?}", s)))?;
        Codon::new(bases)
    }
}

impl TryFrom<String> for Codon {
    type Error = SynthesisError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Codon> for String {
    fn from(codon: Codon) -> Self {
        codon.to_string()
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.0 {
            write!(f, "{}", base.as_char())?;
        }
        Ok(())
    }
}

/// Parse une séquence codante: A/C/G/T uniquement, espaces ignorés
pub fn parse_nucleotides(s: &str) -> Result<Vec<IupacBase>> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            let base = IupacBase::from_char(c)?;
            if base.is_standard() {
                Ok(base)
            } else {
                Err(SynthesisError::InvalidBase(c))
            }
        })
        .collect()
}

/// Découpe une séquence codante en codons
pub fn parse_codons(s: &str) -> Result<Vec<Codon>> {
    let bases = parse_nucleotides(s)?;
    if bases.len() % 3 != 0 {
        return Err(SynthesisError::FrameMismatch { len: bases.len() });
    }

    bases
        .chunks_exact(3)
        .map(|chunk| Codon::new([chunk[0], chunk[1], chunk[2]]))
        .collect()
}

/// Parse un motif IUPAC (les codes ambigus servent de jokers)
pub fn parse_pattern(s: &str) -> Result<Vec<IupacBase>> {
    let pattern = s.trim();
    if pattern.is_empty() {
        return Err(SynthesisError::Configuration("Motif vide".to_string()));
    }

    pattern
        .chars()
        .map(|c| {
            IupacBase::from_char(c).map_err(|_| {
                SynthesisError::Configuration(format!("Motif invalide {:?}: caractère {:?}", s, c))
            })
        })
        .collect()
}

/// Reverse complément (codes IUPAC compris)
pub fn reverse_complement(bases: &[IupacBase]) -> Result<Vec<IupacBase>> {
    let text: Vec<u8> = bases.iter().map(|b| b.as_char() as u8).collect();
    dna::revcomp(&text)
        .into_iter()
        .map(|c| IupacBase::from_char(c as char))
        .collect()
}

/// Aplatit des codons en nucléotides
pub fn codons_to_bases(codons: &[Codon]) -> Vec<IupacBase> {
    codons.iter().flat_map(|c| c.bases().iter().copied()).collect()
}

/// Représentation texte d'une suite de bases
pub fn bases_to_string(bases: &[IupacBase]) -> String {
    bases.iter().map(|b| b.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iupac_base_conversion() {
        assert_eq!(IupacBase::from_char('A').unwrap(), IupacBase::A);
        assert_eq!(IupacBase::from_char('c').unwrap(), IupacBase::C);
        assert!(IupacBase::from_char('X').is_err());
    }

    #[test]
    fn test_wildcard_matching() {
        assert!(IupacBase::N.matches(IupacBase::G));
        assert!(IupacBase::R.matches(IupacBase::A));
        assert!(!IupacBase::R.matches(IupacBase::C));
        assert!(IupacBase::T.matches(IupacBase::T));
        assert!(!IupacBase::T.matches(IupacBase::A));
    }

    #[test]
    fn test_codon_parsing_and_gc() {
        let codon: Codon = "gcg".parse().unwrap();
        assert_eq!(codon.to_string(), "GCG");
        assert_eq!(codon.gc_count(), 3);
        assert!("GCN".parse::<Codon>().is_err());
        assert!("GC".parse::<Codon>().is_err());
    }

    #[test]
    fn test_codon_order_is_lexicographic() {
        let aaa: Codon = "AAA".parse().unwrap();
        let aag: Codon = "AAG".parse().unwrap();
        let tta: Codon = "TTA".parse().unwrap();
        assert!(aaa < aag);
        assert!(aag < tta);
    }

    #[test]
    fn test_parse_codons_frame() {
        assert_eq!(parse_codons("ATG AAA\nTAA").unwrap().len(), 3);
        assert!(matches!(
            parse_codons("ATGA"),
            Err(SynthesisError::FrameMismatch { len: 4 })
        ));
        assert!(matches!(parse_codons("ATGNNN"), Err(SynthesisError::InvalidBase('N'))));
    }

    #[test]
    fn test_reverse_complement() {
        let bases = parse_pattern("ATGCAACG").unwrap();
        let rc = reverse_complement(&bases).unwrap();
        assert_eq!(bases_to_string(&rc), "CGTTGCAT");

        let ambiguous = parse_pattern("GRN").unwrap();
        assert_eq!(bases_to_string(&reverse_complement(&ambiguous).unwrap()), "NYC");
    }

    #[test]
    fn test_parse_pattern_rejects_garbage() {
        assert!(parse_pattern("").is_err());
        assert!(parse_pattern("GAAT-C").is_err());
    }
}
