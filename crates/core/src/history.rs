//! État de la séquence en cours de correction et journal des changements

use crate::codon_table::CodonTable;
use crate::error::{Result, SynthesisError};
use crate::sequence::{codons_to_bases, parse_codons, Codon, IupacBase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Changement effectif d'un codon lors d'une itération
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Position du codon
    pub position: usize,
    /// Itération d'application (à partir de 1)
    pub step: usize,
    /// Codon remplacé
    pub from: Codon,
    /// Nouveau codon
    pub to: Codon,
    /// Motif du changement
    pub reason: String,
}

/// Journal des changements, en ajout seul
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    records: Vec<ChangeRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute les changements d'une itération
    pub(crate) fn append(&mut self, records: Vec<ChangeRecord>) {
        debug_assert!(records
            .iter()
            .all(|r| self.records.last().map_or(true, |last| last.step <= r.step)));
        self.records.extend(records);
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// Historique d'une position, dans l'ordre des itérations
    pub fn for_position(&self, position: usize) -> impl Iterator<Item = &ChangeRecord> + '_ {
        self.records.iter().filter(move |r| r.position == position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}

/// Séquence codante sous forme de codons et compteur d'itérations
#[derive(Debug, Clone)]
pub struct SequenceState {
    codons: Vec<Codon>,
    iteration: usize,
}

impl SequenceState {
    /// Crée l'état depuis une CDS; chaque codon doit être connu de la table
    pub fn from_cds(cds: &str, table: &CodonTable) -> Result<Self> {
        let codons = parse_codons(cds)?;
        if codons.is_empty() {
            return Err(SynthesisError::Configuration("Séquence vide".to_string()));
        }
        if let Some(unknown) = codons.iter().find(|c| table.amino_acid(c).is_none()) {
            return Err(SynthesisError::UnknownCodon(unknown.to_string()));
        }

        Ok(Self {
            codons,
            iteration: 0,
        })
    }

    pub fn codons(&self) -> &[Codon] {
        &self.codons
    }

    pub fn len(&self) -> usize {
        self.codons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    /// Nombre d'itérations appliquées
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Instantané nucléotidique pour les détecteurs
    pub fn snapshot(&self) -> Vec<IupacBase> {
        codons_to_bases(&self.codons)
    }

    /// Applique des remplacements et passe à l'itération suivante
    pub(crate) fn apply(&mut self, replacements: &BTreeMap<usize, Codon>) -> Result<()> {
        // Positions triées: la dernière suffit pour valider toutes les autres
        if let Some((&position, _)) = replacements.iter().next_back() {
            if position >= self.codons.len() {
                return Err(SynthesisError::InternalInconsistency(format!(
                    "Remplacement hors séquence: position {} (longueur {})",
                    position,
                    self.codons.len()
                )));
            }
        }

        for (&position, &codon) in replacements {
            self.codons[position] = codon;
        }
        self.iteration += 1;
        Ok(())
    }
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for codon in &self.codons {
            write!(f, "{}", codon)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codon(s: &str) -> Codon {
        s.parse().unwrap()
    }

    #[test]
    fn test_state_from_cds() {
        let table = CodonTable::standard();
        let state = SequenceState::from_cds("atgaaa taa", &table).unwrap();
        assert_eq!(state.len(), 3);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.to_string(), "ATGAAATAA");
        assert_eq!(state.snapshot().len(), 9);
    }

    #[test]
    fn test_state_rejects_bad_input() {
        let table = CodonTable::standard();
        assert!(matches!(
            SequenceState::from_cds("ATGAA", &table),
            Err(SynthesisError::FrameMismatch { len: 5 })
        ));
        assert!(SequenceState::from_cds("", &table).is_err());

        let partial = CodonTable::from_json(
            r#"{"amino_acids": [{"letter": "M", "codons": [{"triplet": "ATG", "weight": 1}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            SequenceState::from_cds("ATGAAA", &partial),
            Err(SynthesisError::UnknownCodon(_))
        ));
    }

    #[test]
    fn test_apply_replacements() {
        let table = CodonTable::standard();
        let mut state = SequenceState::from_cds("ATGAAATAA", &table).unwrap();
        let mut replacements = BTreeMap::new();
        replacements.insert(1, codon("AAG"));

        state.apply(&replacements).unwrap();
        assert_eq!(state.to_string(), "ATGAAGTAA");
        assert_eq!(state.iteration(), 1);

        replacements.insert(7, codon("AAG"));
        assert!(matches!(
            state.apply(&replacements),
            Err(SynthesisError::InternalInconsistency(_))
        ));
    }

    #[test]
    fn test_history_by_position() {
        let mut history = History::new();
        history.append(vec![ChangeRecord {
            position: 1,
            step: 1,
            from: codon("AAA"),
            to: codon("AAG"),
            reason: "test".to_string(),
        }]);
        history.append(vec![ChangeRecord {
            position: 1,
            step: 2,
            from: codon("AAG"),
            to: codon("AAA"),
            reason: "test".to_string(),
        }]);

        let steps: Vec<usize> = history.for_position(1).map(|r| r.step).collect();
        assert_eq!(steps, vec![1, 2]);
        assert_eq!(history.for_position(0).count(), 0);
        assert_eq!(history.len(), 2);
    }
}
