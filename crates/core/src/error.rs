//! Types d'erreurs pour la correction de CDS

use crate::fixer::{FixOutcome, FixStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Configuration invalide: {0}")]
    Configuration(String),

    #[error("Base IUPAC invalide: {0}")]
    InvalidBase(char),

    #[error("Longueur de séquence non multiple de 3: {len} nucléotides")]
    FrameMismatch { len: usize },

    #[error("Codon absent de la table: {0}")]
    UnknownCodon(String),

    #[error("Incohérence interne: {0}")]
    InternalInconsistency(String),

    #[error(
        "Pas de convergence après {} itérations: {} problème(s) restant(s)",
        .0.iterations,
        .0.remaining.len()
    )]
    ConvergenceFailure(Box<FixOutcome>),

    #[error("Correction annulée après {} itérations", .0.iterations)]
    Cancelled(Box<FixOutcome>),

    #[error("Erreur IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erreur de sérialisation: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SynthesisError {
    /// Statut terminal correspondant à l'erreur, si elle en a un
    pub fn status(&self) -> Option<FixStatus> {
        match self {
            SynthesisError::Configuration(_)
            | SynthesisError::InvalidBase(_)
            | SynthesisError::FrameMismatch { .. }
            | SynthesisError::UnknownCodon(_)
            | SynthesisError::Serialization(_) => Some(FixStatus::ConfigurationError),
            SynthesisError::ConvergenceFailure(_) => Some(FixStatus::Exhausted),
            SynthesisError::Cancelled(_) => Some(FixStatus::Cancelled),
            SynthesisError::InternalInconsistency(_) | SynthesisError::Io(_) => None,
        }
    }

    /// Vrai pour les erreurs de configuration (rien n'a été modifié)
    pub fn is_configuration_error(&self) -> bool {
        self.status() == Some(FixStatus::ConfigurationError)
    }

    /// Résultat partiel (meilleur effort) porté par l'erreur
    pub fn partial_outcome(&self) -> Option<&FixOutcome> {
        match self {
            SynthesisError::ConvergenceFailure(outcome) | SynthesisError::Cancelled(outcome) => {
                Some(outcome)
            }
            _ => None,
        }
    }

    /// Consomme l'erreur et rend le résultat partiel
    pub fn into_partial_outcome(self) -> Option<FixOutcome> {
        match self {
            SynthesisError::ConvergenceFailure(outcome) | SynthesisError::Cancelled(outcome) => {
                Some(*outcome)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
