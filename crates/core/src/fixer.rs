//! Boucle de convergence: détection → planification → application
//!
//! La boucle est une machine à états explicite. Chaque balayage lance tous
//! les détecteurs en parallèle sur un instantané de la séquence et attend
//! qu'ils aient tous terminé; la planification et l'application se font
//! ensuite sur un seul thread. Le nombre d'applications est borné par
//! `max_iterations`; l'annulation n'est prise en compte qu'à la fin d'un
//! balayage.

use crate::codon_table::CodonTable;
use crate::detectors::{
    self, ExactMatchRemover, GcContentRemover, ProblemDetector, RepeatRemover, Suggestion,
};
use crate::error::{Result, SynthesisError};
use crate::history::{ChangeRecord, History, SequenceState};
use crate::planner::{CodonSubstitutionPlanner, SubstitutionPlan};
use crate::{log_error, log_operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Nombre maximal d'itérations par défaut
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Fenêtre de répétition par défaut (en nucléotides)
pub const DEFAULT_REPEAT_WINDOW: usize = 18;

pub const HOMOPOLYMER_REASON: &str = "Homopolymers";
pub const USER_REMOVAL_REASON: &str = "Removal requested by user";

/// Statut terminal d'une correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixStatus {
    /// Plus aucun problème détecté
    Converged,
    /// Borne d'itérations atteinte (ou plus aucun progrès possible)
    Exhausted,
    /// Annulation demandée par l'appelant
    Cancelled,
    /// Entrée ou configuration invalide, rien n'a été modifié
    ConfigurationError,
}

impl fmt::Display for FixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FixStatus::Converged => "converged",
            FixStatus::Exhausted => "exhausted",
            FixStatus::Cancelled => "cancelled",
            FixStatus::ConfigurationError => "configuration-error",
        };
        write!(f, "{}", label)
    }
}

/// Fenêtre de contrôle du contenu GC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcWindowConfig {
    pub window: usize,
    pub gc_min: f64,
    pub gc_max: f64,
}

/// Configuration du correcteur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    /// Nombre maximal d'itérations appliquées
    pub max_iterations: usize,
    /// Longueur de fenêtre des répétitions (None = pas de contrôle)
    pub repeat_window: Option<usize>,
    /// Homopolymères interdits
    pub homopolymer_patterns: Vec<String>,
    /// Motifs à supprimer demandés par l'utilisateur
    pub forbidden_sequences: Vec<String>,
    /// Contrôle du contenu GC
    pub gc_window: Option<GcWindowConfig>,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            repeat_window: Some(DEFAULT_REPEAT_WINDOW),
            homopolymer_patterns: vec!["AAAAAAAA".to_string(), "GGGGGGGG".to_string()],
            forbidden_sequences: Vec::new(),
            gc_window: None,
        }
    }
}

impl FixerConfig {
    /// Charge la configuration depuis du JSON (champs absents = défaut)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Charge la configuration depuis un fichier JSON
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Construit et valide l'ensemble des détecteurs
    pub fn build_detectors(&self) -> Result<Vec<Box<dyn ProblemDetector>>> {
        let mut detectors: Vec<Box<dyn ProblemDetector>> = Vec::new();

        if !self.homopolymer_patterns.is_empty() {
            detectors.push(Box::new(ExactMatchRemover::new(
                &self.homopolymer_patterns,
                HOMOPOLYMER_REASON,
            )?));
        }
        if !self.forbidden_sequences.is_empty() {
            detectors.push(Box::new(ExactMatchRemover::new(
                &self.forbidden_sequences,
                USER_REMOVAL_REASON,
            )?));
        }
        if let Some(window) = self.repeat_window {
            detectors.push(Box::new(RepeatRemover::new(window)?));
        }
        if let Some(gc) = &self.gc_window {
            detectors.push(Box::new(GcContentRemover::new(gc.window, gc.gc_min, gc.gc_max)?));
        }

        if detectors.is_empty() {
            return Err(SynthesisError::Configuration(
                "Aucun détecteur configuré".to_string(),
            ));
        }
        Ok(detectors)
    }
}

/// Jeton d'annulation partagé entre l'appelant et la boucle
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demande l'arrêt; pris en compte à la fin du balayage en cours
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Résultat d'une correction
#[derive(Debug, Clone, Serialize)]
pub struct FixOutcome {
    /// Identifiant de l'exécution
    pub run_id: Uuid,
    pub status: FixStatus,
    /// Séquence finale (nucléotides)
    pub sequence: String,
    /// Protéine codée, identique à celle de l'entrée
    pub protein: String,
    /// Journal ordonné des changements
    pub changes: Vec<ChangeRecord>,
    /// Nombre d'itérations appliquées
    pub iterations: usize,
    /// Problèmes encore détectés à l'arrêt
    pub remaining: Vec<Suggestion>,
    /// Checksum SHA-256 de la séquence finale
    pub checksum: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

enum LoopState {
    Scanning,
    Planning(Vec<Suggestion>),
    Applying(SubstitutionPlan),
    Converged,
    Exhausted(Vec<Suggestion>),
    Cancelled(Vec<Suggestion>),
}

/// Correcteur de CDS par substitutions synonymes
pub struct CdsFixer {
    table: CodonTable,
    detectors: Vec<Box<dyn ProblemDetector>>,
    max_iterations: usize,
    cancellation: CancellationToken,
}

impl CdsFixer {
    pub fn new(table: CodonTable, detectors: Vec<Box<dyn ProblemDetector>>) -> Self {
        Self {
            table,
            detectors,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cancellation: CancellationToken::new(),
        }
    }

    /// Crée un correcteur depuis une configuration
    pub fn from_config(table: CodonTable, config: &FixerConfig) -> Result<Self> {
        let detectors = config.build_detectors()?;
        Ok(Self::new(table, detectors).with_max_iterations(config.max_iterations))
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Jeton permettant d'annuler une correction depuis un autre thread
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn table(&self) -> &CodonTable {
        &self.table
    }

    /// Un seul balayage de détection, sans modification
    pub fn scan(&self, cds: &str) -> Result<Vec<Suggestion>> {
        let state = SequenceState::from_cds(cds, &self.table)?;
        Ok(detectors::scan(&self.detectors, &state.snapshot()))
    }

    /// Corrige une CDS
    ///
    /// `Ok` uniquement si la séquence a convergé. Une borne d'itérations
    /// atteinte donne `ConvergenceFailure` et une annulation `Cancelled`;
    /// dans les deux cas l'erreur porte le meilleur résultat obtenu.
    pub fn fix(&self, cds: &str) -> Result<FixOutcome> {
        log_operation!("fix_cds", {
            let started_at = Utc::now();
            let mut state = SequenceState::from_cds(cds, &self.table)?;
            let protein = self.table.translate(state.codons())?;
            let planner = CodonSubstitutionPlanner::new(&self.table);
            let mut history = History::new();

            tracing::info!(
                codons = state.len(),
                detectors = self.detectors.len(),
                max_iterations = self.max_iterations,
                "Début de la correction"
            );

            let mut loop_state = LoopState::Scanning;
            let (status, remaining) = loop {
                loop_state = match loop_state {
                    LoopState::Scanning => {
                        let snapshot = state.snapshot();
                        let suggestions = detectors::scan(&self.detectors, &snapshot);
                        tracing::debug!(
                            iteration = state.iteration(),
                            suggestions = suggestions.len(),
                            "Balayage terminé"
                        );

                        if self.cancellation.is_cancelled() {
                            LoopState::Cancelled(suggestions)
                        } else if suggestions.is_empty() {
                            LoopState::Converged
                        } else if state.iteration() >= self.max_iterations {
                            LoopState::Exhausted(suggestions)
                        } else {
                            LoopState::Planning(suggestions)
                        }
                    }
                    LoopState::Planning(suggestions) => {
                        let step = state.iteration() + 1;
                        let plan = planner
                            .plan(&state, &suggestions, step)
                            .map_err(|e| log_error!(e))?;

                        if plan.is_empty() {
                            tracing::warn!(
                                iteration = state.iteration(),
                                remaining = suggestions.len(),
                                "Aucune substitution possible, arrêt"
                            );
                            LoopState::Exhausted(suggestions)
                        } else {
                            LoopState::Applying(plan)
                        }
                    }
                    LoopState::Applying(plan) => {
                        state
                            .apply(&plan.replacements)
                            .map_err(|e| log_error!(e))?;
                        tracing::debug!(
                            step = state.iteration(),
                            changed = plan.changes.len(),
                            "Substitutions appliquées"
                        );
                        history.append(plan.changes);
                        LoopState::Scanning
                    }
                    LoopState::Converged => break (FixStatus::Converged, Vec::new()),
                    LoopState::Exhausted(remaining) => break (FixStatus::Exhausted, remaining),
                    LoopState::Cancelled(remaining) => break (FixStatus::Cancelled, remaining),
                };
            };

            let final_protein = self.table.translate(state.codons())?;
            if final_protein != protein {
                return Err(log_error!(SynthesisError::InternalInconsistency(
                    "La protéine codée a changé".to_string()
                )));
            }

            let sequence = state.to_string();
            let checksum = format!("{:x}", Sha256::digest(sequence.as_bytes()));
            let outcome = FixOutcome {
                run_id: Uuid::new_v4(),
                status,
                sequence,
                protein,
                changes: history.into_records(),
                iterations: state.iteration(),
                remaining,
                checksum,
                started_at,
                finished_at: Utc::now(),
            };

            match status {
                FixStatus::Converged => {
                    tracing::info!(
                        iterations = outcome.iterations,
                        changes = outcome.changes.len(),
                        "Séquence corrigée"
                    );
                    Ok(outcome)
                }
                FixStatus::Cancelled => {
                    tracing::warn!(iterations = outcome.iterations, "Correction annulée");
                    Err(SynthesisError::Cancelled(Box::new(outcome)))
                }
                _ => {
                    tracing::warn!(
                        iterations = outcome.iterations,
                        remaining = outcome.remaining.len(),
                        "Pas de convergence"
                    );
                    Err(SynthesisError::ConvergenceFailure(Box::new(outcome)))
                }
            }
        })
    }
}

/// Corrige une CDS selon une configuration
pub fn fix_cds(cds: &str, table: CodonTable, config: &FixerConfig) -> Result<FixOutcome> {
    CdsFixer::from_config(table, config)?.fix(cds)
}

/// Correction avec les réglages usuels: homopolymères de 8, répétitions de
/// 18 nucléotides et motifs demandés par l'utilisateur
pub fn fix_cds_simple<S: AsRef<str>>(
    cds: &str,
    table: CodonTable,
    sequences_to_remove: &[S],
) -> Result<FixOutcome> {
    let config = FixerConfig {
        forbidden_sequences: sequences_to_remove
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect(),
        ..Default::default()
    };
    fix_cds(cds, table, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FixerConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.repeat_window, Some(18));
        assert_eq!(config.build_detectors().unwrap().len(), 2);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = FixerConfig::from_json(
            r#"{"forbidden_sequences": ["GAATTC"], "gc_window": {"window": 30, "gc_min": 0.3, "gc_max": 0.7}}"#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.forbidden_sequences, vec!["GAATTC"]);
        assert_eq!(config.build_detectors().unwrap().len(), 4);
    }

    #[test]
    fn test_invalid_detector_config() {
        let config = FixerConfig {
            forbidden_sequences: vec!["GAZTC".to_string()],
            ..Default::default()
        };
        assert!(matches!(config.build_detectors(), Err(e) if e.is_configuration_error()));

        let config = FixerConfig {
            repeat_window: Some(0),
            ..Default::default()
        };
        assert!(config.build_detectors().is_err());

    }

    #[test]
    fn test_empty_detector_set_is_rejected() {
        let config = FixerConfig {
            repeat_window: None,
            homopolymer_patterns: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.build_detectors(), Err(e) if e.is_configuration_error()));
        assert!(CdsFixer::from_config(CodonTable::standard(), &config).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixer.json");
        std::fs::write(&path, r#"{"max_iterations": 12, "repeat_window": null}"#).unwrap();

        let config = FixerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.max_iterations, 12);
        assert_eq!(config.repeat_window, None);
        assert_eq!(config.homopolymer_patterns, FixerConfig::default().homopolymer_patterns);

        assert!(FixerConfig::load_from_file(dir.path().join("absent.json")).is_err());

        std::fs::write(&path, "{ pas du json").unwrap();
        assert!(matches!(
            FixerConfig::load_from_file(&path),
            Err(SynthesisError::Serialization(_))
        ));
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_clean_sequence_converges_without_changes() {
        let table = CodonTable::escherichia_coli();
        let outcome = fix_cds_simple("ATGGCTAAACGTTAA", table, &[] as &[&str]).unwrap();
        assert_eq!(outcome.status, FixStatus::Converged);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.changes.is_empty());
        assert_eq!(outcome.sequence, "ATGGCTAAACGTTAA");
        assert_eq!(outcome.protein, "MAKR*");
        assert_eq!(outcome.checksum.len(), 64);
    }
}
