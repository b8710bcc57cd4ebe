//! CDSFix Core Library
//!
//! Correction de séquences codantes avant synthèse: suppression des motifs
//! interdits (sites de restriction, homopolymères, répétitions) par
//! substitution de codons synonymes, sans changer la protéine codée.

pub mod codon_table;
pub mod detectors;
pub mod error;
pub mod fixer;
pub mod history;
pub mod logging;
pub mod planner;
pub mod sequence;
pub mod stats;

// Réexportations principales
pub use codon_table::{AminoAcidSpec, CodonSpec, CodonTable, CodonUsage};
pub use detectors::{
    ExactMatchRemover, GcBias, GcContentRemover, ProblemDetector, RepeatRemover, Suggestion,
};
pub use error::{Result, SynthesisError};
pub use fixer::{
    fix_cds, fix_cds_simple, CancellationToken, CdsFixer, FixOutcome, FixStatus, FixerConfig,
    GcWindowConfig,
};
pub use history::{ChangeRecord, History, SequenceState};
pub use logging::init_logging;
// Les macros log_operation et log_error sont automatiquement exportées à la racine du crate
pub use planner::{CodonSubstitutionPlanner, SubstitutionPlan};
pub use sequence::{reverse_complement, Codon, IupacBase};
pub use stats::SequenceStats;
