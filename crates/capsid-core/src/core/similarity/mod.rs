//! # Similarity Module
//!
//! Pairwise structural similarity between structure-bearing entries and the
//! dense matrix assembled from it.
//!
//! Two interchangeable scorers sit behind [`SimilarityStrategy`]: an external
//! structural aligner ([`external::TmAlignScorer`]) and a deterministic
//! annotation-driven fallback ([`simulated::SimulatedScorer`]). The strategy is
//! chosen once per run by [`SimilarityStrategy::probe`]. Individual aligner
//! failures degrade that pair to the simulated score and are recorded as
//! [`ScoringWarning`]s rather than propagated.

pub mod external;
pub mod matrix;
pub mod simulated;

pub use external::{ScoreScale, TmAlignError, TmAlignOptions, TmAlignScorer};
pub use matrix::SimilarityMatrix;
pub use simulated::SimulatedScorer;

use crate::core::models::annotation::{AnnotatedEntry, ArchitectureClass};
use crate::core::models::entry::GenomeType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const DEFAULT_MAX_STRUCTURES: usize = 500;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimilarityError {
    #[error("Duplicate identifier in similarity matrix: {0}")]
    DuplicateId(String),
    #[error("Identifier not present in similarity matrix: {0}")]
    UnknownId(String),
    #[error("Score {score} for pair ({a}, {b}) lies outside [0, 1]")]
    ScoreOutOfRange { a: String, b: String, score: f64 },
    #[error("{count} structure-bearing entries exceed the configured ceiling of {max}")]
    TooManyStructures { count: usize, max: usize },
}

/// Borrowed view of an annotated entry that carries a structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureEntry<'a> {
    pub id: &'a str,
    pub structure_id: &'a str,
    pub architecture_class: ArchitectureClass,
    pub genome_type: GenomeType,
    pub family: Option<&'a str>,
}

impl<'a> StructureEntry<'a> {
    pub fn from_annotated(entry: &'a AnnotatedEntry) -> Option<Self> {
        let structure_id = entry.entry.structure_id.as_deref()?;
        Some(Self {
            id: &entry.entry.id,
            structure_id,
            architecture_class: entry.annotation.architecture_class,
            genome_type: entry.annotation.genome_type,
            family: entry.annotation.inferred_family.as_deref(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeMode {
    /// External aligner when it resolves, simulated otherwise.
    #[default]
    Auto,
    Simulated,
    /// External aligner requested; still falls back with a warning.
    External,
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Simulated => "simulated",
            Self::External => "external",
        })
    }
}

impl FromStr for ProbeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "simulated" => Ok(Self::Simulated),
            "external" => Ok(Self::External),
            other => Err(format!(
                "unknown similarity mode '{other}' (expected 'auto', 'simulated' or 'external')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    External,
    Simulated,
}

/// A recorded degradation: either the probe fell back, or a single pair
/// could not be scored by the external aligner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoringWarning {
    pub pair: Option<(String, String)>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityStrategy {
    External(TmAlignScorer),
    Simulated(SimulatedScorer),
}

impl SimilarityStrategy {
    /// Selects the scorer for a run. The returned warning, if any, explains a
    /// fallback to the simulated scorer.
    pub fn probe(mode: ProbeMode, options: &TmAlignOptions) -> (Self, Option<ScoringWarning>) {
        let simulated = Self::Simulated(SimulatedScorer::new());
        if mode == ProbeMode::Simulated {
            return (simulated, None);
        }

        let fallback = |message: String| {
            (
                Self::Simulated(SimulatedScorer::new()),
                Some(ScoringWarning {
                    pair: None,
                    message,
                }),
            )
        };

        let Some(binary) = external::locate_binary(&options.binary) else {
            return fallback(format!(
                "structural aligner '{}' not found; using simulated similarity",
                options.binary
            ));
        };
        let Some(structure_dir) = options.structure_dir.clone() else {
            return fallback(
                "no structure directory configured for the aligner; using simulated similarity"
                    .to_string(),
            );
        };

        let scorer = TmAlignScorer::new(binary, structure_dir)
            .with_extension(&options.extension)
            .with_timeout(options.timeout)
            .with_scale(options.scale);
        (Self::External(scorer), None)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::External(_) => StrategyKind::External,
            Self::Simulated(_) => StrategyKind::Simulated,
        }
    }

    /// Scores one pair. External failures degrade to the simulated score and
    /// come back as a warning.
    pub fn similarity(
        &self,
        a: &StructureEntry<'_>,
        b: &StructureEntry<'_>,
    ) -> (f64, Option<ScoringWarning>) {
        match self {
            Self::Simulated(scorer) => (scorer.score(a, b), None),
            Self::External(scorer) => match scorer.score(a.structure_id, b.structure_id) {
                Ok(score) => (score, None),
                Err(e) => {
                    warn!(a = a.id, b = b.id, error = %e, "Aligner failed; using simulated score.");
                    let warning = ScoringWarning {
                        pair: Some((a.id.to_string(), b.id.to_string())),
                        message: e.to_string(),
                    };
                    (SimulatedScorer::new().score(a, b), Some(warning))
                }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityReport {
    pub matrix: SimilarityMatrix,
    pub strategy: StrategyKind,
    pub warnings: Vec<ScoringWarning>,
}

/// Assembles the full similarity matrix over the given entries.
///
/// Entries are indexed in ascending identifier order. Only the upper triangle
/// is scored; scores are written after every pair has been computed, so the
/// result does not depend on evaluation order. `on_pair` runs once per scored
/// pair, possibly from several threads.
pub fn build_matrix<F>(
    entries: &[StructureEntry<'_>],
    strategy: &SimilarityStrategy,
    max_structures: usize,
    on_pair: F,
) -> Result<SimilarityReport, SimilarityError>
where
    F: Fn() + Sync,
{
    if entries.len() > max_structures {
        return Err(SimilarityError::TooManyStructures {
            count: entries.len(),
            max: max_structures,
        });
    }

    let mut ordered: Vec<&StructureEntry<'_>> = entries.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(b.id));

    let ids = ordered.iter().map(|e| e.id.to_string()).collect();
    let mut matrix = SimilarityMatrix::new(ids)?;

    let n = ordered.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let iterator = pairs.par_iter();

    let scored: Vec<(usize, usize, f64, Option<ScoringWarning>)> = iterator
        .map(|&(i, j)| {
            let (score, warning) = strategy.similarity(ordered[i], ordered[j]);
            on_pair();
            (i, j, score, warning)
        })
        .collect();

    let mut warnings = Vec::new();
    for (i, j, score, warning) in scored {
        matrix.set_by_index(i, j, score);
        warnings.extend(warning);
    }

    info!(
        structures = n,
        pairs = pairs.len(),
        strategy = ?strategy.kind(),
        fallbacks = warnings.len(),
        "Similarity matrix assembled."
    );

    Ok(SimilarityReport {
        matrix,
        strategy: strategy.kind(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: &str, class: ArchitectureClass) -> StructureEntry<'_> {
        StructureEntry {
            id,
            structure_id: id,
            architecture_class: class,
            genome_type: GenomeType::Unknown,
            family: None,
        }
    }

    #[test]
    fn every_scored_pair_is_announced() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let entries = [
            view("A", ArchitectureClass::Sjr),
            view("B", ArchitectureClass::Djr),
            view("C", ArchitectureClass::Sjr),
            view("D", ArchitectureClass::Other),
        ];
        let strategy = SimilarityStrategy::Simulated(SimulatedScorer::new());
        let scored = AtomicUsize::new(0);
        build_matrix(&entries, &strategy, DEFAULT_MAX_STRUCTURES, || {
            scored.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(scored.into_inner(), 6);
    }

    #[test]
    fn simulated_matrix_is_symmetric_with_unit_diagonal() {
        let entries = [
            view("C", ArchitectureClass::Djr),
            view("A", ArchitectureClass::Sjr),
            view("B", ArchitectureClass::Sjr),
        ];
        let strategy = SimilarityStrategy::Simulated(SimulatedScorer::new());
        let report = build_matrix(&entries, &strategy, DEFAULT_MAX_STRUCTURES, || {}).unwrap();
        let m = &report.matrix;
        assert_eq!(m.ids(), &["A".to_string(), "B".to_string(), "C".to_string()]);
        for a in m.ids() {
            assert_eq!(m.get(a, a), Some(1.0));
            for b in m.ids() {
                assert_eq!(m.get(a, b), m.get(b, a));
                assert!(m.get(a, b).is_some());
            }
        }
        assert_eq!(report.strategy, StrategyKind::Simulated);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn ceiling_is_enforced() {
        let entries = [view("A", ArchitectureClass::Sjr), view("B", ArchitectureClass::Sjr)];
        let strategy = SimilarityStrategy::Simulated(SimulatedScorer::new());
        assert_eq!(
            build_matrix(&entries, &strategy, 1, || {}).unwrap_err(),
            SimilarityError::TooManyStructures { count: 2, max: 1 }
        );
    }

    #[test]
    fn missing_binary_falls_back_with_one_warning() {
        let options = TmAlignOptions {
            binary: "capsid-no-such-aligner-binary".to_string(),
            ..TmAlignOptions::default()
        };
        for mode in [ProbeMode::Auto, ProbeMode::External] {
            let (strategy, warning) = SimilarityStrategy::probe(mode, &options);
            assert_eq!(strategy.kind(), StrategyKind::Simulated);
            assert!(warning.is_some());
        }
        let (strategy, warning) = SimilarityStrategy::probe(ProbeMode::Simulated, &options);
        assert_eq!(strategy.kind(), StrategyKind::Simulated);
        assert!(warning.is_none());
    }

    #[test]
    fn failing_pairs_degrade_to_simulated_scores() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = SimilarityStrategy::External(TmAlignScorer::new(
            "/nonexistent/TMalign".into(),
            dir.path().to_path_buf(),
        ));
        let entries = [view("A", ArchitectureClass::Sjr), view("B", ArchitectureClass::Sjr)];
        let report = build_matrix(&entries, &strategy, DEFAULT_MAX_STRUCTURES, || {}).unwrap();
        let expected = SimulatedScorer::new().score(&entries[0], &entries[1]);
        assert_eq!(report.matrix.get("A", "B"), Some(expected));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].pair, Some(("A".to_string(), "B".to_string())));
    }

    #[test]
    fn probe_mode_parses_case_insensitively() {
        assert_eq!("EXTERNAL".parse::<ProbeMode>(), Ok(ProbeMode::External));
        assert!("fast".parse::<ProbeMode>().is_err());
    }
}
