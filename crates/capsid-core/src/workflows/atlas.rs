use super::annotate::{self, AnnotationSummary, SummaryTables};
use crate::core::classifier::Classifier;
use crate::core::models::annotation::AnnotatedEntry;
use crate::core::models::entry::Entry;
use crate::core::rules::RuleTables;
use crate::core::similarity::{SimilarityReport, SimilarityStrategy, StructureEntry, build_matrix};
use crate::engine::clustering::{ClusterAssignment, Dendrogram, dendrogram};
use crate::engine::config::AtlasConfig;
use crate::engine::error::EngineError;
use crate::engine::network::{CooccurrenceNetwork, build_network};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::transitions::{TransitionHypothesis, infer_transitions};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};

/// Every artifact of one atlas run.
#[derive(Debug, Clone, Serialize)]
pub struct AtlasResult {
    pub annotated: Vec<AnnotatedEntry>,
    pub summary: AnnotationSummary,
    pub tables: SummaryTables,
    pub similarity: SimilarityReport,
    pub dendrogram: Dendrogram,
    /// One assignment per cutoff; the primary cutoff comes first.
    pub assignments: Vec<ClusterAssignment>,
    pub network: CooccurrenceNetwork,
    pub transitions: Vec<TransitionHypothesis>,
}

impl AtlasResult {
    pub fn primary(&self) -> &ClusterAssignment {
        &self.assignments[0]
    }
}

fn ensure_not_cancelled(cancel: &AtomicBool, stage: &'static str) -> Result<(), EngineError> {
    if cancel.load(Ordering::Relaxed) {
        warn!(stage, "Cancellation requested; aborting run.");
        return Err(EngineError::Cancelled { stage });
    }
    Ok(())
}

/// Runs the full batch pipeline over a curated catalog.
///
/// Stages run strictly in sequence: annotation, pairwise similarity over the
/// structure-bearing entries, average-linkage clustering, flat cuts at every
/// configured cutoff, the domain co-occurrence network over all entries, and
/// transition inference on the primary cut. `cancel` is polled before each
/// stage starts.
///
/// # Errors
///
/// Returns [`EngineError::Cancelled`] when `cancel` is set,
/// [`EngineError::EmptyInput`] when no entry carries a structure, and
/// propagates similarity and configuration failures.
#[instrument(skip_all, name = "atlas_workflow")]
pub fn run(
    entries: Vec<Entry>,
    tables: &RuleTables,
    config: &AtlasConfig,
    reporter: &ProgressReporter,
    cancel: &AtomicBool,
) -> Result<AtlasResult, EngineError> {
    info!(entries = entries.len(), "Starting atlas run.");

    // === Stage 1: Annotation ===
    ensure_not_cancelled(cancel, "annotate")?;
    reporter.report(Progress::StageStart { name: "annotate" });
    let classifier = Classifier::new(tables.clone());
    let (annotated, summary) = annotate::run(entries, &classifier);
    let tables = annotate::summary_tables(&annotated);
    reporter.report(Progress::StageFinish);

    // === Stage 2: Pairwise similarity ===
    ensure_not_cancelled(cancel, "similarity")?;
    reporter.report(Progress::StageStart { name: "similarity" });
    let structures: Vec<StructureEntry> = annotated
        .iter()
        .filter_map(StructureEntry::from_annotated)
        .collect();
    if structures.is_empty() {
        return Err(EngineError::EmptyInput {
            stage: "similarity",
            reason: "no entry carries a structure identifier".to_string(),
        });
    }
    let (strategy, probe_warning) =
        SimilarityStrategy::probe(config.similarity.mode, &config.similarity.aligner);
    if let Some(warning) = &probe_warning {
        warn!(message = %warning.message, "Similarity probe fell back.");
        reporter.report(Progress::Message(warning.message.clone()));
    }
    let n = structures.len() as u64;
    reporter.report(Progress::TaskStart {
        total: n * n.saturating_sub(1) / 2,
    });
    let mut similarity = build_matrix(&structures, &strategy, config.similarity.max_structures, || {
        reporter.report(Progress::TaskIncrement)
    })?;
    reporter.report(Progress::TaskFinish);
    if let Some(warning) = probe_warning {
        similarity.warnings.insert(0, warning);
    }
    reporter.report(Progress::StageFinish);

    // === Stage 3: Dendrogram ===
    ensure_not_cancelled(cancel, "dendrogram")?;
    reporter.report(Progress::StageStart { name: "dendrogram" });
    let tree = dendrogram(&similarity.matrix)?;
    reporter.report(Progress::StageFinish);

    // === Stage 4: Flat cuts ===
    ensure_not_cancelled(cancel, "cuts")?;
    reporter.report(Progress::StageStart { name: "cuts" });
    let cutoffs = config.clustering.all_cutoffs();
    reporter.report(Progress::TaskStart {
        total: cutoffs.len() as u64,
    });
    let mut assignments = Vec::with_capacity(cutoffs.len());
    for cutoff in cutoffs {
        let assignment = tree.cut(cutoff)?;
        info!(
            cutoff,
            clusters = assignment.cluster_count(),
            "Dendrogram cut."
        );
        assignments.push(assignment);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::StageFinish);

    // === Stage 5: Co-occurrence network ===
    ensure_not_cancelled(cancel, "network")?;
    reporter.report(Progress::StageStart { name: "network" });
    let network = build_network(annotated.iter().map(|a| &a.entry));
    reporter.report(Progress::StageFinish);

    // === Stage 6: Transition inference ===
    ensure_not_cancelled(cancel, "transitions")?;
    reporter.report(Progress::StageStart { name: "transitions" });
    let transitions = infer_transitions(
        &assignments[0],
        &annotated,
        &network,
        &config.transitions,
    );
    reporter.report(Progress::StageFinish);

    info!(
        structures = similarity.matrix.len(),
        clusters = assignments[0].cluster_count(),
        network_nodes = network.node_count(),
        network_edges = network.edge_count(),
        transitions = transitions.len(),
        "Atlas run finished."
    );

    Ok(AtlasResult {
        annotated,
        summary,
        tables,
        similarity,
        dendrogram: tree,
        assignments,
        network,
        transitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::similarity::{ProbeMode, StrategyKind};
    use crate::engine::config::AtlasConfigBuilder;
    use std::sync::Mutex;

    fn catalog() -> Vec<Entry> {
        vec![
            Entry::new("P1")
                .with_organism("Adeno-associated virus 2")
                .with_protein_name("capsid protein VP1")
                .with_domains(["PF00740"])
                .with_length(735)
                .with_structure("1LP3"),
            Entry::new("P2")
                .with_organism("Canine parvovirus")
                .with_protein_name("capsid protein VP2")
                .with_domains(["PF00740"])
                .with_length(584)
                .with_structure("2CAS"),
            Entry::new("P3")
                .with_organism("Human adenovirus 5")
                .with_protein_name("hexon protein")
                .with_domains(["PF00608", "PF09018"])
                .with_length(952)
                .with_structure("1P30"),
            Entry::new("P4").with_protein_name("hypothetical protein"),
        ]
    }

    fn simulated_config() -> AtlasConfig {
        AtlasConfigBuilder::new()
            .similarity_mode(ProbeMode::Simulated)
            .primary_cutoff(0.5)
            .extra_cutoffs(vec![0.3])
            .min_support(1)
            .precedence(crate::engine::config::Precedence::default().order().to_vec())
            .build()
            .unwrap()
    }

    #[test]
    fn run_produces_every_artifact() {
        let result = run(
            catalog(),
            &RuleTables::default(),
            &simulated_config(),
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        )
        .unwrap();

        assert_eq!(result.annotated.len(), 4);
        assert_eq!(result.summary.total, 4);
        assert_eq!(result.tables.genome_architecture.total, 4);
        assert_eq!(
            result.tables.architectures.iter().map(|a| a.total_proteins).sum::<usize>(),
            4
        );
        assert_eq!(result.similarity.strategy, StrategyKind::Simulated);
        assert_eq!(result.similarity.matrix.len(), 3);
        assert_eq!(result.dendrogram.leaf_count(), 3);
        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.primary().cutoff, 0.5);
        assert_eq!(result.primary().label("P1"), result.primary().label("P2"));
        assert!(result.network.has_edge("PF00608", "PF09018"));
    }

    #[test]
    fn stages_are_reported_in_order() {
        let stages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StageStart { name } = event {
                stages.lock().unwrap().push(name);
            }
        }));
        run(
            catalog(),
            &RuleTables::default(),
            &simulated_config(),
            &reporter,
            &AtomicBool::new(false),
        )
        .unwrap();
        drop(reporter);
        assert_eq!(
            stages.into_inner().unwrap(),
            vec!["annotate", "similarity", "dendrogram", "cuts", "network", "transitions"]
        );
    }

    #[test]
    fn similarity_stage_counts_every_structure_pair() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        run(
            catalog(),
            &RuleTables::default(),
            &simulated_config(),
            &reporter,
            &AtomicBool::new(false),
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let start = events
            .iter()
            .position(|e| *e == Progress::StageStart { name: "similarity" })
            .unwrap();
        let finish = start + events[start..].iter().position(|e| *e == Progress::StageFinish).unwrap();
        let stage = &events[start..finish];
        assert!(stage.contains(&Progress::TaskStart { total: 3 }));
        assert_eq!(stage.iter().filter(|e| **e == Progress::TaskIncrement).count(), 3);
        assert!(stage.contains(&Progress::TaskFinish));
    }

    #[test]
    fn set_cancel_flag_aborts_before_first_stage() {
        let err = run(
            catalog(),
            &RuleTables::default(),
            &simulated_config(),
            &ProgressReporter::new(),
            &AtomicBool::new(true),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Cancelled { stage: "annotate" }));
    }

    #[test]
    fn catalog_without_structures_is_rejected() {
        let entries = vec![Entry::new("X1"), Entry::new("X2")];
        let err = run(
            entries,
            &RuleTables::default(),
            &simulated_config(),
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput { stage: "similarity", .. }));
    }

    #[test]
    fn missing_aligner_falls_back_and_records_warning() {
        let config = AtlasConfigBuilder::new()
            .similarity_mode(ProbeMode::Auto)
            .aligner_binary("definitely-not-an-aligner-binary")
            .primary_cutoff(0.5)
            .min_support(1)
            .precedence(crate::engine::config::Precedence::default().order().to_vec())
            .build()
            .unwrap();
        let result = run(
            catalog(),
            &RuleTables::default(),
            &config,
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(result.similarity.strategy, StrategyKind::Simulated);
        assert!(result.similarity.warnings[0].pair.is_none());
    }
}
