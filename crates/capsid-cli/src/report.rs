use crate::error::{CliError, Result};
use capsidomics::core::io::catalog::AnnotatedCatalogFile;
use capsidomics::core::io::matrix::MatrixFile;
use capsidomics::core::io::traits::TabularFile;
use capsidomics::core::classifier::{Classifier, EvidenceChecklist};
use capsidomics::core::models::annotation::{AnnotatedEntry, EvidenceLevel};
use capsidomics::engine::clustering::{ClusterAssignment, Merge};
use capsidomics::workflows::annotate;
use capsidomics::workflows::atlas::AtlasResult;
use capsidomics::workflows::curate::CurationReport;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const ANNOTATED_CSV: &str = "annotated.csv";
pub const HIGH_CONFIDENCE_CSV: &str = "high_confidence.csv";
pub const MATRIX_CSV: &str = "similarity_matrix.csv";
pub const SUMMARY_JSON: &str = "summary.json";
pub const TABLES_JSON: &str = "summary_tables.json";
pub const CLUSTERING_JSON: &str = "clustering.json";
pub const NETWORK_JSON: &str = "network.json";
pub const TRANSITIONS_JSON: &str = "transitions.json";
pub const WARNINGS_JSON: &str = "similarity_warnings.json";
pub const CURATION_JSON: &str = "curation.json";

#[derive(Serialize)]
struct ClusteringReport<'a> {
    ids: &'a [String],
    merges: &'a [Merge],
    assignments: Vec<AssignmentReport<'a>>,
}

#[derive(Serialize)]
struct AssignmentReport<'a> {
    cutoff: f64,
    cluster_count: usize,
    clusters: Vec<ClusterReport<'a>>,
}

#[derive(Serialize)]
struct ClusterReport<'a> {
    label: usize,
    members: &'a [String],
}

impl<'a> From<&'a ClusterAssignment> for AssignmentReport<'a> {
    fn from(assignment: &'a ClusterAssignment) -> Self {
        Self {
            cutoff: assignment.cutoff,
            cluster_count: assignment.cluster_count(),
            clusters: assignment
                .clusters()
                .map(|(label, members)| ClusterReport { label, members })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Explanation<'a> {
    entry_id: &'a str,
    evidence_level: EvidenceLevel,
    signals: Vec<&'static str>,
    checklist: EvidenceChecklist,
}

/// Per-entry evidence checklists, so each assigned level can be traced to
/// the signals that produced it.
pub fn write_explanations(
    classifier: &Classifier,
    annotated: &[AnnotatedEntry],
    path: &Path,
) -> Result<()> {
    let explanations: Vec<Explanation> = annotated
        .iter()
        .map(|record| {
            let classification = classifier.explain(&record.entry);
            Explanation {
                entry_id: record.id(),
                evidence_level: classification.annotation.evidence_level,
                signals: classification.checklist.fired(),
                checklist: classification.checklist,
            }
        })
        .collect();
    write_json(&explanations, path)
}

pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| CliError::writing(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| CliError::writing(path, e))?;
    writer.flush().map_err(|e| CliError::writing(path, e))?;
    Ok(())
}

pub fn write_annotated(annotated: &[AnnotatedEntry], path: &Path) -> Result<()> {
    AnnotatedCatalogFile::write_to_path(&annotated.to_vec(), path)
        .map_err(|e| CliError::writing(path, e))
}

pub fn write_high_confidence(annotated: &[AnnotatedEntry], path: &Path) -> Result<usize> {
    let high = annotate::high_confidence(annotated);
    AnnotatedCatalogFile::write_to_path(&high, path).map_err(|e| CliError::writing(path, e))?;
    Ok(high.len())
}

/// Writes every artifact of an atlas run into `dir` and returns the paths
/// written, in order.
pub fn write_atlas(
    result: &AtlasResult,
    curation: Option<&CurationReport>,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| CliError::writing(dir, e))?;
    let mut written = Vec::new();
    let mut target = |name: &str| {
        let path = dir.join(name);
        written.push(path.clone());
        path
    };

    write_annotated(&result.annotated, &target(ANNOTATED_CSV))?;
    write_high_confidence(&result.annotated, &target(HIGH_CONFIDENCE_CSV))?;

    let matrix_path = target(MATRIX_CSV);
    MatrixFile::write_to_path(&result.similarity.matrix, &matrix_path)
        .map_err(|e| CliError::writing(&matrix_path, e))?;

    write_json(&result.summary, &target(SUMMARY_JSON))?;
    write_json(&result.tables, &target(TABLES_JSON))?;

    let clustering = ClusteringReport {
        ids: result.dendrogram.ids(),
        merges: result.dendrogram.merges(),
        assignments: result.assignments.iter().map(AssignmentReport::from).collect(),
    };
    write_json(&clustering, &target(CLUSTERING_JSON))?;
    write_json(&result.network, &target(NETWORK_JSON))?;
    write_json(&result.transitions, &target(TRANSITIONS_JSON))?;
    write_json(&result.similarity.warnings, &target(WARNINGS_JSON))?;
    if let Some(report) = curation {
        write_json(report, &target(CURATION_JSON))?;
    }

    info!(dir = %dir.display(), files = written.len(), "Reports written.");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsidomics::core::models::entry::Entry;
    use capsidomics::core::rules::RuleTables;
    use capsidomics::core::similarity::ProbeMode;
    use capsidomics::engine::config::{AtlasConfigBuilder, Precedence};
    use capsidomics::engine::progress::ProgressReporter;
    use capsidomics::workflows::atlas;
    use std::sync::atomic::AtomicBool;

    fn small_result() -> AtlasResult {
        let entries = vec![
            Entry::new("A1")
                .with_protein_name("capsid protein VP1")
                .with_domains(["PF00740"])
                .with_length(600)
                .with_structure("1LP3"),
            Entry::new("A2")
                .with_protein_name("hexon")
                .with_domains(["PF00608"])
                .with_length(950)
                .with_structure("1P30"),
        ];
        let config = AtlasConfigBuilder::new()
            .similarity_mode(ProbeMode::Simulated)
            .primary_cutoff(0.5)
            .min_support(1)
            .precedence(Precedence::default().order().to_vec())
            .build()
            .unwrap();
        atlas::run(
            entries,
            &RuleTables::default(),
            &config,
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        )
        .unwrap()
    }

    #[test]
    fn atlas_reports_are_written_and_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let written = write_atlas(&small_result(), None, &out).unwrap();

        assert_eq!(written.len(), 9);
        assert!(written.iter().all(|p| p.exists()));

        let clustering: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(CLUSTERING_JSON)).unwrap()).unwrap();
        assert_eq!(clustering["ids"].as_array().unwrap().len(), 2);
        assert_eq!(clustering["assignments"].as_array().unwrap().len(), 2);

        let tables: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(TABLES_JSON)).unwrap()).unwrap();
        assert_eq!(tables["genome_architecture"]["total"], 2);
        assert!(tables["architectures"].as_array().unwrap().len() >= 1);

        let matrix = MatrixFile::read_from_path(out.join(MATRIX_CSV)).unwrap();
        assert_eq!(matrix.ids(), &["A1".to_string(), "A2".to_string()]);
    }

    #[test]
    fn explanations_list_fired_signals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explain.json");
        let result = small_result();
        write_explanations(&Classifier::default(), &result.annotated, &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json[0]["entry_id"], "A1");
        assert_eq!(json[0]["evidence_level"], "high");
        assert!(
            json[0]["signals"]
                .as_array()
                .unwrap()
                .iter()
                .any(|s| s == "structure")
        );
    }

    #[test]
    fn curation_report_is_written_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let report = CurationReport {
            input: 3,
            kept: 2,
            duplicates: 1,
            ..CurationReport::default()
        };
        let written = write_atlas(&small_result(), Some(&report), dir.path()).unwrap();
        assert_eq!(written.last(), Some(&dir.path().join(CURATION_JSON)));
    }
}
