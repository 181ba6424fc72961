use crate::core::classifier::Classifier;
use crate::core::models::annotation::{AnnotatedEntry, ArchitectureClass, EvidenceLevel, TNumber};
use crate::core::models::entry::{Entry, GenomeType};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, instrument};

const UNASSIGNED_FAMILY: &str = "unassigned";

/// Category totals over an annotated catalog, keyed by vocabulary label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    pub total: usize,
    pub with_structure: usize,
    pub by_evidence_level: BTreeMap<String, usize>,
    pub by_architecture_class: BTreeMap<String, usize>,
    pub by_capsid_role: BTreeMap<String, usize>,
    pub by_t_number: BTreeMap<String, usize>,
    pub by_genome_type: BTreeMap<String, usize>,
    pub by_family: BTreeMap<String, usize>,
    pub by_morphology: BTreeMap<String, usize>,
}

impl AnnotationSummary {
    pub fn count(&self, level: EvidenceLevel) -> usize {
        self.by_evidence_level
            .get(level.as_str())
            .copied()
            .unwrap_or(0)
    }
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

pub fn summarize(annotated: &[AnnotatedEntry]) -> AnnotationSummary {
    let mut summary = AnnotationSummary {
        total: annotated.len(),
        ..AnnotationSummary::default()
    };
    for record in annotated {
        let a = &record.annotation;
        if record.entry.has_structure() {
            summary.with_structure += 1;
        }
        bump(&mut summary.by_evidence_level, a.evidence_level.as_str());
        bump(&mut summary.by_architecture_class, a.architecture_class.as_str());
        bump(&mut summary.by_capsid_role, a.capsid_role.as_str());
        bump(&mut summary.by_t_number, a.t_number.as_str());
        bump(&mut summary.by_genome_type, a.genome_type.as_str());
        bump(
            &mut summary.by_family,
            a.inferred_family.as_deref().unwrap_or(UNASSIGNED_FAMILY),
        );
        bump(&mut summary.by_morphology, a.virion_morphology.as_str());
    }
    summary
}

/// One row of the family overview: entries sharing an inferred family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyOverview {
    pub family: String,
    pub protein_count: usize,
    /// Most common value among the family's entries; ties go to the
    /// earliest vocabulary value.
    pub architecture_class: ArchitectureClass,
    pub genome_type: GenomeType,
    pub t_number: TNumber,
    pub with_structure: usize,
    pub high_confidence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchitectureOverview {
    pub architecture_class: ArchitectureClass,
    pub total_proteins: usize,
    pub families: Vec<String>,
    pub genome_types: Vec<GenomeType>,
    pub t_numbers: Vec<TNumber>,
    pub with_structure: usize,
    /// Share of entries with a structure, in percent rounded to one decimal.
    pub structure_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomeArchitectureRow {
    pub genome_type: GenomeType,
    /// Aligned with [`GenomeArchitectureMatrix::architectures`].
    pub counts: Vec<usize>,
    pub total: usize,
}

/// Genome type by architecture crosstab over the observed values, with
/// row and column totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenomeArchitectureMatrix {
    pub architectures: Vec<ArchitectureClass>,
    pub rows: Vec<GenomeArchitectureRow>,
    pub column_totals: Vec<usize>,
    pub total: usize,
}

impl GenomeArchitectureMatrix {
    pub fn count(&self, genome_type: GenomeType, architecture: ArchitectureClass) -> usize {
        let Some(column) = self.architectures.iter().position(|a| *a == architecture) else {
            return 0;
        };
        self.rows
            .iter()
            .find(|row| row.genome_type == genome_type)
            .map_or(0, |row| row.counts[column])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTables {
    pub families: Vec<FamilyOverview>,
    pub architectures: Vec<ArchitectureOverview>,
    pub genome_architecture: GenomeArchitectureMatrix,
}

fn most_common<T: Ord + Copy>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, x), (b, y)| x.cmp(y).then_with(|| b.cmp(a)))
        .map(|(value, _)| value)
}

pub fn family_overview(annotated: &[AnnotatedEntry]) -> Vec<FamilyOverview> {
    let mut by_family: BTreeMap<&str, Vec<&AnnotatedEntry>> = BTreeMap::new();
    for record in annotated {
        if let Some(family) = record.annotation.inferred_family.as_deref().filter(|f| !f.is_empty()) {
            by_family.entry(family).or_default().push(record);
        }
    }

    let mut rows: Vec<FamilyOverview> = by_family
        .into_iter()
        .map(|(family, members)| FamilyOverview {
            family: family.to_string(),
            protein_count: members.len(),
            architecture_class: most_common(members.iter().map(|m| m.annotation.architecture_class))
                .unwrap_or_default(),
            genome_type: most_common(members.iter().map(|m| m.annotation.genome_type))
                .unwrap_or_default(),
            t_number: most_common(members.iter().map(|m| m.annotation.t_number)).unwrap_or_default(),
            with_structure: members.iter().filter(|m| m.entry.has_structure()).count(),
            high_confidence: members
                .iter()
                .filter(|m| m.annotation.evidence_level == EvidenceLevel::High)
                .count(),
        })
        .collect();
    // Stable sort keeps family names ascending within equal counts.
    rows.sort_by(|a, b| b.protein_count.cmp(&a.protein_count));
    rows
}

pub fn architecture_overview(annotated: &[AnnotatedEntry]) -> Vec<ArchitectureOverview> {
    let mut by_class: BTreeMap<ArchitectureClass, Vec<&AnnotatedEntry>> = BTreeMap::new();
    for record in annotated {
        by_class
            .entry(record.annotation.architecture_class)
            .or_default()
            .push(record);
    }

    let mut rows: Vec<ArchitectureOverview> = by_class
        .into_iter()
        .map(|(class, members)| {
            let with_structure = members.iter().filter(|m| m.entry.has_structure()).count();
            let percent = 100.0 * with_structure as f64 / members.len() as f64;
            ArchitectureOverview {
                architecture_class: class,
                total_proteins: members.len(),
                families: members
                    .iter()
                    .filter_map(|m| m.annotation.inferred_family.clone())
                    .filter(|f| !f.is_empty())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
                genome_types: members
                    .iter()
                    .map(|m| m.annotation.genome_type)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
                t_numbers: members
                    .iter()
                    .map(|m| m.annotation.t_number)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect(),
                with_structure,
                structure_percent: (percent * 10.0).round() / 10.0,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_proteins.cmp(&a.total_proteins));
    rows
}

pub fn genome_architecture_matrix(annotated: &[AnnotatedEntry]) -> GenomeArchitectureMatrix {
    let architectures: Vec<ArchitectureClass> = annotated
        .iter()
        .map(|a| a.annotation.architecture_class)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut by_genome: BTreeMap<GenomeType, Vec<usize>> = BTreeMap::new();
    for record in annotated {
        let a = &record.annotation;
        if let Some(column) = architectures.iter().position(|c| *c == a.architecture_class) {
            by_genome
                .entry(a.genome_type)
                .or_insert_with(|| vec![0; architectures.len()])[column] += 1;
        }
    }

    let mut column_totals = vec![0; architectures.len()];
    let rows: Vec<GenomeArchitectureRow> = by_genome
        .into_iter()
        .map(|(genome_type, counts)| {
            for (total, count) in column_totals.iter_mut().zip(&counts) {
                *total += count;
            }
            GenomeArchitectureRow {
                genome_type,
                total: counts.iter().sum(),
                counts,
            }
        })
        .collect();

    GenomeArchitectureMatrix {
        architectures,
        rows,
        column_totals,
        total: annotated.len(),
    }
}

pub fn summary_tables(annotated: &[AnnotatedEntry]) -> SummaryTables {
    SummaryTables {
        families: family_overview(annotated),
        architectures: architecture_overview(annotated),
        genome_architecture: genome_architecture_matrix(annotated),
    }
}

/// Classifies every entry, preserving input order.
#[instrument(skip_all, name = "annotation_workflow")]
pub fn run(entries: Vec<Entry>, classifier: &Classifier) -> (Vec<AnnotatedEntry>, AnnotationSummary) {
    let annotated: Vec<AnnotatedEntry> = entries
        .into_iter()
        .map(|entry| classifier.annotate(entry))
        .collect();
    let summary = summarize(&annotated);

    info!(
        total = summary.total,
        high = summary.count(EvidenceLevel::High),
        medium = summary.count(EvidenceLevel::Medium),
        low = summary.count(EvidenceLevel::Low),
        "Annotation finished."
    );
    (annotated, summary)
}

pub fn high_confidence(annotated: &[AnnotatedEntry]) -> Vec<AnnotatedEntry> {
    annotated
        .iter()
        .filter(|a| a.annotation.evidence_level == EvidenceLevel::High)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotation::Annotation;

    fn catalog() -> Vec<Entry> {
        vec![
            Entry::new("P1")
                .with_organism("Adeno-associated virus 2")
                .with_protein_name("capsid protein VP1")
                .with_domains(["PF00740"])
                .with_length(735)
                .with_structure("1LP3"),
            Entry::new("P2")
                .with_organism("Human adenovirus 5")
                .with_protein_name("hexon protein")
                .with_domains(["PF00608"])
                .with_length(952),
            Entry::new("P3").with_protein_name("hypothetical protein"),
        ]
    }

    #[test]
    fn run_preserves_order_and_summarizes() {
        let (annotated, summary) = run(catalog(), &Classifier::default());
        let ids: Vec<&str> = annotated.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.with_structure, 1);
        assert_eq!(summary.count(EvidenceLevel::High), 1);
        assert_eq!(summary.count(EvidenceLevel::Medium), 1);
        assert_eq!(summary.count(EvidenceLevel::Low), 1);
        assert_eq!(summary.by_family.get("Adenoviridae"), Some(&1));
        assert_eq!(summary.by_family.get(UNASSIGNED_FAMILY), Some(&1));
        assert_eq!(summary.by_architecture_class.get("DJR"), Some(&1));
    }

    fn annotated(
        id: &str,
        family: Option<&str>,
        class: ArchitectureClass,
        genome_type: GenomeType,
        structure: bool,
    ) -> AnnotatedEntry {
        let mut entry = Entry::new(id);
        if structure {
            entry = entry.with_structure("1ABC");
        }
        AnnotatedEntry {
            entry,
            annotation: Annotation {
                architecture_class: class,
                genome_type,
                inferred_family: family.map(str::to_string),
                evidence_level: if structure { EvidenceLevel::High } else { EvidenceLevel::Low },
                ..Annotation::default()
            },
        }
    }

    fn table_catalog() -> Vec<AnnotatedEntry> {
        use ArchitectureClass::*;
        vec![
            annotated("A", Some("Parvoviridae"), Sjr, GenomeType::SsDna, true),
            annotated("B", Some("Parvoviridae"), Sjr, GenomeType::SsDna, false),
            annotated("C", Some("Parvoviridae"), Djr, GenomeType::SsDna, false),
            annotated("D", Some("Adenoviridae"), Djr, GenomeType::DsDna, true),
            annotated("E", None, Djr, GenomeType::DsDna, false),
            annotated("F", Some(""), Other, GenomeType::Unknown, false),
        ]
    }

    #[test]
    fn family_overview_groups_named_families_by_size() {
        let rows = family_overview(&table_catalog());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].family, "Parvoviridae");
        assert_eq!(rows[0].protein_count, 3);
        assert_eq!(rows[0].architecture_class, ArchitectureClass::Sjr);
        assert_eq!(rows[0].genome_type, GenomeType::SsDna);
        assert_eq!(rows[0].with_structure, 1);
        assert_eq!(rows[0].high_confidence, 1);
        assert_eq!(rows[1].family, "Adenoviridae");
        assert_eq!(rows[1].architecture_class, ArchitectureClass::Djr);
    }

    #[test]
    fn mode_ties_resolve_to_the_earliest_value() {
        assert_eq!(most_common([TNumber::T3, TNumber::T1]), Some(TNumber::T1));
        assert_eq!(most_common(Vec::<TNumber>::new()), None);
    }

    #[test]
    fn architecture_overview_lists_distinct_values_and_structure_share() {
        let rows = architecture_overview(&table_catalog());
        assert_eq!(rows[0].architecture_class, ArchitectureClass::Djr);
        assert_eq!(rows[0].total_proteins, 3);
        assert_eq!(rows[0].families, vec!["Adenoviridae", "Parvoviridae"]);
        assert_eq!(rows[0].genome_types, vec![GenomeType::SsDna, GenomeType::DsDna]);
        assert_eq!(rows[0].with_structure, 1);
        assert_eq!(rows[0].structure_percent, 33.3);

        let sjr = rows
            .iter()
            .find(|r| r.architecture_class == ArchitectureClass::Sjr)
            .unwrap();
        assert_eq!(sjr.structure_percent, 50.0);
    }

    #[test]
    fn genome_architecture_crosstab_has_consistent_margins() {
        let matrix = genome_architecture_matrix(&table_catalog());
        assert_eq!(matrix.total, 6);
        assert_eq!(matrix.count(GenomeType::SsDna, ArchitectureClass::Sjr), 2);
        assert_eq!(matrix.count(GenomeType::DsDna, ArchitectureClass::Djr), 2);
        assert_eq!(matrix.count(GenomeType::DsDna, ArchitectureClass::Sjr), 0);
        assert_eq!(matrix.count(GenomeType::DsRna, ArchitectureClass::Sjr), 0);
        assert_eq!(matrix.rows.iter().map(|r| r.total).sum::<usize>(), matrix.total);
        assert_eq!(matrix.column_totals.iter().sum::<usize>(), matrix.total);
        for row in &matrix.rows {
            assert_eq!(row.counts.iter().sum::<usize>(), row.total);
        }
    }

    #[test]
    fn high_confidence_selects_only_high_entries() {
        let (annotated, _) = run(catalog(), &Classifier::default());
        let high = high_confidence(&annotated);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id(), "P1");
    }
}
