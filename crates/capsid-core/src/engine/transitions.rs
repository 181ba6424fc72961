use super::clustering::ClusterAssignment;
use super::config::TransitionConfig;
use super::network::CooccurrenceNetwork;
use crate::core::models::annotation::{AnnotatedEntry, ArchitectureClass};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// A directed architecture transition supported by same-cluster pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionHypothesis {
    pub source: ArchitectureClass,
    pub target: ArchitectureClass,
    /// Same-cluster entry pairs oriented `source -> target`.
    pub support: usize,
    /// All cross-class pairs whose source is this hypothesis' source class.
    pub source_total: usize,
    pub confidence: f64,
    pub clusters: Vec<usize>,
    /// Domains carried by both members of at least one supporting pair.
    pub shared_domains: Vec<String>,
    /// Network edges linking a source-member domain to a target-member domain.
    pub cooccurrence_links: usize,
}

#[derive(Default)]
struct Tally<'a> {
    support: usize,
    clusters: BTreeSet<usize>,
    shared_domains: BTreeSet<String>,
    source_domains: BTreeSet<&'a str>,
    target_domains: BTreeSet<&'a str>,
}

/// Proposes architecture transitions from mixed-class clusters.
///
/// Every unordered pair of same-cluster members with different classes
/// yields one candidate oriented from the lower to the higher precedence
/// rank. Candidates are aggregated per `(source, target)`; those below
/// `min_support` are dropped. Output is ordered by support (descending),
/// then source rank, then target rank.
pub fn infer_transitions(
    clusters: &ClusterAssignment,
    annotations: &[AnnotatedEntry],
    network: &CooccurrenceNetwork,
    config: &TransitionConfig,
) -> Vec<TransitionHypothesis> {
    let by_id: HashMap<&str, &AnnotatedEntry> =
        annotations.iter().map(|a| (a.id(), a)).collect();
    let precedence = &config.precedence;

    let mut tallies: BTreeMap<(usize, usize), Tally> = BTreeMap::new();
    let mut source_totals: HashMap<ArchitectureClass, usize> = HashMap::new();

    for (label, members) in clusters.clusters() {
        let present: Vec<&AnnotatedEntry> = members
            .iter()
            .filter_map(|id| {
                let found = by_id.get(id.as_str()).copied();
                if found.is_none() {
                    warn!(entry_id = %id, cluster = label, "Cluster member has no annotation; skipped.");
                }
                found
            })
            .collect();

        for (a, b) in present.iter().tuple_combinations() {
            let (class_a, class_b) = (
                a.annotation.architecture_class,
                b.annotation.architecture_class,
            );
            if class_a == class_b {
                continue;
            }
            let (source, target) = if precedence.rank(class_a) < precedence.rank(class_b) {
                (a, b)
            } else {
                (b, a)
            };
            let source_class = source.annotation.architecture_class;
            let target_class = target.annotation.architecture_class;

            *source_totals.entry(source_class).or_insert(0) += 1;

            let tally = tallies
                .entry((precedence.rank(source_class), precedence.rank(target_class)))
                .or_default();
            tally.support += 1;
            tally.clusters.insert(label);
            tally.shared_domains.extend(
                source
                    .entry
                    .domains()
                    .iter()
                    .filter(|d| target.entry.has_domain(d))
                    .cloned(),
            );
            tally
                .source_domains
                .extend(source.entry.domains().iter().map(String::as_str));
            tally
                .target_domains
                .extend(target.entry.domains().iter().map(String::as_str));
        }
    }

    let order = precedence.order();
    let mut hypotheses: Vec<TransitionHypothesis> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.support >= config.min_support)
        .map(|((source_rank, target_rank), tally)| {
            let source = order[source_rank];
            let target = order[target_rank];
            let source_total = source_totals.get(&source).copied().unwrap_or(tally.support);
            TransitionHypothesis {
                source,
                target,
                support: tally.support,
                source_total,
                confidence: tally.support as f64 / source_total as f64,
                clusters: tally.clusters.into_iter().collect(),
                shared_domains: tally.shared_domains.into_iter().collect(),
                cooccurrence_links: count_links(network, &tally.source_domains, &tally.target_domains),
            }
        })
        .collect();

    hypotheses.sort_by(|x, y| {
        y.support
            .cmp(&x.support)
            .then_with(|| precedence.rank(x.source).cmp(&precedence.rank(y.source)))
            .then_with(|| precedence.rank(x.target).cmp(&precedence.rank(y.target)))
    });

    debug!(hypotheses = hypotheses.len(), "Transition inference finished.");
    hypotheses
}

/// Distinct network edges with one endpoint in each domain set.
fn count_links(
    network: &CooccurrenceNetwork,
    source_domains: &BTreeSet<&str>,
    target_domains: &BTreeSet<&str>,
) -> usize {
    network
        .edges()
        .filter(|(a, b, _)| {
            (source_domains.contains(a) && target_domains.contains(b))
                || (source_domains.contains(b) && target_domains.contains(a))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::annotation::Annotation;
    use crate::core::models::entry::Entry;
    use crate::core::similarity::SimilarityMatrix;
    use crate::engine::clustering::cluster;
    use crate::engine::config::Precedence;
    use crate::engine::network::build_network;

    fn annotated(id: &str, class: ArchitectureClass, domains: &[&str]) -> AnnotatedEntry {
        AnnotatedEntry {
            entry: Entry::new(id).with_domains(domains.iter().copied()),
            annotation: Annotation {
                architecture_class: class,
                ..Annotation::default()
            },
        }
    }

    /// Every listed id in a single cluster.
    fn one_cluster(ids: &[&str]) -> ClusterAssignment {
        let ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        let scores: Vec<(String, String, f64)> = ids
            .iter()
            .tuple_combinations()
            .map(|(a, b)| (a.clone(), b.clone(), 0.9))
            .collect();
        let matrix = SimilarityMatrix::from_scores(ids, scores).unwrap();
        cluster(&matrix, 0.5).unwrap()
    }

    fn config(min_support: usize) -> TransitionConfig {
        TransitionConfig {
            precedence: Precedence::default(),
            min_support,
        }
    }

    #[test]
    fn pairs_are_oriented_by_precedence_and_aggregated() {
        let entries = vec![
            annotated("A", ArchitectureClass::Sjr, &["PF1", "PF2"]),
            annotated("B", ArchitectureClass::Djr, &["PF2", "PF3"]),
            annotated("C", ArchitectureClass::Djr, &["PF3"]),
        ];
        let clusters = one_cluster(&["A", "B", "C"]);
        let network = build_network(entries.iter().map(|a| &a.entry));
        let hypotheses = infer_transitions(&clusters, &entries, &network, &config(1));

        assert_eq!(hypotheses.len(), 1);
        let h = &hypotheses[0];
        assert_eq!((h.source, h.target), (ArchitectureClass::Sjr, ArchitectureClass::Djr));
        assert_eq!(h.support, 2);
        assert_eq!(h.source_total, 2);
        assert!((h.confidence - 1.0).abs() < 1e-12);
        assert_eq!(h.clusters, vec![1]);
        assert_eq!(h.shared_domains, vec!["PF2".to_string()]);
        // PF1-PF2 and PF2-PF3 join source domains {PF1, PF2} to target domains {PF2, PF3}.
        assert_eq!(h.cooccurrence_links, 2);
    }

    #[test]
    fn hypotheses_below_min_support_are_dropped() {
        let entries = vec![
            annotated("A", ArchitectureClass::Sjr, &[]),
            annotated("B", ArchitectureClass::Other, &[]),
        ];
        let clusters = one_cluster(&["A", "B"]);
        let network = CooccurrenceNetwork::default();
        assert!(infer_transitions(&clusters, &entries, &network, &config(2)).is_empty());
        assert_eq!(infer_transitions(&clusters, &entries, &network, &config(1)).len(), 1);
    }

    #[test]
    fn output_is_sorted_and_support_is_conserved() {
        let entries = vec![
            annotated("A", ArchitectureClass::Sjr, &[]),
            annotated("B", ArchitectureClass::Sjr, &[]),
            annotated("C", ArchitectureClass::Other, &[]),
            annotated("D", ArchitectureClass::Other, &[]),
            annotated("E", ArchitectureClass::Djr, &[]),
        ];
        let clusters = one_cluster(&["A", "B", "C", "D", "E"]);
        let network = CooccurrenceNetwork::default();
        let hypotheses = infer_transitions(&clusters, &entries, &network, &config(1));

        let keys: Vec<_> = hypotheses.iter().map(|h| (h.source, h.target, h.support)).collect();
        assert_eq!(
            keys,
            vec![
                (ArchitectureClass::Sjr, ArchitectureClass::Other, 4),
                (ArchitectureClass::Sjr, ArchitectureClass::Djr, 2),
                (ArchitectureClass::Djr, ArchitectureClass::Other, 2),
            ]
        );

        for class in ArchitectureClass::ALL {
            let from: Vec<_> = hypotheses.iter().filter(|h| h.source == class).collect();
            let sum: usize = from.iter().map(|h| h.support).sum();
            if let Some(first) = from.first() {
                assert!(sum <= first.source_total);
            }
        }
        let sjr_total = hypotheses[0].source_total;
        assert_eq!(sjr_total, 6);
    }

    #[test]
    fn custom_precedence_flips_orientation() {
        let entries = vec![
            annotated("A", ArchitectureClass::Sjr, &[]),
            annotated("B", ArchitectureClass::Djr, &[]),
        ];
        let mut order = Precedence::default().order().to_vec();
        order.reverse();
        let config = TransitionConfig {
            precedence: Precedence::new(order).unwrap(),
            min_support: 1,
        };
        let hypotheses = infer_transitions(
            &one_cluster(&["A", "B"]),
            &entries,
            &CooccurrenceNetwork::default(),
            &config,
        );
        assert_eq!(
            (hypotheses[0].source, hypotheses[0].target),
            (ArchitectureClass::Djr, ArchitectureClass::Sjr)
        );
    }

    #[test]
    fn members_without_annotations_are_skipped() {
        let entries = vec![annotated("A", ArchitectureClass::Sjr, &[])];
        let hypotheses = infer_transitions(
            &one_cluster(&["A", "B"]),
            &entries,
            &CooccurrenceNetwork::default(),
            &config(1),
        );
        assert!(hypotheses.is_empty());
    }
}
