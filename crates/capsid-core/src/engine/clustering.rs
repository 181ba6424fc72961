use super::config::{ConfigError, validate_cutoff};
use super::error::EngineError;
use crate::core::similarity::SimilarityMatrix;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// One agglomeration step. Leaves are nodes `0..n`; the k-th merge creates
/// node `n + k`. `left` is the child holding the smaller leaf identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
    pub size: usize,
}

/// Average-linkage merge history over identifiers in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dendrogram {
    ids: Vec<String>,
    merges: Vec<Merge>,
}

/// Flat clustering at one dissimilarity cutoff.
///
/// Labels start at 1 and follow each cluster's smallest member identifier,
/// so they depend only on the partition and never on input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    pub cutoff: f64,
    labels: BTreeMap<String, usize>,
    clusters: Vec<Vec<String>>,
}

impl ClusterAssignment {
    pub fn label(&self, id: &str) -> Option<usize> {
        self.labels.get(id).copied()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Members of the cluster with the given label, in identifier order.
    pub fn members(&self, label: usize) -> Option<&[String]> {
        label
            .checked_sub(1)
            .and_then(|i| self.clusters.get(i))
            .map(Vec::as_slice)
    }

    /// `(label, members)` pairs in label order.
    pub fn clusters(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(i, members)| (i + 1, members.as_slice()))
    }

    pub fn labels(&self) -> &BTreeMap<String, usize> {
        &self.labels
    }
}

struct ActiveCluster {
    node: usize,
    /// Leaf indices in ascending order; leaf order equals identifier order.
    members: Vec<usize>,
}

impl ActiveCluster {
    fn smallest(&self) -> usize {
        self.members[0]
    }
}

/// Builds the average-linkage (UPGMA) dendrogram of a similarity matrix.
///
/// Dissimilarity is `1 - s`; missing pairs count as `1`. Cluster distances
/// are recomputed from leaf distances summed in identifier order, and equal
/// heights are broken by the pair of smallest member identifiers, so any
/// permutation of the same matrix yields the same merges.
pub fn dendrogram(matrix: &SimilarityMatrix) -> Result<Dendrogram, EngineError> {
    if matrix.is_empty() {
        return Err(EngineError::EmptyInput {
            stage: "clustering",
            reason: "the similarity matrix has no entries".to_string(),
        });
    }

    let mut ids: Vec<String> = matrix.ids().to_vec();
    ids.sort();
    let n = ids.len();

    let source_index: Vec<usize> = ids
        .iter()
        .filter_map(|id| matrix.index_of(id))
        .collect();
    let leaf_distance: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        0.0
                    } else {
                        let score = matrix.get_by_index(source_index[i], source_index[j]);
                        score.map_or(1.0, |s| 1.0 - s)
                    }
                })
                .collect()
        })
        .collect();

    let average = |a: &ActiveCluster, b: &ActiveCluster| -> f64 {
        let (first, second) = if a.smallest() < b.smallest() { (a, b) } else { (b, a) };
        let mut sum = 0.0;
        for &i in &first.members {
            for &j in &second.members {
                sum += leaf_distance[i][j];
            }
        }
        sum / (first.members.len() * second.members.len()) as f64
    };

    let mut active: Vec<ActiveCluster> = (0..n)
        .map(|i| ActiveCluster {
            node: i,
            members: vec![i],
        })
        .collect();

    let key = |a: usize, b: usize| if a < b { (a, b) } else { (b, a) };
    let mut distances: HashMap<(usize, usize), f64> = HashMap::new();
    for (x, a) in active.iter().enumerate() {
        for b in &active[x + 1..] {
            distances.insert(key(a.node, b.node), average(a, b));
        }
    }

    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    while active.len() > 1 {
        let mut best: Option<(f64, (usize, usize), usize, usize)> = None;
        for x in 0..active.len() {
            for y in (x + 1)..active.len() {
                let (a, b) = (&active[x], &active[y]);
                let height = distances[&key(a.node, b.node)];
                let tie = key(a.smallest(), b.smallest());
                let better = match &best {
                    None => true,
                    Some((best_height, best_tie, _, _)) => {
                        match height.total_cmp(best_height) {
                            Ordering::Less => true,
                            Ordering::Equal => tie < *best_tie,
                            Ordering::Greater => false,
                        }
                    }
                };
                if better {
                    best = Some((height, tie, x, y));
                }
            }
        }

        let Some((height, _, x, y)) = best else {
            break;
        };
        // y > x, so removing y first keeps x valid.
        let b = active.remove(y);
        let a = active.remove(x);
        let (left, right) = if a.smallest() < b.smallest() { (a, b) } else { (b, a) };

        let mut members = left.members.clone();
        members.extend_from_slice(&right.members);
        members.sort_unstable();

        let merged = ActiveCluster {
            node: n + merges.len(),
            members,
        };
        merges.push(Merge {
            left: left.node,
            right: right.node,
            height,
            size: merged.members.len(),
        });

        for other in &active {
            distances.insert(key(merged.node, other.node), average(&merged, other));
        }
        active.push(merged);
    }

    debug!(leaves = n, merges = merges.len(), "Dendrogram built.");
    Ok(Dendrogram { ids, merges })
}

/// Flat clusters of `matrix` at the given dissimilarity cutoff.
pub fn cluster(matrix: &SimilarityMatrix, cutoff: f64) -> Result<ClusterAssignment, EngineError> {
    validate_cutoff("cutoff", cutoff)?;
    Ok(dendrogram(matrix)?.cut(cutoff)?)
}

impl Dendrogram {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    pub fn leaf_count(&self) -> usize {
        self.ids.len()
    }

    /// Applies merges in order while their height is at most `cutoff`.
    pub fn cut(&self, cutoff: f64) -> Result<ClusterAssignment, ConfigError> {
        validate_cutoff("cutoff", cutoff)?;
        let n = self.ids.len();

        // Leaf sets per node: leaves first, then one slot per merge.
        let mut node_leaves: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        let mut root_of: Vec<usize> = (0..n).collect();
        for merge in &self.merges {
            if merge.height > cutoff {
                break;
            }
            let node = node_leaves.len();
            let mut leaves = std::mem::take(&mut node_leaves[merge.left]);
            leaves.append(&mut std::mem::take(&mut node_leaves[merge.right]));
            for &leaf in &leaves {
                root_of[leaf] = node;
            }
            node_leaves.push(leaves);
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for leaf in 0..n {
            groups.entry(root_of[leaf]).or_default().push(leaf);
        }
        let mut clusters: Vec<Vec<usize>> = groups.into_values().collect();
        // Leaves are pushed in ascending order, so each group's first leaf is
        // its smallest identifier.
        clusters.sort_by_key(|members| members[0]);

        let clusters: Vec<Vec<String>> = clusters
            .into_iter()
            .map(|members| members.into_iter().map(|i| self.ids[i].clone()).collect())
            .collect();
        let labels = clusters
            .iter()
            .enumerate()
            .flat_map(|(i, members)| members.iter().map(move |id| (id.clone(), i + 1)))
            .collect();

        Ok(ClusterAssignment {
            cutoff,
            labels,
            clusters,
        })
    }
}
