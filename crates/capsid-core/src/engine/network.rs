use crate::core::models::entry::Entry;
use itertools::Itertools;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

/// Weighted undirected graph over domain identifiers.
///
/// A node's count is the number of entries carrying that domain; an edge's
/// weight is the number of entries carrying both endpoints. Edge keys are
/// stored with the lexicographically smaller identifier first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CooccurrenceNetwork {
    nodes: BTreeMap<String, usize>,
    edges: BTreeMap<(String, String), usize>,
}

fn edge_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

pub fn build_network<'a, I>(entries: I) -> CooccurrenceNetwork
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut network = CooccurrenceNetwork::default();
    for entry in entries {
        let domains: Vec<&String> = entry.domains().iter().sorted().dedup().collect();
        for domain in &domains {
            *network.nodes.entry((*domain).clone()).or_insert(0) += 1;
        }
        for (a, b) in domains.iter().tuple_combinations() {
            *network
                .edges
                .entry(((*a).clone(), (*b).clone()))
                .or_insert(0) += 1;
        }
    }
    debug!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        "Co-occurrence network built."
    );
    network
}

impl CooccurrenceNetwork {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.nodes.contains_key(domain)
    }

    /// Number of entries carrying `domain`.
    pub fn node_count_of(&self, domain: &str) -> usize {
        self.nodes.get(domain).copied().unwrap_or(0)
    }

    /// Edge weight, symmetric in its arguments; `0` when there is no edge.
    pub fn weight(&self, a: &str, b: &str) -> usize {
        if a == b {
            return 0;
        }
        let (lo, hi) = edge_key(a, b);
        self.edges
            .get(&(lo.to_string(), hi.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.weight(a, b) > 0
    }

    /// Neighbours of `domain` with edge weights, in identifier order.
    pub fn neighbors(&self, domain: &str) -> Vec<(&str, usize)> {
        self.edges
            .iter()
            .filter_map(|((a, b), &w)| {
                if a == domain {
                    Some((b.as_str(), w))
                } else if b == domain {
                    Some((a.as_str(), w))
                } else {
                    None
                }
            })
            .sorted()
            .collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, usize)> {
        self.nodes.iter().map(|(id, &count)| (id.as_str(), count))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, usize)> {
        self.edges
            .iter()
            .map(|((a, b), &w)| (a.as_str(), b.as_str(), w))
    }
}

#[derive(serde::Serialize)]
struct NodeRecord<'a> {
    id: &'a str,
    entries: usize,
}

#[derive(serde::Serialize)]
struct EdgeRecord<'a> {
    source: &'a str,
    target: &'a str,
    weight: usize,
}

impl Serialize for CooccurrenceNetwork {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes: Vec<NodeRecord> = self
            .nodes()
            .map(|(id, entries)| NodeRecord { id, entries })
            .collect();
        let edges: Vec<EdgeRecord> = self
            .edges()
            .map(|(source, target, weight)| EdgeRecord {
                source,
                target,
                weight,
            })
            .collect();

        let mut state = serializer.serialize_struct("CooccurrenceNetwork", 4)?;
        state.serialize_field("nodes", &nodes)?;
        state.serialize_field("edges", &edges)?;
        state.serialize_field("node_count", &self.node_count())?;
        state.serialize_field("edge_count", &self.edge_count())?;
        state.end()
    }
}
