//! # Engine Module
//!
//! This module implements the relationship-inference stages that run after
//! annotation: hierarchical clustering of the similarity matrix, the domain
//! co-occurrence network and architecture-transition inference, together
//! with the configuration, error and progress types shared by the workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Similarity, clustering and transition settings with a validating builder
//! - **Clustering** ([`clustering`]) - Average-linkage dendrogram and canonical flat cuts
//! - **Co-occurrence** ([`network`]) - Weighted undirected graph over domain identifiers
//! - **Transitions** ([`transitions`]) - Directed architecture-transition hypotheses from mixed clusters
//! - **Progress Monitoring** ([`progress`]) - Stage and task events for front ends
//! - **Error Handling** ([`error`]) - The umbrella error type of the pipeline
//!
//! Every stage consumes the complete output of its predecessor and returns a
//! fresh, self-contained artifact; nothing is updated incrementally.

pub mod clustering;
pub mod config;
pub mod error;
pub mod network;
pub mod progress;
pub mod transitions;
