//! # Core Module
//!
//! This module provides the stateless building blocks of the capsidomics
//! pipeline: the record vocabulary, the rule tables, the evidence classifier,
//! the pairwise similarity scorers and tabular I/O.
//!
//! ## Architecture
//!
//! - **Record Model** ([`models`]) - Entries, annotations and their closed vocabularies
//! - **Rule Tables** ([`rules`]) - Keyword, domain, family and length tables with TOML loading
//! - **Evidence Classifier** ([`classifier`]) - Ordered rule cascades producing one annotation per entry
//! - **Similarity** ([`similarity`]) - External aligner and deterministic fallback behind one strategy,
//!   plus the dense similarity matrix
//! - **File I/O** ([`io`]) - CSV catalogs and similarity matrices
//!
//! Nothing in this layer holds mutable global state. Every function here is
//! a pure function of its inputs, apart from the bounded external aligner
//! invocation in [`similarity::external`].

pub mod classifier;
pub mod io;
pub mod models;
pub mod rules;
pub mod similarity;
