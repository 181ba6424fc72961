//! # Capsid Atlas Core Library
//!
//! A library for annotating viral capsid proteins that share the jelly-roll
//! fold and for inferring how their architectures relate to one another.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to keep
//! classification, inference and orchestration apart.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Entry`, `Annotation`),
//!   the rule tables and the deterministic classifier, pairwise structural
//!   similarity, and catalog I/O.
//!
//! - **[`engine`]: The Inference Layer.** Average-linkage clustering of the
//!   similarity matrix, the domain co-occurrence network and architecture
//!   transition inference, together with configuration, errors and progress.
//!
//! - **[`workflows`]: The Public API.** Curation, annotation and the full atlas
//!   run that ties `core` and `engine` together.

pub mod core;
pub mod engine;
pub mod workflows;
