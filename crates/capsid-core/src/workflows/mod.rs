//! # Workflows Module
//!
//! This module provides the end-to-end procedures that front ends call to
//! turn a catalog of capsid protein records into an atlas.
//!
//! ## Overview
//!
//! Workflows are the top-level entry points of the library. Each one takes
//! plain inputs (entries, rule tables, a validated configuration), reports
//! progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter)
//! and returns self-contained, serializable artifacts.
//!
//! ## Architecture
//!
//! - **Curation** ([`curate`]) - Length filter and identifier de-duplication ahead of classification
//! - **Annotation** ([`annotate`]) - Rule-based classification with category totals
//! - **Atlas** ([`atlas`]) - Annotation, similarity, clustering, co-occurrence and transitions in one run
//!
//! ## Key Capabilities
//!
//! - **Strictly staged execution** where each stage consumes the complete output of its predecessor
//! - **Whole-run cancellation** checked before every stage
//! - **Graceful degradation** to simulated similarity when no structural aligner is usable

pub mod annotate;
pub mod atlas;
pub mod curate;
