//! # Core Models Module
//!
//! This module contains the record vocabulary shared by every stage of the
//! capsidomics pipeline.
//!
//! ## Overview
//!
//! - [`entry`] - The canonical per-protein record ([`entry::Entry`]) with its genome-type and
//!   host-category vocabularies and domain accession normalization
//! - [`annotation`] - The categorical annotation attached by the evidence classifier:
//!   capsid role, architecture class, T-number, evidence level and virion morphology
//!
//! Models carry no behavior beyond construction, parsing and display. Entries
//! and annotations are immutable once produced for a given input snapshot.
//!
//! ```ignore
//! use capsidomics::core::models::entry::Entry;
//!
//! let entry = Entry::new("P03135")
//!     .with_protein_name("capsid protein VP1")
//!     .with_domains(["PF00740"])
//!     .with_length(735);
//! ```

pub mod annotation;
pub mod entry;
