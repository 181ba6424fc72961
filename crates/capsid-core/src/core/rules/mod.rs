//! # Rule Tables Module
//!
//! Static knowledge consumed by the evidence classifier: the role keyword
//! cascade, the catalogue of jelly-roll associated domains, the virus family
//! patterns with their genome/T-number/morphology annotations, the plausible
//! length windows per architecture class, and the evidence policy.
//!
//! The built-in values live in [`defaults`] as `phf` maps and const slices.
//! [`tables::RuleTables`] is the owned, immutable form handed to the
//! classifier, either built from those defaults or loaded from TOML.

pub mod defaults;
pub mod tables;

pub use tables::{
    DomainFold, DomainRule, EvidencePolicy, FamilyRule, LengthRange, RoleKeywordRule,
    RuleTableError, RuleTables,
};
