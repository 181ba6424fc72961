use super::entry::{Entry, GenomeType, ParseVocabularyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Implements `Display`, `FromStr` and string-based serde for a closed
/// vocabulary enum that exposes `ALL` and `as_str`.
macro_rules! string_vocabulary {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseVocabularyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $ty::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ParseVocabularyError::new($kind, s))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ParseVocabularyError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CapsidRole {
    Mcp,
    Minor,
    Spike,
    Turret,
    Cement,
    Movement,
    Matrix,
    NonCapsid,
    #[default]
    Unknown,
}

impl CapsidRole {
    pub const ALL: [CapsidRole; 9] = [
        Self::Mcp,
        Self::Minor,
        Self::Spike,
        Self::Turret,
        Self::Cement,
        Self::Movement,
        Self::Matrix,
        Self::NonCapsid,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcp => "MCP",
            Self::Minor => "minor",
            Self::Spike => "spike",
            Self::Turret => "turret",
            Self::Cement => "cement",
            Self::Movement => "movement",
            Self::Matrix => "matrix",
            Self::NonCapsid => "non-capsid",
            Self::Unknown => "unknown",
        }
    }

    /// Roles that denote a structural component of the virion shell.
    pub fn is_capsid_component(&self) -> bool {
        matches!(
            self,
            Self::Mcp | Self::Minor | Self::Spike | Self::Turret | Self::Cement
        )
    }
}

string_vocabulary!(CapsidRole, "capsid role");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArchitectureClass {
    Sjr,
    Djr,
    TandemJrf,
    JrfHybrid,
    NucleoplasminLike,
    #[default]
    Other,
}

impl ArchitectureClass {
    pub const ALL: [ArchitectureClass; 6] = [
        Self::Sjr,
        Self::Djr,
        Self::TandemJrf,
        Self::JrfHybrid,
        Self::NucleoplasminLike,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sjr => "SJR",
            Self::Djr => "DJR",
            Self::TandemJrf => "tandem_JRF",
            Self::JrfHybrid => "JRF_hybrid",
            Self::NucleoplasminLike => "nucleoplasmin_like",
            Self::Other => "other",
        }
    }
}

string_vocabulary!(ArchitectureClass, "architecture class");

/// Icosahedral triangulation number, ordered as a categorical scale with
/// `NA` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TNumber {
    T1,
    T3,
    PseudoT3,
    T7,
    T13,
    T25,
    Higher,
    #[default]
    NotApplicable,
}

impl TNumber {
    pub const ALL: [TNumber; 8] = [
        Self::T1,
        Self::T3,
        Self::PseudoT3,
        Self::T7,
        Self::T13,
        Self::T25,
        Self::Higher,
        Self::NotApplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::T1 => "T=1",
            Self::T3 => "T=3",
            Self::PseudoT3 => "pseudo-T=3",
            Self::T7 => "T=7",
            Self::T13 => "T=13",
            Self::T25 => "T=25",
            Self::Higher => "higher",
            Self::NotApplicable => "NA",
        }
    }

    /// Maps a free-form triangulation label (`T=169`, `pseudo-T=25`) onto the
    /// categorical scale. Lattices the scale does not name become `NA`.
    fn from_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_ascii_lowercase();
        if lowered.is_empty() || lowered == "na" {
            return Some(Self::NotApplicable);
        }
        if lowered == "higher" {
            return Some(Self::Higher);
        }
        let (pseudo, rest) = match lowered.strip_prefix("pseudo-") {
            Some(rest) => (true, rest),
            None => (false, lowered.as_str()),
        };
        let n: u32 = rest.strip_prefix("t=")?.trim().parse().ok()?;
        match (pseudo, n) {
            (true, 3) => Some(Self::PseudoT3),
            (_, 1) => Some(Self::T1),
            (false, 3) => Some(Self::T3),
            (_, 7) => Some(Self::T7),
            (_, 13) => Some(Self::T13),
            (_, 25) => Some(Self::T25),
            (_, n) if n > 13 => Some(Self::Higher),
            // Well-formed lattices outside the scale (T=4, T=9, ...).
            (_, n) if n > 0 => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

impl fmt::Display for TNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TNumber {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| ParseVocabularyError::new("T-number", s))
    }
}

impl TryFrom<String> for TNumber {
    type Error = ParseVocabularyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TNumber> for String {
    fn from(value: TNumber) -> Self {
        value.as_str().to_string()
    }
}

/// Confidence tier; ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EvidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl EvidenceLevel {
    pub const ALL: [EvidenceLevel; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

string_vocabulary!(EvidenceLevel, "evidence level");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VirionMorphology {
    Icosahedral,
    Geminate,
    Filamentous,
    Pleomorphic,
    Complex,
    #[default]
    Unknown,
}

impl VirionMorphology {
    pub const ALL: [VirionMorphology; 6] = [
        Self::Icosahedral,
        Self::Geminate,
        Self::Filamentous,
        Self::Pleomorphic,
        Self::Complex,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Icosahedral => "icosahedral",
            Self::Geminate => "geminate",
            Self::Filamentous => "filamentous",
            Self::Pleomorphic => "pleomorphic",
            Self::Complex => "complex",
            Self::Unknown => "unknown",
        }
    }
}

string_vocabulary!(VirionMorphology, "virion morphology");

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub capsid_role: CapsidRole,
    pub architecture_class: ArchitectureClass,
    pub genome_type: GenomeType,
    pub t_number: TNumber,
    pub evidence_level: EvidenceLevel,
    pub inferred_family: Option<String>,
    pub virion_morphology: VirionMorphology,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedEntry {
    pub entry: Entry,
    pub annotation: Annotation,
}

impl AnnotatedEntry {
    pub fn id(&self) -> &str {
        &self.entry.id
    }
}
