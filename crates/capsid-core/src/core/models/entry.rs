use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unrecognized {kind} value: '{value}'")]
pub struct ParseVocabularyError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseVocabularyError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum GenomeType {
    #[serde(rename = "ssDNA")]
    SsDna,
    #[serde(rename = "dsDNA")]
    DsDna,
    #[serde(rename = "ssRNA+")]
    SsRnaPositive,
    #[serde(rename = "ssRNA-")]
    SsRnaNegative,
    #[serde(rename = "dsRNA")]
    DsRna,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl GenomeType {
    pub const ALL: [GenomeType; 6] = [
        Self::SsDna,
        Self::DsDna,
        Self::SsRnaPositive,
        Self::SsRnaNegative,
        Self::DsRna,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SsDna => "ssDNA",
            Self::DsDna => "dsDNA",
            Self::SsRnaPositive => "ssRNA+",
            Self::SsRnaNegative => "ssRNA-",
            Self::DsRna => "dsRNA",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for GenomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenomeType {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
            .or_else(|| trimmed.is_empty().then_some(Self::Unknown))
            .ok_or_else(|| ParseVocabularyError::new("genome type", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum HostCategory {
    #[serde(rename = "Eukaryota_Animal")]
    Animal,
    #[serde(rename = "Eukaryota_Plant")]
    Plant,
    #[serde(rename = "Eukaryota_Fungi")]
    Fungi,
    #[serde(rename = "Eukaryota_Protist")]
    Protist,
    #[serde(rename = "Bacteria")]
    Bacteria,
    #[serde(rename = "Archaea")]
    Archaea,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl HostCategory {
    pub const ALL: [HostCategory; 7] = [
        Self::Animal,
        Self::Plant,
        Self::Fungi,
        Self::Protist,
        Self::Bacteria,
        Self::Archaea,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Animal => "Eukaryota_Animal",
            Self::Plant => "Eukaryota_Plant",
            Self::Fungi => "Eukaryota_Fungi",
            Self::Protist => "Eukaryota_Protist",
            Self::Bacteria => "Bacteria",
            Self::Archaea => "Archaea",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostCategory {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(trimmed))
            .or_else(|| trimmed.is_empty().then_some(Self::Unknown))
            .ok_or_else(|| ParseVocabularyError::new("host category", s))
    }
}

/// Normalizes a domain accession: trims, upper-cases and drops a trailing
/// Pfam version suffix (`PF00729.22` becomes `PF00729`).
pub fn normalize_domain_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let base = match trimmed.split_once('.') {
        Some((head, tail)) if !head.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => head,
        _ => trimmed,
    };
    Some(base.to_ascii_uppercase())
}

/// One protein record of the catalog.
///
/// Domain identifiers keep their discovery order, but only set membership is
/// meaningful; [`Entry::new`] and [`Entry::with_domains`] normalize and
/// de-duplicate them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub organism: String,
    pub protein_name: String,
    domains: Vec<String>,
    pub length: Option<u32>,
    pub structure_id: Option<String>,
    pub genome_type: GenomeType,
    pub host_category: HostCategory,
    pub references: Vec<String>,
}

impl Entry {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_organism(mut self, organism: &str) -> Self {
        self.organism = organism.to_string();
        self
    }

    pub fn with_protein_name(mut self, name: &str) -> Self {
        self.protein_name = name.to_string();
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domains.clear();
        for raw in domains {
            self.push_domain(raw.as_ref());
        }
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_structure(mut self, structure_id: &str) -> Self {
        let trimmed = structure_id.trim();
        self.structure_id = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn with_genome_type(mut self, genome_type: GenomeType) -> Self {
        self.genome_type = genome_type;
        self
    }

    pub fn with_host_category(mut self, host: HostCategory) -> Self {
        self.host_category = host;
        self
    }

    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.references = references
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        self
    }

    pub fn push_domain(&mut self, raw: &str) {
        if let Some(id) = normalize_domain_id(raw) {
            if !self.domains.contains(&id) {
                self.domains.push(id);
            }
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn has_domain(&self, id: &str) -> bool {
        self.domains.iter().any(|d| d == id)
    }

    pub fn has_structure(&self) -> bool {
        self.structure_id.is_some()
    }

    pub fn has_literature(&self) -> bool {
        !self.references.is_empty()
    }
}
