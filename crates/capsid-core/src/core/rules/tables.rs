use super::defaults;
use crate::core::models::annotation::{ArchitectureClass, CapsidRole, TNumber, VirionMorphology};
use crate::core::models::entry::{GenomeType, normalize_domain_id};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Structural fold associated with a catalogued domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainFold {
    #[serde(rename = "SJR")]
    Sjr,
    #[serde(rename = "DJR")]
    Djr,
    #[serde(rename = "JRF_derived")]
    JrfDerived,
    #[serde(rename = "nucleoplasmin")]
    Nucleoplasmin,
    #[serde(rename = "non-JRF")]
    NonJrf,
}

impl DomainFold {
    pub fn is_jelly_roll(&self) -> bool {
        !matches!(self, Self::NonJrf)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DomainRule {
    pub name: String,
    pub fold: DomainFold,
    #[serde(default)]
    pub role: CapsidRole,
    /// Whether the domain marks a capsid-class protein rather than a merely
    /// JRF-derived one.
    #[serde(default)]
    pub capsid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RoleKeywordRule {
    pub role: CapsidRole,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FamilyRule {
    pub name: String,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub genome_type: GenomeType,
    #[serde(default)]
    pub t_number: TNumber,
    #[serde(default)]
    pub morphology: VirionMorphology,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthRange {
    pub min: u32,
    pub max: u32,
}

impl LengthRange {
    pub fn contains(&self, length: u32) -> bool {
        (self.min..=self.max).contains(&length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct EvidencePolicy {
    pub medium_min_signals: usize,
}

impl Default for EvidencePolicy {
    fn default() -> Self {
        Self {
            medium_min_signals: defaults::MEDIUM_MIN_SIGNALS,
        }
    }
}

/// The immutable lookup tables driving the evidence classifier.
///
/// Sections omitted from a TOML file keep their built-in values, so a file
/// may override only the domain table, for example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct RuleTables {
    pub role_keywords: Vec<RoleKeywordRule>,
    pub domains: BTreeMap<String, DomainRule>,
    pub families: Vec<FamilyRule>,
    pub length_ranges: BTreeMap<ArchitectureClass, LengthRange>,
    pub evidence: EvidencePolicy,
}

impl Default for RuleTables {
    fn default() -> Self {
        let role_keywords = defaults::ROLE_KEYWORDS
            .iter()
            .map(|seed| RoleKeywordRule {
                role: seed.role,
                patterns: seed.patterns.iter().map(|p| p.to_string()).collect(),
            })
            .collect();

        let domains = defaults::JRF_DOMAINS
            .entries()
            .map(|(id, seed)| {
                (
                    id.to_string(),
                    DomainRule {
                        name: seed.name.to_string(),
                        fold: seed.fold,
                        role: seed.role,
                        capsid: seed.capsid,
                    },
                )
            })
            .collect();

        let families = defaults::FAMILIES
            .iter()
            .map(|seed| FamilyRule {
                name: seed.name.to_string(),
                patterns: seed.patterns.iter().map(|p| p.to_string()).collect(),
                genome_type: seed.genome_type,
                t_number: seed.t_number,
                morphology: seed.morphology,
            })
            .collect();

        Self {
            role_keywords,
            domains,
            families,
            length_ranges: default_length_ranges(),
            evidence: EvidencePolicy::default(),
        }
    }
}

fn default_length_ranges() -> BTreeMap<ArchitectureClass, LengthRange> {
    defaults::LENGTH_RANGES
        .iter()
        .map(|&(class, min, max)| (class, LengthRange { min, max }))
        .collect()
}

impl RuleTables {
    pub fn load(path: &Path) -> Result<Self, RuleTableError> {
        let content = std::fs::read_to_string(path).map_err(|e| RuleTableError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RuleTableError> {
        Self::parse(content, "<inline>")
    }

    pub fn to_toml_string(&self) -> Result<String, RuleTableError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn parse(content: &str, origin: &str) -> Result<Self, RuleTableError> {
        let tables: RuleTables = toml::from_str(content).map_err(|e| RuleTableError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        tables.normalized()
    }

    /// Canonicalizes keys and patterns and fills absent length ranges.
    fn normalized(mut self) -> Result<Self, RuleTableError> {
        let mut domains = BTreeMap::new();
        let mut raw_keys: BTreeMap<String, String> = BTreeMap::new();
        for (raw, rule) in std::mem::take(&mut self.domains) {
            let id = normalize_domain_id(&raw)
                .ok_or_else(|| RuleTableError::Invalid("empty domain accession".to_string()))?;
            if let Some(first) = raw_keys.insert(id.clone(), raw.clone()) {
                return Err(RuleTableError::DuplicateDomain {
                    accession: id,
                    first,
                    second: raw,
                });
            }
            domains.insert(id, rule);
        }
        self.domains = domains;

        for rule in &mut self.role_keywords {
            rule.patterns = lowered_patterns(&rule.patterns);
        }
        for family in &mut self.families {
            family.patterns = lowered_patterns(&family.patterns);
        }

        for (class, range) in default_length_ranges() {
            self.length_ranges.entry(class).or_insert(range);
        }
        if let Some((class, range)) = self.length_ranges.iter().find(|(_, r)| r.min > r.max) {
            return Err(RuleTableError::Invalid(format!(
                "length range for {} has min {} above max {}",
                class, range.min, range.max
            )));
        }

        if !(1..=4).contains(&self.evidence.medium_min_signals) {
            return Err(RuleTableError::Invalid(format!(
                "medium-min-signals must be between 1 and 4, got {}",
                self.evidence.medium_min_signals
            )));
        }
        Ok(self)
    }

    pub fn domain(&self, id: &str) -> Option<&DomainRule> {
        self.domains.get(id)
    }

    /// First keyword rule whose pattern occurs in the lower-cased name.
    pub fn match_role_keyword(&self, protein_name: &str) -> Option<CapsidRole> {
        let lowered = protein_name.to_lowercase();
        self.role_keywords
            .iter()
            .find(|rule| rule.patterns.iter().any(|p| lowered.contains(p.as_str())))
            .map(|rule| rule.role)
    }

    pub fn resolve_family(&self, organism: &str) -> Option<&FamilyRule> {
        let lowered = organism.to_lowercase();
        if lowered.trim().is_empty() {
            return None;
        }
        self.families
            .iter()
            .find(|family| family.patterns.iter().any(|p| lowered.contains(p.as_str())))
    }

    pub fn length_range(&self, class: ArchitectureClass) -> Option<LengthRange> {
        self.length_ranges.get(&class).copied()
    }
}

fn lowered_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

#[derive(Debug, Error)]
pub enum RuleTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid rule table: {0}")]
    Invalid(String),
    #[error("Domain keys '{first}' and '{second}' both normalize to '{accession}'")]
    DuplicateDomain {
        accession: String,
        first: String,
        second: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_tables_cover_every_architecture_class() {
        let tables = RuleTables::default();
        for class in ArchitectureClass::ALL {
            assert!(tables.length_range(class).is_some(), "missing {class}");
        }
        assert_eq!(tables.length_range(ArchitectureClass::Sjr), Some(LengthRange { min: 150, max: 1000 }));
    }

    #[test]
    fn minor_capsid_keyword_wins_over_generic_capsid_token() {
        let tables = RuleTables::default();
        assert_eq!(tables.match_role_keyword("Minor capsid protein VP2"), Some(CapsidRole::Minor));
        assert_eq!(tables.match_role_keyword("capsid protein VP1"), Some(CapsidRole::Mcp));
        assert_eq!(tables.match_role_keyword("Coat"), Some(CapsidRole::Mcp));
        assert_eq!(tables.match_role_keyword("DNA polymerase"), None);
    }

    #[test]
    fn picobirnavirus_is_not_mistaken_for_a_birnavirus() {
        let tables = RuleTables::default();
        let family = tables.resolve_family("Human picobirnavirus").unwrap();
        assert_eq!(family.name, "Picobirnaviridae");
        let family = tables.resolve_family("Infectious bursal disease virus").unwrap();
        assert_eq!(family.name, "Birnaviridae");
        assert!(tables.resolve_family("").is_none());
    }

    #[test]
    fn partial_file_keeps_builtin_sections_and_normalizes_keys() {
        let toml = r#"
            [domains."pf99999.3"]
            name = "Test_fold"
            fold = "DJR"
            role = "MCP"
            capsid = true

            [length-ranges.DJR]
            min = 10
            max = 20
        "#;
        let tables = RuleTables::from_toml_str(toml).unwrap();
        assert_eq!(tables.domains.len(), 1);
        assert_eq!(tables.domain("PF99999").map(|d| d.fold), Some(DomainFold::Djr));
        assert_eq!(tables.length_range(ArchitectureClass::Djr), Some(LengthRange { min: 10, max: 20 }));
        assert_eq!(tables.length_range(ArchitectureClass::Sjr), Some(LengthRange { min: 150, max: 1000 }));
        assert_eq!(tables.role_keywords, RuleTables::default().role_keywords);
    }

    #[test]
    fn domain_keys_colliding_after_normalization_are_rejected() {
        let toml = r#"
            [domains."PF99999.1"]
            name = "First"
            fold = "SJR"
            role = "MCP"
            capsid = true

            [domains.pf99999]
            name = "Second"
            fold = "DJR"
            role = "MCP"
            capsid = true
        "#;
        match RuleTables::from_toml_str(toml) {
            Err(RuleTableError::DuplicateDomain { accession, .. }) => assert_eq!(accession, "PF99999"),
            other => panic!("expected a duplicate-domain error, got {other:?}"),
        }
    }

    #[test]
    fn inverted_length_range_is_rejected() {
        let toml = "[length-ranges.SJR]\nmin = 500\nmax = 100\n";
        let err = RuleTables::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, RuleTableError::Invalid(_)));
    }

    #[test]
    fn out_of_range_evidence_policy_is_rejected() {
        let toml = "[evidence]\nmedium-min-signals = 0\n";
        assert!(matches!(RuleTables::from_toml_str(toml), Err(RuleTableError::Invalid(_))));
    }

    #[test]
    fn unknown_section_is_a_toml_error() {
        let err = RuleTables::from_toml_str("[bogus]\nx = 1\n").unwrap_err();
        assert!(matches!(err, RuleTableError::Toml { .. }));
    }

    #[test]
    fn defaults_survive_a_dump_and_reload() {
        let tables = RuleTables::default();
        let dumped = tables.to_toml_string().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(dumped.as_bytes()).unwrap();
        let reloaded = RuleTables::load(file.path()).unwrap();
        assert_eq!(reloaded, tables);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = RuleTables::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, RuleTableError::Io { .. }));
    }
}
