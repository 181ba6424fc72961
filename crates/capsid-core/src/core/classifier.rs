use super::models::annotation::{
    AnnotatedEntry, Annotation, ArchitectureClass, CapsidRole, EvidenceLevel, TNumber,
    VirionMorphology,
};
use super::models::entry::Entry;
use super::rules::{DomainFold, DomainRule, EvidencePolicy, RuleTables};
use serde::Serialize;

/// Which evidence signals fired for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EvidenceChecklist {
    pub role_keyword: bool,
    pub capsid_keyword: bool,
    pub literature: bool,
    pub domain_match: bool,
    pub capsid_domain: bool,
    pub plausible_length: bool,
    pub genome_resolved: bool,
    pub structure: bool,
}

impl EvidenceChecklist {
    pub fn level(&self, policy: &EvidencePolicy) -> EvidenceLevel {
        let high = (self.capsid_keyword || self.literature)
            && self.capsid_domain
            && self.plausible_length
            && self.structure;
        if high {
            return EvidenceLevel::High;
        }

        let medium_signals = [
            self.role_keyword,
            self.domain_match,
            self.plausible_length || self.genome_resolved,
            self.literature,
        ]
        .into_iter()
        .filter(|&fired| fired)
        .count();

        if medium_signals >= policy.medium_min_signals {
            EvidenceLevel::Medium
        } else {
            EvidenceLevel::Low
        }
    }

    /// Names of the signals that fired, in checklist order.
    pub fn fired(&self) -> Vec<&'static str> {
        [
            ("role_keyword", self.role_keyword),
            ("capsid_keyword", self.capsid_keyword),
            ("literature", self.literature),
            ("domain_match", self.domain_match),
            ("capsid_domain", self.capsid_domain),
            ("plausible_length", self.plausible_length),
            ("genome_resolved", self.genome_resolved),
            ("structure", self.structure),
        ]
        .into_iter()
        .filter_map(|(name, fired)| fired.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub annotation: Annotation,
    pub checklist: EvidenceChecklist,
}

/// Deterministic rule engine mapping an [`Entry`] to its [`Annotation`].
///
/// Each attribute is decided by its own ordered cascade over the injected
/// [`RuleTables`]; the first matching rule wins and unmatched inputs fall
/// through to the explicit unknown categories. Classification never fails.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tables: RuleTables,
}

impl Classifier {
    pub fn new(tables: RuleTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    pub fn classify(&self, entry: &Entry) -> Annotation {
        self.explain(entry).annotation
    }

    pub fn annotate(&self, entry: Entry) -> AnnotatedEntry {
        let annotation = self.classify(&entry);
        AnnotatedEntry { entry, annotation }
    }

    pub fn explain(&self, entry: &Entry) -> Classification {
        let known_domains: Vec<&DomainRule> = entry
            .domains()
            .iter()
            .filter_map(|id| self.tables.domain(id))
            .collect();

        let keyword_role = self.tables.match_role_keyword(&entry.protein_name);
        let capsid_role = keyword_role
            .or_else(|| {
                known_domains
                    .iter()
                    .map(|rule| rule.role)
                    .find(|role| *role != CapsidRole::Unknown)
            })
            .unwrap_or_default();

        let architecture_class = self.architecture(entry, &known_domains);

        let (genome_type, t_number, virion_morphology, inferred_family) =
            match self.tables.resolve_family(&entry.organism) {
                Some(family) => (
                    family.genome_type,
                    family.t_number,
                    family.morphology,
                    Some(family.name.clone()),
                ),
                None => (
                    entry.genome_type,
                    TNumber::NotApplicable,
                    VirionMorphology::Unknown,
                    None,
                ),
            };

        let plausible_length = match (entry.length, self.tables.length_range(architecture_class)) {
            (Some(length), Some(range)) => range.contains(length),
            _ => false,
        };

        let checklist = EvidenceChecklist {
            role_keyword: keyword_role.is_some(),
            capsid_keyword: keyword_role.is_some_and(|role| role.is_capsid_component()),
            literature: entry.has_literature(),
            domain_match: !known_domains.is_empty(),
            capsid_domain: known_domains.iter().any(|rule| rule.capsid),
            plausible_length,
            genome_resolved: genome_type.is_known(),
            structure: entry.has_structure(),
        };

        Classification {
            annotation: Annotation {
                capsid_role,
                architecture_class,
                genome_type,
                t_number,
                evidence_level: checklist.level(&self.tables.evidence),
                inferred_family,
                virion_morphology,
            },
            checklist,
        }
    }

    fn architecture(&self, entry: &Entry, known_domains: &[&DomainRule]) -> ArchitectureClass {
        let has_fold = |fold: DomainFold| known_domains.iter().any(|rule| rule.fold == fold);

        if has_fold(DomainFold::Djr) {
            return ArchitectureClass::Djr;
        }
        if has_fold(DomainFold::Sjr) {
            return ArchitectureClass::Sjr;
        }

        let jrf_domains = known_domains
            .iter()
            .filter(|rule| rule.fold.is_jelly_roll())
            .count();
        if jrf_domains > 2 {
            return ArchitectureClass::TandemJrf;
        }
        // Entry domains are already distinct, so anything not counted above
        // is either uncatalogued or a non-JRF catalogue domain.
        let non_jrf_domains = entry.domains().len() - jrf_domains;
        if jrf_domains > 0 && non_jrf_domains > 0 {
            return ArchitectureClass::JrfHybrid;
        }
        if has_fold(DomainFold::Nucleoplasmin) {
            return ArchitectureClass::NucleoplasminLike;
        }
        ArchitectureClass::Other
    }
}
