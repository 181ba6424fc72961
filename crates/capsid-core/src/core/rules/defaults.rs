use super::tables::DomainFold;
use crate::core::models::annotation::{ArchitectureClass, CapsidRole, TNumber, VirionMorphology};
use crate::core::models::entry::GenomeType;
use phf::{Map, phf_map};

#[derive(Debug, Clone, Copy)]
pub struct DomainSeed {
    pub name: &'static str,
    pub fold: DomainFold,
    pub role: CapsidRole,
    pub capsid: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RoleKeywordSeed {
    pub role: CapsidRole,
    pub patterns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct FamilySeed {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
    pub genome_type: GenomeType,
    pub t_number: TNumber,
    pub morphology: VirionMorphology,
}

#[rustfmt::skip]
pub static JRF_DOMAINS: Map<&'static str, DomainSeed> = phf_map! {
    // --- SJR capsid domains ---
    "PF00729" => DomainSeed { name: "Viral_coat", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF00740" => DomainSeed { name: "Parvo_coat", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF02227" => DomainSeed { name: "Viral_caps", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF08398" => DomainSeed { name: "Circovirus_cap", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF01141" => DomainSeed { name: "Noda_capsid", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF00910" => DomainSeed { name: "RNA_phage_coat", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF08410" => DomainSeed { name: "Gemini_CP", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF02305" => DomainSeed { name: "Birna_VP", fold: DomainFold::Sjr, role: CapsidRole::Mcp, capsid: true },
    "PF02956" => DomainSeed { name: "Microvir_J", fold: DomainFold::Sjr, role: CapsidRole::Minor, capsid: true },
    "PF03016" => DomainSeed { name: "Penton_base", fold: DomainFold::Sjr, role: CapsidRole::Minor, capsid: true },

    // --- DJR capsid domains (PRD1-adenovirus lineage) ---
    "PF00608" => DomainSeed { name: "Adeno_hexon", fold: DomainFold::Djr, role: CapsidRole::Mcp, capsid: true },
    "PF09018" => DomainSeed { name: "Adeno_hexon_N", fold: DomainFold::Djr, role: CapsidRole::Mcp, capsid: true },
    "PF04451" => DomainSeed { name: "DUF557", fold: DomainFold::Djr, role: CapsidRole::Mcp, capsid: true },
    "PF04663" => DomainSeed { name: "Phycodnavirus_MCP", fold: DomainFold::Djr, role: CapsidRole::Mcp, capsid: true },
    "PF04894" => DomainSeed { name: "ASFV_p72", fold: DomainFold::Djr, role: CapsidRole::Mcp, capsid: true },
    "PF04537" => DomainSeed { name: "Iridovirus_MCP", fold: DomainFold::Djr, role: CapsidRole::Mcp, capsid: true },

    // --- JRF-derived, non-capsid ---
    "PF01107" => DomainSeed { name: "30Kc", fold: DomainFold::JrfDerived, role: CapsidRole::Movement, capsid: false },
    "PF00927" => DomainSeed { name: "Nucleoplasmin", fold: DomainFold::Nucleoplasmin, role: CapsidRole::NonCapsid, capsid: false },

    // --- Capsid-associated, not a jelly roll ---
    "PF04547" => DomainSeed { name: "Adeno_fiber", fold: DomainFold::NonJrf, role: CapsidRole::Spike, capsid: false },
};

// Specific roles precede MCP so that "minor capsid protein" is not caught by
// the generic "capsid protein" token.
#[rustfmt::skip]
pub static ROLE_KEYWORDS: &[RoleKeywordSeed] = &[
    RoleKeywordSeed { role: CapsidRole::Minor, patterns: &["minor capsid", "penton", "vertex"] },
    RoleKeywordSeed { role: CapsidRole::Spike, patterns: &["spike", "fiber", "fibre", "receptor binding"] },
    RoleKeywordSeed { role: CapsidRole::Turret, patterns: &["turret"] },
    RoleKeywordSeed { role: CapsidRole::Cement, patterns: &["cement", "glue", "protein ix", "protein iiia"] },
    RoleKeywordSeed { role: CapsidRole::Movement, patterns: &["movement protein", "30k", "cell-to-cell"] },
    RoleKeywordSeed { role: CapsidRole::Matrix, patterns: &["matrix protein"] },
    RoleKeywordSeed {
        role: CapsidRole::Mcp,
        patterns: &["major capsid", "capsid protein", "coat protein", "hexon", "vp1", "vp2", "vp3", "vp54", "p72", "mcp"],
    },
    RoleKeywordSeed { role: CapsidRole::Mcp, patterns: &["capsid", "coat", "shell"] },
];

// Order matters: "picobirnavirus" must be tried before "birnavirus".
#[rustfmt::skip]
pub static FAMILIES: &[FamilySeed] = &[
    FamilySeed { name: "Parvoviridae", patterns: &["parvovirus", "adeno-associated", "aav", "bocavirus", "dependovirus"], genome_type: GenomeType::SsDna, t_number: TNumber::PseudoT3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Picornaviridae", patterns: &["picornavirus", "poliovirus", "rhinovirus", "enterovirus", "coxsackie", "hepatitis a"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::PseudoT3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Adenoviridae", patterns: &["adenovirus"], genome_type: GenomeType::DsDna, t_number: TNumber::T25, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Circoviridae", patterns: &["circovirus", "pcv", "bfdv", "beak and feather"], genome_type: GenomeType::SsDna, t_number: TNumber::T1, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Geminiviridae", patterns: &["geminivirus", "begomovirus", "mastrevirus", "maize streak", "leaf curl"], genome_type: GenomeType::SsDna, t_number: TNumber::T1, morphology: VirionMorphology::Geminate },
    FamilySeed { name: "Microviridae", patterns: &["microvirus", "phix174", "phi x 174"], genome_type: GenomeType::SsDna, t_number: TNumber::T1, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Nanoviridae", patterns: &["nanovirus", "bunchy top"], genome_type: GenomeType::SsDna, t_number: TNumber::T1, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Nodaviridae", patterns: &["nodavirus", "flock house", "nodamura"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Tombusviridae", patterns: &["tombusvirus", "carmovirus", "necrovirus", "bushy stunt"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Bromoviridae", patterns: &["bromovirus", "ccmv", "alfamovirus", "chlorotic mottle", "brome mosaic"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Caliciviridae", patterns: &["calicivirus", "norovirus", "sapovirus"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Tymoviridae", patterns: &["tymovirus", "yellow mosaic"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Leviviridae", patterns: &["levivirus", "phage ms2", "qbeta"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Picobirnaviridae", patterns: &["picobirnavirus"], genome_type: GenomeType::DsRna, t_number: TNumber::T3, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Birnaviridae", patterns: &["birnavirus", "ibdv", "ipnv", "infectious bursal"], genome_type: GenomeType::DsRna, t_number: TNumber::T13, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Tectiviridae", patterns: &["prd1", "tectivirus", "bam35"], genome_type: GenomeType::DsDna, t_number: TNumber::T25, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Corticoviridae", patterns: &["corticovirus", "phage pm2"], genome_type: GenomeType::DsDna, t_number: TNumber::Higher, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Phycodnaviridae", patterns: &["chlorella virus", "phycodnavirus", "pbcv"], genome_type: GenomeType::DsDna, t_number: TNumber::Higher, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Mimiviridae", patterns: &["mimivirus", "megavirus"], genome_type: GenomeType::DsDna, t_number: TNumber::Higher, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Asfarviridae", patterns: &["african swine fever", "asfv"], genome_type: GenomeType::DsDna, t_number: TNumber::Higher, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Iridoviridae", patterns: &["iridovirus", "ranavirus"], genome_type: GenomeType::DsDna, t_number: TNumber::Higher, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Poxviridae", patterns: &["poxvirus", "vaccinia"], genome_type: GenomeType::DsDna, t_number: TNumber::NotApplicable, morphology: VirionMorphology::Complex },
    FamilySeed { name: "Turriviridae", patterns: &["stiv", "turreted icosahedral"], genome_type: GenomeType::DsDna, t_number: TNumber::Higher, morphology: VirionMorphology::Icosahedral },
    FamilySeed { name: "Virgaviridae", patterns: &["tobamovirus", "tobacco mosaic", "virgavirus"], genome_type: GenomeType::SsRnaPositive, t_number: TNumber::NotApplicable, morphology: VirionMorphology::Filamentous },
];

/// Inclusive plausible sequence-length window (amino acids) per architecture.
#[rustfmt::skip]
pub static LENGTH_RANGES: &[(ArchitectureClass, u32, u32)] = &[
    (ArchitectureClass::Sjr, 150, 1000),
    (ArchitectureClass::Djr, 250, 2000),
    (ArchitectureClass::TandemJrf, 300, 2000),
    (ArchitectureClass::JrfHybrid, 150, 2000),
    (ArchitectureClass::NucleoplasminLike, 100, 400),
    (ArchitectureClass::Other, 100, 2000),
];

pub const MEDIUM_MIN_SIGNALS: usize = 2;
