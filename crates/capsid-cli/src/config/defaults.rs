use capsidomics::core::similarity::{DEFAULT_MAX_STRUCTURES, external};
use capsidomics::engine::config::{
    DEFAULT_EXTRA_CUTOFFS, DEFAULT_MIN_SUPPORT, DEFAULT_PRIMARY_CUTOFF, Precedence,
};
use capsidomics::workflows::curate::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};

pub struct DefaultsConfig {
    pub curation_enabled: bool,
    pub min_length: u32,
    pub max_length: u32,
    pub similarity_mode: String,
    pub aligner: String,
    pub structure_extension: String,
    pub aligner_timeout_secs: u64,
    pub score_scale: String,
    pub max_structures: usize,
    pub primary_cutoff: f64,
    pub extra_cutoffs: Vec<f64>,
    pub precedence: Vec<String>,
    pub min_support: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            curation_enabled: true,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            similarity_mode: "auto".to_string(),
            aligner: external::DEFAULT_BINARY.to_string(),
            structure_extension: external::DEFAULT_EXTENSION.to_string(),
            aligner_timeout_secs: external::DEFAULT_TIMEOUT.as_secs(),
            score_scale: "unit".to_string(),
            max_structures: DEFAULT_MAX_STRUCTURES,
            primary_cutoff: DEFAULT_PRIMARY_CUTOFF,
            extra_cutoffs: DEFAULT_EXTRA_CUTOFFS.to_vec(),
            precedence: Precedence::default()
                .order()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            min_support: DEFAULT_MIN_SUPPORT,
        }
    }
}
