use crate::core::models::annotation::ArchitectureClass;
use crate::core::similarity::{DEFAULT_MAX_STRUCTURES, ProbeMode, ScoreScale, TmAlignOptions};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PRIMARY_CUTOFF: f64 = 0.5;
pub const DEFAULT_EXTRA_CUTOFFS: [f64; 1] = [0.3];
pub const DEFAULT_MIN_SUPPORT: usize = 2;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}

pub(crate) fn validate_cutoff(parameter: &'static str, cutoff: f64) -> Result<f64, ConfigError> {
    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(ConfigError::invalid(
            parameter,
            format!("cutoff must be a finite, non-negative number (got {cutoff})"),
        ));
    }
    Ok(cutoff)
}

/// Ordering of architecture classes used to orient transitions; a lower
/// rank is the presumed ancestral state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precedence {
    order: Vec<ArchitectureClass>,
}

impl Precedence {
    /// Fails unless `order` lists every architecture class exactly once.
    pub fn new(order: Vec<ArchitectureClass>) -> Result<Self, ConfigError> {
        for class in ArchitectureClass::ALL {
            let occurrences = order.iter().filter(|c| **c == class).count();
            if occurrences != 1 {
                return Err(ConfigError::invalid(
                    "precedence",
                    format!("{class} must appear exactly once (found {occurrences})"),
                ));
            }
        }
        if order.len() != ArchitectureClass::ALL.len() {
            return Err(ConfigError::invalid(
                "precedence",
                format!("expected {} classes, got {}", ArchitectureClass::ALL.len(), order.len()),
            ));
        }
        Ok(Self { order })
    }

    pub fn rank(&self, class: ArchitectureClass) -> usize {
        self.order
            .iter()
            .position(|c| *c == class)
            .unwrap_or(self.order.len())
    }

    pub fn order(&self) -> &[ArchitectureClass] {
        &self.order
    }
}

impl Default for Precedence {
    fn default() -> Self {
        Self {
            order: vec![
                ArchitectureClass::Sjr,
                ArchitectureClass::TandemJrf,
                ArchitectureClass::Djr,
                ArchitectureClass::JrfHybrid,
                ArchitectureClass::NucleoplasminLike,
                ArchitectureClass::Other,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityConfig {
    pub mode: ProbeMode,
    pub aligner: TmAlignOptions,
    pub max_structures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    pub primary_cutoff: f64,
    pub extra_cutoffs: Vec<f64>,
}

impl ClusteringConfig {
    /// Primary cutoff first, then the extra cutoffs in the given order.
    pub fn all_cutoffs(&self) -> Vec<f64> {
        std::iter::once(self.primary_cutoff)
            .chain(self.extra_cutoffs.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionConfig {
    pub precedence: Precedence,
    pub min_support: usize,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            precedence: Precedence::default(),
            min_support: DEFAULT_MIN_SUPPORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasConfig {
    pub similarity: SimilarityConfig,
    pub clustering: ClusteringConfig,
    pub transitions: TransitionConfig,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityConfig {
                mode: ProbeMode::Auto,
                aligner: TmAlignOptions::default(),
                max_structures: DEFAULT_MAX_STRUCTURES,
            },
            clustering: ClusteringConfig {
                primary_cutoff: DEFAULT_PRIMARY_CUTOFF,
                extra_cutoffs: DEFAULT_EXTRA_CUTOFFS.to_vec(),
            },
            transitions: TransitionConfig::default(),
        }
    }
}

#[derive(Default)]
pub struct AtlasConfigBuilder {
    similarity_mode: Option<ProbeMode>,
    aligner_binary: Option<String>,
    structure_dir: Option<PathBuf>,
    structure_extension: Option<String>,
    aligner_timeout: Option<Duration>,
    score_scale: Option<ScoreScale>,
    max_structures: Option<usize>,
    primary_cutoff: Option<f64>,
    extra_cutoffs: Option<Vec<f64>>,
    precedence: Option<Vec<ArchitectureClass>>,
    min_support: Option<usize>,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn similarity_mode(mut self, mode: ProbeMode) -> Self {
        self.similarity_mode = Some(mode);
        self
    }
    pub fn aligner_binary(mut self, binary: &str) -> Self {
        self.aligner_binary = Some(binary.to_string());
        self
    }
    pub fn structure_dir(mut self, dir: PathBuf) -> Self {
        self.structure_dir = Some(dir);
        self
    }
    pub fn structure_extension(mut self, extension: &str) -> Self {
        self.structure_extension = Some(extension.to_string());
        self
    }
    pub fn aligner_timeout(mut self, timeout: Duration) -> Self {
        self.aligner_timeout = Some(timeout);
        self
    }
    pub fn score_scale(mut self, scale: ScoreScale) -> Self {
        self.score_scale = Some(scale);
        self
    }
    pub fn max_structures(mut self, max: usize) -> Self {
        self.max_structures = Some(max);
        self
    }
    pub fn primary_cutoff(mut self, cutoff: f64) -> Self {
        self.primary_cutoff = Some(cutoff);
        self
    }
    pub fn extra_cutoffs(mut self, cutoffs: Vec<f64>) -> Self {
        self.extra_cutoffs = Some(cutoffs);
        self
    }
    pub fn precedence(mut self, order: Vec<ArchitectureClass>) -> Self {
        self.precedence = Some(order);
        self
    }
    pub fn min_support(mut self, min_support: usize) -> Self {
        self.min_support = Some(min_support);
        self
    }

    pub fn build(self) -> Result<AtlasConfig, ConfigError> {
        let primary_cutoff = validate_cutoff(
            "primary_cutoff",
            self.primary_cutoff
                .ok_or(ConfigError::MissingParameter("primary_cutoff"))?,
        )?;
        let extra_cutoffs = self
            .extra_cutoffs
            .unwrap_or_else(|| DEFAULT_EXTRA_CUTOFFS.to_vec())
            .into_iter()
            .map(|c| validate_cutoff("extra_cutoffs", c))
            .collect::<Result<Vec<_>, _>>()?;

        let min_support = self
            .min_support
            .ok_or(ConfigError::MissingParameter("min_support"))?;
        if min_support == 0 {
            return Err(ConfigError::invalid("min_support", "must be at least 1"));
        }

        let precedence = Precedence::new(
            self.precedence
                .ok_or(ConfigError::MissingParameter("precedence"))?,
        )?;

        let timeout = self
            .aligner_timeout
            .unwrap_or(crate::core::similarity::external::DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::invalid("aligner_timeout", "must be greater than zero"));
        }

        let max_structures = self.max_structures.unwrap_or(DEFAULT_MAX_STRUCTURES);
        if max_structures == 0 {
            return Err(ConfigError::invalid("max_structures", "must be at least 1"));
        }

        let defaults = TmAlignOptions::default();
        let aligner = TmAlignOptions {
            binary: self.aligner_binary.unwrap_or(defaults.binary),
            structure_dir: self.structure_dir,
            extension: self.structure_extension.unwrap_or(defaults.extension),
            timeout,
            scale: self.score_scale.unwrap_or(defaults.scale),
        };

        Ok(AtlasConfig {
            similarity: SimilarityConfig {
                mode: self
                    .similarity_mode
                    .ok_or(ConfigError::MissingParameter("similarity_mode"))?,
                aligner,
                max_structures,
            },
            clustering: ClusteringConfig {
                primary_cutoff,
                extra_cutoffs,
            },
            transitions: TransitionConfig {
                precedence,
                min_support,
            },
        })
    }
}
