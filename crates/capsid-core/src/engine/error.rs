use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::CatalogError;
use crate::core::rules::RuleTableError;
use crate::core::similarity::SimilarityError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Rule table error: {source}")]
    RuleTables {
        #[from]
        source: RuleTableError,
    },

    #[error("Catalog error: {source}")]
    Catalog {
        #[from]
        source: CatalogError,
    },

    #[error("Similarity error: {source}")]
    Similarity {
        #[from]
        source: SimilarityError,
    },

    #[error("Stage '{stage}' received no input: {reason}")]
    EmptyInput { stage: &'static str, reason: String },

    #[error("Run cancelled before stage '{stage}'")]
    Cancelled { stage: &'static str },
}
