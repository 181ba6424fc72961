use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCurationConfig {
    pub enabled: Option<bool>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSimilarityConfig {
    pub mode: Option<String>,
    pub aligner: Option<String>,
    pub structure_dir: Option<PathBuf>,
    pub structure_extension: Option<String>,
    pub timeout_secs: Option<u64>,
    pub score_scale: Option<String>,
    pub max_structures: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileClusteringConfig {
    pub primary_cutoff: Option<f64>,
    pub extra_cutoffs: Option<Vec<f64>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileTransitionConfig {
    pub precedence: Option<Vec<String>>,
    pub min_support: Option<usize>,
}

/// Every section is optional; absent values fall through to the defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub rules: Option<PathBuf>,
    pub curation: Option<FileCurationConfig>,
    pub similarity: Option<FileSimilarityConfig>,
    pub clustering: Option<FileClusteringConfig>,
    pub transitions: Option<FileTransitionConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::parsing(path, e))?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| CliError::parsing(path, e))?;

        // Relative paths inside the file are relative to the file itself.
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        if let Some(rules) = config.rules.as_mut() {
            if rules.is_relative() {
                *rules = base.join(&*rules);
            }
        }
        if let Some(dir) = config
            .similarity
            .as_mut()
            .and_then(|s| s.structure_dir.as_mut())
        {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(config)
    }
}
