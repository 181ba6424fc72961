use capsidomics::engine::config::AtlasConfig;
use capsidomics::workflows::curate::CurationSettings;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Rule-table file; the built-in tables are used when absent.
    pub rules_path: Option<PathBuf>,
    /// `None` when curation is disabled.
    pub curation: Option<CurationSettings>,
    pub atlas: AtlasConfig,
}
