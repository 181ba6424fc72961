pub mod analyze;
pub mod annotate;
pub mod rules;

use crate::error::{CliError, Result};
use capsidomics::core::io::catalog::CatalogFile;
use capsidomics::core::io::traits::TabularFile;
use capsidomics::core::models::entry::Entry;
use capsidomics::core::rules::RuleTables;
use capsidomics::workflows::curate::{self, CurationReport, CurationSettings};
use std::path::Path;
use tracing::info;

pub(crate) fn load_rules(path: Option<&Path>) -> Result<RuleTables> {
    match path {
        Some(path) => {
            info!("Loading rule tables from {:?}", path);
            RuleTables::load(path).map_err(|e| CliError::parsing(path, e))
        }
        None => Ok(RuleTables::default()),
    }
}

pub(crate) fn load_catalog(
    path: &Path,
    curation: Option<&CurationSettings>,
) -> Result<(Vec<Entry>, Option<CurationReport>)> {
    info!("Loading catalog from {:?}", path);
    let entries = CatalogFile::read_from_path(path).map_err(|e| CliError::parsing(path, e))?;
    if entries.is_empty() {
        return Err(CliError::Argument(format!(
            "Catalog '{}' contains no entries.",
            path.display()
        )));
    }

    match curation {
        Some(settings) => {
            let (kept, report) =
                curate::run(entries, settings).map_err(|e| CliError::Config(e.to_string()))?;
            println!(
                "Curated catalog: kept {} of {} entries ({} duplicate, {} too short, {} too long).",
                report.kept, report.input, report.duplicates, report.too_short, report.too_long
            );
            Ok((kept, Some(report)))
        }
        None => Ok((entries, None)),
    }
}
