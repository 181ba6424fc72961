use super::{load_catalog, load_rules};
use crate::cli::AnalyzeArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::report;
use crate::utils::progress::CliProgressHandler;
use capsidomics::{engine::progress::ProgressReporter, workflows};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

pub async fn run(args: AnalyzeArgs, cancel: Arc<AtomicBool>) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args.config, &args.curation, Some(&args.atlas))?;

    let rules = load_rules(app_config.rules_path.as_deref())?;
    let (entries, curation_report) = load_catalog(&args.input, app_config.curation.as_ref())?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting atlas run over {} entries...", entries.len());
    info!("Invoking the core atlas workflow...");

    let result = tokio::task::block_in_place(|| {
        workflows::atlas::run(entries, &rules, &app_config.atlas, &reporter, &cancel)
    })?;

    for warning in &result.similarity.warnings {
        match &warning.pair {
            Some((a, b)) => warn!(a = %a, b = %b, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let written = report::write_atlas(&result, curation_report.as_ref(), &args.output_dir)?;

    println!(
        "✓ {} structures, {} clusters at cutoff {}, {} transition hypotheses.",
        result.similarity.matrix.len(),
        result.primary().cluster_count(),
        result.primary().cutoff,
        result.transitions.len()
    );
    if !result.similarity.warnings.is_empty() {
        println!(
            "  {} similarity fallback(s) recorded; see {}.",
            result.similarity.warnings.len(),
            report::WARNINGS_JSON
        );
    }
    println!(
        "  {} report files written to: {}",
        written.len(),
        args.output_dir.display()
    );

    Ok(())
}
