use super::{load_catalog, load_rules};
use crate::cli::AnnotateArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::report;
use capsidomics::core::classifier::Classifier;
use capsidomics::core::models::annotation::EvidenceLevel;
use capsidomics::workflows::annotate;
use tracing::info;

pub async fn run(args: AnnotateArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args.config, &args.curation, None)?;

    let rules = load_rules(app_config.rules_path.as_deref())?;
    let (entries, _) = load_catalog(&args.input, app_config.curation.as_ref())?;

    println!("Annotating {} entries...", entries.len());
    let classifier = Classifier::new(rules);
    let (annotated, summary) =
        tokio::task::block_in_place(|| annotate::run(entries, &classifier));

    report::write_annotated(&annotated, &args.output)?;
    println!(
        "✓ Annotated catalog written to: {} (high: {}, medium: {}, low: {})",
        args.output.display(),
        summary.count(EvidenceLevel::High),
        summary.count(EvidenceLevel::Medium),
        summary.count(EvidenceLevel::Low),
    );

    if let Some(path) = &args.high_confidence {
        let count = report::write_high_confidence(&annotated, path)?;
        println!("  {} high-confidence entries written to: {}", count, path.display());
    }
    if let Some(path) = &args.tables {
        report::write_json(&annotate::summary_tables(&annotated), path)?;
        println!("  Summary tables written to: {}", path.display());
    }
    if let Some(path) = &args.explain {
        report::write_explanations(&classifier, &annotated, path)?;
        println!("  Evidence checklists written to: {}", path.display());
    }
    if let Some(path) = &args.summary {
        report::write_json(&summary, path)?;
        println!("  Summary written to: {}", path.display());
    }

    Ok(())
}
