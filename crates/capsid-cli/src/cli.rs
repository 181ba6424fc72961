use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "capsid - Annotate jelly-roll fold viral capsid proteins and infer how their architectures relate.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for pairwise similarity scoring.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify every record of a protein catalog and write the annotated catalog.
    Annotate(AnnotateArgs),
    /// Run the full atlas: annotation, structural similarity, clustering, co-occurrence and transitions.
    Analyze(AnalyzeArgs),
    /// Print the built-in rule tables as TOML, ready to be edited and passed back with --rules.
    Rules(RulesArgs),
}

/// Configuration sources shared by the pipeline subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to a rule-table TOML file replacing the built-in tables.
    #[arg(short, long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S clustering.primary-cutoff=0.4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CurationArgs {
    /// Override the minimum accepted sequence length.
    #[arg(long, value_name = "INT")]
    pub min_length: Option<u32>,

    /// Override the maximum accepted sequence length.
    #[arg(long, value_name = "INT")]
    pub max_length: Option<u32>,

    /// Skip the length filter and identifier de-duplication.
    #[arg(long)]
    pub no_curation: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AtlasArgs {
    // --- Similarity Overrides ---
    /// Similarity strategy: 'auto', 'simulated' or 'external'.
    #[arg(short = 'm', long, value_name = "MODE")]
    pub similarity_mode: Option<String>,

    /// Structural aligner executable (a path or a name on PATH).
    #[arg(long, value_name = "NAME_OR_PATH")]
    pub aligner: Option<String>,

    /// Directory holding one structure file per structure identifier.
    #[arg(long, value_name = "DIR")]
    pub structure_dir: Option<PathBuf>,

    /// File extension of the structure files (without the dot).
    #[arg(long, value_name = "EXT")]
    pub structure_extension: Option<String>,

    /// Per-pair aligner timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub aligner_timeout: Option<u64>,

    /// Scale of the aligner's score: 'unit' for [0, 1] or 'signed' for [-1, 1].
    #[arg(long, value_name = "SCALE")]
    pub score_scale: Option<String>,

    /// Maximum number of structures accepted into the similarity matrix.
    #[arg(long, value_name = "INT")]
    pub max_structures: Option<usize>,

    // --- Clustering Overrides ---
    /// Primary dissimilarity cutoff used for transition inference.
    #[arg(long = "cutoff", value_name = "FLOAT")]
    pub primary_cutoff: Option<f64>,

    /// Additional cutoffs reported alongside the primary one (comma-separated).
    #[arg(long = "extra-cutoffs", value_name = "FLOAT,...", value_delimiter = ',')]
    pub extra_cutoffs: Option<Vec<f64>>,

    // --- Transition Overrides ---
    /// Minimum number of supporting pairs for a transition hypothesis.
    #[arg(long, value_name = "INT")]
    pub min_support: Option<usize>,
}

/// Arguments for the `annotate` subcommand.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Path to the input catalog (CSV with at least an `entry_id` column).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the annotated catalog (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write the high-confidence subset to this CSV.
    #[arg(long, value_name = "PATH")]
    pub high_confidence: Option<PathBuf>,

    /// Also write the annotation summary to this JSON file.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Also write the family, architecture and genome-by-architecture tables (JSON).
    #[arg(long, value_name = "PATH")]
    pub tables: Option<PathBuf>,

    /// Also write, per entry, which evidence signals fired (JSON).
    #[arg(long, value_name = "PATH")]
    pub explain: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub curation: CurationArgs,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to the input catalog (CSV with at least an `entry_id` column).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving every report; created when missing.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub curation: CurationArgs,

    #[command(flatten)]
    pub atlas: AtlasArgs,
}

/// Arguments for the `rules` subcommand.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Write the tables to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
