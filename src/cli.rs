use clap::Parser;
use std::path::PathBuf;

use crate::application::dto::OutputFormat;

/// Plan a target-framework migration for a family of NuGet packages
#[derive(Parser, Debug)]
#[command(name = "nuget-roadmap")]
#[command(version)]
#[command(
    about = "Plan a target-framework migration for a family of NuGet packages",
    long_about = "Resolves the dependency trees of the given NuGet packages, checks every \
                  package against the target framework and prints a staged migration roadmap."
)]
pub struct Args {
    /// Root package ids to analyze
    #[arg(value_name = "PACKAGES", conflicts_with = "prefix")]
    pub packages: Vec<String>,

    /// Analyze every registry package whose id starts with this prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Target framework moniker to migrate to (e.g. net8.0)
    #[arg(short, long = "target", value_name = "TFM")]
    pub target: Option<String>,

    /// Framework that must stay supported while migrating.
    /// Can be specified multiple times: --current net6.0 --current netstandard2.0
    #[arg(short, long = "current", value_name = "TFM")]
    pub current: Vec<String>,

    /// Package ids to mark as internal (supports wildcards: *), e.g. "Contoso.*"
    #[arg(short, long, value_name = "PATTERNS")]
    pub mask: Option<String>,

    /// Prerelease token preferred when choosing a root version (e.g. "-dev")
    #[arg(long, value_name = "TOKEN", allow_hyphen_values = true)]
    pub dev_filter: Option<String>,

    /// Maximum number of registry requests in flight [default: 6]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Metadata cache file; reused and updated across runs
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Hours a cached registry response stays valid [default: 24]
    #[arg(long, value_name = "HOURS")]
    pub cache_ttl_hours: Option<u64>,

    /// Never contact the registry; cache misses are reported as missing packages
    #[arg(long)]
    pub cache_only: bool,

    /// Empty the metadata cache before the run
    #[arg(long)]
    pub clear_cache: bool,

    /// Output format: json or text [default: json]
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exit with code 1 when any package is blocked
    #[arg(long)]
    pub fail_on_blocked: bool,

    /// Log registry and cache activity to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file path (defaults to ./nuget-roadmap.config.yml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
