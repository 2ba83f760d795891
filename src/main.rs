use nuget_roadmap::adapters::outbound::cache::InMemoryMetadataCache;
use nuget_roadmap::adapters::outbound::console::StderrProgressReporter;
use nuget_roadmap::adapters::outbound::filesystem::{
    FileMetadataCache, FileSystemWriter, StdoutPresenter,
};
use nuget_roadmap::adapters::outbound::network::{NuGetEndpoints, NuGetRegistryClient};
use nuget_roadmap::application::dto::{AnalysisRequest, AnalysisResponse, OutputFormat};
use nuget_roadmap::application::factories::FormatterFactory;
use nuget_roadmap::application::use_cases::AnalyzeMigrationUseCase;
use nuget_roadmap::cli::Args;
use nuget_roadmap::config::{self, ConfigFile};
use nuget_roadmap::migration_planning::services::DEFAULT_CONCURRENCY;
use nuget_roadmap::ports::outbound::{MetadataCache, OutputPresenter, ProgressReporter};
use nuget_roadmap::shared::error::{ExitCode, MigrationError};
use nuget_roadmap::shared::Result;
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Hours a cached registry response stays valid unless configured otherwise
const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

#[tokio::main]
async fn main() {
    // Parse command-line arguments (clap exits with code 2 on usage errors)
    let args = Args::parse_args();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(exit_code) => process::exit(exit_code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

/// Diagnostic logging to stderr: warnings by default, this crate's debug
/// events with `--verbose`. `RUST_LOG` takes precedence over both.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "warn,nuget_roadmap=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let request = build_request(&args, &config)?;
    let format = resolve_format(&args, &config)?;

    // Create adapters (Dependency Injection)
    let registry = Arc::new(NuGetRegistryClient::new(build_endpoints(&config))?);
    let progress_reporter = Arc::new(StderrProgressReporter::new());
    let ttl_hours = args
        .cache_ttl_hours
        .or(config.cache_ttl_hours)
        .unwrap_or(DEFAULT_CACHE_TTL_HOURS);
    let ttl = Duration::from_secs(ttl_hours.saturating_mul(3600));

    let response = match args.cache.clone().or_else(|| config.cache_path.clone()) {
        Some(cache_path) => {
            let cache = Arc::new(FileMetadataCache::open(&cache_path, ttl)?);
            if args.clear_cache {
                cache.clear();
                progress_reporter.report(&format!(
                    "🧹 Cleared metadata cache: {}",
                    cache_path.display()
                ));
            }
            let response = analyze(
                Arc::clone(&registry),
                Arc::clone(&cache),
                Arc::clone(&progress_reporter),
                request,
            )
            .await?;
            cache.persist()?;
            response
        }
        None => {
            if request.cache_only {
                progress_reporter.report_error(
                    "⚠️  Warning: --cache-only without --cache; every package will be reported as missing",
                );
            }
            let cache = Arc::new(InMemoryMetadataCache::new(ttl));
            analyze(registry, cache, Arc::clone(&progress_reporter), request).await?
        }
    };

    // Display progress message
    progress_reporter.report(FormatterFactory::progress_message(format));

    // Create formatter using factory
    let use_color = args.output.is_none()
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();
    let formatter = FormatterFactory::create(format, use_color);
    let formatted_output = formatter.format(&response)?;

    // Present output
    let presenter: Box<dyn OutputPresenter> = match &args.output {
        Some(output_path) => Box::new(FileSystemWriter::new(output_path.clone())),
        None => Box::new(StdoutPresenter::new()),
    };
    presenter.present(&formatted_output)?;

    Ok(determine_exit_code(&args, &response))
}

async fn analyze<C>(
    registry: Arc<NuGetRegistryClient>,
    cache: Arc<C>,
    progress_reporter: Arc<StderrProgressReporter>,
    request: AnalysisRequest,
) -> Result<AnalysisResponse>
where
    C: MetadataCache + 'static,
{
    let use_case = AnalyzeMigrationUseCase::new(registry, cache, progress_reporter);
    use_case.execute(request).await
}

/// Loads `--config`, or the config file in the working directory if present
fn load_config(args: &Args) -> Result<ConfigFile> {
    match &args.config {
        Some(path) => config::load_config_from_path(path),
        None => Ok(config::discover_config(Path::new("."))?.unwrap_or_default()),
    }
}

/// Merges CLI flags over config values into a validated request
fn build_request(args: &Args, config: &ConfigFile) -> Result<AnalysisRequest> {
    let mut builder = AnalysisRequest::builder();

    // A package source given on the command line replaces the config's entirely
    if !args.packages.is_empty() || args.prefix.is_some() {
        builder = builder.packages(args.packages.iter().cloned());
        if let Some(prefix) = &args.prefix {
            builder = builder.prefix(prefix.clone());
        }
    } else {
        if let Some(packages) = &config.packages {
            builder = builder.packages(packages.iter().cloned());
        }
        if let Some(prefix) = &config.prefix {
            builder = builder.prefix(prefix.clone());
        }
    }

    if let Some(target) = args.target.as_ref().or(config.target_framework.as_ref()) {
        builder = builder.target_framework(target.clone());
    }

    let current = if args.current.is_empty() {
        config.current_frameworks.clone().unwrap_or_default()
    } else {
        args.current.clone()
    };
    builder = builder.current_frameworks(current);

    if let Some(mask) = args.mask.as_ref().or(config.internal_mask.as_ref()) {
        builder = builder.internal_mask(mask.clone());
    }
    if let Some(filter) = args.dev_filter.as_ref().or(config.dev_filter.as_ref()) {
        builder = builder.dev_filter(filter.clone());
    }

    builder
        .concurrency(
            args.concurrency
                .or(config.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
        )
        .cache_only(args.cache_only || config.cache_only.unwrap_or(false))
        .build()
}

fn resolve_format(args: &Args, config: &ConfigFile) -> Result<OutputFormat> {
    if let Some(format) = args.format {
        return Ok(format);
    }
    match &config.format {
        Some(raw) => raw
            .parse::<OutputFormat>()
            .map_err(|message| MigrationError::Validation { message }.into()),
        None => Ok(OutputFormat::default()),
    }
}

fn build_endpoints(config: &ConfigFile) -> NuGetEndpoints {
    let mut endpoints = NuGetEndpoints::default();
    if let Some(registry) = &config.registry {
        if let Some(url) = &registry.flat_container_url {
            endpoints.flat_container_url = url.clone();
        }
        if let Some(url) = &registry.registration_url {
            endpoints.registration_url = url.clone();
        }
        if let Some(url) = &registry.search_url {
            endpoints.search_url = url.clone();
        }
    }
    endpoints
}

fn determine_exit_code(args: &Args, response: &AnalysisResponse) -> ExitCode {
    if args.fail_on_blocked && response.has_blockers() {
        eprintln!(
            "⚠️  Warning: {} blocked package(s) found",
            response.summary.blocked
        );
        ExitCode::BlockersDetected
    } else {
        ExitCode::Success
    }
}
