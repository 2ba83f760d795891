use crate::application::dto::{AnalysisRequest, AnalysisResponse, PackageSource};
use crate::migration_planning::domain::{AnalysisMetadata, PackageNode};
use crate::migration_planning::services::cached_metadata::{
    read_entry, search_cache_key, write_entry,
};
use crate::migration_planning::services::{
    AnalysisTargets, ConflictDetector, DependencyTreeLoader, LoaderOptions, MigrationAnalyzer,
    MigrationOrderer, PackageIndex, StagePlanner,
};
use crate::ports::outbound::{
    LoadProgressCallback, MetadataCache, PackageRegistry, ProgressReporter,
};
use crate::shared::error::MigrationError;
use crate::shared::Result;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Interval at which the progress thread samples the loader counters
const PROGRESS_POLL_INTERVAL_MS: u64 = 50;

/// AnalyzeMigrationUseCase - Core use case for building a migration roadmap
///
/// This use case orchestrates the whole analysis using generic dependency
/// injection for the registry, the metadata cache and progress reporting.
///
/// # Type Parameters
/// * `R` - PackageRegistry implementation
/// * `C` - MetadataCache implementation
/// * `PR` - ProgressReporter implementation (shared with the progress thread)
pub struct AnalyzeMigrationUseCase<R, C, PR> {
    registry: Arc<R>,
    cache: Arc<C>,
    progress_reporter: Arc<PR>,
}

impl<R, C, PR> AnalyzeMigrationUseCase<R, C, PR>
where
    R: PackageRegistry + 'static,
    C: MetadataCache + 'static,
    PR: ProgressReporter + Send + Sync + 'static,
{
    /// Creates a new AnalyzeMigrationUseCase with injected dependencies
    pub fn new(registry: Arc<R>, cache: Arc<C>, progress_reporter: Arc<PR>) -> Self {
        Self {
            registry,
            cache,
            progress_reporter,
        }
    }

    /// Executes the migration analysis
    ///
    /// # Arguments
    /// * `request` - Validated analysis request
    ///
    /// # Returns
    /// AnalysisResponse with the annotated tree, order, stages and conflicts
    ///
    /// # Errors
    /// Fails only while resolving the root ids: an empty prefix search, or an
    /// unreachable registry with no cached search result to fall back on.
    /// Per-package fetch failures are absorbed while loading.
    pub async fn execute(&self, request: AnalysisRequest) -> Result<AnalysisResponse> {
        let mut notices = Vec::new();

        // Step 1: Resolve root package ids
        let root_ids = self.resolve_root_ids(&request, &mut notices).await?;

        // Step 2: Load dependency trees
        let roots = self.load_trees(&request, &root_ids).await;

        // Step 3: Analyze compatibility
        let targets = AnalysisTargets::new(&request.target_framework, &request.current_frameworks);
        let roots = self.analyze_compatibility(&request, roots, &targets).await;

        // Step 4: Order packages and assign ranks
        let order = MigrationOrderer::compute(&roots);
        if !order.broken_edges.is_empty() {
            tracing::debug!(
                broken_edges = order.broken_edges.len(),
                "Cycles broken while ordering packages"
            );
        }
        let roots = MigrationOrderer::assign(roots, &order);

        // Step 5: Detect conflicts and plan stages
        let conflicts = ConflictDetector::detect(&roots);
        let stages = StagePlanner::plan(&roots);

        // Step 6: Build response
        let metadata = AnalysisMetadata::for_run(targets.target(), &request.current_frameworks);
        let response = AnalysisResponse::new(metadata, roots, order, stages, conflicts, notices);
        self.report_summary(&response);
        Ok(response)
    }

    /// Resolves the root ids from the explicit list or a prefix search
    async fn resolve_root_ids(
        &self,
        request: &AnalysisRequest,
        notices: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        match &request.source {
            PackageSource::Explicit(ids) => Ok(ids.clone()),
            PackageSource::Prefix(prefix) => {
                self.progress_reporter
                    .report(&format!("🔍 Searching registry for packages starting with '{}'...", prefix));
                let ids = self
                    .search_prefix(prefix, request.cache_only, notices)
                    .await?;
                self.progress_reporter
                    .report(&format!("✅ Found {} package(s)", ids.len()));
                Ok(ids)
            }
        }
    }

    /// Runs a prefix search, falling back to the last cached result when the
    /// registry cannot be reached. Successful searches refresh the cache.
    async fn search_prefix(
        &self,
        prefix: &str,
        cache_only: bool,
        notices: &mut Vec<String>,
    ) -> Result<Vec<String>> {
        let key = search_cache_key(prefix);
        let cached: Option<Vec<String>> =
            read_entry(self.cache.as_ref(), &key).filter(|ids: &Vec<String>| !ids.is_empty());

        if cache_only {
            return cached.ok_or_else(|| {
                MigrationError::NoPackagesFound {
                    prefix: prefix.to_string(),
                }
                .into()
            });
        }

        match self.registry.search_by_prefix(prefix).await {
            Ok(ids) if ids.is_empty() => Err(MigrationError::NoPackagesFound {
                prefix: prefix.to_string(),
            }
            .into()),
            Ok(ids) => {
                write_entry(self.cache.as_ref(), &key, &ids);
                Ok(ids)
            }
            Err(error) => match cached {
                Some(ids) => {
                    tracing::warn!(prefix, error = %error, "Prefix search failed, using cached result");
                    let notice = format!(
                        "Registry unreachable, using cached search results for '{}'",
                        prefix
                    );
                    self.progress_reporter
                        .report_error(&format!("⚠️  Warning: {}", notice));
                    notices.push(notice);
                    Ok(ids)
                }
                None => Err(MigrationError::RegistryUnreachable {
                    prefix: prefix.to_string(),
                    details: error.to_string(),
                }
                .into()),
            },
        }
    }

    /// Loads every root tree while a background thread mirrors the loader's
    /// growing counters onto the progress reporter
    async fn load_trees(&self, request: &AnalysisRequest, root_ids: &[String]) -> Vec<PackageNode> {
        self.progress_reporter.report(&format!(
            "📦 Resolving dependency trees for {} root package(s)...",
            root_ids.len()
        ));

        let loader = DependencyTreeLoader::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.cache),
            LoaderOptions {
                internal_mask: request.internal_mask.clone(),
                dev_filter: request.dev_filter.clone(),
                concurrency: request.concurrency,
                cache_only: request.cache_only,
            },
        );

        // Create atomic counters for thread-safe progress sharing
        let progress_current = Arc::new(AtomicUsize::new(0));
        let progress_total = Arc::new(AtomicUsize::new(0));
        let is_done = Arc::new(AtomicBool::new(false));

        let current_clone = Arc::clone(&progress_current);
        let total_clone = Arc::clone(&progress_total);
        let done_clone = Arc::clone(&is_done);
        let reporter = Arc::clone(&self.progress_reporter);

        // Spawn a thread to update the progress display
        let progress_handle = thread::spawn(move || {
            let mut last_seen = (0, 0);
            while !done_clone.load(Ordering::Relaxed) {
                let snapshot = (
                    current_clone.load(Ordering::Relaxed),
                    total_clone.load(Ordering::Relaxed),
                );
                if snapshot.1 > 0 && snapshot != last_seen {
                    reporter.report_progress(snapshot.0, snapshot.1, Some("Resolving packages..."));
                    last_seen = snapshot;
                }
                thread::sleep(Duration::from_millis(PROGRESS_POLL_INTERVAL_MS));
            }
        });

        let progress_callback: LoadProgressCallback =
            Arc::new(move |current: usize, total: usize| {
                progress_current.store(current, Ordering::Relaxed);
                progress_total.store(total, Ordering::Relaxed);
            });

        let roots = loader.load_with_progress(root_ids, progress_callback).await;

        // Signal completion and wait for the progress thread
        is_done.store(true, Ordering::Relaxed);
        let _ = progress_handle.join();

        let unique = PackageIndex::build(&roots).len();
        self.progress_reporter
            .report_completion(&format!("✅ Resolved {} unique package(s)", unique));
        roots
    }

    async fn analyze_compatibility(
        &self,
        request: &AnalysisRequest,
        roots: Vec<PackageNode>,
        targets: &AnalysisTargets,
    ) -> Vec<PackageNode> {
        let frameworks = targets.frameworks().join(", ");
        self.progress_reporter
            .report(&format!("🧮 Analyzing compatibility with {}...", frameworks));

        let analyzer = MigrationAnalyzer::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.cache),
            request.cache_only,
        );
        analyzer.analyze(roots, targets).await
    }

    fn report_summary(&self, response: &AnalysisResponse) {
        let summary = &response.summary;
        self.progress_reporter.report_completion(&format!(
            "✅ Analysis complete: {} ready, {} partial, {} split, {} blocked across {} stage(s)",
            summary.ready,
            summary.partial,
            summary.split,
            summary.blocked,
            response.stages.len()
        ));
        if summary.conflicts > 0 {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: {} package(s) are requested at conflicting versions",
                summary.conflicts
            ));
        }
    }
}
