use super::cached_metadata::{self, CachedDependency, CachedPackage};
use super::internal_mask::InternalMask;
use crate::migration_planning::domain::{package_key, PackageNode, UNKNOWN_VERSION};
use crate::migration_planning::policies::VersionSelectionPolicy;
use crate::ports::outbound::{LoadProgressCallback, MetadataCache, PackageDetails, PackageRegistry};
use crate::shared::error::RegistryError;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Default number of registry requests allowed in flight at once
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Settings of one loader
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Marks matching package ids as internal
    pub internal_mask: InternalMask,
    /// Prerelease token preferred when picking a root version
    pub dev_filter: Option<String>,
    /// Maximum registry requests in flight
    pub concurrency: usize,
    /// Treat cache misses as missing packages instead of calling the registry
    pub cache_only: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            internal_mask: InternalMask::none(),
            dev_filter: None,
            concurrency: DEFAULT_CONCURRENCY,
            cache_only: false,
        }
    }
}

/// DependencyTreeLoader resolves root package ids into full dependency trees.
///
/// Every package id is expanded at most once per run. Later occurrences
/// become shared-reference stubs, whether the first load already finished
/// or is still in flight on another branch. Ids found among their own
/// ancestors become cyclic terminal nodes.
///
/// All branches run as futures of the calling task: sibling dependencies are
/// loaded concurrently and reassembled in declaration order. Only registry
/// requests are bounded by the concurrency limit; cache hits never wait.
///
/// Fetch failures are absorbed per package. A package the registry cannot
/// describe still gets a node with whatever data was available.
pub struct DependencyTreeLoader<R, C> {
    registry: Arc<R>,
    cache: Arc<C>,
    options: LoaderOptions,
}

impl<R, C> DependencyTreeLoader<R, C>
where
    R: PackageRegistry + 'static,
    C: MetadataCache + 'static,
{
    pub fn new(registry: Arc<R>, cache: Arc<C>, options: LoaderOptions) -> Self {
        Self {
            registry,
            cache,
            options,
        }
    }

    /// Loads the trees of all roots, in the order given
    pub async fn load(&self, root_ids: &[String]) -> Vec<PackageNode> {
        self.load_with_progress(root_ids, Arc::new(|_: usize, _: usize| {}))
            .await
    }

    /// Loads the trees of all roots, reporting `(current, total)` counts.
    ///
    /// `total` counts packages discovered so far and grows while the tree is
    /// explored; `current` counts packages whose subtree is complete.
    pub async fn load_with_progress(
        &self,
        root_ids: &[String],
        progress: LoadProgressCallback,
    ) -> Vec<PackageNode> {
        let run = Arc::new(LoadRun {
            registry: Arc::clone(&self.registry),
            cache: Arc::clone(&self.cache),
            options: self.options.clone(),
            limiter: Semaphore::new(self.options.concurrency.max(1)),
            state: Mutex::new(LoadState::default()),
            current: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            progress,
        });

        let roots = root_ids
            .iter()
            .map(|id| LoadRun::load_node(&run, NodeRequest::root(id)));
        let nodes = join_all(roots).await;

        debug!(
            roots = nodes.len(),
            packages = run.total.load(Ordering::SeqCst),
            "Dependency tree loaded"
        );
        nodes
    }
}

type PendingNode = Shared<BoxFuture<'static, PackageNode>>;

/// One occurrence to resolve
#[derive(Debug, Clone)]
struct NodeRequest {
    id: String,
    requested_version: Option<String>,
    depth: usize,
    /// Keys on the path from the root, excluding this one
    ancestors: HashSet<String>,
    parent: Option<String>,
}

impl NodeRequest {
    fn root(id: &str) -> Self {
        Self {
            id: id.trim().to_string(),
            requested_version: None,
            depth: 0,
            ancestors: HashSet::new(),
            parent: None,
        }
    }
}

/// Shared state of one run. Always mutated without an await in between.
#[derive(Default)]
struct LoadState {
    /// Childless copies of completed packages
    visited: HashMap<String, PackageNode>,
    in_flight: HashMap<String, PendingNode>,
    /// Wait-for graph: package key -> keys whose loads it is awaiting
    waits_on: HashMap<String, HashSet<String>>,
}

impl LoadState {
    fn add_wait(&mut self, waiter: &str, target: &str) {
        self.waits_on
            .entry(waiter.to_string())
            .or_default()
            .insert(target.to_string());
    }

    /// True when `from` is (transitively) waiting on `to`
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(key) = stack.pop() {
            if key == to {
                return true;
            }
            if !seen.insert(key) {
                continue;
            }
            if let Some(targets) = self.waits_on.get(key) {
                stack.extend(targets.iter().map(String::as_str));
            }
        }
        false
    }
}

enum Claim {
    Resolved(PackageNode),
    Follow(PendingNode),
    Owner(PendingNode),
    WouldDeadlock,
}

struct LoadRun<R, C> {
    registry: Arc<R>,
    cache: Arc<C>,
    options: LoaderOptions,
    limiter: Semaphore,
    state: Mutex<LoadState>,
    current: AtomicUsize,
    total: AtomicUsize,
    progress: LoadProgressCallback,
}

impl<R, C> LoadRun<R, C>
where
    R: PackageRegistry + 'static,
    C: MetadataCache + 'static,
{
    fn load_node(run: &Arc<Self>, request: NodeRequest) -> BoxFuture<'static, PackageNode> {
        let run = Arc::clone(run);
        async move {
            let key = package_key(&request.id);
            if request.ancestors.contains(&key) {
                debug!(package = %request.id, depth = request.depth, "Cycle detected");
                return run.cyclic_node(request);
            }

            match Self::claim(&run, &key, &request) {
                Claim::Resolved(stub) => stub,
                Claim::Follow(pending) => pending
                    .await
                    .shared_reference(request.depth, request.requested_version),
                Claim::Owner(pending) => pending.await,
                Claim::WouldDeadlock => {
                    debug!(
                        package = %request.id,
                        depth = request.depth,
                        "Cross-branch cycle detected"
                    );
                    run.cyclic_node(request)
                }
            }
        }
        .boxed()
    }

    /// Decides, atomically, how this occurrence of `key` gets its data
    fn claim(run: &Arc<Self>, key: &str, request: &NodeRequest) -> Claim {
        let mut state = run.lock_state();

        if let Some(template) = state.visited.get(key) {
            return Claim::Resolved(
                template.shared_reference(request.depth, request.requested_version.clone()),
            );
        }

        if let Some(pending) = state.in_flight.get(key).cloned() {
            if let Some(parent) = request.parent.as_deref() {
                if state.reaches(key, parent) {
                    return Claim::WouldDeadlock;
                }
                state.add_wait(parent, key);
            }
            return Claim::Follow(pending);
        }

        let pending = Self::resolve_package(Arc::clone(run), request.clone(), key.to_string())
            .boxed()
            .shared();
        state.in_flight.insert(key.to_string(), pending.clone());
        if let Some(parent) = request.parent.as_deref() {
            state.add_wait(parent, key);
        }
        drop(state);

        run.report_discovered();
        Claim::Owner(pending)
    }

    async fn resolve_package(run: Arc<Self>, request: NodeRequest, key: String) -> PackageNode {
        let is_internal = run.options.internal_mask.matches(&request.id);
        let metadata = run.fetch_metadata(&request, &key).await;

        let mut ancestors = request.ancestors.clone();
        ancestors.insert(key.clone());
        let children = join_all(metadata.dependencies.iter().map(|dependency| {
            Self::load_node(
                &run,
                NodeRequest {
                    id: dependency.id.clone(),
                    requested_version: dependency.version.clone(),
                    depth: request.depth + 1,
                    ancestors: ancestors.clone(),
                    parent: Some(key.clone()),
                },
            )
        }))
        .await;

        let node = PackageNode::resolved(
            request.id,
            metadata.version,
            request.requested_version,
            metadata.available_versions,
            is_internal,
            request.depth,
            metadata.target_frameworks,
            children,
        );
        run.complete(&key, &node);
        node
    }

    /// Reads package metadata from the cache, falling back to the registry
    async fn fetch_metadata(&self, request: &NodeRequest, key: &str) -> CachedPackage {
        if let Some(cached) =
            cached_metadata::read_entry::<CachedPackage, _>(self.cache.as_ref(), key)
        {
            debug!(package = %request.id, "Cache hit");
            return cached;
        }

        if self.options.cache_only {
            debug!(package = %request.id, "Cache miss in cache-only mode");
            return CachedPackage::missing(request.requested_version.clone());
        }

        let versions = self.limited(self.registry.list_versions(&request.id)).await;
        let versions_ok = versions.is_ok();
        let available_versions = versions.unwrap_or_else(|e| {
            log_fetch_failure(&e);
            request.requested_version.iter().cloned().collect()
        });

        let version = match &request.requested_version {
            Some(version) => version.clone(),
            None => VersionSelectionPolicy::select(
                &available_versions,
                self.options.dev_filter.as_deref(),
            ),
        };

        if version == UNKNOWN_VERSION {
            return CachedPackage {
                version,
                available_versions,
                target_frameworks: vec![],
                dependencies: vec![],
            };
        }

        let details = self
            .limited(self.registry.get_details(&request.id, &version))
            .await;
        let details_ok = details.is_ok();
        let details = details.unwrap_or_else(|e| {
            log_fetch_failure(&e);
            PackageDetails::default()
        });

        let metadata = CachedPackage {
            version,
            available_versions,
            target_frameworks: details.target_frameworks(),
            dependencies: details
                .merged_dependencies()
                .into_iter()
                .map(|dependency| CachedDependency {
                    version: VersionSelectionPolicy::requested_from_range(
                        dependency.range.as_deref(),
                    ),
                    id: dependency.id,
                })
                .collect(),
        }
        .for_storage();

        if versions_ok && details_ok {
            cached_metadata::write_entry(self.cache.as_ref(), key, &metadata);
        }
        metadata
    }

    /// Runs a registry request under the concurrency limit
    async fn limited<F: Future>(&self, request: F) -> F::Output {
        // The semaphore is never closed, so acquisition cannot fail
        let _permit = self.limiter.acquire().await;
        request.await
    }

    fn cyclic_node(&self, request: NodeRequest) -> PackageNode {
        let is_internal = self.options.internal_mask.matches(&request.id);
        PackageNode::cyclic(
            request.id,
            request.requested_version,
            is_internal,
            request.depth,
        )
    }

    fn complete(&self, key: &str, node: &PackageNode) {
        {
            let mut state = self.lock_state();
            state
                .visited
                .insert(key.to_string(), node.shared_reference(node.depth, None));
            state.in_flight.remove(key);
            state.waits_on.remove(key);
        }
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        (self.progress)(current, self.total.load(Ordering::SeqCst));
    }

    fn report_discovered(&self) {
        let total = self.total.fetch_add(1, Ordering::SeqCst) + 1;
        (self.progress)(self.current.load(Ordering::SeqCst), total);
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn log_fetch_failure(error: &RegistryError) {
    if error.is_not_found() {
        debug!("{}", error);
    } else {
        warn!("{}", error);
    }
}
