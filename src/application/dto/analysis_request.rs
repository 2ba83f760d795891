use crate::migration_planning::domain::TargetFramework;
use crate::migration_planning::services::{InternalMask, DEFAULT_CONCURRENCY};
use crate::shared::error::MigrationError;
use crate::shared::Result;

/// Where the root package ids of an analysis come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// Ids listed explicitly by the user
    Explicit(Vec<String>),
    /// Every registry package whose id starts with the prefix
    Prefix(String),
}

/// AnalysisRequest - validated input of one migration analysis
///
/// Built through [`AnalysisRequest::builder`], which checks the framework
/// monikers and the internal mask before anything touches the network.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub source: PackageSource,
    /// Normalised target framework moniker, e.g. `net8.0`
    pub target_framework: String,
    /// Frameworks the packages must keep supporting while migrating
    pub current_frameworks: Vec<String>,
    pub internal_mask: InternalMask,
    pub dev_filter: Option<String>,
    pub concurrency: usize,
    pub cache_only: bool,
}

impl AnalysisRequest {
    pub fn builder() -> AnalysisRequestBuilder {
        AnalysisRequestBuilder::default()
    }

    /// Every framework the analysis checks, target first
    pub fn frameworks(&self) -> Vec<String> {
        let mut frameworks = vec![self.target_framework.clone()];
        for framework in &self.current_frameworks {
            if !frameworks.contains(framework) {
                frameworks.push(framework.clone());
            }
        }
        frameworks
    }
}

/// Builder for [`AnalysisRequest`]
#[derive(Debug, Clone)]
pub struct AnalysisRequestBuilder {
    packages: Vec<String>,
    prefix: Option<String>,
    target_framework: Option<String>,
    current_frameworks: Vec<String>,
    internal_mask: Option<String>,
    dev_filter: Option<String>,
    concurrency: usize,
    cache_only: bool,
}

impl Default for AnalysisRequestBuilder {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            prefix: None,
            target_framework: None,
            current_frameworks: Vec::new(),
            internal_mask: None,
            dev_filter: None,
            concurrency: DEFAULT_CONCURRENCY,
            cache_only: false,
        }
    }
}

impl AnalysisRequestBuilder {
    pub fn packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn target_framework(mut self, moniker: impl Into<String>) -> Self {
        self.target_framework = Some(moniker.into());
        self
    }

    pub fn current_frameworks<I, S>(mut self, monikers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_frameworks = monikers.into_iter().map(Into::into).collect();
        self
    }

    pub fn internal_mask(mut self, mask: impl Into<String>) -> Self {
        self.internal_mask = Some(mask.into());
        self
    }

    pub fn dev_filter(mut self, filter: impl Into<String>) -> Self {
        self.dev_filter = Some(filter.into());
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn cache_only(mut self, cache_only: bool) -> Self {
        self.cache_only = cache_only;
        self
    }

    /// Validates the collected values and builds the request
    ///
    /// # Errors
    /// - neither (or both) package ids and a prefix were given
    /// - a framework moniker cannot be parsed
    /// - the internal mask is invalid
    /// - concurrency is zero
    pub fn build(self) -> Result<AnalysisRequest> {
        let packages: Vec<String> = self
            .packages
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        let prefix = self
            .prefix
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let source = match (packages.is_empty(), prefix) {
            (false, None) => PackageSource::Explicit(packages),
            (true, Some(prefix)) => PackageSource::Prefix(prefix),
            (false, Some(_)) => {
                return Err(validation("Specify package ids or a prefix, not both"));
            }
            (true, None) => {
                return Err(validation(
                    "At least one package id or a prefix is required",
                ));
            }
        };

        let target = self
            .target_framework
            .ok_or_else(|| validation("A target framework is required"))?;
        let target_framework = parse_moniker(&target)?;

        let mut current_frameworks = Vec::with_capacity(self.current_frameworks.len());
        for moniker in &self.current_frameworks {
            let framework = parse_moniker(moniker)?;
            if framework != target_framework && !current_frameworks.contains(&framework) {
                current_frameworks.push(framework);
            }
        }

        if self.concurrency == 0 {
            return Err(validation("Concurrency must be at least 1"));
        }

        let internal_mask = match self.internal_mask.as_deref() {
            Some(mask) => InternalMask::parse(mask)?,
            None => InternalMask::none(),
        };

        let dev_filter = self
            .dev_filter
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        Ok(AnalysisRequest {
            source,
            target_framework,
            current_frameworks,
            internal_mask,
            dev_filter,
            concurrency: self.concurrency,
            cache_only: self.cache_only,
        })
    }
}

fn parse_moniker(moniker: &str) -> Result<String> {
    TargetFramework::parse(moniker)
        .map(|framework| framework.to_string())
        .ok_or_else(|| {
            MigrationError::InvalidTargetFramework {
                moniker: moniker.to_string(),
            }
            .into()
        })
}

fn validation(message: &str) -> anyhow::Error {
    MigrationError::Validation {
        message: message.to_string(),
    }
    .into()
}
