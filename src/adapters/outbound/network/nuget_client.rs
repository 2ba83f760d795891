use crate::ports::outbound::{PackageDetails, PackageRegistry};
use crate::shared::error::RegistryError;
use crate::shared::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_FLAT_CONTAINER_URL: &str = "https://api.nuget.org/v3-flatcontainer";
pub const DEFAULT_REGISTRATION_URL: &str = "https://api.nuget.org/v3/registration5-gz-semver2";
pub const DEFAULT_SEARCH_URL: &str = "https://azuresearch-usnc.nuget.org/query";

/// Results requested per search page
const SEARCH_PAGE_SIZE: usize = 100;

/// Upper bound on ids collected from one prefix search
const MAX_SEARCH_RESULTS: usize = 1000;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Base URLs of the NuGet v3 services used by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuGetEndpoints {
    pub flat_container_url: String,
    pub registration_url: String,
    pub search_url: String,
}

impl Default for NuGetEndpoints {
    fn default() -> Self {
        Self {
            flat_container_url: DEFAULT_FLAT_CONTAINER_URL.to_string(),
            registration_url: DEFAULT_REGISTRATION_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VersionIndex {
    #[serde(default)]
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationLeaf {
    catalog_entry: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    total_hits: usize,
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
}

/// NuGetRegistryClient adapter for the NuGet v3 HTTP API
///
/// This adapter implements the PackageRegistry port:
/// - versions come from the flat container (`{id}/index.json`)
/// - details come from the registration leaf, then its catalog entry
/// - prefix search pages through the search service
///
/// Requests are not retried; the tree loader already tolerates failures.
pub struct NuGetRegistryClient {
    client: reqwest::Client,
    endpoints: NuGetEndpoints,
}

impl NuGetRegistryClient {
    /// Creates a client for the given endpoints
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(endpoints: NuGetEndpoints) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("nuget-roadmap/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, endpoints })
    }

    /// Validates a path component before it is placed in a URL
    fn validate_url_component(
        package_id: &str,
        component: &str,
        component_type: &str,
    ) -> std::result::Result<(), RegistryError> {
        let reason = if component.trim().is_empty() {
            Some(format!("{} is empty", component_type))
        } else if component.contains('/') || component.contains('\\') {
            Some(format!(
                "{} contains path separators which are not allowed",
                component_type
            ))
        } else if component.contains("..") {
            Some(format!("{} contains '..' which is not allowed", component_type))
        } else if component.contains('#') || component.contains('?') || component.contains('@') {
            Some(format!("{} contains URL-unsafe characters", component_type))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RegistryError::InvalidPackageId {
                package_id: package_id.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn versions_url(&self, package_id: &str) -> String {
        format!(
            "{}/{}/index.json",
            self.endpoints.flat_container_url.trim_end_matches('/'),
            urlencoding::encode(&package_id.to_lowercase())
        )
    }

    fn registration_url(&self, package_id: &str, version: &str) -> String {
        format!(
            "{}/{}/{}.json",
            self.endpoints.registration_url.trim_end_matches('/'),
            urlencoding::encode(&package_id.to_lowercase()),
            urlencoding::encode(&version.to_lowercase())
        )
    }

    fn search_url(&self, prefix: &str, skip: usize) -> String {
        format!(
            "{}?q={}&prerelease=true&semVerLevel=2.0.0&skip={}&take={}",
            self.endpoints.search_url,
            urlencoding::encode(prefix),
            skip,
            SEARCH_PAGE_SIZE
        )
    }

    /// GETs a JSON document, mapping 404 to `NotFound`
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package_id: &str,
    ) -> std::result::Result<T, RegistryError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::network(package_id, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::not_found(package_id));
        }
        if !status.is_success() {
            return Err(RegistryError::network(
                package_id,
                format!("registry returned status code {}", status),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::InvalidResponse {
                package_id: package_id.to_string(),
                details: e.to_string(),
            })
    }
}

#[async_trait]
impl PackageRegistry for NuGetRegistryClient {
    async fn list_versions(
        &self,
        package_id: &str,
    ) -> std::result::Result<Vec<String>, RegistryError> {
        Self::validate_url_component(package_id, package_id, "Package id")?;

        let index: VersionIndex = self
            .get_json(&self.versions_url(package_id), package_id)
            .await?;
        // The flat container lists versions oldest first
        Ok(index.versions.into_iter().rev().collect())
    }

    async fn get_details(
        &self,
        package_id: &str,
        version: &str,
    ) -> std::result::Result<PackageDetails, RegistryError> {
        Self::validate_url_component(package_id, package_id, "Package id")?;
        Self::validate_url_component(package_id, version, "Version")?;

        let leaf: RegistrationLeaf = self
            .get_json(&self.registration_url(package_id, version), package_id)
            .await?;
        self.get_json(&leaf.catalog_entry, package_id).await
    }

    async fn search_by_prefix(
        &self,
        prefix: &str,
    ) -> std::result::Result<Vec<String>, RegistryError> {
        let needle = prefix.trim().to_lowercase();
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut skip = 0;

        loop {
            let page: SearchPage = self.get_json(&self.search_url(prefix.trim(), skip), prefix).await?;
            let page_len = page.data.len();

            for hit in page.data {
                if hit.id.to_lowercase().starts_with(&needle) && seen.insert(hit.id.to_lowercase()) {
                    ids.push(hit.id);
                }
            }

            skip += page_len;
            if page_len == 0 || skip >= page.total_hits || ids.len() >= MAX_SEARCH_RESULTS {
                break;
            }
        }

        ids.truncate(MAX_SEARCH_RESULTS);
        tracing::debug!(prefix, found = ids.len(), "Prefix search complete");
        Ok(ids)
    }
}
