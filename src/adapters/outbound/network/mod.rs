/// Network adapters for external API calls
mod nuget_client;

pub use nuget_client::{
    NuGetEndpoints, NuGetRegistryClient, DEFAULT_FLAT_CONTAINER_URL, DEFAULT_REGISTRATION_URL,
    DEFAULT_SEARCH_URL,
};
