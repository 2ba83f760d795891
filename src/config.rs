//! Configuration file support for nuget-roadmap.
//!
//! Provides YAML-based configuration through `nuget-roadmap.config.yml` files,
//! including data structures, file loading, and validation. Command-line
//! flags override whatever the file sets.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::migration_planning::domain::TargetFramework;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "nuget-roadmap.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub packages: Option<Vec<String>>,
    pub prefix: Option<String>,
    pub target_framework: Option<String>,
    pub current_frameworks: Option<Vec<String>>,
    pub internal_mask: Option<String>,
    pub dev_filter: Option<String>,
    pub concurrency: Option<usize>,
    pub cache_path: Option<PathBuf>,
    pub cache_ttl_hours: Option<u64>,
    pub cache_only: Option<bool>,
    pub format: Option<String>,
    pub registry: Option<RegistryConfig>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Overrides for the NuGet v3 service URLs.
#[derive(Debug, Deserialize, Default)]
pub struct RegistryConfig {
    pub flat_container_url: Option<String>,
    pub registration_url: Option<String>,
    pub search_url: Option<String>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.concurrency == Some(0) {
        bail!(
            "Invalid config: concurrency must be at least 1.\n\n\
             💡 Hint: Omit the field to use the default of 6 concurrent requests."
        );
    }

    if let Some(ref target) = config.target_framework {
        if TargetFramework::parse(target).is_none() {
            bail!(
                "Invalid config: target_framework '{}' is not a recognised moniker.\n\n\
                 💡 Hint: Use a short moniker such as net8.0, netcoreapp3.1 or netstandard2.0.",
                target
            );
        }
    }

    if let Some(ref current) = config.current_frameworks {
        for (i, moniker) in current.iter().enumerate() {
            if TargetFramework::parse(moniker).is_none() {
                bail!(
                    "Invalid config: current_frameworks[{}] '{}' is not a recognised moniker.",
                    i,
                    moniker
                );
            }
        }
    }

    if let Some(ref packages) = config.packages {
        for (i, id) in packages.iter().enumerate() {
            if id.trim().is_empty() {
                bail!("Invalid config: packages[{}] must not be empty.", i);
            }
        }
    }

    if let Some(ref registry) = config.registry {
        let urls = [
            ("flat_container_url", &registry.flat_container_url),
            ("registration_url", &registry.registration_url),
            ("search_url", &registry.search_url),
        ];
        for (name, url) in urls {
            if let Some(url) = url {
                if url.trim().is_empty() {
                    bail!(
                        "Invalid config: registry.{} must not be empty.\n\n\
                         💡 Hint: Remove the field to use the public nuget.org endpoint.",
                        name
                    );
                }
            }
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let mut keys: Vec<&String> = config.unknown_fields.keys().collect();
    keys.sort();
    for key in keys {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
