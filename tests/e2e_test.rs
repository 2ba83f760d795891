/// End-to-end tests for the CLI
///
/// Every run that reaches the analysis uses `--cache-only` against a cache
/// file seeded by the test, so no registry is contacted.
use assert_cmd::cargo::cargo_bin_cmd;
use chrono::Utc;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Cache value of a resolved package
fn package(version: &str, frameworks: &[&str], dependencies: &[(&str, &str)]) -> Value {
    json!({
        "version": version,
        "availableVersions": [version],
        "targetFrameworks": frameworks,
        "dependencies": dependencies
            .iter()
            .map(|(id, version)| json!({ "id": id, "version": version }))
            .collect::<Vec<_>>(),
    })
}

/// Writes a cache snapshot holding `entries`, all stored just now
fn write_cache(dir: &Path, entries: &[(&str, Value)]) -> PathBuf {
    let stored_at = Utc::now().to_rfc3339();
    let entries: serde_json::Map<String, Value> = entries
        .iter()
        .map(|(key, value)| {
            (
                key.to_string(),
                json!({ "value": value, "storedAt": stored_at }),
            )
        })
        .collect();
    let path = dir.join("cache.json");
    fs::write(
        &path,
        serde_json::to_string_pretty(&json!({ "version": 1, "entries": entries })).unwrap(),
    )
    .unwrap();
    path
}

/// App (net8.0) -> Data (netstandard2.0); Legacy declares only net9.0
fn seeded_cache(dir: &Path) -> PathBuf {
    write_cache(
        dir,
        &[
            (
                "contoso.app",
                package("3.0.0", &["net8.0"], &[("Contoso.Data", "2.0.0")]),
            ),
            ("contoso.data", package("2.0.0", &["netstandard2.0"], &[])),
            ("contoso.legacy", package("1.0.0", &["net9.0"], &[])),
            (
                "search:contoso.",
                json!(["contoso.app", "contoso.data"]),
            ),
        ],
    )
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("nuget-roadmap").arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("nuget-roadmap")
            .arg("--version")
            .assert()
            .code(0)
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("nuget-roadmap")
            .arg("--invalid-option")
            .assert()
            .code(2);
    }

    /// Exit code 2: Invalid format value
    #[test]
    fn test_exit_code_invalid_format() {
        cargo_bin_cmd!("nuget-roadmap")
            .args(["Contoso.App", "-t", "net8.0", "-f", "invalid_format"])
            .assert()
            .code(2);
    }

    /// Exit code 2: packages and --prefix together
    #[test]
    fn test_exit_code_packages_with_prefix() {
        cargo_bin_cmd!("nuget-roadmap")
            .args(["Contoso.App", "--prefix", "Contoso.", "-t", "net8.0"])
            .assert()
            .code(2);
    }

    /// Exit code 3: Application error - no target framework anywhere
    #[test]
    fn test_exit_code_missing_target() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .arg("Contoso.App")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("target framework"));
    }

    /// Exit code 3: Application error - unrecognised moniker
    #[test]
    fn test_exit_code_invalid_moniker() {
        let dir = TempDir::new().unwrap();
        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["Contoso.App", "-t", "java8"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("java8"));
    }

    /// Exit code 3: Application error - cache-only prefix search with nothing cached
    #[test]
    fn test_exit_code_prefix_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = write_cache(dir.path(), &[]);
        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["--prefix", "Fabrikam.", "-t", "net8.0", "--cache-only"])
            .arg("--cache")
            .arg(&cache)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Fabrikam."));
    }

    /// Exit code 0: blocked packages without --fail-on-blocked
    #[test]
    fn test_exit_code_blocked_without_flag() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());
        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["Contoso.Legacy", "-t", "net8.0", "--cache-only"])
            .arg("--cache")
            .arg(&cache)
            .assert()
            .code(0);
    }

    /// Exit code 1: blocked packages with --fail-on-blocked
    #[test]
    fn test_exit_code_fail_on_blocked() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());
        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args([
                "Contoso.Legacy",
                "-t",
                "net8.0",
                "--cache-only",
                "--fail-on-blocked",
            ])
            .arg("--cache")
            .arg(&cache)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("1 blocked package(s) found"));
    }

    /// Exit code 0: --fail-on-blocked with a clean roadmap
    #[test]
    fn test_exit_code_fail_on_blocked_clean() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());
        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args([
                "Contoso.App",
                "-t",
                "net8.0",
                "--cache-only",
                "--fail-on-blocked",
            ])
            .arg("--cache")
            .arg(&cache)
            .assert()
            .code(0);
    }
}

mod output_tests {
    use super::*;

    #[test]
    fn test_json_roadmap_from_cache() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());

        let output = cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["Contoso.App", "-t", "net8.0", "--cache-only"])
            .arg("--cache")
            .arg(&cache)
            .output()
            .unwrap();

        assert!(output.status.success());
        let report = stdout_json(&output);
        assert_eq!(report["metadata"]["targetFramework"], "net8.0");
        assert_eq!(report["summary"]["totalPackages"], 2);
        assert_eq!(report["summary"]["ready"], 2);
        assert_eq!(
            report["migrationOrder"]["packageIds"],
            json!(["Contoso.Data", "Contoso.App"])
        );
        assert_eq!(report["roots"][0]["dependencies"][0]["id"], "Contoso.Data");
        assert_eq!(report["roots"][0]["dependencies"][0]["status"], "ready");
    }

    #[test]
    fn test_text_roadmap_to_file() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());
        let output_path = dir.path().join("roadmap.txt");

        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args([
                "Contoso.App",
                "Contoso.Legacy",
                "-t",
                "net8.0",
                "--cache-only",
                "-f",
                "text",
            ])
            .arg("--cache")
            .arg(&cache)
            .arg("-o")
            .arg(&output_path)
            .assert()
            .code(0)
            .stdout(predicate::str::is_empty());

        let roadmap = fs::read_to_string(&output_path).unwrap();
        assert!(roadmap.contains("Migration roadmap for net8.0"));
        assert!(roadmap.contains("Contoso.Legacy"));
        assert!(roadmap.contains("Blocked packages"));
        // Written to a file: no color codes
        assert!(!roadmap.contains('\u{1b}'));
    }

    #[test]
    fn test_prefix_run_from_cached_search() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());

        let output = cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["--prefix", "Contoso.", "-t", "net8.0", "--cache-only"])
            .arg("--cache")
            .arg(&cache)
            .output()
            .unwrap();

        assert!(output.status.success());
        let report = stdout_json(&output);
        assert_eq!(report["roots"].as_array().unwrap().len(), 2);
        // Package ids are case-insensitive; a root may take the casing of
        // the occurrence that was expanded first
        let stage = |n: usize| -> Vec<String> {
            report["stages"][n]["packageIds"]
                .as_array()
                .unwrap()
                .iter()
                .map(|id| id.as_str().unwrap().to_lowercase())
                .collect()
        };
        assert_eq!(stage(0), vec!["contoso.data"]);
        assert_eq!(stage(1), vec!["contoso.app"]);
    }

    #[test]
    fn test_cache_file_is_rewritten_after_run() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());

        cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["Contoso.App", "-t", "net8.0", "--cache-only"])
            .arg("--cache")
            .arg(&cache)
            .assert()
            .code(0);

        let snapshot: Value = serde_json::from_str(&fs::read_to_string(&cache).unwrap()).unwrap();
        assert_eq!(snapshot["version"], 1);
        assert!(snapshot["entries"]["contoso.app"]["value"].is_object());
    }

    #[test]
    fn test_clear_cache_empties_the_file() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());

        let output = cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args(["Contoso.App", "-t", "net8.0", "--cache-only", "--clear-cache"])
            .arg("--cache")
            .arg(&cache)
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Cleared metadata cache"));
        // Nothing cached: the root is reported with an unknown version
        let report = stdout_json(&output);
        assert_eq!(report["roots"][0]["version"], "unknown");
        let snapshot: Value = serde_json::from_str(&fs::read_to_string(&cache).unwrap()).unwrap();
        assert!(snapshot["entries"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_current_frameworks_are_recorded() {
        let dir = TempDir::new().unwrap();
        let cache = seeded_cache(dir.path());

        let output = cargo_bin_cmd!("nuget-roadmap")
            .current_dir(dir.path())
            .args([
                "Contoso.Data",
                "-t",
                "net8.0",
                "--current",
                "net6.0",
                "--cache-only",
            ])
            .arg("--cache")
            .arg(&cache)
            .output()
            .unwrap();

        assert!(output.status.success());
        let report = stdout_json(&output);
        assert_eq!(report["metadata"]["currentFrameworks"], json!(["net6.0"]));
        let compatibility = report["roots"][0]["frameworkCompatibility"]
            .as_array()
            .unwrap();
        assert_eq!(compatibility.len(), 2);
        assert!(compatibility.iter().all(|c| c["supported"] == true));
    }
}
