use crate::migration_planning::domain::UNKNOWN_VERSION;

/// VersionSelectionPolicy picks which version of a package to analyse.
///
/// Priority order when no version is requested explicitly:
/// 1. Newest prerelease whose label contains the dev filter token
/// 2. Newest stable version (no `-` prerelease marker)
/// 3. Newest version of any kind
/// 4. `"unknown"` when the registry knows no versions
pub struct VersionSelectionPolicy;

impl VersionSelectionPolicy {
    /// Selects a version from a newest-first list
    pub fn select(versions: &[String], dev_filter: Option<&str>) -> String {
        let dev_filter = dev_filter
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty());

        if let Some(token) = dev_filter {
            let dev_match = versions
                .iter()
                .find(|version| version.contains('-') && version.to_lowercase().contains(&token));
            if let Some(version) = dev_match {
                return version.clone();
            }
        }

        versions
            .iter()
            .find(|version| !version.contains('-'))
            .or_else(|| versions.first())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// Extracts the version a dependency range asks for.
    ///
    /// NuGet ranges use interval notation (`[1.0.0, )`, `(, 2.0]`, `[1.2.3]`)
    /// or a bare minimum version (`1.0.0`). The lower bound is used; ranges
    /// without one yield `None`.
    pub fn requested_from_range(range: Option<&str>) -> Option<String> {
        let range = range?.trim();
        let inner = range
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')']);
        let lower = inner.split(',').next().unwrap_or_default().trim();
        if lower.is_empty() {
            None
        } else {
            Some(lower.to_string())
        }
    }
}
