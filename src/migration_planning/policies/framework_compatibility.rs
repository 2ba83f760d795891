use crate::migration_planning::domain::{
    CompatibilityMode, FrameworkCompatibility, FrameworkFamily, TargetFramework,
};

/// FrameworkCompatibilityPolicy decides whether a package's declared frameworks
/// can run on a target framework.
///
/// Precedence:
/// 1. No declared frameworks: portable, always supported
/// 2. Direct match on the `net` / `netcoreapp` chain (best match kept: `net`
///    outranks `netcoreapp`, then the higher version)
/// 3. Any `netstandard` declaration when the target is a runtime framework
/// 4. Otherwise unsupported
pub struct FrameworkCompatibilityPolicy;

impl FrameworkCompatibilityPolicy {
    /// Classifies `declared` against one `target` moniker
    pub fn check(declared: &[String], target: &str) -> FrameworkCompatibility {
        if declared.is_empty() {
            return Self::result(target, true, CompatibilityMode::Portable, None);
        }

        let Some(target_tfm) = TargetFramework::parse(target) else {
            return Self::result(target, false, CompatibilityMode::None, None);
        };

        let parsed: Vec<TargetFramework> = declared
            .iter()
            .filter_map(|moniker| TargetFramework::parse(moniker))
            .collect();

        let direct = parsed
            .iter()
            .filter(|tfm| Self::is_direct_match(tfm, &target_tfm))
            .max_by(|a, b| a.precedence_cmp(b));
        if let Some(best) = direct {
            return Self::result(
                target,
                true,
                CompatibilityMode::Direct,
                Some(best.to_string()),
            );
        }

        if target_tfm.family().is_runtime() {
            let standard = parsed
                .iter()
                .filter(|tfm| tfm.family() == FrameworkFamily::NetStandard)
                .max_by_key(|tfm| tfm.version());
            if let Some(best) = standard {
                return Self::result(
                    target,
                    true,
                    CompatibilityMode::Netstandard,
                    Some(best.to_string()),
                );
            }
        }

        Self::result(target, false, CompatibilityMode::None, None)
    }

    /// Classifies `declared` against every framework in `targets`, in order
    pub fn check_all(declared: &[String], targets: &[String]) -> Vec<FrameworkCompatibility> {
        targets
            .iter()
            .map(|target| Self::check(declared, target))
            .collect()
    }

    fn is_direct_match(declared: &TargetFramework, target: &TargetFramework) -> bool {
        if !declared.family().is_runtime() || !target.family().is_runtime() {
            return false;
        }
        if declared.family() == target.family() {
            return declared.version() <= target.version();
        }
        // netcoreapp is the pre-5.0 name of the net runtime lineage
        declared.family() == FrameworkFamily::NetCoreApp
            && target.family() == FrameworkFamily::Net
            && target.version().major >= 5
    }

    fn result(
        target: &str,
        supported: bool,
        compatibility_mode: CompatibilityMode,
        matched_framework: Option<String>,
    ) -> FrameworkCompatibility {
        FrameworkCompatibility {
            framework: target.to_string(),
            supported,
            compatibility_mode,
            matched_framework,
        }
    }
}
