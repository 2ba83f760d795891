use std::cmp::Ordering;
use std::fmt;

/// Framework family recognised by the compatibility engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameworkFamily {
    /// .NET 5 and later (`net5.0`, `net8.0`, ...)
    Net,
    /// .NET Core 1.0 - 3.1 (`netcoreapp3.1`)
    NetCoreApp,
    /// .NET Standard (`netstandard2.0`)
    NetStandard,
}

impl FrameworkFamily {
    fn prefix(self) -> &'static str {
        match self {
            FrameworkFamily::Net => "net",
            FrameworkFamily::NetCoreApp => "netcoreapp",
            FrameworkFamily::NetStandard => "netstandard",
        }
    }

    /// True for the runtime families (`net`, `netcoreapp`), false for `netstandard`
    pub fn is_runtime(self) -> bool {
        matches!(self, FrameworkFamily::Net | FrameworkFamily::NetCoreApp)
    }
}

/// Numeric framework version, compared component-wise (`3.1 < 5.0 < 10.0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameworkVersion {
    pub major: u32,
    pub minor: u32,
}

impl FrameworkVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for FrameworkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A parsed target framework moniker such as `net8.0` or `netstandard2.0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetFramework {
    family: FrameworkFamily,
    version: FrameworkVersion,
}

impl TargetFramework {
    pub fn new(family: FrameworkFamily, version: FrameworkVersion) -> Self {
        Self { family, version }
    }

    /// Parses a short moniker into `(family, version)`.
    ///
    /// Returns `None` for anything outside the three supported families, and
    /// for dotless `net4x` monikers which denote .NET Framework rather than
    /// the modern `net` lineage. Platform suffixes (`net8.0-windows`) are
    /// ignored.
    pub fn parse(moniker: &str) -> Option<Self> {
        let lowered = moniker.trim().to_ascii_lowercase();
        let base = lowered.split('-').next().unwrap_or_default();

        // Longest prefixes first: "netstandard" and "netcoreapp" both start with "net"
        let (family, rest) = if let Some(rest) = base.strip_prefix("netstandard") {
            (FrameworkFamily::NetStandard, rest)
        } else if let Some(rest) = base.strip_prefix("netcoreapp") {
            (FrameworkFamily::NetCoreApp, rest)
        } else if let Some(rest) = base.strip_prefix("net") {
            if !rest.contains('.') {
                return None;
            }
            (FrameworkFamily::Net, rest)
        } else {
            return None;
        };

        parse_version(rest).map(|version| Self { family, version })
    }

    pub fn family(&self) -> FrameworkFamily {
        self.family
    }

    pub fn version(&self) -> FrameworkVersion {
        self.version
    }

    /// Ordering used to pick the "best" declared framework among several matches:
    /// `net` outranks `netcoreapp`, and within one family the higher version wins.
    pub fn precedence_cmp(&self, other: &Self) -> Ordering {
        let rank = |tfm: &Self| match tfm.family {
            FrameworkFamily::Net => 2,
            FrameworkFamily::NetCoreApp => 1,
            FrameworkFamily::NetStandard => 0,
        };
        rank(self)
            .cmp(&rank(other))
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.version)
    }
}

fn parse_version(text: &str) -> Option<FrameworkVersion> {
    if text.is_empty() {
        return None;
    }
    let mut parts = text.split('.');
    let major = parts.next()?.parse::<u32>().ok()?;
    let minor = match parts.next() {
        Some(minor) => minor.parse::<u32>().ok()?,
        None => 0,
    };
    Some(FrameworkVersion::new(major, minor))
}

/// Normalises a registry-declared framework name to a short moniker.
///
/// NuGet catalog entries use long names (`.NETStandard2.0`, `.NETCoreApp3.1`,
/// `.NETFramework4.7.2`) alongside short ones (`net6.0`). Short monikers pass
/// through lowercased. Returns `None` for blank input.
pub fn normalize_moniker(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();

    let long_forms = [(".netstandard", "netstandard"), (".netcoreapp", "netcoreapp")];
    for (long, short) in long_forms {
        if let Some(rest) = lowered.strip_prefix(long) {
            return Some(format!("{}{}", short, rest));
        }
    }

    if let Some(rest) = lowered.strip_prefix(".netframework") {
        // .NETFramework4.7.2 -> net472
        let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
        return Some(format!("net{}", digits));
    }

    Some(lowered.trim_start_matches('.').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_net() {
        let tfm = TargetFramework::parse("net8.0").unwrap();
        assert_eq!(tfm.family(), FrameworkFamily::Net);
        assert_eq!(tfm.version(), FrameworkVersion::new(8, 0));
    }

    #[test]
    fn test_parse_netcoreapp_and_netstandard() {
        let core = TargetFramework::parse("netcoreapp3.1").unwrap();
        assert_eq!(core.family(), FrameworkFamily::NetCoreApp);
        assert_eq!(core.version(), FrameworkVersion::new(3, 1));

        let standard = TargetFramework::parse("NetStandard2.0").unwrap();
        assert_eq!(standard.family(), FrameworkFamily::NetStandard);
        assert_eq!(standard.version(), FrameworkVersion::new(2, 0));
    }

    #[test]
    fn test_parse_ignores_platform_suffix() {
        let tfm = TargetFramework::parse("net8.0-windows7.0").unwrap();
        assert_eq!(tfm.to_string(), "net8.0");
    }

    #[test]
    fn test_parse_rejects_net_framework_and_garbage() {
        assert!(TargetFramework::parse("net48").is_none());
        assert!(TargetFramework::parse("net472").is_none());
        assert!(TargetFramework::parse("uap10.0").is_none());
        assert!(TargetFramework::parse("netstandard").is_none());
        assert!(TargetFramework::parse("").is_none());
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        let ten = TargetFramework::parse("net10.0").unwrap();
        let nine = TargetFramework::parse("net9.0").unwrap();
        assert!(ten.version() > nine.version());
    }

    #[test]
    fn test_precedence_net_outranks_netcoreapp() {
        let net5 = TargetFramework::parse("net5.0").unwrap();
        let core31 = TargetFramework::parse("netcoreapp3.1").unwrap();
        assert_eq!(net5.precedence_cmp(&core31), Ordering::Greater);

        let net6 = TargetFramework::parse("net6.0").unwrap();
        assert_eq!(net5.precedence_cmp(&net6), Ordering::Less);
    }

    #[test]
    fn test_normalize_long_forms() {
        assert_eq!(
            normalize_moniker(".NETStandard2.0").as_deref(),
            Some("netstandard2.0")
        );
        assert_eq!(
            normalize_moniker(".NETCoreApp3.1").as_deref(),
            Some("netcoreapp3.1")
        );
        assert_eq!(
            normalize_moniker(".NETFramework4.7.2").as_deref(),
            Some("net472")
        );
        assert_eq!(normalize_moniker("net6.0").as_deref(), Some("net6.0"));
        assert_eq!(normalize_moniker("  "), None);
    }
}
