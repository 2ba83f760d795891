use crate::shared::error::MigrationError;
use crate::shared::Result;

/// Maximum number of patterns in one mask
const MAX_MASK_PATTERNS: usize = 64;

/// Maximum length of a single pattern
const MAX_PATTERN_LENGTH: usize = 255;

/// InternalMask - decides whether a package id belongs to the user's organisation
///
/// A mask is one or more glob patterns separated by `;`, `,` or whitespace,
/// e.g. `"Contoso.*; Fabrikam.Shared"`. `*` matches zero or more characters.
/// Matching is case-insensitive, like package ids themselves. An empty mask
/// matches nothing.
#[derive(Debug, Clone, Default)]
pub struct InternalMask {
    patterns: Vec<PatternMatcher>,
}

impl InternalMask {
    /// Parses a mask string
    ///
    /// # Errors
    /// - Too many patterns (> MAX_MASK_PATTERNS)
    /// - A pattern that is too long, contains invalid characters, or is only wildcards
    pub fn parse(mask: &str) -> Result<Self> {
        let raw: Vec<&str> = mask
            .split([';', ','])
            .flat_map(str::split_whitespace)
            .filter(|p| !p.is_empty())
            .collect();

        if raw.len() > MAX_MASK_PATTERNS {
            return Err(invalid(
                mask,
                format!("too many patterns: {} (maximum: {})", raw.len(), MAX_MASK_PATTERNS),
            ));
        }

        let mut patterns = Vec::with_capacity(raw.len());
        for pattern in raw {
            validate_pattern(mask, pattern)?;
            patterns.push(compile_pattern(&pattern.to_lowercase()));
        }

        Ok(Self { patterns })
    }

    /// A mask that matches nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Checks whether a package id matches any pattern
    pub fn matches(&self, package_id: &str) -> bool {
        let id = package_id.to_lowercase();
        self.patterns.iter().any(|p| p.matches(&id))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Pattern matcher types for efficient matching
#[derive(Debug, Clone)]
enum PatternMatcher {
    /// Exact match: "contoso.core"
    Exact(String),
    /// Leading wildcard: "*.abstractions"
    EndsWith(String),
    /// Trailing wildcard: "contoso.*"
    StartsWith(String),
    /// Both ends: "*logging*"
    Contains(String),
    /// Anything else: "contoso.*.tests*"
    Segments {
        first: String,
        middle: Vec<String>,
        last: String,
    },
}

impl PatternMatcher {
    fn matches(&self, id: &str) -> bool {
        match self {
            PatternMatcher::Exact(s) => id == s,
            PatternMatcher::EndsWith(suffix) => id.ends_with(suffix.as_str()),
            PatternMatcher::StartsWith(prefix) => id.starts_with(prefix.as_str()),
            PatternMatcher::Contains(middle) => id.contains(middle.as_str()),
            PatternMatcher::Segments {
                first,
                middle,
                last,
            } => {
                if id.len() < first.len() + last.len()
                    || !id.starts_with(first.as_str())
                    || !id.ends_with(last.as_str())
                {
                    return false;
                }
                // Middle parts must appear in order between the anchored ends
                let mut rest = &id[first.len()..id.len() - last.len()];
                for part in middle {
                    match rest.find(part.as_str()) {
                        Some(pos) => rest = &rest[pos + part.len()..],
                        None => return false,
                    }
                }
                true
            }
        }
    }
}

fn compile_pattern(pattern: &str) -> PatternMatcher {
    if !pattern.contains('*') {
        return PatternMatcher::Exact(pattern.to_string());
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let inner: Vec<String> = parts[1..parts.len() - 1]
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect();
    let first = parts[0];
    let last = parts[parts.len() - 1];

    match (first.is_empty(), last.is_empty(), inner.len()) {
        (true, false, 0) => PatternMatcher::EndsWith(last.to_string()),
        (false, true, 0) => PatternMatcher::StartsWith(first.to_string()),
        (true, true, 1) => PatternMatcher::Contains(inner[0].clone()),
        _ => PatternMatcher::Segments {
            first: first.to_string(),
            middle: inner,
            last: last.to_string(),
        },
    }
}

fn validate_pattern(mask: &str, pattern: &str) -> Result<()> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(invalid(
            mask,
            format!(
                "pattern '{}' is too long ({} chars, maximum {})",
                pattern,
                pattern.len(),
                MAX_PATTERN_LENGTH
            ),
        ));
    }

    if let Some(ch) = pattern.chars().find(|c| !is_valid_pattern_char(*c)) {
        return Err(invalid(
            mask,
            format!("pattern '{}' contains invalid character '{}'", pattern, ch),
        ));
    }

    if pattern.chars().all(|c| c == '*') {
        return Err(invalid(
            mask,
            format!("pattern '{}' cannot contain only wildcards", pattern),
        ));
    }

    Ok(())
}

fn is_valid_pattern_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '*'
}

fn invalid(mask: &str, reason: String) -> anyhow::Error {
    MigrationError::InvalidMask {
        mask: mask.to_string(),
        reason,
    }
    .into()
}
