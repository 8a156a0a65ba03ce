//! Build numbers and their comparison

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Strict all-digits pattern a host version string must match
static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid numeric pattern"));

/// A published build number. Releases are tagged with plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildNumber(u64);

impl BuildNumber {
    pub const fn new(build: u64) -> Self {
        Self(build)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parse a host-reported version string.
    ///
    /// Only plain digit strings are accepted. Anything else ("1.2.0", "",
    /// "v40", " 40") means the running build is unknown.
    pub fn parse_strict(raw: &str) -> Option<Self> {
        if !NUMERIC.is_match(raw) {
            return None;
        }
        raw.parse().ok().map(Self)
    }

    /// Parse a release tag, tolerating a leading `v` or `#`
    pub fn parse_tag(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);
        Self::parse_strict(digits)
    }

    /// Check if this build is newer than another
    pub fn is_newer_than(self, other: BuildNumber) -> bool {
        self > other
    }
}

impl From<u64> for BuildNumber {
    fn from(build: u64) -> Self {
        Self(build)
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_accepts_digits() {
        assert_eq!(BuildNumber::parse_strict("40"), Some(BuildNumber::new(40)));
        assert_eq!(BuildNumber::parse_strict("0"), Some(BuildNumber::new(0)));
        assert_eq!(BuildNumber::parse_strict("007"), Some(BuildNumber::new(7)));
    }

    #[test]
    fn test_parse_strict_rejects_everything_else() {
        for raw in ["1.2.0", "", "abc", "v40", " 40", "40 ", "-1", "+3", "4e2"] {
            assert_eq!(BuildNumber::parse_strict(raw), None, "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_parse_strict_rejects_overflow() {
        assert_eq!(BuildNumber::parse_strict("99999999999999999999999"), None);
    }

    #[test]
    fn test_parse_tag_prefixes() {
        assert_eq!(BuildNumber::parse_tag("42"), Some(BuildNumber::new(42)));
        assert_eq!(BuildNumber::parse_tag("v42"), Some(BuildNumber::new(42)));
        assert_eq!(BuildNumber::parse_tag("#42"), Some(BuildNumber::new(42)));
        assert_eq!(BuildNumber::parse_tag("v1.0.0"), None);
        assert_eq!(BuildNumber::parse_tag("latest"), None);
    }

    #[test]
    fn test_build_comparison() {
        let b40 = BuildNumber::new(40);
        let b41 = BuildNumber::new(41);
        assert!(b41.is_newer_than(b40));
        assert!(!b40.is_newer_than(b41));
        assert!(!b40.is_newer_than(b40));
        assert_eq!(b41.to_string(), "41");
    }
}
