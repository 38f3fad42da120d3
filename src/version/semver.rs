//! Version value type and its comparison algebra
//!
//! Parsing is tolerant of the shapes found in the wild: tag names (`v12.4.0`),
//! constraint fragments (`^12.4`, `>=11.5.3`) and two-part versions (`12.4`).
//! Operator prefixes are stripped, not interpreted.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::version::error::VersionError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?(?:-(.+))?$").unwrap()
});

/// Operator prefixes stripped before parsing, longest first
const RANGE_PREFIXES: &[&str] = &[">=", "<=", "==", "!=", "^", "~", ">", "<", "="];

/// Immutable `major.minor.patch[-suffix]` version
///
/// A version without suffix ranks above the same numeric triple with a
/// suffix (stable > pre-release). Two suffixes compare as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    suffix: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: None,
        }
    }

    /// Creates a pre-release version; an empty suffix yields a stable version
    pub fn with_suffix(major: u64, minor: u64, patch: u64, suffix: &str) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: (!suffix.is_empty()).then(|| suffix.to_string()),
        }
    }

    /// Parse a version string, stripping a leading `v` and range operators.
    ///
    /// Examples:
    /// - "12.4" -> 12.4.0
    /// - "v1.2.3-beta" -> 1.2.3-beta
    /// - "^12.4.1" -> 12.4.1
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let body = strip_prefixes(input);

        let captures = VERSION_RE
            .captures(body)
            .ok_or_else(|| VersionError::InvalidVersionFormat(input.to_string()))?;

        let number = |index: usize| -> Result<u64, VersionError> {
            match captures.get(index) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| VersionError::InvalidVersionFormat(input.to_string())),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            suffix: captures.get(4).map(|m| m.as_str().to_string()),
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// True when the version carries no pre-release suffix
    pub fn is_stable(&self) -> bool {
        self.suffix.is_none()
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    pub fn is_greater_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }

    pub fn is_less_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_equal(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Same-generation check: both versions share the major component
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major
    }
}

fn strip_prefixes(input: &str) -> &str {
    let mut body = input.trim();
    if let Some(prefix) = RANGE_PREFIXES.iter().find(|p| body.starts_with(**p)) {
        body = body[prefix.len()..].trim_start();
    }
    body.strip_prefix(['v', 'V']).unwrap_or(body)
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.suffix, &other.suffix) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "-{}", suffix)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", 1, 2, 3, None)]
    #[case("v1.2.3-beta", 1, 2, 3, Some("beta"))]
    #[case("V12.4.0", 12, 4, 0, None)]
    #[case("12.4", 12, 4, 0, None)]
    #[case("^12.4", 12, 4, 0, None)]
    #[case("~12.4.3", 12, 4, 3, None)]
    #[case(">=11.5.0", 11, 5, 0, None)]
    #[case("< 13.0", 13, 0, 0, None)]
    #[case(" 12.4.1-beta.1 ", 12, 4, 1, Some("beta.1"))]
    fn parse_accepts_tolerant_inputs(
        #[case] input: &str,
        #[case] major: u64,
        #[case] minor: u64,
        #[case] patch: u64,
        #[case] suffix: Option<&str>,
    ) {
        let version = Version::parse(input).unwrap();
        assert_eq!(
            (version.major(), version.minor(), version.patch(), version.suffix()),
            (major, minor, patch, suffix)
        );
    }

    #[rstest]
    #[case("")]
    #[case("main")]
    #[case("dev-master")]
    #[case("12")]
    #[case("12.x")]
    #[case("a.b.c")]
    #[case("1.2.3.4")]
    #[case("99999999999999999999.0.0")]
    fn parse_rejects_malformed_inputs(#[case] input: &str) {
        assert_eq!(
            Version::parse(input),
            Err(VersionError::InvalidVersionFormat(input.to_string()))
        );
    }

    #[test]
    fn display_reproduces_canonical_form() {
        assert_eq!(Version::parse("v1.2.3-beta").unwrap().to_string(), "1.2.3-beta");
        assert_eq!(Version::parse("12.4").unwrap().to_string(), "12.4.0");
    }

    #[rstest]
    #[case("1.2.3", "1.2.4", Ordering::Less)]
    #[case("1.3.0", "1.2.9", Ordering::Greater)]
    #[case("2.0.0", "1.99.99", Ordering::Greater)]
    #[case("1.2.3", "1.2.3", Ordering::Equal)]
    #[case("1.2.3", "1.2.3-rc1", Ordering::Greater)]
    #[case("1.2.3-alpha", "1.2.3-beta", Ordering::Less)]
    #[case("1.2.3-beta", "1.2.3-beta", Ordering::Equal)]
    #[case("1.2.10", "1.2.9", Ordering::Greater)]
    fn compare_orders_numerically_then_by_suffix(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        let a = Version::parse(a).unwrap();
        let b = Version::parse(b).unwrap();
        assert_eq!(a.compare(&b), expected);
        assert_eq!(b.compare(&a), expected.reverse());
    }

    #[test]
    fn stable_is_greater_than_any_prerelease_of_same_triple() {
        let stable = Version::new(12, 4, 0);
        for suffix in ["alpha", "beta.1", "rc", "zzz", "dev"] {
            let pre = Version::with_suffix(12, 4, 0, suffix);
            assert!(stable.is_greater_than(&pre), "12.4.0 > 12.4.0-{suffix}");
            assert!(pre.is_less_than(&stable));
        }
    }

    #[test]
    fn derived_predicates_agree_with_compare() {
        let a = Version::new(12, 4, 0);
        let b = Version::new(12, 4, 0);
        assert!(a.is_equal(&b));
        assert!(!a.is_greater_than(&b));
        assert!(!a.is_less_than(&b));
    }

    #[rstest]
    #[case("12.4.0", "12.0.0", true)]
    #[case("12.4.0", "12.4.0-dev", true)]
    #[case("12.4.0", "13.0.0", false)]
    #[case("11.5.30", "12.4.0", false)]
    fn is_compatible_with_is_symmetric(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
        let a = Version::parse(a).unwrap();
        let b = Version::parse(b).unwrap();
        assert_eq!(a.is_compatible_with(&b), expected);
        assert_eq!(b.is_compatible_with(&a), expected);
    }

    #[test]
    fn with_empty_suffix_is_stable() {
        assert!(Version::with_suffix(1, 0, 0, "").is_stable());
    }

    #[test]
    fn serializes_as_canonical_string() {
        let json = serde_json::to_string(&Version::with_suffix(13, 0, 1, "rc1")).unwrap();
        assert_eq!(json, "\"13.0.1-rc1\"");
    }
}
