//! Composer constraint checker
//!
//! Supports the constraint shapes used in `composer.json` `require` sections:
//! - `*` - any version
//! - `12.4`, `12.4.0` - exact
//! - `^12.4` - same major, at least 12.4.0
//! - `~12.4.0` - same major.minor, at least the given patch
//! - `>=12.0,<13.0`, `>=12.0 <13.0` - comparator list, all must hold
//! - `12.*`, `12.4.x` - wildcards
//! - `^11.5 || ^12.4` - alternatives, any may hold
//!
//! Anything else is incompatible, including hyphen ranges (`12.0 - 13.0`).
//! Unknown syntax never raises.

use indexmap::IndexMap;
use serde_json::Value;

use crate::version::semver::Version;

/// Composer package names that stand for the TYPO3 core
pub const TYPO3_PACKAGES: &[&str] = &[
    "typo3/cms-core",
    "typo3/cms",
    "typo3/minimal",
    "typo3/cms-backend",
    "typo3/cms-frontend",
    "typo3/cms-extbase",
    "typo3/cms-fluid",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintChecker;

/// A single parsed constraint term
#[derive(Debug, PartialEq)]
enum Term {
    Any,
    /// Only major.minor given: same major
    ExactMinor(Version),
    /// Full triple given: numeric equality
    Exact(Version),
    Caret(Version),
    Tilde { floor: Version, two_part: bool },
    WildcardMajor(u64),
    WildcardMinor(u64, u64),
    Gte(Version),
    Gt(Version),
    Lte(Version),
    Lt(Version),
    NotEqual(Version),
}

impl Term {
    fn parse(term: &str) -> Option<Self> {
        let term = strip_stability_flag(term.trim());
        if term.is_empty() {
            return None;
        }

        if term == "*" {
            return Some(Term::Any);
        }

        if let Some(rest) = term.strip_prefix(">=") {
            parse_operand(rest).map(Term::Gte)
        } else if let Some(rest) = term.strip_prefix("<=") {
            parse_operand(rest).map(Term::Lte)
        } else if let Some(rest) = term.strip_prefix("!=") {
            parse_operand(rest).map(Term::NotEqual)
        } else if let Some(rest) = term.strip_prefix('>') {
            parse_operand(rest).map(Term::Gt)
        } else if let Some(rest) = term.strip_prefix('<') {
            parse_operand(rest).map(Term::Lt)
        } else if let Some(rest) = term.strip_prefix('^') {
            parse_operand(rest).map(Term::Caret)
        } else if let Some(rest) = term.strip_prefix('~') {
            let two_part = numeric_part_count(rest) == 2;
            parse_operand(rest).map(|floor| Term::Tilde { floor, two_part })
        } else if let Some(rest) = term
            .strip_prefix("==")
            .or_else(|| term.strip_prefix('='))
        {
            Self::parse_exact(rest.trim())
        } else if let Some(wildcard) = Self::parse_wildcard(term) {
            Some(wildcard)
        } else {
            Self::parse_exact(term)
        }
    }

    fn parse_exact(body: &str) -> Option<Self> {
        let version = parse_operand(body)?;
        if numeric_part_count(body) == 2 {
            Some(Term::ExactMinor(version))
        } else {
            Some(Term::Exact(version))
        }
    }

    /// Parse wildcard patterns like `12.*` or `12.4.x`
    fn parse_wildcard(term: &str) -> Option<Self> {
        let parts: Vec<&str> = term.split('.').collect();
        let is_wildcard = |s: &str| s == "*" || s.eq_ignore_ascii_case("x");

        match parts.as_slice() {
            [major, w] if is_wildcard(*w) => major.parse().ok().map(Term::WildcardMajor),
            [major, minor, w] if is_wildcard(*w) => {
                let major = major.parse().ok()?;
                let minor = minor.parse().ok()?;
                Some(Term::WildcardMinor(major, minor))
            }
            _ => None,
        }
    }

    fn satisfies(&self, target: &Version) -> bool {
        match self {
            Term::Any => true,
            Term::ExactMinor(v) => target.is_compatible_with(v),
            Term::Exact(v) => {
                target.major() == v.major()
                    && target.minor() == v.minor()
                    && target.patch() == v.patch()
            }
            Term::Caret(v) => target.major() == v.major() && target >= v,
            Term::Tilde { floor, two_part } => {
                if *two_part {
                    target.major() == floor.major() && target >= floor
                } else {
                    target.major() == floor.major()
                        && target.minor() == floor.minor()
                        && target.patch() >= floor.patch()
                }
            }
            Term::WildcardMajor(major) => target.major() == *major,
            Term::WildcardMinor(major, minor) => {
                target.major() == *major && target.minor() == *minor
            }
            Term::Gte(v) => target >= v,
            Term::Gt(v) => target > v,
            Term::Lte(v) => target <= v,
            Term::Lt(v) => target < v,
            Term::NotEqual(v) => target != v,
        }
    }
}

/// Operands must be plain numeric versions; a second operator is not allowed
fn parse_operand(body: &str) -> Option<Version> {
    let body = body.trim();
    if body.starts_with(['<', '>', '=', '!', '^', '~']) {
        return None;
    }
    Version::parse(body).ok()
}

fn numeric_part_count(body: &str) -> usize {
    let body = body.trim();
    let body = body.strip_prefix(['v', 'V']).unwrap_or(body);
    let numeric = body.split('-').next().unwrap_or(body);
    numeric.split('.').count()
}

fn strip_stability_flag(term: &str) -> &str {
    match term.find('@') {
        Some(index) => term[..index].trim_end(),
        None => term,
    }
}

/// Split a comparator list on `,` and whitespace, gluing a bare operator to
/// the operand that follows it (`>= 12.0` is one term).
fn split_and_terms(spec: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut pending_operator: Option<String> = None;

    for token in spec
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if let Some(op) = pending_operator.take() {
            terms.push(format!("{}{}", op, token));
        } else if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '!' | '^' | '~')) {
            pending_operator = Some(token.to_string());
        } else {
            terms.push(token.to_string());
        }
    }

    if let Some(op) = pending_operator {
        // dangling operator never parses, which keeps the list incompatible
        terms.push(op);
    }

    terms
}

impl ConstraintChecker {
    pub fn new() -> Self {
        Self
    }

    /// Check whether `target` satisfies the constraint string
    ///
    /// Unparseable constraints are incompatible.
    pub fn is_constraint_compatible(&self, constraint: &str, target: &Version) -> bool {
        let constraint = constraint.trim();
        if constraint.is_empty() {
            return false;
        }

        constraint
            .split('|')
            .map(str::trim)
            .filter(|alternative| !alternative.is_empty())
            .any(|alternative| Self::is_alternative_compatible(alternative, target))
    }

    fn is_alternative_compatible(alternative: &str, target: &Version) -> bool {
        let terms = split_and_terms(alternative);
        if terms.is_empty() {
            return false;
        }

        let parsed: Option<Vec<Term>> = terms.iter().map(|t| Term::parse(t)).collect();
        match parsed {
            Some(terms) => terms.iter().all(|term| term.satisfies(target)),
            None => false,
        }
    }

    /// Filter a `require` map to the entries naming the TYPO3 core
    pub fn find_typo3_requirements(
        &self,
        require: &IndexMap<String, String>,
    ) -> IndexMap<String, String> {
        require
            .iter()
            .filter(|(name, _)| TYPO3_PACKAGES.contains(&name.to_ascii_lowercase().as_str()))
            .map(|(name, constraint)| (name.clone(), constraint.clone()))
            .collect()
    }

    /// True iff at least one TYPO3 requirement of the manifest accepts `target`
    pub fn is_composer_json_compatible(&self, manifest: &Value, target: &Version) -> bool {
        let require = require_map(manifest);

        self.find_typo3_requirements(&require)
            .values()
            .any(|constraint| self.is_constraint_compatible(constraint, target))
    }
}

/// Extract the string-valued entries of a manifest's `require` object
pub fn require_map(manifest: &Value) -> IndexMap<String, String> {
    manifest
        .get("require")
        .and_then(Value::as_object)
        .map(|require| {
            require
                .iter()
                .filter_map(|(name, constraint)| {
                    constraint
                        .as_str()
                        .map(|c| (name.clone(), c.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn check(constraint: &str, target: &str) -> bool {
        ConstraintChecker.is_constraint_compatible(constraint, &Version::parse(target).unwrap())
    }

    #[rstest]
    #[case("*", "1.0.0", true)]
    #[case("*", "13.4.2", true)]
    #[case(" * ", "12.4.0", true)]
    fn universal_is_always_compatible(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case("^12.4", "12.4.0", true)]
    #[case("^12.4", "12.9.9", true)]
    #[case("^12.4", "11.5.0", false)]
    #[case("^12.4", "13.0.0", false)]
    #[case("^12.4", "12.3.9", false)]
    #[case("^12.4.5", "12.4.4", false)]
    #[case("^12.4.5", "12.4.5", true)]
    #[case("^12.4", "12.4.0-dev", false)]
    fn caret_requires_same_major_floor(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case("~12.4.0", "12.4.0", true)]
    #[case("~12.4.0", "12.4.9", true)]
    #[case("~12.4.0", "12.5.0", false)]
    #[case("~12.4.3", "12.4.2", false)]
    #[case("~12.4.0", "13.4.0", false)]
    #[case("~12.4", "12.9.0", true)]
    #[case("~12.4", "12.3.0", false)]
    #[case("~12.4", "13.0.0", false)]
    fn tilde_pins_major_and_minor(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case("12.4.0", "12.4.0", true)]
    #[case("12.4.0", "12.4.1", false)]
    #[case("=12.4.1", "12.4.1", true)]
    #[case("==12.4.1", "12.4.2", false)]
    #[case("12.4", "12.9.0", true)]
    #[case("12.4", "13.4.0", false)]
    #[case("v12.4.0", "12.4.0", true)]
    fn exact_matches_to_given_precision(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case(">=12.0,<13.0", "12.4.0", true)]
    #[case(">=12.0,<13.0", "13.0.0", false)]
    #[case(">=12.0,<13.0", "11.5.0", false)]
    #[case(">=12.0 <13.0", "12.4.0", true)]
    #[case(">= 12.0, < 13.0", "12.4.0", true)]
    #[case(">12.4.0", "12.4.0", false)]
    #[case(">12.4.0", "12.4.1", true)]
    #[case("<=12.4.0", "12.4.0", true)]
    #[case(">=11.5.0,<=12.4.99", "12.4.10", true)]
    #[case(">=12.0,!=12.4.2", "12.4.2", false)]
    #[case(">=12.0,!=12.4.2", "12.4.3", true)]
    fn comparator_list_requires_every_term(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case("12.*", "12.4.0", true)]
    #[case("12.*", "13.0.0", false)]
    #[case("12.4.*", "12.4.7", true)]
    #[case("12.4.x", "12.5.0", false)]
    #[case("12.X", "12.0.0", true)]
    fn wildcards_match_prefix(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case("^11.5 || ^12.4", "12.4.0", true)]
    #[case("^11.5 || ^12.4", "11.5.30", true)]
    #[case("^11.5 || ^12.4", "13.0.0", false)]
    #[case("^11.5|^12.4", "12.4.3", true)]
    #[case("^12.4 || garbage", "12.4.3", true)]
    fn alternatives_need_one_match(
        #[case] constraint: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(constraint, target), expected);
    }

    #[rstest]
    #[case("")]
    #[case("dev-main")]
    #[case("latest")]
    #[case("^^12.4")]
    #[case(">=")]
    #[case("12")]
    #[case("||")]
    #[case("12.4.0 - 13.0")]
    #[case("12.0 - 12.4.5")]
    fn unrecognized_syntax_fails_closed(#[case] constraint: &str) {
        let target = Version::new(12, 4, 0);
        assert!(!ConstraintChecker.is_constraint_compatible(constraint, &target));
    }

    #[test]
    fn trailing_comma_is_tolerated() {
        assert!(check(">=12.0,", "12.4.0"));
    }

    #[test]
    fn stability_flag_is_ignored() {
        assert!(check("^12.4@dev", "12.4.0"));
    }

    #[test]
    fn find_typo3_requirements_keeps_only_core_aliases() {
        let require: IndexMap<String, String> = [
            ("php", "^8.1"),
            ("typo3/cms-core", "^12.4"),
            ("typo3/cms-extbase", "^12.4"),
            ("georgringer/numbered-pagination", "^2.0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let found = ConstraintChecker.find_typo3_requirements(&require);

        assert_eq!(
            found.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["typo3/cms-core", "typo3/cms-extbase"]
        );
    }

    #[test]
    fn composer_json_compatible_when_any_core_requirement_matches() {
        let manifest = json!({
            "require": {
                "typo3/cms-core": "^12.4",
                "typo3/cms-fluid": "^11.5"
            }
        });

        assert!(ConstraintChecker.is_composer_json_compatible(&manifest, &Version::new(12, 4, 0)));
    }

    #[rstest]
    #[case(json!({"require": {"typo3/cms-core": "^11.5"}}))]
    #[case(json!({"require": {"php": "^8.1"}}))]
    #[case(json!({"require": {}}))]
    #[case(json!({"name": "vendor/ext"}))]
    #[case(json!({"require": {"typo3/cms-core": 12}}))]
    #[case(json!([]))]
    fn composer_json_incompatible_without_matching_core_requirement(#[case] manifest: Value) {
        assert!(!ConstraintChecker.is_composer_json_compatible(&manifest, &Version::new(12, 4, 0)));
    }
}
