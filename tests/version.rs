use rstest::rstest;
use serde_json::json;

use typo3_upgrade_analyzer::version::{
    ConstraintChecker, RegistryCompatibilityChecker, RegistryReleaseEntry, Version,
};

fn v(input: &str) -> Version {
    Version::parse(input).unwrap()
}

#[test]
fn parse_round_trips_canonical_form() {
    let version = v("v1.2.3-beta");

    assert_eq!(
        (version.major(), version.minor(), version.patch(), version.suffix()),
        (1, 2, 3, Some("beta"))
    );
    assert_eq!(version.to_string(), "1.2.3-beta");
    assert_eq!(v(&version.to_string()), version);
}

#[rstest]
#[case("12.4.0", "12.4.0-rc1")]
#[case("1.0.0", "1.0.0-alpha")]
fn stable_is_greater_than_prerelease_of_same_triple(#[case] stable: &str, #[case] pre: &str) {
    assert!(v(stable).is_greater_than(&v(pre)));
    assert!(v(pre).is_less_than(&v(stable)));
}

#[rstest]
#[case("12.4.0", "12.0.0")]
#[case("12.4.0", "13.0.0")]
#[case("11.5.3", "11.5.3-dev")]
fn is_compatible_with_is_symmetric(#[case] a: &str, #[case] b: &str) {
    assert_eq!(v(a).is_compatible_with(&v(b)), v(b).is_compatible_with(&v(a)));
}

#[rstest]
#[case("^12.4", "12.4.0", true)]
#[case("^12.4", "12.9.9", true)]
#[case("^12.4", "11.5.0", false)]
#[case("^12.4", "13.0.0", false)]
#[case("~12.4.0", "12.4.0", true)]
#[case("~12.4.0", "12.4.9", true)]
#[case("~12.4.0", "12.5.0", false)]
fn constraint_properties(#[case] constraint: &str, #[case] target: &str, #[case] expected: bool) {
    assert_eq!(
        ConstraintChecker::new().is_constraint_compatible(constraint, &v(target)),
        expected
    );
}

#[rstest]
#[case(json!(["*"]), "1.0.0", true)]
#[case(json!(["*"]), "99.0.0", true)]
#[case(json!([11, 12]), "12.4.0", true)]
#[case(json!([11, 12]), "13.0.0", false)]
fn registry_list_properties(
    #[case] tokens: serde_json::Value,
    #[case] target: &str,
    #[case] expected: bool,
) {
    let entry: RegistryReleaseEntry =
        serde_json::from_value(json!({ "number": "1.0.0", "typo3_versions": tokens })).unwrap();

    assert_eq!(
        RegistryCompatibilityChecker::new().is_version_compatible(&entry, &v(target)),
        expected
    );
}
