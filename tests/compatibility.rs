//! Compatibility checks and migration planning through the registry

mod helper;

use helper::{create_registry, framework_record, version};
use mock_registry::registry::MockRegistry;
use mock_registry::version::range::VersionRange;
use mock_registry::version::types::{
    CompatibilityMatrix, Effort, EnvironmentDescriptor, IssueCategory, IssueType,
    MigrationAction, MockVersionRecord, Severity,
};
use rstest::rstest;

fn toast_registry() -> MockRegistry {
    let mut registry = create_registry(false, true);

    let mut matrix = CompatibilityMatrix {
        framework: VersionRange::between(version("18.0.0"), version("18.99.0")),
        test_runner: Some(VersionRange::at_least(version("29.0.0"))),
        ..Default::default()
    };
    matrix.dependencies.insert(
        "zod".to_string(),
        VersionRange::at_least(version("3.20.0")).excluding(version("3.21.0")),
    );
    registry
        .register_version("toast", MockVersionRecord::new(version("1.0.0"), matrix))
        .unwrap();

    let mut v2 = framework_record("2.0.0", "18.0.0", "19.99.0");
    v2.breaking_changes = vec!["useToast returns an object".to_string()];
    v2.deprecations = vec!["toast.dismissAll".to_string()];
    v2.migration_guide = Some("docs/toast-v2.md".to_string());
    registry.register_version("toast", v2).unwrap();

    registry
        .register_version(
            "toast",
            framework_record("3.0.0-beta.1", "19.0.0", "19.99.0"),
        )
        .unwrap();
    registry
}

fn environment(framework: &str, test_runner: &str, zod: &str) -> EnvironmentDescriptor {
    let mut environment = EnvironmentDescriptor::with_framework(framework);
    environment.test_runner = Some(test_runner.to_string());
    environment
        .dependencies
        .insert("zod".to_string(), zod.to_string());
    environment
}

#[test]
fn matching_environment_is_compatible_without_issues() {
    let mut registry = toast_registry();

    let result = registry
        .check_compatibility("toast", "1.0.0", &environment("18.2.0", "29.7.0", "3.22.0"))
        .unwrap();

    assert!(result.compatible);
    assert!(result.issues.is_empty());
    assert!(!result.migration_required);
    assert!(result.migration_path.is_none());
}

#[rstest]
#[case("17.0.2", "29.7.0", "3.22.0", Severity::Critical, IssueCategory::VersionMismatch, false)]
#[case("19.0.0", "29.7.0", "3.22.0", Severity::High, IssueCategory::VersionMismatch, true)]
#[case("18.2.0", "28.1.0", "3.22.0", Severity::Critical, IssueCategory::VersionMismatch, false)]
#[case("18.2.0", "29.7.0", "3.21.0", Severity::High, IssueCategory::DependencyConflict, true)]
#[case("18.2.0", "29.7.0", "3.10.0", Severity::Critical, IssueCategory::DependencyConflict, false)]
fn single_mismatch_is_reported_with_its_severity(
    #[case] framework: &str,
    #[case] test_runner: &str,
    #[case] zod: &str,
    #[case] severity: Severity,
    #[case] category: IssueCategory,
    #[case] compatible: bool,
) {
    let mut registry = toast_registry();

    let result = registry
        .check_compatibility("toast", "1.0.0", &environment(framework, test_runner, zod))
        .unwrap();

    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, severity);
    assert_eq!(result.issues[0].category, category);
    assert_eq!(result.compatible, compatible);
    assert_eq!(result.recommendations.len(), 1);
}

#[test]
fn framework_mismatch_is_always_an_error() {
    let mut registry = toast_registry();

    let result = registry
        .check_compatibility("toast", "1.0.0", &environment("19.0.0", "29.7.0", "3.22.0"))
        .unwrap();

    assert_eq!(result.issues[0].issue_type, IssueType::Error);
}

#[test]
fn breaking_changes_make_version_incompatible_and_plan_migration() {
    let mut registry = toast_registry();

    let result = registry
        .check_compatibility("toast", "2.0.0", &EnvironmentDescriptor::with_framework("18.2.0"))
        .unwrap();

    assert!(!result.compatible);
    assert!(result.migration_required);
    let breaking = result
        .issues
        .iter()
        .find(|issue| issue.category == IssueCategory::BreakingChange)
        .unwrap();
    assert_eq!(breaking.severity, Severity::Critical);
    assert_eq!(breaking.issue_type, IssueType::Error);
    assert_eq!(breaking.affected_features, ["useToast returns an object"]);
    assert!(
        result
            .recommendations
            .iter()
            .any(|r| r.contains("docs/toast-v2.md"))
    );

    let path = result.migration_path.unwrap();
    assert_eq!(path.from_version, version("2.0.0"));
    assert_eq!(path.to_version, version("2.0.0"));
    assert_eq!(path.estimated_effort, Effort::High);
}

#[test]
fn unknown_mock_version_is_incompatible_rather_than_an_error() {
    let mut registry = toast_registry();

    let result = registry
        .check_compatibility("toast", "9.9.9", &EnvironmentDescriptor::default())
        .unwrap();

    assert!(!result.compatible);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].severity, Severity::Critical);
    assert_eq!(result.issues[0].category, IssueCategory::VersionMismatch);
}

#[test]
fn malformed_version_text_is_a_parse_error() {
    let mut registry = toast_registry();

    assert!(
        registry
            .check_compatibility("toast", "one", &EnvironmentDescriptor::default())
            .is_err()
    );
    assert!(
        registry
            .check_compatibility("toast", "1.0.0", &EnvironmentDescriptor::with_framework("18"))
            .is_err()
    );
}

#[test]
fn repeated_check_is_served_from_cache() {
    let mut registry = toast_registry();
    let environment = environment("18.2.0", "29.7.0", "3.22.0");

    let first = registry
        .check_compatibility("toast", "1.0.0", &environment)
        .unwrap();
    let second = registry
        .check_compatibility("toast", "1.0.0", &environment)
        .unwrap();

    assert_eq!(first, second);
    let cache = registry.stats().cache;
    assert_eq!(cache.hits, 1);
    assert_eq!(cache.misses, 1);
}

#[test]
fn migration_targets_latest_stable_version() {
    let mut registry = toast_registry();

    let path = registry
        .generate_migration_path("toast", "1.0.0")
        .unwrap()
        .unwrap();

    assert_eq!(path.from_version, version("1.0.0"));
    assert_eq!(path.to_version, version("2.0.0"));
    assert_eq!(path.steps.len(), 1);
    assert_eq!(path.steps[0].action, MigrationAction::BumpVersion);
    assert!(path.automatable);
    assert_eq!(path.estimated_effort, Effort::Low);
}

#[test]
fn migration_from_version_with_breaking_changes_orders_steps() {
    let mut registry = toast_registry();

    let path = registry
        .generate_migration_path("toast", "2.0.0")
        .unwrap()
        .unwrap();

    let actions: Vec<_> = path.steps.iter().map(|step| step.action).collect();
    assert_eq!(
        actions,
        [
            MigrationAction::AddressBreakingChanges,
            MigrationAction::UpdateDeprecatedUsage,
            MigrationAction::BumpVersion,
        ]
    );
    assert!(!path.automatable);
}

#[test]
fn migration_from_unregistered_version_is_none() {
    let mut registry = toast_registry();

    assert_eq!(registry.generate_migration_path("toast", "0.1.0"), Ok(None));
    assert_eq!(registry.generate_migration_path("ghost", "1.0.0"), Ok(None));
}

#[test]
fn latest_version_skips_prereleases_by_default() {
    let registry = toast_registry();

    assert_eq!(registry.versions().latest_version("toast"), Some(&version("2.0.0")));
    assert_eq!(registry.versions().versions("toast").len(), 3);
}
