//! Compatibility checking of a mock version record against an environment

use crate::version::error::ParseError;
use crate::version::range::VersionRange;
use crate::version::semver::parse_version;
use crate::version::types::{
    Companion, CompatibilityIssue, CompatibilityResult, EnvironmentDescriptor, IssueCategory,
    IssueType, MockVersionRecord, Severity,
};

/// Which part of the environment an issue was raised for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Dimension<'a> {
    Framework,
    Companion(Companion),
    Dependency(&'a str),
}

impl Dimension<'_> {
    fn label(&self) -> String {
        match self {
            Dimension::Framework => "framework".to_string(),
            Dimension::Companion(companion) => companion.as_str().to_string(),
            Dimension::Dependency(name) => name.to_string(),
        }
    }

    fn category(&self) -> IssueCategory {
        match self {
            Dimension::Dependency(_) => IssueCategory::DependencyConflict,
            _ => IssueCategory::VersionMismatch,
        }
    }

    /// The host framework cannot be worked around, so any mismatch there is an
    /// error. Everything else is only an error when the mismatch is critical.
    fn issue_type(&self, severity: Severity) -> IssueType {
        match self {
            Dimension::Framework => IssueType::Error,
            _ if severity == Severity::Critical => IssueType::Error,
            _ => IssueType::Warning,
        }
    }
}

/// Evaluate a record against an environment.
///
/// Every version present in the environment must parse, or the whole check
/// fails; only dimensions the record's matrix declares a range for are
/// matched. The returned result never carries a migration path; attaching
/// one is the caller's job when `migration_required` is set.
pub fn evaluate(
    mock_name: &str,
    record: &MockVersionRecord,
    environment: &EnvironmentDescriptor,
) -> Result<CompatibilityResult, ParseError> {
    let matrix = &record.compatibility_matrix;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if let Some(framework) = environment.framework.as_deref() {
        check_dimension(
            Dimension::Framework,
            framework,
            Some(&matrix.framework),
            &mut issues,
            &mut recommendations,
        )?;
    }

    for companion in Companion::ALL {
        if let Some(installed) = environment.companion(companion) {
            check_dimension(
                Dimension::Companion(companion),
                installed,
                matrix.companion(companion),
                &mut issues,
                &mut recommendations,
            )?;
        }
    }

    for (name, installed) in &environment.dependencies {
        check_dimension(
            Dimension::Dependency(name),
            installed,
            matrix.dependencies.get(name),
            &mut issues,
            &mut recommendations,
        )?;
    }

    if !record.breaking_changes.is_empty() {
        let resolution = format!(
            "Review {} breaking change(s) introduced in {}@{}",
            record.breaking_changes.len(),
            mock_name,
            record.version
        );
        issues.push(CompatibilityIssue {
            issue_type: IssueType::Error,
            category: IssueCategory::BreakingChange,
            severity: Severity::Critical,
            description: format!(
                "{}@{} contains breaking changes: {}",
                mock_name,
                record.version,
                record.breaking_changes.join("; ")
            ),
            affected_features: record.breaking_changes.clone(),
            resolution: Some(resolution.clone()),
        });
        recommendations.push(resolution);
        if let Some(guide) = &record.migration_guide {
            recommendations.push(format!("Follow the migration guide: {}", guide));
        }
    }

    if !record.deprecations.is_empty() {
        let resolution = format!(
            "Replace {} deprecated API(s) before they are removed",
            record.deprecations.len()
        );
        issues.push(CompatibilityIssue {
            issue_type: IssueType::Warning,
            category: IssueCategory::Deprecation,
            severity: Severity::Medium,
            description: format!(
                "{}@{} deprecates: {}",
                mock_name,
                record.version,
                record.deprecations.join("; ")
            ),
            affected_features: record.deprecations.clone(),
            resolution: Some(resolution.clone()),
        });
        recommendations.push(resolution);
    }

    let compatible = is_compatible(&issues);
    let migration_required = requires_migration(&issues);

    Ok(CompatibilityResult {
        compatible,
        issues,
        recommendations,
        migration_required,
        migration_path: None,
    })
}

/// Critical issues in any required dimension, or any breaking change, make the
/// result incompatible.
pub fn is_compatible(issues: &[CompatibilityIssue]) -> bool {
    !issues.iter().any(|issue| {
        issue.severity == Severity::Critical
            && matches!(
                issue.category,
                IssueCategory::VersionMismatch
                    | IssueCategory::DependencyConflict
                    | IssueCategory::BreakingChange
            )
    })
}

pub fn requires_migration(issues: &[CompatibilityIssue]) -> bool {
    issues.iter().any(|issue| match issue.category {
        IssueCategory::BreakingChange => true,
        IssueCategory::VersionMismatch => issue.severity == Severity::Critical,
        _ => false,
    })
}

fn check_dimension(
    dimension: Dimension<'_>,
    installed: &str,
    range: Option<&VersionRange>,
    issues: &mut Vec<CompatibilityIssue>,
    recommendations: &mut Vec<String>,
) -> Result<(), ParseError> {
    let version = parse_version(installed)?;
    let Some(range) = range else {
        return Ok(());
    };
    let outcome = range.matches(&version);
    if outcome.compatible {
        return Ok(());
    }

    let label = dimension.label();
    let resolution = match &dimension {
        Dimension::Dependency(name) => {
            format!("Update dependency {} to a version matching {}", name, range)
        }
        _ => format!("Use a {} version matching {}", label, range),
    };

    issues.push(CompatibilityIssue {
        issue_type: dimension.issue_type(outcome.severity),
        category: dimension.category(),
        severity: outcome.severity,
        description: format!("{} {} does not satisfy {}", label, version, range),
        affected_features: vec![label],
        resolution: Some(resolution.clone()),
    });
    recommendations.push(resolution);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::semver::SemanticVersion;
    use crate::version::types::CompatibilityMatrix;
    use rstest::rstest;

    fn v(text: &str) -> SemanticVersion {
        parse_version(text).unwrap()
    }

    fn record() -> MockVersionRecord {
        let mut matrix = CompatibilityMatrix {
            framework: VersionRange::between(v("18.0.0"), v("18.99.0")),
            test_runner: Some(VersionRange::at_least(v("29.0.0"))),
            ..Default::default()
        };
        matrix
            .dependencies
            .insert("zod".to_string(), VersionRange::exact(v("3.22.0")));
        MockVersionRecord::new(v("1.0.0"), matrix)
    }

    #[test]
    fn matching_environment_is_compatible_without_issues() {
        let mut env = EnvironmentDescriptor::with_framework("18.2.0");
        env.set_companion(Companion::TestRunner, "29.7.0");
        env.dependencies
            .insert("zod".to_string(), "3.22.0".to_string());

        let result = evaluate("toast", &record(), &env).unwrap();

        assert!(result.compatible);
        assert!(result.issues.is_empty());
        assert!(result.recommendations.is_empty());
        assert!(!result.migration_required);
    }

    #[test]
    fn empty_environment_skips_every_dimension() {
        let result = evaluate("toast", &record(), &EnvironmentDescriptor::default()).unwrap();

        assert!(result.compatible);
        assert!(result.issues.is_empty());
    }

    #[rstest]
    // below min: critical, incompatible, migration needed
    #[case("17.0.2", false, Severity::Critical, true)]
    // above max: still an error for the framework, but not critical
    #[case("19.0.0", true, Severity::High, false)]
    fn framework_mismatch_is_always_an_error(
        #[case] framework: &str,
        #[case] compatible: bool,
        #[case] severity: Severity,
        #[case] migration_required: bool,
    ) {
        let env = EnvironmentDescriptor::with_framework(framework);

        let result = evaluate("toast", &record(), &env).unwrap();

        assert_eq!(result.compatible, compatible);
        assert_eq!(result.migration_required, migration_required);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.issue_type, IssueType::Error);
        assert_eq!(issue.category, IssueCategory::VersionMismatch);
        assert_eq!(issue.severity, severity);
        assert_eq!(issue.affected_features, vec!["framework".to_string()]);
    }

    #[test]
    fn companion_mismatch_below_critical_degrades_to_warning() {
        let mut record = record();
        record.compatibility_matrix.test_runner =
            Some(VersionRange::between(v("29.0.0"), v("29.99.0")));
        let mut env = EnvironmentDescriptor::default();
        env.set_companion(Companion::TestRunner, "30.0.0");

        let result = evaluate("toast", &record, &env).unwrap();

        assert!(result.compatible);
        assert_eq!(result.issues[0].issue_type, IssueType::Warning);
        assert_eq!(result.issues[0].severity, Severity::High);
    }

    #[test]
    fn critical_companion_mismatch_is_an_error_and_incompatible() {
        let mut env = EnvironmentDescriptor::default();
        env.set_companion(Companion::TestRunner, "27.5.1");

        let result = evaluate("toast", &record(), &env).unwrap();

        assert!(!result.compatible);
        assert!(result.migration_required);
        assert_eq!(result.issues[0].issue_type, IssueType::Error);
        assert_eq!(result.issues[0].affected_features, vec!["test_runner"]);
    }

    #[test]
    fn critical_dependency_conflict_is_incompatible_without_requiring_migration() {
        let mut env = EnvironmentDescriptor::default();
        env.dependencies
            .insert("zod".to_string(), "3.21.0".to_string());

        let result = evaluate("toast", &record(), &env).unwrap();

        assert!(!result.compatible);
        assert!(!result.migration_required);
        assert_eq!(result.issues[0].category, IssueCategory::DependencyConflict);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert_eq!(
            result.recommendations,
            vec!["Update dependency zod to a version matching =3.22.0".to_string()]
        );
    }

    #[test]
    fn dependency_without_declared_range_is_skipped() {
        let mut env = EnvironmentDescriptor::default();
        env.dependencies
            .insert("lodash".to_string(), "4.17.21".to_string());

        let result = evaluate("toast", &record(), &env).unwrap();

        assert!(result.issues.is_empty());
    }

    #[test]
    fn breaking_changes_make_result_incompatible_regardless_of_environment() {
        let mut record = record();
        record.breaking_changes = vec!["useToast() returns an object".to_string()];
        record.migration_guide = Some("docs/toast-v2.md".to_string());
        let mut env = EnvironmentDescriptor::with_framework("18.2.0");
        env.set_companion(Companion::TestRunner, "29.7.0");

        let result = evaluate("toast", &record, &env).unwrap();

        assert!(!result.compatible);
        assert!(result.migration_required);
        let issue = &result.issues[0];
        assert_eq!(issue.category, IssueCategory::BreakingChange);
        assert_eq!(issue.severity, Severity::Critical);
        assert_eq!(issue.issue_type, IssueType::Error);
        assert!(
            result
                .recommendations
                .contains(&"Follow the migration guide: docs/toast-v2.md".to_string())
        );
    }

    #[test]
    fn deprecations_add_medium_warning_but_stay_compatible() {
        let mut record = record();
        record.deprecations = vec!["toast.legacy()".to_string()];

        let result = evaluate("toast", &record, &EnvironmentDescriptor::default()).unwrap();

        assert!(result.compatible);
        assert!(!result.migration_required);
        assert_eq!(result.issues[0].category, IssueCategory::Deprecation);
        assert_eq!(result.issues[0].severity, Severity::Medium);
        assert_eq!(result.issues[0].issue_type, IssueType::Warning);
    }

    #[rstest]
    #[case(EnvironmentDescriptor::with_framework("18"))]
    #[case(EnvironmentDescriptor { testing_library: Some("latest".to_string()), ..Default::default() })]
    #[case(EnvironmentDescriptor { dependencies: [("zod".to_string(), "^3".to_string())].into(), ..Default::default() })]
    fn malformed_environment_version_is_a_hard_error(#[case] env: EnvironmentDescriptor) {
        let mut record = record();
        record.compatibility_matrix.testing_library = Some(VersionRange::any());

        assert!(evaluate("toast", &record, &env).is_err());
    }

    #[rstest]
    #[case(EnvironmentDescriptor { typescript: Some("next".to_string()), ..Default::default() })]
    #[case(EnvironmentDescriptor { test_runner: Some("latest".to_string()), ..Default::default() })]
    #[case(EnvironmentDescriptor { dependencies: [("axios".to_string(), "^1".to_string())].into(), ..Default::default() })]
    fn malformed_environment_version_fails_without_declared_range(
        #[case] env: EnvironmentDescriptor,
    ) {
        let record = MockVersionRecord::new(
            v("1.0.0"),
            CompatibilityMatrix {
                framework: VersionRange::at_least(v("18.0.0")),
                ..Default::default()
            },
        );

        assert!(evaluate("toast", &record, &env).is_err());
    }

    #[test]
    fn undeclared_dimensions_are_parsed_but_not_matched() {
        let mut env = EnvironmentDescriptor::with_framework("18.2.0");
        env.set_companion(Companion::TypeScript, "5.4.0");
        env.dependencies
            .insert("axios".to_string(), "0.1.0".to_string());

        let result = evaluate("toast", &record(), &env).unwrap();

        assert!(result.compatible);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn migration_flag_tracks_breaking_or_critical_version_mismatch() {
        let issue = |category, severity| CompatibilityIssue {
            issue_type: IssueType::Warning,
            category,
            severity,
            description: String::new(),
            affected_features: vec![],
            resolution: None,
        };

        assert!(requires_migration(&[issue(
            IssueCategory::BreakingChange,
            Severity::Critical
        )]));
        assert!(requires_migration(&[issue(
            IssueCategory::VersionMismatch,
            Severity::Critical
        )]));
        assert!(!requires_migration(&[issue(
            IssueCategory::VersionMismatch,
            Severity::High
        )]));
        assert!(!requires_migration(&[issue(
            IssueCategory::DependencyConflict,
            Severity::Critical
        )]));
        assert!(!requires_migration(&[issue(
            IssueCategory::Deprecation,
            Severity::Medium
        )]));
    }
}
