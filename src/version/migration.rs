//! Migration path synthesis

use crate::version::semver::SemanticVersion;
use crate::version::types::{Effort, MigrationAction, MigrationPath, MigrationStep, MockVersionRecord};

/// Build the remediation plan from `current` to `latest`.
///
/// Steps are emitted in fixed priority order: breaking changes, then
/// deprecations, then the version bump that is always last. Returns `None`
/// when there is no latest version to migrate to.
pub fn plan_migration(
    mock_name: &str,
    current: &MockVersionRecord,
    latest: Option<&SemanticVersion>,
) -> Option<MigrationPath> {
    let to_version = latest?.clone();
    let from_version = current.version.clone();

    let mut steps = Vec::new();
    let mut effort = Effort::Low;

    if !current.breaking_changes.is_empty() {
        steps.push(MigrationStep {
            action: MigrationAction::AddressBreakingChanges,
            description: format!(
                "Address {} breaking change(s) in {}",
                current.breaking_changes.len(),
                mock_name
            ),
            details: current.breaking_changes.clone(),
            required: true,
            automated: false,
        });
        effort = effort.max(Effort::High);
    }

    if !current.deprecations.is_empty() {
        steps.push(MigrationStep {
            action: MigrationAction::UpdateDeprecatedUsage,
            description: format!(
                "Update usage of {} deprecated API(s) in {}",
                current.deprecations.len(),
                mock_name
            ),
            details: current.deprecations.clone(),
            required: false,
            automated: false,
        });
        effort = effort.max(Effort::Medium);
    }

    steps.push(MigrationStep {
        action: MigrationAction::BumpVersion,
        description: format!(
            "Update {} from {} to {}",
            mock_name, from_version, to_version
        ),
        details: Vec::new(),
        required: true,
        automated: true,
    });

    let automatable = steps.iter().all(|step| step.automated);

    Some(MigrationPath {
        from_version,
        to_version,
        steps,
        estimated_effort: effort,
        automatable,
    })
}
