//! One predicate per condition category.
//!
//! Each returns `true` for an empty list. Probe failures evaluate to
//! `false`; the version probe additionally warns.
use std::collections::BTreeMap;

use super::version::{VersionConstraint, probe_version};
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

/// Current OS is one of `allowed`.
#[must_use]
pub fn matches_os(allowed: &[String], platform: &Platform) -> bool {
    allowed.is_empty() || allowed.iter().any(|os| *os == platform.os)
}

/// Current distro is one of `allowed`, compared case-insensitively.
///
/// Always true off Linux. On Linux an undetectable distro fails a
/// non-empty list.
#[must_use]
pub fn matches_distro(allowed: &[String], platform: &Platform) -> bool {
    if allowed.is_empty() || !platform.is_linux() {
        return true;
    }
    platform
        .distro
        .as_deref()
        .is_some_and(|current| allowed.iter().any(|d| d.eq_ignore_ascii_case(current)))
}

/// Every program in `required` resolves on the search path.
#[must_use]
pub fn matches_executables(required: &[String], executor: &dyn Executor) -> bool {
    required.iter().all(|name| executor.which(name).is_some())
}

/// Every program in `constraints` is present and its version satisfies
/// the constraint.
#[must_use]
pub fn matches_executable_versions(
    constraints: &BTreeMap<String, String>,
    executor: &dyn Executor,
    log: &dyn Log,
) -> bool {
    constraints.iter().all(|(name, constraint)| {
        let Some(path) = executor.which(name) else {
            log.debug(&format!("{name} not found on PATH"));
            return false;
        };
        let Some(version) = probe_version(executor, &path) else {
            log.warn(&format!("could not determine version of {name}"));
            return false;
        };
        let Ok(constraint) = constraint.parse::<VersionConstraint>();
        let ok = constraint.is_met_by(&version);
        if !ok {
            log.debug(&format!("{name} {version} does not satisfy {constraint}"));
        }
        ok
    })
}

/// Current user is one of `allowed`.
#[must_use]
pub fn matches_user(allowed: &[String], platform: &Platform) -> bool {
    allowed.is_empty()
        || platform
            .user
            .as_deref()
            .is_some_and(|current| allowed.iter().any(|u| u == current))
}
