//! Version-string arithmetic for document versions.
//!
//! Every content change is a patch bump: `1.0.0 -> 1.0.1 -> 1.0.2`. There is
//! no minor or major bump path.

use semver::Version;

use crate::errors::CoreError;

/// Version assigned to the first snapshot of every document.
pub const INITIAL_VERSION: &str = "1.0.0";

/// Change log attached to the first snapshot of every document.
pub const INITIAL_CHANGE_LOG: &str = "Initial version";

/// Parse a stored version string into `(major, minor, patch)`.
///
/// Up to three dot-separated integer components are accepted; missing
/// components default to `0` (`"2"` is `2.0.0`, `"1.4"` is `1.4.0`).
///
/// # Errors
///
/// Returns `CoreError::InvalidVersion` for empty input, more than three
/// components, or a component that is not a non-negative integer.
pub fn parse_components(version: &str) -> Result<Version, CoreError> {
    let invalid = |reason: &str| CoreError::InvalidVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = version.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty version"));
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() > 3 {
        return Err(invalid("more than three components"));
    }

    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u64>()
            .map_err(|e| invalid(&format!("component '{part}': {e}")))?;
    }

    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Compute the version that follows `current`: the patch component plus one.
///
/// # Errors
///
/// Returns `CoreError::InvalidVersion` if `current` cannot be parsed.
pub fn increment_version(current: &str) -> Result<String, CoreError> {
    let parsed = parse_components(current)?;
    let patch = parsed.patch.checked_add(1).ok_or_else(|| CoreError::InvalidVersion {
        version: current.to_string(),
        reason: "patch component overflow".to_string(),
    })?;
    Ok(Version::new(parsed.major, parsed.minor, patch).to_string())
}

/// Version that follows the latest stored one, or the initial version when
/// the document has no history.
///
/// # Errors
///
/// Returns `CoreError::InvalidVersion` if `latest` cannot be parsed.
pub fn next_version(latest: Option<&str>) -> Result<String, CoreError> {
    latest.map_or_else(|| Ok(INITIAL_VERSION.to_string()), increment_version)
}
