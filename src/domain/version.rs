use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::domain::tag::TagPattern;
use crate::error::{ReleaseError, Result};

/// Version every package gets on its first release.
pub const INITIAL_VERSION: Version = Version::new(1, 0, 0);

/// Release severity, following semantic-versioning increment rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
}

impl ReleaseType {
    /// Precedence used when reducing many changes to one severity.
    pub const PRIORITY: [ReleaseType; 3] =
        [ReleaseType::Major, ReleaseType::Minor, ReleaseType::Patch];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(ReleaseType::Major),
            "minor" => Ok(ReleaseType::Minor),
            "patch" => Ok(ReleaseType::Patch),
            other => Err(ReleaseError::config(format!(
                "unknown release type '{}' (expected major, minor or patch)",
                other
            ))),
        }
    }
}

/// Increment exactly one component of `version`.
///
/// - **Major**: major += 1, minor = 0, patch = 0
/// - **Minor**: minor += 1, patch = 0
/// - **Patch**: patch += 1
///
/// Pre-release and build metadata never carry over.
pub fn bump(version: &Version, release_type: ReleaseType) -> Version {
    match release_type {
        ReleaseType::Major => Version::new(version.major + 1, 0, 0),
        ReleaseType::Minor => Version::new(version.major, version.minor + 1, 0),
        ReleaseType::Patch => Version::new(version.major, version.minor, version.patch + 1),
    }
}

/// Parse the semantic version carried by a release tag such as `foo-v1.2.3`.
pub fn parse_tag_version(tag: &str, pattern: &TagPattern) -> Result<Version> {
    let suffix = pattern
        .version_part(tag)
        .ok_or_else(|| ReleaseError::version(tag, format!("expected prefix '{}'", pattern.prefix())))?;

    Version::parse(suffix).map_err(|e| ReleaseError::version(tag, e.to_string()))
}

/// Compute the next version from the prior release tag and severity.
///
/// Without a prior tag the result is always [`INITIAL_VERSION`]; the first
/// release is a baseline, not a bump.
pub fn next_version(
    prior_tag: Option<&str>,
    pattern: &TagPattern,
    release_type: ReleaseType,
) -> Result<Version> {
    match prior_tag {
        None => Ok(INITIAL_VERSION),
        Some(tag) => {
            let current = parse_tag_version(tag, pattern)?;
            Ok(bump(&current, release_type))
        }
    }
}
