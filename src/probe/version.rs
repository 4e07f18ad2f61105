//! Semantic version splitting for build scripts.

use semver::Version;

/// Major, minor and patch of a semantic version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionParts {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionParts {
    /// Components as the strings written to the configure files
    pub fn to_strings(self) -> [String; 3] {
        [
            self.major.to_string(),
            self.minor.to_string(),
            self.patch.to_string(),
        ]
    }
}

/// Parse `raw` as a semantic version. A leading `v` (as in git tags) is allowed.
///
/// Returns `None` for anything that is not a full `MAJOR.MINOR.PATCH` version.
pub fn parse_semantic_version(raw: &str) -> Option<VersionParts> {
    let trimmed = raw.trim();
    let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let version = Version::parse(candidate).ok()?;
    Some(VersionParts {
        major: version.major,
        minor: version.minor,
        patch: version.patch,
    })
}

/// The three strings to write for `raw`: the components, or empty strings
/// when `raw` is not a semantic version
pub fn version_components(raw: &str) -> [String; 3] {
    match parse_semantic_version(raw) {
        Some(parts) => parts.to_strings(),
        None => {
            tracing::warn!("{:?} is not a semantic version, writing empty components", raw);
            Default::default()
        }
    }
}
