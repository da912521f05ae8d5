//! Version parsing, comparison and effective-version resolution.
//!
//! Chromium versions are dotted sequences of integers, usually four
//! components. They are not semver, so comparison is done component by
//! component with missing trailing components treated as zero.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::CachePaths;

/// A parsed dotted version such as `142.0.7444.175`.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

/// Error returned when a version string is not dotted integers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version string: {0:?}")]
pub struct ParseVersionError(String);

impl Version {
    /// Returns the numeric components.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseVersionError(s.to_string()));
        }
        let components = s
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        Ok(Self { components })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| {
                let a = self.components.get(i).copied().unwrap_or(0);
                let b = other.components.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Returns `true` if version `a` is strictly newer than version `b`.
///
/// A string that does not parse is never newer than anything, and nothing
/// is newer than it.
#[must_use]
pub fn is_newer(a: &str, b: &str) -> bool {
    match (a.parse::<Version>(), b.parse::<Version>()) {
        (Ok(a), Ok(b)) => a > b,
        _ => false,
    }
}

/// Resolves the version to use, given the compiled-in `baseline`.
///
/// The marker written by the update checker wins only when it is newer than
/// the baseline and its version directory already exists. A missing or
/// unreadable marker is the normal first-run state and falls back silently.
#[must_use]
pub fn effective_version(paths: &CachePaths, baseline: &str) -> String {
    let marker = paths.version_marker();
    let Ok(content) = std::fs::read_to_string(&marker) else {
        return baseline.to_string();
    };
    let staged = content.trim();
    if is_newer(staged, baseline) && paths.is_version_staged(staged) {
        debug!("Using staged version {staged} from {}", marker.display());
        return staged.to_string();
    }
    baseline.to_string()
}
