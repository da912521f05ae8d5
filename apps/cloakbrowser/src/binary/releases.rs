//! Release feed lookup for the update checker.
//!
//! The feed is the GitHub releases listing for the project. Only the first
//! page is consulted; releases are returned newest first.
//!
//! ## Feed Format
//!
//! ```json
//! [
//!   { "tag_name": "chromium-v145.0.7718.0", "draft": false },
//!   { "tag_name": "v0.2.0", "draft": false }
//! ]
//! ```
//!
//! A release is eligible when it is not a draft and its tag starts with
//! `chromium-v`; the version is the tag with that prefix removed.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::RELEASE_TAG_PREFIX;
use crate::errors::{CloakError, Result};

/// User-Agent header for HTTP requests.
pub(crate) const USER_AGENT: &str = concat!("cloakbrowser/", env!("CARGO_PKG_VERSION"));

/// One entry of the release listing. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    /// Git tag of the release, e.g. `chromium-v145.0.7718.0`.
    pub tag_name: String,
    /// Whether the release is an unpublished draft.
    #[serde(default)]
    pub draft: bool,
}

impl Release {
    /// Returns the Chromium version carried by this release, if eligible.
    #[must_use]
    pub fn chromium_version(&self) -> Option<&str> {
        if self.draft {
            return None;
        }
        self.tag_name
            .strip_prefix(RELEASE_TAG_PREFIX)
            .filter(|v| !v.is_empty())
    }
}

/// Returns the version of the first eligible release in feed order.
#[must_use]
pub fn latest_chromium_version(releases: &[Release]) -> Option<String> {
    releases
        .iter()
        .find_map(Release::chromium_version)
        .map(str::to_string)
}

/// Queries the release feed for the newest published Chromium version.
///
/// Any network or parse failure yields `None`; this is only ever used in a
/// best-effort context.
pub async fn latest_remote_version(url: &str, timeout: Duration) -> Option<String> {
    match fetch_releases(url, timeout).await {
        Ok(releases) => latest_chromium_version(&releases),
        Err(e) => {
            debug!("Release feed lookup failed: {e}");
            None
        }
    }
}

/// Fetches and parses the release listing.
///
/// # Errors
///
/// Returns a `Network` error if the request fails, the server returns a
/// non-success status, or the body is not a release listing.
pub async fn fetch_releases(url: &str, timeout: Duration) -> Result<Vec<Release>> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CloakError::network_with_source("Failed to create HTTP client", e))?;

    let response = client
        .get(url)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .map_err(|e| CloakError::network_with_source(format!("Failed to fetch {url}"), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CloakError::network(format!("HTTP error {status}: {url}")));
    }

    let text = response
        .text()
        .await
        .map_err(|e| CloakError::network_with_source(format!("Failed to read {url}"), e))?;

    serde_json::from_str(&text).map_err(|e| {
        CloakError::network_with_source(format!("Failed to parse release feed from {url}"), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, draft: bool) -> Release {
        Release {
            tag_name: tag.to_string(),
            draft,
        }
    }

    #[test]
    fn parses_chromium_tag() {
        let releases = [
            release("chromium-v145.0.7718.0", false),
            release("chromium-v142.0.7444.175", false),
        ];
        assert_eq!(
            latest_chromium_version(&releases).as_deref(),
            Some("145.0.7718.0")
        );
    }

    #[test]
    fn skips_draft_releases() {
        let releases = [
            release("chromium-v999.0.0.0", true),
            release("chromium-v145.0.7718.0", false),
        ];
        assert_eq!(
            latest_chromium_version(&releases).as_deref(),
            Some("145.0.7718.0")
        );
    }

    #[test]
    fn skips_non_chromium_tags() {
        let releases = [
            release("v0.2.0", false),
            release("chromium-v145.0.7718.0", false),
        ];
        assert_eq!(
            latest_chromium_version(&releases).as_deref(),
            Some("145.0.7718.0")
        );
    }

    #[test]
    fn empty_feed_has_no_version() {
        assert_eq!(latest_chromium_version(&[]), None);
        assert_eq!(
            latest_chromium_version(&[release("chromium-v", false)]),
            None
        );
    }

    #[test]
    fn deserializes_github_payload() {
        let json = r#"[
            {"tag_name": "chromium-v145.0.7718.0", "draft": false, "name": "Chromium 145", "assets": []},
            {"tag_name": "v0.2.0", "prerelease": true}
        ]"#;
        let releases: Vec<Release> = serde_json::from_str(json).unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0], release("chromium-v145.0.7718.0", false));
        assert!(!releases[1].draft);
    }
}
