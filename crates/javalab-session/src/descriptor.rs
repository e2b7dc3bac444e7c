//! The immutable session descriptor.

use std::collections::BTreeMap;

/// Identifiers a session presents to the token endpoint.
///
/// Built once at session construction and never mutated. The options bag is
/// free-form; the backend interprets the keys (execution type, mini-app
/// selection, compile flags).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionDescriptor {
    /// Project channel id.
    pub channel_id: String,
    /// URL the backend fetches project sources from.
    pub project_url: String,
    /// Source version id to execute.
    pub project_version: String,
    /// Server level id.
    pub level_id: String,
    /// Free-form options forwarded to the backend.
    pub options: BTreeMap<String, String>,
}

impl SessionDescriptor {
    /// Create a descriptor with an empty options bag.
    pub fn new(
        channel_id: impl Into<String>,
        project_url: impl Into<String>,
        project_version: impl Into<String>,
        level_id: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            project_url: project_url.into(),
            project_version: project_version.into(),
            level_id: level_id.into(),
            options: BTreeMap::new(),
        }
    }

    /// Add one option to the bag.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.options.insert(key.into(), value.into());
        self
    }

    /// Query parameters for the token request.
    ///
    /// Option entries use the `options[<key>]` form the token endpoint
    /// expects for the nested bag.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("channelId".to_string(), self.channel_id.clone()),
            ("projectUrl".to_string(), self.project_url.clone()),
            ("projectVersion".to_string(), self.project_version.clone()),
            ("levelId".to_string(), self.level_id.clone()),
        ];
        for (key, value) in &self.options {
            pairs.push((format!("options[{key}]"), value.clone()));
        }
        pairs
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
