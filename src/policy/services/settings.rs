//! Configuration values for building a policy engine.

use serde::{Deserialize, Serialize};

/// Permission settings as they appear in configuration.
///
/// Loading the values from disk or the environment happens outside this
/// crate; anything that deserializes with `serde` can feed them in.
///
/// # Examples
///
/// ```
/// use parapet::policy::services::PolicySettings;
///
/// let settings: PolicySettings = serde_json::from_str(
///     r#"{"mode": "accept_edits", "deny": ["Bash(rm:*)"]}"#,
/// ).expect("valid settings");
/// assert_eq!(settings.mode, "accept_edits");
/// assert!(settings.allow.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Permission mode name; unknown names fall back to `default`.
    pub mode: String,
    /// Allow rule strings.
    pub allow: Vec<String>,
    /// Deny rule strings.
    pub deny: Vec<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            mode: "default".to_owned(),
            allow: Vec::new(),
            deny: Vec::new(),
        }
    }
}
