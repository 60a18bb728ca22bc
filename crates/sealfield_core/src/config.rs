//! Runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default placeholder shown to readers without disclosure rights.
pub const DEFAULT_MASK: &str = "••••••";

/// Default window for suppressing repeated decrypt-failure notifications.
pub const DEFAULT_NOTIFY_WINDOW: Duration = Duration::from_secs(3600);

/// Who may read decrypted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosurePolicy {
    /// Superusers and holders of the global or collection permission only.
    #[default]
    PermissionGated,
    /// Every reader receives plaintext; values are still encrypted at rest.
    Unrestricted,
}

/// Configuration for the encryption pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global toggle. When off, the write path stores values as given and
    /// the read path returns stored values untouched.
    pub enabled: bool,

    /// Placeholder returned instead of real content for unauthorized readers.
    pub mask: String,

    /// Disclosure policy for the read path.
    pub disclosure: DisclosurePolicy,

    /// Window during which repeated decrypt failures for the same
    /// collection produce at most one operator notification.
    #[serde(with = "duration_secs")]
    pub notify_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            mask: DEFAULT_MASK.to_string(),
            disclosure: DisclosurePolicy::PermissionGated,
            notify_window: DEFAULT_NOTIFY_WINDOW,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global encryption toggle.
    #[must_use]
    pub fn enabled(mut self, value: bool) -> Self {
        self.enabled = value;
        self
    }

    /// Sets the mask placeholder.
    #[must_use]
    pub fn mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = mask.into();
        self
    }

    /// Sets the disclosure policy.
    #[must_use]
    pub fn disclosure(mut self, policy: DisclosurePolicy) -> Self {
        self.disclosure = policy;
        self
    }

    /// Sets the notification dedup window.
    #[must_use]
    pub fn notify_window(mut self, window: Duration) -> Self {
        self.notify_window = window;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
