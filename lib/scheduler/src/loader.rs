//! Declarative descriptor configuration.
//!
//! Hosts can declare their notifications in a JSON document instead of
//! constructing descriptors in code. The loader only defines the record
//! shape and the parse; `NotificationScheduler::load_config_file` feeds the
//! resulting records into the registry.
//!
//! ```json
//! [
//!   {
//!     "name": "daily-reminder",
//!     "description": "Reminds the user once a day",
//!     "interval": 86400,
//!     "one_time_only": false,
//!     "should_wait_interval_before_first_fire": false
//!   }
//! ]
//! ```

use crate::descriptor::NotificationDescriptor;
use crate::error::LoaderError;
use chrono::Duration;
use recur_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

fn default_true() -> bool {
    true
}

/// One declared notification. Fields beyond `name` and `interval` default to
/// the same values as [`NotificationDescriptor::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Unique notification name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Firing interval in seconds.
    pub interval: f64,
    /// Fire at most once ever.
    #[serde(default)]
    pub one_time_only: bool,
    /// Whether the notification participates in scheduling.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the scheduler fires this automatically.
    #[serde(default = "default_true")]
    pub causes_notification_generation: bool,
    /// Wait a full interval before the first fire.
    #[serde(default = "default_true")]
    pub should_wait_interval_before_first_fire: bool,
    /// Opaque key/value data handed to handlers.
    #[serde(default)]
    pub user_info: Map<String, Value>,
    /// Opaque payload handed to handlers.
    #[serde(default)]
    pub payload: Value,
}

impl From<NotificationConfig> for NotificationDescriptor {
    fn from(config: NotificationConfig) -> Self {
        let interval = Duration::milliseconds((config.interval * 1000.0) as i64);
        let mut descriptor = NotificationDescriptor::new(config.name, interval)
            .with_description(config.description)
            .with_one_time_only(config.one_time_only)
            .with_causes_notification_generation(config.causes_notification_generation)
            .with_wait_before_first_fire(config.should_wait_interval_before_first_fire)
            .with_user_info(config.user_info)
            .with_payload(config.payload);
        descriptor.enabled = config.enabled;
        descriptor
    }
}

/// Parses an ordered list of notification configs from a JSON document.
///
/// # Errors
///
/// Returns an error if the document is not a valid config list.
pub fn load_configs_str(raw: &str) -> Result<Vec<NotificationConfig>, LoaderError> {
    let configs = serde_json::from_str(raw).map_err(|e| LoaderError::Parse {
        reason: e.to_string(),
    })?;
    Ok(configs)
}

/// Reads and parses notification configs from the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_configs_file(path: impl AsRef<Path>) -> Result<Vec<NotificationConfig>, LoaderError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| LoaderError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    load_configs_str(&raw)
}
