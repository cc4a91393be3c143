//! Engine and gesture configuration.
//!
//! [`GestureSettings`] configures one gesture instance and
//! [`ManagerConfig`] configures the engine. Both have sensible defaults and
//! builder-style setters. [`TouchConfig`] bundles a manager configuration
//! with named gesture presets and can be loaded from TOML or JSON:
//!
//! ```
//! use horizon_touch::TouchConfig;
//!
//! let config = TouchConfig::from_toml_str(r#"
//!     [manager]
//!     propagate_to_ancestors = false
//!
//!     [gestures.single_press]
//!     min_pointers = 1
//!     max_pointers = 1
//!     ignore_children = true
//! "#).unwrap();
//!
//! assert!(!config.manager.propagate_to_ancestors);
//! assert_eq!(config.gesture("single_press").unwrap().max_pointers, 1);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arena::GesturePriority;
use crate::error::{ConfigError, GestureError};

/// Default number of positions kept in each pointer's motion history.
pub const DEFAULT_POINTER_HISTORY_LEN: usize = 16;

/// Settings for one gesture instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Minimum number of pointers. 0 behaves like 1.
    pub min_pointers: u32,
    /// Maximum number of pointers. 0 means no limit.
    pub max_pointers: u32,
    /// Only accept pointers pressed directly on the gesture's own node.
    pub ignore_children: bool,
    /// Send gesture-specific messages (such as `"OnPress"`) to the message target.
    pub send_messages: bool,
    /// Send `"OnGestureStateChange"` on every committed transition.
    pub send_state_change_messages: bool,
    /// Whether the gesture takes part in routing.
    pub enabled: bool,
    /// Arbitration priority. Higher priorities are considered first.
    pub priority: GesturePriority,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            min_pointers: 0,
            max_pointers: 0,
            ignore_children: false,
            send_messages: true,
            send_state_change_messages: false,
            enabled: true,
            priority: GesturePriority::Normal,
        }
    }
}

impl GestureSettings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum pointer count.
    pub fn with_min_pointers(mut self, min: u32) -> Self {
        self.min_pointers = min;
        self
    }

    /// Set the maximum pointer count.
    pub fn with_max_pointers(mut self, max: u32) -> Self {
        self.max_pointers = max;
        self
    }

    /// Set whether pointers pressed on descendants are ignored.
    pub fn with_ignore_children(mut self, ignore: bool) -> Self {
        self.ignore_children = ignore;
        self
    }

    /// Set whether gesture-specific messages are sent.
    pub fn with_send_messages(mut self, send: bool) -> Self {
        self.send_messages = send;
        self
    }

    /// Set whether state change messages are sent.
    pub fn with_send_state_change_messages(mut self, send: bool) -> Self {
        self.send_state_change_messages = send;
        self
    }

    /// Set whether the gesture is enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the arbitration priority.
    pub fn with_priority(mut self, priority: GesturePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Check that the pointer thresholds describe a non-empty window.
    pub fn validate(&self) -> Result<(), GestureError> {
        if self.max_pointers > 0 && self.min_pointers > self.max_pointers {
            return Err(GestureError::InvalidThresholds {
                min: self.min_pointers,
                max: self.max_pointers,
            });
        }
        Ok(())
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Route presses to gestures on the target's ancestors as well as on the
    /// target itself.
    pub propagate_to_ancestors: bool,
    /// Number of positions kept in each pointer's motion history.
    pub pointer_history_len: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            propagate_to_ancestors: true,
            pointer_history_len: DEFAULT_POINTER_HISTORY_LEN,
        }
    }
}

impl ManagerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether presses propagate to ancestors.
    pub fn with_propagate_to_ancestors(mut self, propagate: bool) -> Self {
        self.propagate_to_ancestors = propagate;
        self
    }

    /// Set the pointer history length.
    pub fn with_pointer_history_len(mut self, len: usize) -> Self {
        self.pointer_history_len = len;
        self
    }
}

/// A manager configuration plus named gesture presets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    /// Engine settings.
    pub manager: ManagerConfig,
    /// Gesture presets by name.
    pub gestures: BTreeMap<String, GestureSettings>,
}

impl TouchConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read_text(path.as_ref())?)
    }

    /// Load and validate a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_text(path.as_ref())?)
    }

    /// Serialize to pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a gesture preset.
    pub fn gesture(&self, name: &str) -> Option<&GestureSettings> {
        self.gestures.get(name)
    }

    /// Add or replace a gesture preset.
    pub fn insert_gesture(&mut self, name: impl Into<String>, settings: GestureSettings) {
        self.gestures.insert(name.into(), settings);
    }

    /// Validate every gesture preset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, settings) in &self.gestures {
            settings
                .validate()
                .map_err(|source| ConfigError::InvalidGesture {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
