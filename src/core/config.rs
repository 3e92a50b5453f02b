#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::events::EventKind;

/// Role marker class that flags an element as the slider's value label.
pub const DEFAULT_LABEL_CLASS: &str = "rating-value";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_label_class"))]
    pub label_class: String,
    /// `true`: follow every drag tick (`input`). `false`: only committed
    /// values (`change`).
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub live: bool,
}

#[cfg(feature = "serde")]
fn default_label_class() -> String {
    DEFAULT_LABEL_CLASS.to_string()
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            label_class: DEFAULT_LABEL_CLASS.to_string(),
            live: true,
        }
    }
}

impl SyncConfig {
    pub fn with_label_class(mut self, class: &str) -> Self {
        self.label_class = class.to_string();
        self
    }

    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// The event the label follows.
    pub fn trigger(&self) -> EventKind {
        if self.live {
            EventKind::Input
        } else {
            EventKind::Change
        }
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
