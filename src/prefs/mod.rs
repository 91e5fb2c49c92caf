//! User dice preferences
//!
//! Decorative settings read when a roll starts. None of them affect scoring.

use serde::{Deserialize, Serialize};

use crate::session::Visibility;
use crate::skin::DEFAULT_SKIN_ID;

/// Per-user dice settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Selected skin (unknown ids fall back to the default skin)
    pub skin_id: String,
    /// Whether the animated dice source should be used at all
    pub enable_3d: bool,
    /// Whether sound cues fire
    pub enable_sfx: bool,
    /// Whether the table shakes on impact
    pub enable_shake: bool,
    /// Visibility applied to new rolls
    pub visibility: Visibility,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            skin_id: DEFAULT_SKIN_ID.to_string(),
            enable_3d: true,
            enable_sfx: true,
            enable_shake: true,
            visibility: Visibility::Public,
        }
    }
}

impl UserPreferences {
    /// Replace the selected skin
    pub fn with_skin(mut self, skin_id: impl Into<String>) -> Self {
        self.skin_id = skin_id.into();
        self
    }
}
