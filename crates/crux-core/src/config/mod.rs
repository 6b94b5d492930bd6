mod loader;
pub mod template;

use serde::{Deserialize, Serialize};

use crate::WindowProperties;
use crate::log::LogConfig;

pub use loader::{config_dir, config_path, load, try_load};

/// Largest window extent accepted from the config file, in pixels.
pub const MAX_EXTENT: u32 = 16_384;

/// Top-level configuration for Crux.
///
/// Loaded from `~/.config/crux/config.toml`. Missing sections
/// fall back to defaults thanks to `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Properties used for windows the host creates without overrides.
    pub window: WindowProperties,
    /// File logging settings.
    pub logging: LogConfig,
}

impl Config {
    /// Clamps window extents and replaces a blank title.
    pub fn validate(&mut self) {
        self.window.width = self.window.width.min(MAX_EXTENT);
        self.window.height = self.window.height.min(MAX_EXTENT);
        if self.window.title.trim().is_empty() {
            self.window.title = WindowProperties::default().title;
        }
    }
}

#[cfg(test)]
mod tests;
