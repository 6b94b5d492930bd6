use std::path::PathBuf;

use super::Config;

/// Returns the config directory: `~/.config/crux/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("crux"))
}

/// Returns the config file path: `~/.config/crux/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Tries to load and parse `config.toml`.
///
/// Returns `Ok(Config)` on success, or an error string describing
/// what went wrong (IO error, parse error, etc.).
pub fn try_load() -> Result<Config, String> {
    let path = config_path().ok_or("could not determine config path")?;
    let content = std::fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))?;
    parse(&content).map_err(|e| format!("{}: {e}", path.display()))
}

/// Loads the configuration from disk, falling back to defaults.
///
/// A missing file silently yields defaults; any other failure is
/// reported on stderr before falling back.
pub fn load() -> Config {
    if !config_path().is_some_and(|p| p.exists()) {
        return Config::default();
    }
    try_load().unwrap_or_else(|e| {
        eprintln!("Warning: {e}");
        Config::default()
    })
}

/// Parses config TOML and clamps it via [`Config::validate`].
pub(super) fn parse(content: &str) -> Result<Config, toml::de::Error> {
    let mut config: Config = toml::from_str(content)?;
    config.validate();
    Ok(config)
}
