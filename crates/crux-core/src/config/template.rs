/// Generates the default `config.toml` contents with explanatory comments.
///
/// Used by `crux init` to create a starter config file that users can
/// immediately edit.
pub fn generate_config() -> String {
    r##"# Crux configuration
# Location: ~/.config/crux/config.toml

# Defaults for windows created by the `crux` host.
[window]
# Title shown in the platform UI.
title = "Unknown"
# Size in pixels. 0 lets the OS pick.
width = 0
height = 0
# Screen position in pixels. A negative value means "unspecified".
position_x = -1
position_y = -1
# For unspecified axes: true centers the window, false lets the OS decide.
position_centered = true

[logging]
# Enable file logging to ~/.config/crux/logs/crux.log.
enabled = false
# Minimum log level: "debug", "info", "warn", or "error".
level = "info"
# Maximum log file size in MB before rotation.
max_file_mb = 10
"##
    .to_string()
}
