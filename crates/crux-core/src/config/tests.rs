use super::loader::parse;
use super::*;

#[test]
fn default_config_has_expected_values() {
    // Act
    let mut config = Config::default();
    config.validate();

    // Assert
    assert_eq!(config.window, WindowProperties::default());
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn config_template_parses_to_defaults() {
    // Arrange
    let toml_str = template::generate_config();

    // Act
    let config = parse(&toml_str);

    // Assert
    assert_eq!(config.unwrap(), Config::default());
}

#[test]
fn partial_toml_uses_defaults_for_missing_sections() {
    // Arrange
    let toml_str = r#"
[window]
title = "Crux Example"
width = 800
height = 600
"#;

    // Act
    let config = parse(toml_str).unwrap();

    // Assert
    assert_eq!(config.window.title, "Crux Example");
    assert_eq!(config.window.size(), crate::Vec2u::new(800, 600));
    assert_eq!(
        config.window.position(),
        WindowProperties::POSITION_UNDEFINED_VEC
    );
    assert_eq!(config.logging, LogConfig::default());
}

#[test]
fn validate_clamps_extents_and_blank_title() {
    // Arrange
    let mut config = Config {
        window: WindowProperties::new("   ", 100_000, 50),
        ..Default::default()
    };

    // Act
    config.validate();

    // Assert
    assert_eq!(config.window.width, MAX_EXTENT);
    assert_eq!(config.window.height, 50);
    assert_eq!(config.window.title, "Unknown");
}

#[test]
fn invalid_toml_is_an_error() {
    assert!(parse("[window]\nwidth = \"wide\"").is_err());
}

#[test]
fn config_path_ends_with_crux_config() {
    if let Some(path) = config_path() {
        assert!(path.ends_with(".config/crux/config.toml"));
    }
}
