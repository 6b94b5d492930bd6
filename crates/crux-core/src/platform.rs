use std::fmt;

/// Operating system families Crux knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    None,
    Windows,
    Mac,
    Linux,
}

/// The platform this build targets, fixed at compile time.
#[cfg(windows)]
pub const TARGET_PLATFORM: Platform = Platform::Windows;
#[cfg(target_os = "macos")]
pub const TARGET_PLATFORM: Platform = Platform::Mac;
#[cfg(target_os = "linux")]
pub const TARGET_PLATFORM: Platform = Platform::Linux;
#[cfg(not(any(windows, target_os = "macos", target_os = "linux")))]
pub const TARGET_PLATFORM: Platform = Platform::None;

impl Platform {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Windows => "Win32",
            Self::Mac => "macOS",
            Self::Linux => "Linux",
        }
    }

    /// Whether a window backend exists for this platform.
    pub fn has_backend(self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_windows_has_a_backend() {
        assert!(Platform::Windows.has_backend());
        assert!(!Platform::Linux.has_backend());
        assert!(!Platform::Mac.has_backend());
        assert!(!Platform::None.has_backend());
    }

    #[test]
    fn target_matches_build_configuration() {
        assert_eq!(TARGET_PLATFORM.has_backend(), cfg!(windows));
    }

    #[test]
    fn displays_platform_name() {
        assert_eq!(Platform::Windows.to_string(), "Win32");
        assert_eq!(Platform::None.to_string(), "none");
    }
}
