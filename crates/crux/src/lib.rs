//! Crux: platform-independent windows over a compile-time selected backend.
//!
//! Windows are created through [`WindowFactory`] and shared as
//! [`WindowHandle`]s. Backends that need OS libraries load them through a
//! process-wide registry; call [`shutdown`] before exiting to unload them.

pub use crux_core::{
    CloseFlag, LibraryRegistry, Loader, NativeHandle, Platform, PlatformBackend, TARGET_PLATFORM,
    Vec2i, Vec2u, Vector2, Window, WindowHandle, WindowProperties, WindowResult, config, log,
};

#[cfg(windows)]
pub use crux_windows::libraries;

/// The window backend compiled in for this target.
#[cfg(windows)]
pub type ActiveBackend = crux_windows::Win32Backend;

/// Single entry point for creating windows.
pub struct WindowFactory;

impl WindowFactory {
    /// Whether this build has a window backend.
    pub fn is_supported() -> bool {
        TARGET_PLATFORM.has_backend()
    }

    /// Creates a window with the active backend.
    ///
    /// Returns `None` when the platform has no backend (an expected
    /// outcome, not an error) or when the backend fails. Both are logged.
    pub fn create(props: &WindowProperties) -> Option<WindowHandle> {
        if !Self::is_supported() {
            crux_core::log_info!("no window backend for {TARGET_PLATFORM}");
            return None;
        }
        match Self::try_create(props) {
            Ok(window) => Some(window),
            Err(e) => {
                crux_core::log_error!("window creation failed: {e}");
                None
            }
        }
    }

    /// Like [`create`](Self::create), but reports why no window was made.
    pub fn try_create(props: &WindowProperties) -> WindowResult<WindowHandle> {
        #[cfg(windows)]
        {
            Window::try_create_with::<ActiveBackend>(props)
        }
        #[cfg(not(windows))]
        {
            let _ = props;
            Err(format!("unsupported platform: no window backend for {TARGET_PLATFORM}").into())
        }
    }
}

/// Unloads every native library the backend loaded.
///
/// The registry lives for the whole process and is never torn down
/// implicitly; call this once, after the last window is dropped.
pub fn shutdown() {
    #[cfg(windows)]
    libraries().release_all();
}
