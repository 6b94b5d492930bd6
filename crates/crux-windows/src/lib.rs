//! Win32 backend for Crux. Compiles to an empty crate on other targets.
#![cfg(windows)]

/// Per-monitor DPI awareness.
pub mod dpi;

/// Formatting of Win32 error codes.
pub mod error;

/// `LoadLibraryW`-backed loader and the process-wide library registry.
pub mod library;

/// UTF-8 / UTF-16 conversion for Win32 string parameters.
pub mod wide;

/// Native window backend wrapping a Win32 `HWND`.
pub mod window;

pub use error::last_error_string;
pub use library::{Win32Loader, libraries};
pub use window::Win32Backend;
