use std::cell::RefCell;

use crux_core::{LibraryRegistry, Loader, NativeHandle};
use windows::Win32::Foundation::{FreeLibrary, HMODULE};
use windows::Win32::System::LibraryLoader::LoadLibraryW;
use windows::core::PCWSTR;

use crate::error::last_error_string;
use crate::wide::to_wide;

static LIBRARIES: LibraryRegistry<Win32Loader> = LibraryRegistry::new(Win32Loader);

thread_local! {
    // Outcome of this thread's last `LoadLibraryW`: `None` before the first
    // attempt, an empty string after a success, the failure text otherwise.
    static LAST_LOAD_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Returns the process-wide library registry.
///
/// Lives for the whole process. Call [`LibraryRegistry::release_all`]
/// (or `crux::shutdown`) before exiting to unload everything it holds.
pub fn libraries() -> &'static LibraryRegistry<Win32Loader> {
    &LIBRARIES
}

/// Loads modules with `LoadLibraryW` and unloads them with `FreeLibrary`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Loader;

impl Loader for Win32Loader {
    fn load(&self, name: &str) -> Option<NativeHandle> {
        let wide = to_wide(name);

        // SAFETY: `wide` is NUL-terminated and outlives the call.
        let (handle, error) = match unsafe { LoadLibraryW(PCWSTR(wide.as_ptr())) } {
            Ok(module) => (NativeHandle::from_raw(module.0), String::new()),
            Err(err) => (None, err.message()),
        };
        LAST_LOAD_ERROR.with(|e| *e.borrow_mut() = Some(error));
        handle
    }

    fn unload(&self, handle: NativeHandle) -> Result<(), String> {
        // SAFETY: the handle came from LoadLibraryW and the registry
        // unloads each entry exactly once.
        unsafe { FreeLibrary(HMODULE(handle.as_ptr())) }.map_err(|e| e.message())
    }

    fn last_error(&self) -> String {
        LAST_LOAD_ERROR
            .with(|e| e.borrow().clone())
            .unwrap_or_else(last_error_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_system_library_once() {
        // Arrange
        let registry = LibraryRegistry::new(Win32Loader);

        // Act
        let first = registry.load("kernel32.dll");
        let second = registry.load("kernel32.dll");

        // Assert
        assert!(first.is_some());
        assert_eq!(first, second);
        registry.release_all();
        assert!(!registry.has_library("kernel32.dll"));
    }

    #[test]
    fn missing_library_reports_error() {
        // Arrange
        let registry = LibraryRegistry::new(Win32Loader);

        // Act
        let handle = registry.load("missing.lib");
        let error = registry.last_error();

        // Assert
        assert_eq!(handle, None);
        assert!(!registry.has_library("missing.lib"));
        assert!(!error.is_empty());
    }

    #[test]
    fn successful_load_clears_last_error() {
        // Arrange
        let registry = LibraryRegistry::new(Win32Loader);
        registry.load("missing.lib");

        // Act
        let handle = registry.load("kernel32.dll");

        // Assert
        assert!(handle.is_some());
        assert_eq!(registry.last_error(), "");
        registry.release_all();
    }

    #[test]
    fn global_registry_is_shared() {
        assert!(std::ptr::eq(libraries(), libraries()));
    }
}
