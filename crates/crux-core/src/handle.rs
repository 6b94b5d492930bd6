use std::ffi::c_void;
use std::fmt;
use std::num::NonZeroUsize;

/// An opaque, non-null reference to a native OS resource (a loaded
/// library module or a window).
///
/// Stored as an address rather than a pointer so it can cross threads.
/// The owner of the underlying resource decides its lifetime; this type
/// never frees anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(NonZeroUsize);

impl NativeHandle {
    /// Wraps a raw pointer. Returns `None` for null.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        Self::from_usize(ptr as usize)
    }

    /// Wraps a pointer-sized handle value. Returns `None` for zero.
    pub fn from_usize(value: usize) -> Option<Self> {
        NonZeroUsize::new(value).map(Self)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.get() as *mut c_void
    }

    pub fn as_usize(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_not_a_handle() {
        assert_eq!(NativeHandle::from_raw(std::ptr::null_mut()), None);
        assert_eq!(NativeHandle::from_usize(0), None);
    }

    #[test]
    fn keeps_the_raw_value() {
        // Act
        let handle = NativeHandle::from_usize(0x1234).unwrap();

        // Assert
        assert_eq!(handle.as_usize(), 0x1234);
        assert_eq!(handle.as_ptr() as usize, 0x1234);
        assert_eq!(handle.to_string(), "0x1234");
    }
}
