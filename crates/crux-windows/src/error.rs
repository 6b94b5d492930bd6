use windows::Win32::Foundation::GetLastError;
use windows::Win32::System::Diagnostics::Debug::{
    FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS, FormatMessageW,
};
use windows::core::PWSTR;

use crate::wide::from_wide;

/// Returns the calling thread's last Win32 error as text, or an empty
/// string if no error is set.
///
/// Call it immediately after the failing API; most Win32 calls overwrite
/// the value.
pub fn last_error_string() -> String {
    // SAFETY: GetLastError only reads thread-local state.
    let code = unsafe { GetLastError() };
    if code.0 == 0 {
        return String::new();
    }
    format_error(code.0)
}

/// Formats a Win32 error code with the system message table.
///
/// Falls back to the numeric code if the system has no message for it.
pub fn format_error(code: u32) -> String {
    let mut buffer = [0u16; 512];

    // SAFETY: the buffer pointer and length describe a live, writable
    // array; FORMAT_MESSAGE_IGNORE_INSERTS means no arguments are read.
    let len = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            code,
            0,
            PWSTR(buffer.as_mut_ptr()),
            buffer.len() as u32,
            None,
        )
    };

    if len == 0 {
        return format!("Win32 error {code}");
    }
    from_wide(&buffer[..len as usize]).trim_end().to_string()
}
