use std::iter;

/// Encodes `s` as a NUL-terminated UTF-16 buffer for `*W` Win32 calls.
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(iter::once(0)).collect()
}

/// Decodes a UTF-16 buffer, stopping at the first NUL if there is one.
///
/// Invalid surrogates are replaced rather than rejected.
pub fn from_wide(buffer: &[u16]) -> String {
    let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wide_appends_terminator() {
        // Act
        let wide = to_wide("Crux");

        // Assert
        assert_eq!(wide, vec![b'C' as u16, b'r' as u16, b'u' as u16, b'x' as u16, 0]);
    }

    #[test]
    fn from_wide_stops_at_terminator() {
        // Arrange
        let mut buffer = to_wide("user32.dll");
        buffer.extend_from_slice(&[b'?' as u16; 4]);

        // Act
        let s = from_wide(&buffer);

        // Assert
        assert_eq!(s, "user32.dll");
    }

    #[test]
    fn non_ascii_survives_the_trip() {
        assert_eq!(from_wide(&to_wide("Fenêtre ✓")), "Fenêtre ✓");
    }
}
