//! Upload decoding
//!
//! Uploads arrive as byte streams. They are read completely, a leading UTF-8
//! byte-order mark is removed, and the rest must be valid UTF-8.

use std::io::Read;

use crate::constants::UTF8_BOM;
use crate::{IngestError, Result};

/// Read an upload into a string, tolerating a leading BOM
pub fn decode_upload<R: Read>(mut reader: R) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| IngestError::parse_failure(format!("Failed to read upload: {}", e)))?;

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    std::str::from_utf8(body)
        .map(str::to_string)
        .map_err(|e| {
            IngestError::parse_failure(format!(
                "Upload is not valid UTF-8 (invalid byte at offset {})",
                e.valid_up_to()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::io;

    #[test]
    fn test_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"date;time\n");
        assert_eq!(decode_upload(bytes.as_slice()).unwrap(), "date;time\n");
    }

    #[test]
    fn test_plain_utf8_untouched() {
        let text = "date;time;parcel_location\n2023-05-01;12:00:00;Évora\n";
        assert_eq!(decode_upload(text.as_bytes()).unwrap(), text);
    }

    #[test]
    fn test_invalid_utf8_is_parse_failure() {
        let bytes: &[u8] = &[b'd', b'a', 0xFF, 0xFE];
        let error = decode_upload(bytes).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ParseFailure);
        assert!(error.to_string().contains("offset 2"));
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("connection reset"))
        }
    }

    #[test]
    fn test_read_error_is_parse_failure() {
        let error = decode_upload(BrokenReader).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ParseFailure);
        assert!(error.to_string().contains("connection reset"));
    }
}
