use crate::config::TextEncoding;
use encoding_rs::{UTF_8, WINDOWS_1252};

/// Decode raw member bytes. Returns `None` when the bytes are not valid in
/// the requested encoding.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8 => {
            let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
            (!had_errors).then(|| text.into_owned())
        }
        // encoding_rs maps the ISO-8859-1 label onto windows-1252, so strict
        // Latin-1 stays a byte-to-codepoint copy.
        TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        TextEncoding::Windows1252 => WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_strips_bom() {
        let bytes = b"\xEF\xBB\xBFTime Stamp,Integrated Load";
        assert_eq!(
            decode(bytes, TextEncoding::Utf8).as_deref(),
            Some("Time Stamp,Integrated Load")
        );
    }

    #[test]
    fn test_invalid_utf8_falls_through() {
        let bytes = b"Name,Caf\xE9";
        assert!(decode(bytes, TextEncoding::Utf8).is_none());
        assert!(decode(b"Name,\xEF\xBB", TextEncoding::Utf8).is_none());
        assert_eq!(decode(bytes, TextEncoding::Latin1).as_deref(), Some("Name,Café"));
    }

    #[test]
    fn test_windows_1252_high_range() {
        assert_eq!(decode(b"\x80", TextEncoding::Windows1252).as_deref(), Some("€"));
        assert_eq!(decode(b"\x80", TextEncoding::Latin1).as_deref(), Some("\u{80}"));
        assert_eq!(
            decode(b"\x93Peak\x94 \x96 Caf\xE9", TextEncoding::Windows1252).as_deref(),
            Some("\u{201C}Peak\u{201D} \u{2013} Café")
        );
    }
}
