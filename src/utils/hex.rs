//! Hex rendering and lenient hex parsing for the analyzer's text boundary.
//!
//! Captured bytes travel to and from the external tool layer as hex strings.
//! Output is uppercase pairs separated by single spaces (`"0A FF 10"`); input
//! tolerates whitespace, a `0x` prefix and an odd digit count.

use crate::error::{constants, AnalyzerError, Result};

/// Render bytes as uppercase, space-separated hex pairs.
///
/// ```rust
/// use packet_lens::utils::hex::format_hex;
/// assert_eq!(format_hex(&[0x0a, 0xff, 0x10]), "0A FF 10");
/// assert_eq!(format_hex(&[]), "");
/// ```
pub fn format_hex(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(data.len() * 3 - 1);
    for (i, chunk) in ::hex::encode_upper(data).as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // encode_upper only emits ASCII digits
        out.push(chunk[0] as char);
        out.push(chunk[1] as char);
    }
    out
}

/// Parse a hex string the way captures are usually pasted.
///
/// Whitespace (spaces, tabs, CR/LF) is ignored anywhere, one leading `0x`
/// or `0X` is dropped, and an odd number of digits is left-padded with `0`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);

    let padded;
    let digits = if digits.len() % 2 != 0 {
        padded = format!("0{digits}");
        padded.as_str()
    } else {
        digits
    };

    ::hex::decode(digits).map_err(|e| {
        AnalyzerError::MalformedHexInput(format!("{}: {e}", constants::ERR_INVALID_HEX_DIGIT))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_parse_tolerates_spacing_and_prefix() {
        assert_eq!(parse_hex("0x0A FF\n10").unwrap(), vec![0x0a, 0xff, 0x10]);
        assert_eq!(parse_hex("0Xab").unwrap(), vec![0xab]);
        assert_eq!(parse_hex("  ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_parse_odd_length_left_pads() {
        assert_eq!(parse_hex("abc").unwrap(), vec![0x0a, 0xbc]);
    }

    #[test]
    fn test_parse_rejects_invalid_digit() {
        let err = parse_hex("zz").unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedHexInput(_)));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_format_then_parse() {
        let data = [0u8, 1, 0x7f, 0x80, 0xff];
        let text = format_hex(&data);
        assert_eq!(text, "00 01 7F 80 FF");
        assert_eq!(parse_hex(&text).unwrap(), data);
    }
}
