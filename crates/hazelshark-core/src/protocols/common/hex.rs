use super::error::DecodeError;

/// Parse hex text such as `"08 00 01"` or `"080001"` into bytes.
///
/// Whitespace, commas and an optional `0x` prefix per token are ignored.
///
/// # Examples
/// ```
/// use hazelshark_core::parse_hex;
///
/// assert_eq!(parse_hex("08 00 01")?, vec![0x08, 0x00, 0x01]);
/// assert_eq!(parse_hex("0x0a,0x0D")?, vec![0x0a, 0x0d]);
/// assert!(parse_hex("abc").is_err());
/// # Ok::<(), hazelshark_core::DecodeError>(())
/// ```
pub fn parse_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    let mut digits = Vec::with_capacity(text.len());
    for (position, token) in split_tokens(text) {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        for (index, character) in token.char_indices() {
            let digit = character.to_digit(16).ok_or(DecodeError::InvalidHex {
                position: position + index,
                reason: "not a hex digit",
            })?;
            digits.push((position + index, digit as u8));
        }
    }
    if digits.len() % 2 != 0 {
        return Err(DecodeError::InvalidHex {
            position: text.len(),
            reason: "odd number of hex digits",
        });
    }
    Ok(digits
        .chunks(2)
        .map(|pair| (pair[0].1 << 4) | pair[1].1)
        .collect())
}

fn split_tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (index, character) in text.char_indices() {
        let separator = character.is_whitespace() || character == ',';
        match (separator, start) {
            (true, Some(begin)) => {
                tokens.push((begin, &text[begin..index]));
                start = None;
            }
            (false, None) => start = Some(index),
            _ => {}
        }
    }
    if let Some(begin) = start {
        tokens.push((begin, &text[begin..]));
    }
    tokens.into_iter()
}

/// Format bytes as lowercase space-separated hex pairs.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{format_hex, parse_hex};
    use crate::protocols::common::error::DecodeError;

    #[test]
    fn parse_accepts_mixed_separators() {
        assert_eq!(parse_hex("  01 02\n0304 ").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn parse_empty_is_empty() {
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn parse_reports_bad_character_position() {
        let err = parse_hex("01 0g").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidHex {
                position: 4,
                reason: "not a hex digit"
            }
        );
    }

    #[test]
    fn format_round_trips() {
        let bytes = [0x00, 0x7f, 0xff];
        assert_eq!(format_hex(&bytes), "00 7f ff");
        assert_eq!(parse_hex(&format_hex(&bytes)).unwrap(), bytes.to_vec());
    }
}
