use thiserror::Error;

/// Letters of the second-generation code alphabet, by value.
pub const V2_ALPHABET: &[u8; 26] = b"QWXRTYLPESDFGHUJKZOCVBINMA";

/// Value of each letter `A..=Z` in [`V2_ALPHABET`].
const V2_VALUES: [u32; 26] = [
    25, 21, 19, 10, 8, 11, 12, 13, 22, 15, 16, 6, 24, 23, 18, 7, 0, 3, 9, 4, 14, 20, 1, 2, 5, 17,
];

const V2_FLAG: u32 = 0x8000_0000;
const V2_LOW_MASK: u32 = 0x3ff;
const V2_HIGH_MASK: u32 = 0x3fff_fc00;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameCodeError {
    #[error("game code must be 4 or 6 letters, got {length}")]
    InvalidLength { length: usize },
    #[error("invalid character {character:?} in game code")]
    InvalidCharacter { character: char },
}

/// Pack a 4-character first-generation code into an integer (big-endian).
///
/// # Examples
/// ```
/// use hazelshark_core::codec::game_code::{v1_code_to_int, v1_int_to_code};
///
/// let value = v1_code_to_int("ABCD")?;
/// assert_eq!(value, 0x4142_4344);
/// assert_eq!(v1_int_to_code(value), "ABCD");
/// # Ok::<(), hazelshark_core::codec::GameCodeError>(())
/// ```
pub fn v1_code_to_int(code: &str) -> Result<i32, GameCodeError> {
    let length = code.chars().count();
    if length != 4 {
        return Err(GameCodeError::InvalidLength { length });
    }
    if let Some(character) = code.chars().find(|c| !c.is_ascii()) {
        return Err(GameCodeError::InvalidCharacter { character });
    }
    let bytes = code.as_bytes();
    Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Unpack a first-generation code from its integer form.
pub fn v1_int_to_code(value: i32) -> String {
    value.to_be_bytes().iter().map(|b| char::from(*b)).collect()
}

/// Encode a 6-letter second-generation code.
///
/// # Examples
/// ```
/// use hazelshark_core::codec::game_code::{v2_code_to_int, v2_int_to_code};
///
/// let value = v2_code_to_int("QWXRTY")?;
/// assert!(value < 0);
/// assert_eq!(v2_int_to_code(value), "QWXRTY");
/// # Ok::<(), hazelshark_core::codec::GameCodeError>(())
/// ```
pub fn v2_code_to_int(code: &str) -> Result<i32, GameCodeError> {
    let length = code.chars().count();
    if length != 6 {
        return Err(GameCodeError::InvalidLength { length });
    }
    let mut values = [0u32; 6];
    for (slot, character) in values.iter_mut().zip(code.chars()) {
        let upper = character.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(GameCodeError::InvalidCharacter { character });
        }
        *slot = V2_VALUES[(upper as u8 - b'A') as usize];
    }
    let [a, b, c, d, e, f] = values;
    let low = (a + 26 * b) & V2_LOW_MASK;
    let high = c + 26 * (d + 26 * (e + 26 * f));
    Ok((low | ((high << 10) & V2_HIGH_MASK) | V2_FLAG) as i32)
}

/// Decode a second-generation code from its integer form.
pub fn v2_int_to_code(value: i32) -> String {
    let bits = value as u32;
    let low = bits & V2_LOW_MASK;
    let high = (bits >> 10) & 0xf_ffff;
    let letter = |index: u32| char::from(V2_ALPHABET[(index % 26) as usize]);
    [
        letter(low),
        letter(low / 26),
        letter(high),
        letter(high / 26),
        letter(high / (26 * 26)),
        letter(high / (26 * 26 * 26)),
    ]
    .into_iter()
    .collect()
}

/// Whether an integer code uses the second-generation encoding.
pub fn is_v2(value: i32) -> bool {
    value < 0
}

/// Render any integer game code, picking the generation by the high bit.
pub fn int_to_code(value: i32) -> String {
    if is_v2(value) {
        v2_int_to_code(value)
    } else {
        v1_int_to_code(value)
    }
}

/// Parse a textual game code, picking the generation by its length.
pub fn code_to_int(code: &str) -> Result<i32, GameCodeError> {
    match code.chars().count() {
        4 => v1_code_to_int(code),
        6 => v2_code_to_int(code),
        length => Err(GameCodeError::InvalidLength { length }),
    }
}
