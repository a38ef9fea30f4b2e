/// Upper bound on 7-bit groups read for one packed integer.
///
/// Five groups cover every `u32`; anything longer is malformed input.
pub const MAX_PACKED_GROUPS: usize = 5;

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u8 = 0x7f;

/// A packed integer decoded from the front of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedInt {
    pub value: u32,
    /// Number of bytes consumed.
    pub len: usize,
    /// Set when the group cap was hit while the continuation bit was still set,
    /// or when the groups carry bits above 32 that `value` cannot hold.
    pub truncated: bool,
}

/// Encode `value` as little-endian 7-bit groups with continuation bits.
///
/// # Examples
/// ```
/// use hazelshark_core::codec::encode_packed;
///
/// assert_eq!(encode_packed(0), vec![0x00]);
/// assert_eq!(encode_packed(300), vec![0xac, 0x02]);
/// ```
pub fn encode_packed(value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_PACKED_GROUPS);
    let mut rest = value;
    loop {
        let group = (rest & u32::from(GROUP_MASK)) as u8;
        rest >>= 7;
        if rest == 0 {
            out.push(group);
            return out;
        }
        out.push(group | CONTINUATION);
    }
}

/// Decode a packed integer from the start of `bytes`.
///
/// Returns `None` when the bytes end before a terminating group. At most
/// [`MAX_PACKED_GROUPS`] bytes are consumed.
///
/// # Examples
/// ```
/// use hazelshark_core::codec::decode_packed;
///
/// let packed = decode_packed(&[0xe9, 0x31, 0xff]).unwrap();
/// assert_eq!(packed.value, 6377);
/// assert_eq!(packed.len, 2);
/// assert!(decode_packed(&[0x80]).is_none());
/// ```
pub fn decode_packed(bytes: &[u8]) -> Option<PackedInt> {
    let mut value = 0u64;
    for (index, byte) in bytes.iter().copied().take(MAX_PACKED_GROUPS).enumerate() {
        value |= u64::from(byte & GROUP_MASK) << (7 * index);
        let len = index + 1;
        if byte & CONTINUATION == 0 {
            return Some(PackedInt {
                value: value as u32,
                len,
                truncated: value > u64::from(u32::MAX),
            });
        }
        if len == MAX_PACKED_GROUPS {
            return Some(PackedInt {
                value: value as u32,
                len,
                truncated: true,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_values() {
        for value in [0u32, 1, 0x7f] {
            let bytes = encode_packed(value);
            assert_eq!(bytes.len(), 1);
            assert_eq!(decode_packed(&bytes).unwrap().value, value);
        }
    }

    #[test]
    fn max_value_uses_five_groups() {
        let bytes = encode_packed(u32::MAX);
        assert_eq!(bytes, vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
        let packed = decode_packed(&bytes).unwrap();
        assert_eq!(packed.value, u32::MAX);
        assert!(!packed.truncated);
    }

    #[test]
    fn group_cap_stops_runaway_continuation() {
        let bytes = [0xff; 9];
        let packed = decode_packed(&bytes).unwrap();
        assert_eq!(packed.len, MAX_PACKED_GROUPS);
        assert!(packed.truncated);
    }

    #[test]
    fn overflowing_fifth_group_is_truncated() {
        let packed = decode_packed(&[0xff, 0xff, 0xff, 0xff, 0x7f]).unwrap();
        assert_eq!(packed.len, MAX_PACKED_GROUPS);
        assert_eq!(packed.value, u32::MAX);
        assert!(packed.truncated);
    }

    #[test]
    fn empty_input_is_incomplete() {
        assert!(decode_packed(&[]).is_none());
    }
}
