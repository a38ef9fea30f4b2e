use hazelshark_core::codec::game_code::{
    V2_ALPHABET, v1_code_to_int, v1_int_to_code, v2_code_to_int, v2_int_to_code,
};
use hazelshark_core::codec::{
    ClientVersion, MAX_PACKED_GROUPS, decode_packed, encode_packed, lerp, unlerp,
};
use hazelshark_core::{Direction, decode, decode_announcement, decode_region_info};
use proptest::prelude::*;

fn v2_code() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(V2_ALPHABET.to_vec()), 6)
        .prop_map(|letters| letters.into_iter().map(char::from).collect())
}

proptest! {
    #[test]
    fn prop_packed_roundtrip(value in any::<u32>()) {
        let bytes = encode_packed(value);
        prop_assert!(bytes.len() <= MAX_PACKED_GROUPS);
        let packed = decode_packed(&bytes).unwrap();
        prop_assert_eq!(packed.value, value);
        prop_assert_eq!(packed.len, bytes.len());
        prop_assert!(!packed.truncated);
    }

    #[test]
    fn prop_v1_code_roundtrip(code in "[A-Z]{4}") {
        let value = v1_code_to_int(&code).unwrap();
        prop_assert_eq!(v1_int_to_code(value), code);
    }

    #[test]
    fn prop_v2_code_roundtrip(code in v2_code()) {
        let value = v2_code_to_int(&code).unwrap();
        prop_assert!(value < 0);
        prop_assert_eq!(v2_int_to_code(value), code);
    }

    #[test]
    fn prop_version_roundtrip(
        year in 2018i32..2030,
        month in 0i32..12,
        day in 0i32..36,
        build in 0i32..50,
    ) {
        let version = ClientVersion { year, month, day, build };
        prop_assert_eq!(ClientVersion::decode(version.encode()), version);
    }

    #[test]
    fn prop_lerp_inverts_unlerp(value in -40.0f32..=40.0) {
        let back = lerp(unlerp(value, -40.0, 40.0), -40.0, 40.0);
        prop_assert!((back - value).abs() < 1e-3);
    }

    #[test]
    fn prop_lerp_clamps_outside_range(t in prop_oneof![-10.0f32..0.0, 1.0f32..10.0]) {
        let value = lerp(t, -40.0, 40.0);
        prop_assert!((-40.0..=40.0).contains(&value));
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        for direction in [Direction::Serverbound, Direction::Clientbound] {
            if let Ok(packet) = decode(&bytes, direction) {
                for field in &packet.fields {
                    prop_assert!(field.range.end() <= bytes.len());
                }
            }
        }
        let _ = decode_announcement(&bytes);
        let _ = decode_region_info(&bytes);
    }
}
