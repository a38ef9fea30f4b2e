/// Range of the compressed world coordinates.
pub const COORDINATE_MIN: f32 = -40.0;
pub const COORDINATE_MAX: f32 = 40.0;

/// Interpolate `t` into `[min, max]`; `t` is clamped to `[0, 1]` first.
pub fn lerp(t: f32, min: f32, max: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    min + (max - min) * t
}

/// Inverse of [`lerp`], clamped to `[0, 1]`.
pub fn unlerp(value: f32, min: f32, max: f32) -> f32 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Expand a raw 16-bit coordinate into world units.
///
/// # Examples
/// ```
/// use hazelshark_core::codec::decode_coordinate;
///
/// assert_eq!(decode_coordinate(0), -40.0);
/// assert_eq!(decode_coordinate(u16::MAX), 40.0);
/// assert!(decode_coordinate(32_768).abs() < 0.01);
/// ```
pub fn decode_coordinate(raw: u16) -> f32 {
    lerp(f32::from(raw) / f32::from(u16::MAX), COORDINATE_MIN, COORDINATE_MAX)
}

/// Compress a world coordinate into 16 bits.
pub fn encode_coordinate(value: f32) -> u16 {
    let t = unlerp(value, COORDINATE_MIN, COORDINATE_MAX);
    (t * f32::from(u16::MAX)).round() as u16
}
