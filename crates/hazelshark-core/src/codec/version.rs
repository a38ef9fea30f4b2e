use std::fmt;

const YEAR_WEIGHT: i32 = 25_000;
const MONTH_WEIGHT: i32 = 1_800;
const DAY_WEIGHT: i32 = 50;

/// Client build version as carried in the Hello packet.
///
/// # Examples
/// ```
/// use hazelshark_core::codec::ClientVersion;
///
/// let version = ClientVersion::decode(50_516_550);
/// assert_eq!(version, ClientVersion { year: 2020, month: 9, day: 7, build: 0 });
/// assert_eq!(version.to_string(), "2020.9.7.0");
/// assert_eq!(version.encode(), 50_516_550);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientVersion {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub build: i32,
}

impl ClientVersion {
    pub fn encode(&self) -> i32 {
        self.year * YEAR_WEIGHT + self.month * MONTH_WEIGHT + self.day * DAY_WEIGHT + self.build
    }

    pub fn decode(value: i32) -> Self {
        let year = value.div_euclid(YEAR_WEIGHT);
        let rest = value.rem_euclid(YEAR_WEIGHT);
        Self {
            year,
            month: rest / MONTH_WEIGHT,
            day: (rest % MONTH_WEIGHT) / DAY_WEIGHT,
            build: rest % DAY_WEIGHT,
        }
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.year, self.month, self.day, self.build)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientVersion;

    #[test]
    fn decode_splits_components() {
        let version = ClientVersion::decode(2019 * 25_000 + 4 * 1_800 + 25 * 50 + 3);
        assert_eq!(version.year, 2019);
        assert_eq!(version.month, 4);
        assert_eq!(version.day, 25);
        assert_eq!(version.build, 3);
    }

    #[test]
    fn zero_is_year_zero() {
        assert_eq!(ClientVersion::decode(0).to_string(), "0.0.0.0");
    }
}
