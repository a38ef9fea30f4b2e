/// Payload tag of an announcement packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementTag {
    Cache,
    Data,
    FreeWeekend,
    Unknown(u8),
}

impl AnnouncementTag {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => AnnouncementTag::Cache,
            0x01 => AnnouncementTag::Data,
            0x02 => AnnouncementTag::FreeWeekend,
            other => AnnouncementTag::Unknown(other),
        }
    }
}

/// Hello send option; the client always writes zero.
pub const HELLO_SEND_OPTION: u64 = 0x00;
