//! Real-time-clock value and its two-word wire format.
//!
//! The host exchanges time as two 32-bit words:
//! word 0 = `hour<<16 | minute<<8 | second`,
//! word 1 = `weekday<<24 | year<<16 | month<<8 | day`.
//! No calendar validation happens here; out-of-range fields travel through
//! unchanged and the RTC driver decides what to do with them.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcTime {
    pub second: u8,
    pub minute: u8,
    pub hour: u8,
    pub weekday: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

impl RtcTime {
    pub fn encode(&self) -> [u32; 2] {
        [
            ((self.hour as u32) << 16) | ((self.minute as u32) << 8) | (self.second as u32),
            ((self.weekday as u32) << 24)
                | ((self.year as u32) << 16)
                | ((self.month as u32) << 8)
                | (self.day as u32),
        ]
    }

    pub fn decode(words: [u32; 2]) -> Self {
        RtcTime {
            second: (words[0] & 0xFF) as u8,
            minute: ((words[0] >> 8) & 0xFF) as u8,
            hour: ((words[0] >> 16) & 0xFF) as u8,
            day: (words[1] & 0xFF) as u8,
            month: ((words[1] >> 8) & 0xFF) as u8,
            year: ((words[1] >> 16) & 0xFF) as u8,
            weekday: ((words[1] >> 24) & 0xFF) as u8,
        }
    }
}
