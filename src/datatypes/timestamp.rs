// ABOUTME: Service centre time stamp (SCTS): seven swapped-BCD octets with a quarter-hour UTC offset
// ABOUTME: The two-digit year is anchored to a configured century so decoding never depends on the clock

use crate::codec::PduFormatError;
use crate::encoding::decode_semi_octets;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;

/// Sign bit of the time zone octet; set means west of UTC.
const TZ_NEGATIVE: u8 = 0x08;

/// A decoded service centre time stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Local time at the service centre
    pub instant: NaiveDateTime,
    /// Offset of `instant` from UTC, always a multiple of 15
    pub utc_offset_minutes: i32,
}

impl Timestamp {
    pub const SIZE: usize = 7;

    /// Decode the seven SCTS octets. `century` is added to the two-digit year.
    pub fn decode(octets: &[u8; Self::SIZE], century: i32) -> Result<Self, PduFormatError> {
        let year = semi_octet_value(octets[0], "year")?;
        let month = semi_octet_value(octets[1], "month")?;
        let day = semi_octet_value(octets[2], "day")?;
        let hour = semi_octet_value(octets[3], "hour")?;
        let minute = semi_octet_value(octets[4], "minute")?;
        let second = semi_octet_value(octets[5], "second")?;

        let quarters = semi_octet_value(octets[6] & !TZ_NEGATIVE, "time zone")? as i32;
        let sign = if octets[6] & TZ_NEGATIVE != 0 { -1 } else { 1 };

        let instant = NaiveDate::from_ymd_opt(century + year as i32, month, day)
            .ok_or(PduFormatError::InvalidTimestamp { field: "date" })?
            .and_hms_opt(hour, minute, second)
            .ok_or(PduFormatError::InvalidTimestamp { field: "time" })?;

        Ok(Self {
            instant,
            utc_offset_minutes: quarters * 15 * sign,
        })
    }

    /// The time stamp as an offset-aware date and time
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)?
            .from_local_datetime(&self.instant)
            .single()
    }
}

/// Decode one octet of swapped digits into its two-digit value.
fn semi_octet_value(octet: u8, field: &'static str) -> Result<u32, PduFormatError> {
    decode_semi_octets(&[octet])
        .parse()
        .map_err(|_| PduFormatError::InvalidTimestamp { field })
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S %z")),
            None => write!(f, "{} ({:+} min)", self.instant, self.utc_offset_minutes),
        }
    }
}
