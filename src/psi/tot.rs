//! Decoding of the DVB _Time Offset Table_, which distributes broadcast wall-clock time in-band.
//!
//! The table carries a _UTC_time_ field as a 16-bit _Modified Julian Date_ day count followed by
//! three binary-coded-decimal bytes of hour, minute and second (_ETSI EN 300 468_).  Despite the
//! field's name, Japanese broadcasts place local time here; this module does not apply any
//! timezone conversion and simply reports what the table says.

use crate::packet::Pid;
use chrono::{NaiveDate, NaiveDateTime};

/// The fixed PID on which Time Offset Table sections are carried.
pub const TOT_PID: Pid = Pid::new(0x14);

/// The table id identifying a TOT section.
pub const TOT_TABLE_ID: u8 = 0x73;

// table_id (1) + section_length (2) + MJD (2) + BCD h/m/s (3)
const MIN_SECTION_LEN: usize = 8;
const MJD_OFFSET: usize = 3;

/// Decodes the wall-clock time carried by a reassembled TOT section.
///
/// `None` is returned when the table id does not match, the section is truncated, or the decoded
/// fields do not form a possible calendar date-time (a BCD hour of `0x99`, a day of 32, and so
/// on); callers treat all of these identically to the table not having been seen yet.
pub fn decode(section: &[u8]) -> Option<NaiveDateTime> {
    if section.len() < MIN_SECTION_LEN || section[0] != TOT_TABLE_ID {
        return None;
    }
    let mjd = u32::from(section[MJD_OFFSET]) << 8 | u32::from(section[MJD_OFFSET + 1]);
    let hour = bcd(section[MJD_OFFSET + 2]);
    let minute = bcd(section[MJD_OFFSET + 3]);
    let second = bcd(section[MJD_OFFSET + 4]);
    let (year, month, day) = mjd_to_gregorian(mjd)?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(
        u32::from(hour),
        u32::from(minute),
        u32::from(second),
    )
}

/// Each nibble carries one decimal digit; out-of-range nibbles are tolerated here and rejected by
/// the calendar construction downstream.
fn bcd(b: u8) -> u8 {
    (b >> 4) * 10 + (b & 0x0f)
}

/// Standard almanac conversion of a Modified Julian Date day number into a Gregorian calendar
/// date, per _ETSI EN 300 468, Annex C_.
fn mjd_to_gregorian(mjd: u32) -> Option<(i32, u32, u32)> {
    let mjd = i64::from(mjd);
    let y = ((mjd as f64 - 15_078.2) / 365.25) as i64;
    let m = ((mjd as f64 - 14_956.1 - (y as f64 * 365.25).trunc()) / 30.6001) as i64;
    let day = mjd - 14_956 - (y as f64 * 365.25).trunc() as i64 - (m as f64 * 30.6001).trunc() as i64;
    let k = if m == 14 || m == 15 { 1 } else { 0 };
    let year = i32::try_from(y + k + 1900).ok()?;
    let month = u32::try_from(m - 1 - k * 12).ok()?;
    let day = u32::try_from(day).ok()?;
    Some((year, month, day))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use hex_literal::hex;

    fn datetime(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn unix_epoch() {
        // MJD 40587 is 1970-01-01
        let section = hex!("73 70 0b 9e8b 000000 0000 00000000");
        assert_eq!(decode(&section[..]), Some(datetime(1970, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn mjd_58849() {
        // MJD 58849 is 2020-01-01; BCD 09:30:15
        let section = hex!("73 70 0b e5e1 093015 0000 00000000");
        assert_eq!(decode(&section[..]), Some(datetime(2020, 1, 1, 9, 30, 15)));
    }

    #[test]
    fn leap_day() {
        // MJD 58908 is 2020-02-29
        let section = hex!("73 70 0b e61c 235959 0000 00000000");
        assert_eq!(
            decode(&section[..]),
            Some(datetime(2020, 2, 29, 23, 59, 59))
        );
    }

    #[test]
    fn implausible_bcd_rejected() {
        // hour nibbles decode to 99
        let section = hex!("73 70 0b e5e1 990000 0000 00000000");
        assert_eq!(decode(&section[..]), None);
    }

    #[test]
    fn wrong_table_id() {
        let section = hex!("70 70 0b e5e1 090000 0000 00000000");
        assert_eq!(decode(&section[..]), None);
    }

    #[test]
    fn truncated_section() {
        let section = hex!("73 70 0b e5e1 09");
        assert_eq!(decode(&section[..]), None);
    }
}
