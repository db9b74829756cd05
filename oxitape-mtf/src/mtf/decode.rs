//! String and date decoding.
//!
//! Descriptor blocks refer to their strings through tape addresses (a size
//! and an offset from the start of the block). Dates are packed MSB-first
//! into five bytes:
//!
//! ```text
//! byte:  0        1        2        3        4
//!        yyyyyyyy yyyyyymm mmdddddh hhhhmmmm mmssssss
//! ```

use super::layout::TapeAddress;
use encoding_rs::{UTF_16LE, WINDOWS_1252};
use oxitape_core::error::{MtfError, Result};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// String type: the block carries no strings.
pub const STRING_NONE: u8 = 0;
/// String type: single-byte ANSI.
pub const STRING_ANSI: u8 = 1;
/// String type: UTF-16LE.
pub const STRING_UNICODE: u8 = 2;

/// Resolve a string stored after a descriptor block.
///
/// `block` starts at the descriptor. NUL characters, which MTF uses as path
/// separators, become `/`.
pub fn resolve_string(string_type: u8, block: &[u8], address: TapeAddress) -> Result<String> {
    if address.size == 0 {
        return Ok(String::new());
    }

    let start = address.offset as usize;
    let len = address.size as usize;
    let bytes = block
        .get(start..start + len)
        .ok_or_else(|| MtfError::out_of_range(start, len, block.len()))?;

    let decoded = if string_type == STRING_UNICODE {
        UTF_16LE.decode_without_bom_handling(bytes).0
    } else {
        WINDOWS_1252.decode_without_bom_handling(bytes).0
    };

    Ok(decoded.replace('\0', "/"))
}

/// A date and time as packed into descriptor blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MtfDateTime {
    /// Year (14 bits).
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
}

impl MtfDateTime {
    /// Unpack the five on-tape bytes.
    pub fn unpack(b: [u8; 5]) -> Self {
        Self {
            year: ((b[0] as u16) << 6) | ((b[1] as u16) >> 2),
            month: ((b[1] & 0x03) << 2) | (b[2] >> 6),
            day: (b[2] & 0x3E) >> 1,
            hour: ((b[2] & 0x01) << 4) | (b[3] >> 4),
            minute: ((b[3] & 0x0F) << 2) | (b[4] >> 6),
            second: b[4] & 0x3F,
        }
    }

    /// Pack into the five on-tape bytes. Out-of-range fields are truncated to
    /// their bit widths.
    pub fn pack(&self) -> [u8; 5] {
        let year = self.year & 0x3FFF;
        let month = self.month & 0x0F;
        let day = self.day & 0x1F;
        let hour = self.hour & 0x1F;
        let minute = self.minute & 0x3F;
        let second = self.second & 0x3F;

        [
            (year >> 6) as u8,
            (((year & 0x3F) as u8) << 2) | (month >> 2),
            ((month & 0x03) << 6) | (day << 1) | (hour >> 4),
            ((hour & 0x0F) << 4) | (minute >> 2),
            ((minute & 0x03) << 6) | second,
        ]
    }

    /// True when every field is zero, which backup software writes for
    /// dates it did not record.
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    /// Convert to `SystemTime`, interpreting the fields as UTC on the
    /// proleptic Gregorian calendar.
    ///
    /// Returns `None` for unset dates and impossible calendar values. Dates
    /// before the Unix epoch are kept.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let year = self.year as u32;
        let month = self.month as u32;
        let day = self.day as u32;

        if month == 0 || month > 12 {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        if self.hour > 23 || self.minute > 59 || self.second > 59 {
            return None;
        }

        let secs = days_from_civil(year, month, day) * 86400
            + (self.hour as i64) * 3600
            + (self.minute as i64) * 60
            + self.second as i64;

        if secs >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(secs as u64))
        } else {
            UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))
        }
    }
}

/// Days from 1970-01-01 to the given date, negative before it.
fn days_from_civil(year: u32, month: u32, day: u32) -> i64 {
    // Shift the year to start in March so the leap day falls last.
    let y = year as i64 - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let year_of_era = y - era * 400;
    let m = month as i64;
    let day_of_year = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

impl std::fmt::Display for MtfDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
