/* ───────────────────── Date-serial calculus ─────────────────────────
A point in time is one f64: the integer part counts days, the fraction
is the time of day.
  Serial 1  = 1899-12-31
  Serial 2  = 1900-01-01  (a Monday)
  Serial 61 = 1900-03-01
Starting one day early lets every year use the plain Gregorian leap
rule (1900 is *not* a leap year) while matching the classic 1900 date
system for every date from 1900-03-01 on. Serials <= 0 count backwards
from 1899-12-31.
------------------------------------------------------------------- */

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

const DAYS_IN_MONTH: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_IN_400_YEARS: i64 = 146_097;

/// Calendar range the date functions accept.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

pub const MS_IN_MIN: i64 = 60 * 1000;
pub const MS_IN_HOUR: i64 = 60 * MS_IN_MIN;
pub const MS_IN_DAY: i64 = 24 * MS_IN_HOUR;

/// Calendar fields of a serial's integer part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackedDate {
    pub year: i32,
    /// Zero-based: January is 0.
    pub month: u32,
    /// Day of month, 1-based.
    pub date: u32,
    /// Weekday, 0 = Sunday.
    pub day: u32,
}

/// Clock fields of a serial's fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackedTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

pub fn is_leap_year(yr: i32) -> bool {
    if yr % 4 != 0 {
        return false;
    }
    if yr % 100 != 0 {
        return true;
    }
    yr % 400 == 0
}

pub fn days_in_year(yr: i32) -> i64 {
    if is_leap_year(yr) { 366 } else { 365 }
}

/// `month` is zero-based.
pub fn days_in_month(yr: i32, month: u32) -> i64 {
    if month == 1 && is_leap_year(yr) {
        29
    } else {
        DAYS_IN_MONTH[month as usize % 12]
    }
}

/// Split a serial into calendar fields. Any time-of-day is discarded.
pub fn unpack_date(serial: f64) -> UnpackedDate {
    unpack_days((serial - 1.0).trunc() as i64)
}

/// Serial of a calendar day. `month` is zero-based; months outside
/// `0..12` roll into neighbouring years and `date` may overflow the
/// month, both counting on from the normalised start.
pub fn pack_date(year: i32, month: i32, date: i32) -> f64 {
    let year = year + month.div_euclid(12);
    let month = month.rem_euclid(12) as u32;
    (pack_days(year, month, date as i64) + 1) as f64
}

/// Serial of 0000-01-01.
pub fn min_serial() -> f64 {
    pack_date(MIN_YEAR, 0, 1)
}

/// Serial of 9999-12-31.
pub fn max_serial() -> f64 {
    pack_date(MAX_YEAR, 11, 31)
}

/// [`pack_date`] over unbounded inputs, each truncated to a whole number.
/// `None` when the day lands outside [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn checked_pack_date(year: f64, month: f64, date: f64) -> Option<f64> {
    let month = month.trunc();
    let year = year.trunc() + (month / 12.0).floor();
    if !(f64::from(MIN_YEAR - 1)..=f64::from(MAX_YEAR + 1)).contains(&year) {
        return None;
    }
    let month = month.rem_euclid(12.0) as u32;
    let serial = (pack_days(year as i32, month, 0) + 1) as f64 + date.trunc();
    (min_serial()..=max_serial()).contains(&serial).then_some(serial)
}

/// Split the fractional part of a serial into clock fields.
///
/// Milliseconds are rounded once; every larger unit is truncated.
pub fn unpack_time(serial: f64) -> UnpackedTime {
    let mut frac = serial - serial.trunc();
    if frac < 0.0 {
        frac += 1.0;
    }
    let mut ms = (MS_IN_DAY as f64 * frac).round() as i64;
    let hours = ms / MS_IN_HOUR;
    ms -= hours * MS_IN_HOUR;
    let minutes = ms / MS_IN_MIN;
    ms -= minutes * MS_IN_MIN;
    let seconds = ms / 1000;
    ms -= seconds * 1000;
    UnpackedTime {
        hours: hours as u32,
        minutes: minutes as u32,
        seconds: seconds as u32,
        milliseconds: ms as u32,
    }
}

/// Fraction of a day for a clock time. Inputs are not range checked.
pub fn pack_time(hours: f64, minutes: f64, seconds: f64, ms: f64) -> f64 {
    (hours + minutes / 60.0 + seconds / 3600.0 + ms / 3_600_000.0) / 24.0
}

/// Calendar date-time for a serial, `None` outside chrono's range.
pub fn serial_to_date(serial: f64) -> Option<NaiveDateTime> {
    let d = unpack_date(serial);
    let t = unpack_time(serial);
    let midnight = NaiveDate::from_ymd_opt(d.year, d.month + 1, d.date)?.and_hms_opt(0, 0, 0)?;
    let ms = t.hours as i64 * MS_IN_HOUR
        + t.minutes as i64 * MS_IN_MIN
        + t.seconds as i64 * 1000
        + t.milliseconds as i64;
    midnight.checked_add_signed(TimeDelta::milliseconds(ms))
}

/// Serial for a calendar date-time. Serials up to 1899-12-30 count down
/// from zero with the time of day still counting forward, so a day at or
/// before that date with a time component sits one unit lower.
pub fn date_to_serial(dt: &NaiveDateTime) -> f64 {
    let time = pack_time(
        dt.hour() as f64,
        dt.minute() as f64,
        dt.second() as f64,
        (dt.nanosecond() / 1_000_000) as f64,
    );
    let date = pack_date(dt.year(), dt.month0() as i32, dt.day() as i32);
    if date <= 0.0 && time > 0.0 {
        date - 1.0 + time
    } else {
        date + time
    }
}

// Day numbering here is one lower than the public serial: 1 = 1900-01-01.
fn unpack_days(mut serial: i64) -> UnpackedDate {
    let backwards = serial <= 0;
    let mut year: i32 = 1900;
    let mut day = serial % 7;
    if backwards {
        serial = serial.saturating_neg();
        year -= 1;
        day = (day + 7) % 7;
    }

    // whole 400-year cycles first, then year by year
    let cycles = if backwards {
        serial / DAYS_IN_400_YEARS
    } else {
        (serial - 1).max(0) / DAYS_IN_400_YEARS
    };
    serial -= cycles * DAYS_IN_400_YEARS;
    let years = i32::try_from(cycles * 400).unwrap_or(i32::MAX);
    year = if backwards {
        year.saturating_sub(years)
    } else {
        year.saturating_add(years)
    };

    loop {
        let len = days_in_year(year);
        let spills = if backwards { serial >= len } else { serial > len };
        if !spills {
            break;
        }
        serial -= len;
        year = year.saturating_add(if backwards { -1 } else { 1 });
    }

    let (month, date) = if backwards {
        let mut month = 11;
        let mut len = days_in_month(year, month);
        while serial >= len {
            serial -= len;
            month -= 1;
            len = days_in_month(year, month);
        }
        (month, len - serial)
    } else {
        let mut month = 0;
        while serial > days_in_month(year, month) {
            serial -= days_in_month(year, month);
            month += 1;
        }
        (month, serial)
    };

    UnpackedDate {
        year,
        month,
        date: date as u32,
        day: day as u32,
    }
}

fn pack_days(year: i32, month: u32, date: i64) -> i64 {
    let mut serial = 0;
    if year >= 1900 {
        for y in 1900..year {
            serial += days_in_year(y);
        }
    } else {
        for y in year..=1899 {
            serial -= days_in_year(y);
        }
    }
    for m in 0..month {
        serial += days_in_month(year, m);
    }
    serial + date
}
