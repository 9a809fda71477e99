//! Tabular (civil) Islamic calendar conversion.
//!
//! The festival window defaults to 1 Shawwal, resolved arithmetically rather
//! than through hardcoded Gregorian offsets. The tabular calendar can drift a
//! day from moon-sighting announcements, which is why the engine configuration
//! accepts an explicit festival date override.

use chrono::{Datelike, NaiveDate};

/// Julian day number of 1 Muharram 1 AH (19 July 622 CE, proleptic Gregorian).
const HIJRI_EPOCH_JDN: i64 = 1948440;

const SHAWWAL: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HijriDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

fn julian_day_number(date: NaiveDate) -> i64 {
    let a = i64::from(14 - date.month()) / 12;
    let y = i64::from(date.year()) + 4800 - a;
    let m = i64::from(date.month()) + 12 * a - 3;
    i64::from(date.day()) + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

/// Convert a Gregorian date to the tabular civil Hijri calendar.
pub fn to_hijri(date: NaiveDate) -> HijriDate {
    let jdn = julian_day_number(date);
    let mut l = jdn - HIJRI_EPOCH_JDN + 10632;
    let n = (l - 1) / 10631;
    l = l - 10631 * n + 354;
    let j = ((10985 - l) / 5316) * ((50 * l) / 17719) + (l / 5670) * ((43 * l) / 15238);
    l = l - ((30 - j) / 15) * ((17719 * j) / 50) - (j / 16) * ((15238 * j) / 43) + 29;
    let month = (24 * l) / 709;
    let day = l - (709 * month) / 24;
    let year = 30 * n + j - 30;
    HijriDate {
        year,
        month: month as u32,
        day: day as u32,
    }
}

/// True when `date` is 1 Shawwal (Eid al-Fitr) in the tabular calendar.
pub fn is_festival_day(date: NaiveDate) -> bool {
    let hijri = to_hijri(date);
    hijri.month == SHAWWAL && hijri.day == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn epoch_maps_to_first_of_muharram() {
        let hijri = to_hijri(date(622, 7, 19));
        assert_eq!((hijri.year, hijri.month, hijri.day), (1, 1, 1));
    }

    #[test]
    fn known_new_year_1421() {
        // 6 April 2000 is a widely published 1 Muharram 1421 anchor.
        let hijri = to_hijri(date(2000, 4, 6));
        assert_eq!((hijri.year, hijri.month, hijri.day), (1421, 1, 1));
    }

    #[test]
    fn start_of_ramadan_1446() {
        let hijri = to_hijri(date(2025, 3, 1));
        assert_eq!((hijri.year, hijri.month, hijri.day), (1446, 9, 1));
    }

    #[test]
    fn festival_days_in_recent_years() {
        assert!(is_festival_day(date(2024, 4, 10)));
        assert!(is_festival_day(date(2025, 3, 31)));
        assert!(is_festival_day(date(2026, 3, 20)));
    }

    #[test]
    fn ordinary_days_are_not_festival() {
        assert!(!is_festival_day(date(2025, 3, 30)));
        assert!(!is_festival_day(date(2025, 4, 1)));
        assert!(!is_festival_day(date(2026, 8, 25)));
    }
}
