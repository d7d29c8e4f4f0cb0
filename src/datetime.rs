//! Conversion between the image's time and date registers and chrono's
//! `NaiveDateTime`.
//!
//! Writes always use 24-hour encoding. Reads honour the 12/24-hour bit, so a
//! chip left in 12-hour mode by other firmware still decodes correctly. The
//! day-of-week register is written as Monday = 1 through Sunday = 7.
//!
//! Conversion errors are reported via [`DateTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::image::RegisterImage;
use crate::registers::{Date, Day, Hours, Minutes, Month, Seconds, TimeRepresentation, Year};

/// Errors that can occur during date/time conversion or validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The provided or decoded date/time is invalid (e.g., out of range, not representable)
    InvalidDateTime,
    /// The year is not before 2200
    YearNotBefore2200,
    /// The year is not after 1999
    YearNotAfter1999,
}

/// Splits `value` into (ones, tens), rejecting anything above `max_value`.
fn make_bcd(value: u32, max_value: u32) -> Result<(u8, u8), DateTimeError> {
    if value > max_value {
        return Err(DateTimeError::InvalidDateTime);
    }
    let ones = u8::try_from(value % 10).map_err(|_| DateTimeError::InvalidDateTime)?;
    let tens = u8::try_from(value / 10).map_err(|_| DateTimeError::InvalidDateTime)?;
    Ok((ones, tens))
}

fn convert_seconds(seconds: u32) -> Result<Seconds, DateTimeError> {
    let (ones, tens) = make_bcd(seconds, 59)?;
    let mut value = Seconds::default();
    value.set_seconds(ones);
    value.set_ten_seconds(tens);
    Ok(value)
}

fn convert_minutes(minutes: u32) -> Result<Minutes, DateTimeError> {
    let (ones, tens) = make_bcd(minutes, 59)?;
    let mut value = Minutes::default();
    value.set_minutes(ones);
    value.set_ten_minutes(tens);
    Ok(value)
}

fn convert_hours(hour: u32) -> Result<Hours, DateTimeError> {
    let (ones, tens) = make_bcd(hour, 23)?;
    let mut value = Hours::default();
    value.set_time_representation(TimeRepresentation::TwentyFourHour);
    value.set_hours(ones);
    value.set_ten_hours_24(tens);
    Ok(value)
}

fn convert_day(weekday: u32) -> Result<Day, DateTimeError> {
    if !(1..=7).contains(&weekday) {
        return Err(DateTimeError::InvalidDateTime);
    }
    let mut value = Day::default();
    value.set_day(u8::try_from(weekday).map_err(|_| DateTimeError::InvalidDateTime)?);
    Ok(value)
}

fn convert_date(date: u32) -> Result<Date, DateTimeError> {
    let (ones, tens) = make_bcd(date, 31)?;
    let mut value = Date::default();
    value.set_date(ones);
    value.set_ten_date(tens);
    Ok(value)
}

fn convert_month(month: u32) -> Result<Month, DateTimeError> {
    let (ones, tens) = make_bcd(month, 12)?;
    let mut value = Month::default();
    value.set_month(ones);
    value.set_ten_month(tens);
    Ok(value)
}

fn convert_year(year: i32) -> Result<(Year, bool), DateTimeError> {
    if year > 2199 {
        error!("year {} is too late, must be before 2200", year);
        return Err(DateTimeError::YearNotBefore2200);
    }
    if year < 2000 {
        error!("year {} is too early, must be after 1999", year);
        return Err(DateTimeError::YearNotAfter1999);
    }

    let offset = u32::try_from(year - 2000).map_err(|_| DateTimeError::InvalidDateTime)?;
    let century = offset > 99;
    let (ones, tens) = make_bcd(offset % 100, 99)?;

    let mut value = Year::default();
    value.set_year(ones);
    value.set_ten_year(tens);
    Ok((value, century))
}

fn decode_hours(hours: Hours) -> u32 {
    match hours.time_representation() {
        TimeRepresentation::TwentyFourHour => {
            10 * u32::from(hours.ten_hours_24()) + u32::from(hours.hours())
        }
        TimeRepresentation::TwelveHour => {
            let hour12 = 10 * u32::from(hours.ten_hours()) + u32::from(hours.hours());
            let is_pm = hours.pm_or_twenty_hours() != 0;
            match (hour12, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            }
        }
    }
}

impl RegisterImage {
    /// Decodes the time and date registers.
    ///
    /// Only meaningful after [`RegisterRange::TIME_AND_DATE`] has been
    /// refreshed.
    ///
    /// [`RegisterRange::TIME_AND_DATE`]: crate::image::RegisterRange::TIME_AND_DATE
    pub fn datetime(&self) -> Result<NaiveDateTime, DateTimeError> {
        let seconds = self.seconds();
        let minutes = self.minutes();
        let date = self.date();
        let month = self.month();
        let year = self.year();

        let seconds = 10 * u32::from(seconds.ten_seconds()) + u32::from(seconds.seconds());
        let minutes = 10 * u32::from(minutes.ten_minutes()) + u32::from(minutes.minutes());
        let hours = decode_hours(self.hours());
        debug!("decoded time h={} m={} s={}", hours, minutes, seconds);

        let year_offset = 10 * u32::from(year.ten_year()) + u32::from(year.year());
        let century_offset = if month.century() { 100 } else { 0 };
        let year = 2000_i32
            + i32::try_from(year_offset + century_offset)
                .map_err(|_| DateTimeError::InvalidDateTime)?;
        let month = 10 * u32::from(month.ten_month()) + u32::from(month.month());
        let date = 10 * u32::from(date.ten_date()) + u32::from(date.date());

        NaiveDate::from_ymd_opt(year, month, date)
            .and_then(|d| d.and_hms_opt(hours, minutes, seconds))
            .ok_or(DateTimeError::InvalidDateTime)
    }

    /// Encodes `datetime` into the time and date registers of the image.
    ///
    /// The image is left untouched on error. Commit
    /// [`RegisterRange::TIME_AND_DATE`] afterwards to reach the chip.
    ///
    /// [`RegisterRange::TIME_AND_DATE`]: crate::image::RegisterRange::TIME_AND_DATE
    pub fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), DateTimeError> {
        let seconds = convert_seconds(datetime.second())?;
        let minutes = convert_minutes(datetime.minute())?;
        let hours = convert_hours(datetime.hour())?;
        let day = convert_day(datetime.weekday().number_from_monday())?;
        let date = convert_date(datetime.day())?;
        let mut month = convert_month(datetime.month())?;
        let (year, century) = convert_year(datetime.year())?;
        month.set_century(century);

        self.set_seconds(seconds);
        self.set_minutes(minutes);
        self.set_hours(hours);
        self.set_day(day);
        self.set_date(date);
        self.set_month(month);
        self.set_year(year);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RegisterRange;

    fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_make_bcd_valid() {
        assert_eq!(make_bcd(0, 59).unwrap(), (0, 0));
        assert_eq!(make_bcd(9, 59).unwrap(), (9, 0));
        assert_eq!(make_bcd(10, 59).unwrap(), (0, 1));
        assert_eq!(make_bcd(45, 59).unwrap(), (5, 4));
        assert_eq!(make_bcd(59, 59).unwrap(), (9, 5));
    }

    #[test]
    fn test_make_bcd_invalid() {
        assert_eq!(make_bcd(60, 59), Err(DateTimeError::InvalidDateTime));
        assert_eq!(make_bcd(32, 31), Err(DateTimeError::InvalidDateTime));
        assert_eq!(make_bcd(13, 12), Err(DateTimeError::InvalidDateTime));
    }

    #[test]
    fn test_set_datetime_register_bytes() {
        let mut image = RegisterImage::new();
        // Thursday
        image
            .set_datetime(&datetime(2024, 3, 14, 15, 30, 7))
            .unwrap();
        let bytes = image.range(RegisterRange::TIME_AND_DATE).unwrap();
        assert_eq!(bytes, [0x07, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24]);
    }

    #[test]
    fn test_datetime_roundtrip_through_image() {
        let dt = datetime(2024, 3, 14, 23, 59, 58);
        let mut image = RegisterImage::new();
        image.set_datetime(&dt).unwrap();
        assert_eq!(image.datetime().unwrap(), dt);
    }

    #[test]
    fn test_century_flag() {
        let mut image = RegisterImage::new();
        image
            .set_datetime(&datetime(2099, 12, 31, 23, 59, 59))
            .unwrap();
        assert!(!image.month().century());

        image.set_datetime(&datetime(2100, 1, 1, 0, 0, 0)).unwrap();
        assert!(image.month().century());
        assert_eq!(image.year().ten_year(), 0);
        assert_eq!(image.datetime().unwrap(), datetime(2100, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_year_limits() {
        let mut image = RegisterImage::new();
        assert_eq!(
            image.set_datetime(&datetime(1999, 12, 31, 23, 59, 59)),
            Err(DateTimeError::YearNotAfter1999)
        );
        assert_eq!(
            image.set_datetime(&datetime(2200, 1, 1, 0, 0, 0)),
            Err(DateTimeError::YearNotBefore2200)
        );
        assert_eq!(image, RegisterImage::new());
    }

    #[test]
    fn test_decode_twelve_hour_mode() {
        let mut image = RegisterImage::from_bytes([0; 19]);
        image.set_raw(crate::registers::RegAddr::Date, 0x01);
        image.set_raw(crate::registers::RegAddr::Month, 0x01);
        // 12 AM
        image.set_raw(crate::registers::RegAddr::Hours, 0x52);
        assert_eq!(image.datetime().unwrap(), datetime(2000, 1, 1, 0, 0, 0));
        // 11 PM
        image.set_raw(crate::registers::RegAddr::Hours, 0x71);
        assert_eq!(image.datetime().unwrap(), datetime(2000, 1, 1, 23, 0, 0));
    }

    #[test]
    fn test_invalid_bcd_to_datetime() {
        // Month 0x13 does not exist
        let mut bytes = [0u8; 19];
        bytes[..7].copy_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x01, 0x13, 0x24]);
        let image = RegisterImage::from_bytes(bytes);
        assert_eq!(image.datetime(), Err(DateTimeError::InvalidDateTime));
    }
}
