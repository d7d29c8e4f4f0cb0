//! Display-mode clock face.
//!
//! ```text
//! line 1: <clock>HH:MM:SS   -TT<degree>
//! line 2: <calendar>DD/MM/2CYY Ddd<bell>
//! ```
//!
//! [`setup`] draws everything. [`update`] runs once per tick, right after the
//! chip's seconds increment, and rewrites only the digits that changed.

use embedded_hal::i2c::I2c;

use crate::clock::Clock;
use crate::error::Error;
use crate::image::{RegisterImage, RegisterRange};
use crate::peripherals::{digit, glyph, CharacterDisplay, LINE_1, LINE_2, LINE_WIDTH};

const DAY_NAMES: [&[u8; 3]; 7] = [b"Mon", b"Tue", b"Wed", b"Thu", b"Fri", b"Sat", b"Sun"];

/// Three letter name for a day-of-week register value (1 = Monday).
pub fn day_name(day: u8) -> &'static [u8; 3] {
    match day {
        1..=7 => DAY_NAMES[usize::from(day - 1)],
        _ => b"---",
    }
}

/// `HH:MM:SS` from the time registers (24-hour encoding).
pub fn time_digits(image: &RegisterImage) -> [u8; 8] {
    let hours = image.hours();
    let minutes = image.minutes();
    let seconds = image.seconds();
    [
        digit(hours.ten_hours_24()),
        digit(hours.hours()),
        b':',
        digit(minutes.ten_minutes()),
        digit(minutes.minutes()),
        b':',
        digit(seconds.ten_seconds()),
        digit(seconds.seconds()),
    ]
}

/// `DD/MM/2CYY` from the date registers.
pub fn date_digits(image: &RegisterImage) -> [u8; 10] {
    let date = image.date();
    let month = image.month();
    let year = image.year();
    [
        digit(date.ten_date()),
        digit(date.date()),
        b'/',
        digit(month.ten_month()),
        digit(month.month()),
        b'/',
        b'2',
        digit(u8::from(month.century())),
        digit(year.ten_year()),
        digit(year.year()),
    ]
}

/// `HH:MM` from the alarm 2 registers.
pub fn alarm_digits(image: &RegisterImage) -> [u8; 5] {
    let hours = image.alarm2_hours();
    let minutes = image.alarm2_minutes();
    [
        digit(hours.ten_hours_24()),
        digit(hours.hours()),
        b':',
        digit(minutes.ten_minutes()),
        digit(minutes.minutes()),
    ]
}

/// Line 1 after a refresh of the time and temperature registers.
pub fn top_line(image: &RegisterImage) -> [u8; LINE_WIDTH] {
    let mut line = [b' '; LINE_WIDTH];
    line[0] = glyph::CLOCK;
    line[1..9].copy_from_slice(&time_digits(image));
    let temperature = image.temperature().temperature();
    let magnitude = temperature.unsigned_abs();
    line[12] = if temperature < 0 { b'-' } else { b' ' };
    line[13] = digit(magnitude / 10);
    line[14] = digit(magnitude);
    line[15] = glyph::DEGREE;
    line
}

/// Line 2 after a refresh of the date and day registers.
pub fn bottom_line(image: &RegisterImage, alarm_armed: bool) -> [u8; LINE_WIDTH] {
    let mut line = [b' '; LINE_WIDTH];
    line[0] = glyph::CALENDAR;
    line[1..11].copy_from_slice(&date_digits(image));
    line[12..15].copy_from_slice(day_name(image.day().day()));
    if alarm_armed {
        line[15] = glyph::BELL;
    }
    line
}

/// Powers the display and draws the whole face.
pub fn setup<I2C, D>(
    clock: &mut Clock<I2C>,
    display: &mut D,
    alarm_armed: bool,
) -> Result<(), Error<I2C::Error, D::Error>>
where
    I2C: I2c,
    D: CharacterDisplay,
{
    clock.refresh(RegisterRange::TIME_AND_DATE)?;
    clock.refresh(RegisterRange::TEMPERATURE_MSB)?;
    let top = top_line(clock.image());
    let bottom = bottom_line(clock.image(), alarm_armed);

    display.power_on().map_err(Error::Display)?;
    display.write_at(LINE_1, &top).map_err(Error::Display)?;
    display.write_at(LINE_2, &bottom).map_err(Error::Display)?;
    Ok(())
}

/// Rewrites the seconds digit, then each higher digit whose lower
/// neighbour rolled over to zero. At midnight the date line is redrawn.
pub fn update<I2C, D>(
    clock: &mut Clock<I2C>,
    display: &mut D,
) -> Result<(), Error<I2C::Error, D::Error>>
where
    I2C: I2c,
    D: CharacterDisplay,
{
    clock.refresh(RegisterRange::TIME)?;
    let image = clock.image();
    let (seconds, minutes, hours) = (image.seconds(), image.minutes(), image.hours());

    // (display address, digit), lowest first.
    let cascade = [
        (0x08, seconds.seconds()),
        (0x07, seconds.ten_seconds()),
        (0x05, minutes.minutes()),
        (0x04, minutes.ten_minutes()),
        (0x02, hours.hours()),
        (0x01, hours.ten_hours_24()),
    ];
    for (address, value) in cascade {
        display
            .write_at(LINE_1 + address, &[digit(value)])
            .map_err(Error::Display)?;
        if value != 0 {
            return Ok(());
        }
    }

    debug!("midnight rollover");
    clock.refresh(RegisterRange::DATE_AND_DAY)?;
    let bottom = bottom_line(clock.image(), false);
    display
        .write_at(LINE_2 + 1, &bottom[1..15])
        .map_err(Error::Display)?;
    Ok(())
}
