//! Settings editor.
//!
//! Five screens are visited in order: alarm, time, date, day of week and
//! display timeout. Each screen shows a snippet on line 1 and an arrow on
//! line 2 under the digit being edited. Left/Right move the arrow between
//! editable columns, Up/Down change the digit under it, Enter commits the
//! screen and moves on, Exit leaves without committing the current screen.
//!
//! Clock fields are edited in place in the register image and only reach the
//! chip on Enter. The alarm-enabled flag and the timeout are staged in the
//! editor and written to storage on Enter.

use embedded_hal::i2c::I2c;

use crate::clock::Clock;
use crate::error::Error;
use crate::face::{alarm_digits, date_digits, day_name, time_digits};
use crate::image::{RegisterImage, RegisterRange};
use crate::peripherals::{digit, glyph, storage_map, CharacterDisplay, Storage, LINE_1, LINE_2};
use crate::wake::{Button, ButtonSnapshot};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    Alarm,
    Time,
    Date,
    Day,
    Timeout,
}

struct Layout {
    glyph: u8,
    label: &'static [u8],
    label_address: u8,
    /// Editable columns, ascending. Separators are simply absent.
    columns: &'static [u8],
}

impl Layout {
    fn rightmost(&self) -> u8 {
        self.columns.last().copied().unwrap_or(1)
    }

    fn previous(&self, column: u8) -> Option<u8> {
        self.columns.iter().rev().copied().find(|&c| c < column)
    }

    fn next(&self, column: u8) -> Option<u8> {
        self.columns.iter().copied().find(|&c| c > column)
    }
}

impl Screen {
    pub fn next(self) -> Option<Screen> {
        match self {
            Screen::Alarm => Some(Screen::Time),
            Screen::Time => Some(Screen::Date),
            Screen::Date => Some(Screen::Day),
            Screen::Day => Some(Screen::Timeout),
            Screen::Timeout => None,
        }
    }

    fn layout(self) -> &'static Layout {
        match self {
            Screen::Alarm => &Layout {
                glyph: glyph::BELL,
                label: b"Alarm",
                label_address: 0x4B,
                columns: &[1, 2, 4, 5, 6],
            },
            Screen::Time => &Layout {
                glyph: glyph::CLOCK,
                label: b" Time",
                label_address: 0x4B,
                columns: &[1, 2, 4, 5, 7, 8],
            },
            Screen::Date => &Layout {
                glyph: glyph::CALENDAR,
                label: b"Date",
                label_address: 0x4C,
                columns: &[1, 2, 4, 5, 8, 9, 10],
            },
            Screen::Day => &Layout {
                glyph: glyph::CALENDAR,
                label: b" Day",
                label_address: 0x4C,
                columns: &[1],
            },
            Screen::Timeout => &Layout {
                glyph: glyph::CLOCK,
                label: b"Timeout",
                label_address: 0x49,
                columns: &[1, 2],
            },
        }
    }

    /// Rightmost editable column, where the arrow starts.
    pub fn last_column(self) -> u8 {
        self.layout().rightmost()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Digit {
    Tens,
    Ones,
}

/// Which register group an hour or minute field lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Group {
    Time,
    Alarm2,
}

/// Values edited outside the register image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Staged {
    pub alarm_enabled: u8,
    pub timeout_tens: u8,
    pub timeout_ones: u8,
}

impl Staged {
    pub fn timeout(&self) -> u8 {
        self.timeout_tens * 10 + self.timeout_ones
    }

    fn load_timeout(&mut self, value: u8) {
        let value = value.clamp(1, 99);
        self.timeout_tens = value / 10;
        self.timeout_ones = value % 10;
    }
}

/// One editable digit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Hour(Group, Digit),
    Minute(Group, Digit),
    Second(Digit),
    Date(Digit),
    Month(Digit),
    Century,
    Year(Digit),
    Weekday,
    AlarmEnabled,
    Timeout(Digit),
}

fn pick(digit: Digit, tens: u8, ones: u8) -> u8 {
    match digit {
        Digit::Tens => tens,
        Digit::Ones => ones,
    }
}

fn hour_digits(image: &RegisterImage, group: Group) -> (u8, u8) {
    match group {
        Group::Time => {
            let hours = image.hours();
            (hours.ten_hours_24(), hours.hours())
        }
        Group::Alarm2 => {
            let hours = image.alarm2_hours();
            (hours.ten_hours_24(), hours.hours())
        }
    }
}

fn minute_digits(image: &RegisterImage, group: Group) -> (u8, u8) {
    match group {
        Group::Time => {
            let minutes = image.minutes();
            (minutes.ten_minutes(), minutes.minutes())
        }
        Group::Alarm2 => {
            let minutes = image.alarm2_minutes();
            (minutes.ten_minutes(), minutes.minutes())
        }
    }
}

impl Field {
    /// The field under `column` on `screen`, if that column is editable.
    pub fn at(screen: Screen, column: u8) -> Option<Field> {
        use Digit::{Ones, Tens};
        let field = match (screen, column) {
            (Screen::Alarm, 1) => Field::Hour(Group::Alarm2, Tens),
            (Screen::Alarm, 2) => Field::Hour(Group::Alarm2, Ones),
            (Screen::Alarm, 4) => Field::Minute(Group::Alarm2, Tens),
            (Screen::Alarm, 5) => Field::Minute(Group::Alarm2, Ones),
            (Screen::Alarm, 6) => Field::AlarmEnabled,
            (Screen::Time, 1) => Field::Hour(Group::Time, Tens),
            (Screen::Time, 2) => Field::Hour(Group::Time, Ones),
            (Screen::Time, 4) => Field::Minute(Group::Time, Tens),
            (Screen::Time, 5) => Field::Minute(Group::Time, Ones),
            (Screen::Time, 7) => Field::Second(Tens),
            (Screen::Time, 8) => Field::Second(Ones),
            (Screen::Date, 1) => Field::Date(Tens),
            (Screen::Date, 2) => Field::Date(Ones),
            (Screen::Date, 4) => Field::Month(Tens),
            (Screen::Date, 5) => Field::Month(Ones),
            (Screen::Date, 8) => Field::Century,
            (Screen::Date, 9) => Field::Year(Tens),
            (Screen::Date, 10) => Field::Year(Ones),
            (Screen::Day, 1) => Field::Weekday,
            (Screen::Timeout, 1) => Field::Timeout(Tens),
            (Screen::Timeout, 2) => Field::Timeout(Ones),
            _ => return None,
        };
        Some(field)
    }

    pub fn get(self, image: &RegisterImage, staged: &Staged) -> u8 {
        match self {
            Field::Hour(group, d) => {
                let (tens, ones) = hour_digits(image, group);
                pick(d, tens, ones)
            }
            Field::Minute(group, d) => {
                let (tens, ones) = minute_digits(image, group);
                pick(d, tens, ones)
            }
            Field::Second(d) => {
                let seconds = image.seconds();
                pick(d, seconds.ten_seconds(), seconds.seconds())
            }
            Field::Date(d) => {
                let date = image.date();
                pick(d, date.ten_date(), date.date())
            }
            Field::Month(d) => {
                let month = image.month();
                pick(d, month.ten_month(), month.month())
            }
            Field::Century => u8::from(image.month().century()),
            Field::Year(d) => {
                let year = image.year();
                pick(d, year.ten_year(), year.year())
            }
            Field::Weekday => image.day().day(),
            Field::AlarmEnabled => staged.alarm_enabled,
            Field::Timeout(d) => pick(d, staged.timeout_tens, staged.timeout_ones),
        }
    }

    /// Bounds check for a candidate value, given the current value of the
    /// paired digit.
    pub fn accepts(self, image: &RegisterImage, value: u8) -> bool {
        match self {
            Field::Hour(group, Digit::Tens) => {
                let (_, ones) = hour_digits(image, group);
                value < 3 && !(value == 2 && ones > 3)
            }
            Field::Hour(group, Digit::Ones) => {
                let (tens, _) = hour_digits(image, group);
                if tens == 2 {
                    value < 4
                } else {
                    value < 10
                }
            }
            Field::Minute(_, Digit::Tens) | Field::Second(Digit::Tens) => value < 6,
            Field::Date(Digit::Tens) => {
                let ones = image.date().date();
                value < 4 && !(value == 3 && ones > 1)
            }
            Field::Date(Digit::Ones) => {
                if image.date().ten_date() == 3 {
                    value <= 1
                } else {
                    value < 10
                }
            }
            Field::Month(Digit::Tens) => {
                let ones = image.month().month();
                value < 2 && !(value == 1 && ones > 2)
            }
            Field::Month(Digit::Ones) => {
                if image.month().ten_month() == 1 {
                    value <= 2
                } else {
                    value < 10
                }
            }
            Field::Century | Field::AlarmEnabled => value < 2,
            Field::Weekday => (1..=7).contains(&value),
            Field::Minute(_, Digit::Ones)
            | Field::Second(Digit::Ones)
            | Field::Year(_)
            | Field::Timeout(_) => value < 10,
        }
    }

    pub fn set(self, image: &mut RegisterImage, staged: &mut Staged, value: u8) {
        match self {
            Field::Hour(Group::Time, d) => image.update_hours(|hours| match d {
                Digit::Tens => hours.set_ten_hours_24(value),
                Digit::Ones => hours.set_hours(value),
            }),
            Field::Hour(Group::Alarm2, d) => image.update_alarm2_hours(|hours| match d {
                Digit::Tens => hours.set_ten_hours_24(value),
                Digit::Ones => hours.set_hours(value),
            }),
            Field::Minute(Group::Time, d) => image.update_minutes(|minutes| match d {
                Digit::Tens => minutes.set_ten_minutes(value),
                Digit::Ones => minutes.set_minutes(value),
            }),
            Field::Minute(Group::Alarm2, d) => image.update_alarm2_minutes(|minutes| match d {
                Digit::Tens => minutes.set_ten_minutes(value),
                Digit::Ones => minutes.set_minutes(value),
            }),
            Field::Second(d) => image.update_seconds(|seconds| match d {
                Digit::Tens => seconds.set_ten_seconds(value),
                Digit::Ones => seconds.set_seconds(value),
            }),
            Field::Date(d) => image.update_date(|date| match d {
                Digit::Tens => date.set_ten_date(value),
                Digit::Ones => date.set_date(value),
            }),
            Field::Month(d) => image.update_month(|month| match d {
                Digit::Tens => month.set_ten_month(value),
                Digit::Ones => month.set_month(value),
            }),
            Field::Century => image.update_month(|month| month.set_century(value != 0)),
            Field::Year(d) => image.update_year(|year| match d {
                Digit::Tens => year.set_ten_year(value),
                Digit::Ones => year.set_year(value),
            }),
            Field::Weekday => image.update_day(|day| day.set_day(value)),
            Field::AlarmEnabled => staged.alarm_enabled = value,
            Field::Timeout(Digit::Tens) => staged.timeout_tens = value,
            Field::Timeout(Digit::Ones) => staged.timeout_ones = value,
        }
    }
}

/// Up/Down direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

pub struct Editor {
    screen: Screen,
    column: u8,
    staged: Staged,
    ready_to_exit: bool,
}

impl Editor {
    pub const fn new() -> Self {
        Self {
            screen: Screen::Alarm,
            column: 0,
            staged: Staged {
                alarm_enabled: 0,
                timeout_tens: 0,
                timeout_ones: 1,
            },
            ready_to_exit: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn staged(&self) -> &Staged {
        &self.staged
    }

    /// Field under the arrow.
    pub fn field(&self) -> Option<Field> {
        Field::at(self.screen, self.column)
    }

    pub fn ready_to_exit(&self) -> bool {
        self.ready_to_exit
    }

    pub fn clear_exit_flag(&mut self) {
        self.ready_to_exit = false;
    }

    /// Clears the display and opens the first screen.
    pub fn begin<I2C, D, S>(
        &mut self,
        clock: &mut Clock<I2C>,
        display: &mut D,
        storage: &mut S,
    ) -> Result<(), Error<I2C::Error, D::Error>>
    where
        I2C: I2c,
        D: CharacterDisplay,
        S: Storage,
    {
        self.screen = Screen::Alarm;
        self.column = 0;
        display.clear().map_err(Error::Display)?;
        display.write_at(LINE_1 + 0x0D, b"Set").map_err(Error::Display)?;
        self.enter_screen(clock, display, storage)?;
        self.redraw(clock.image(), display).map_err(Error::Display)
    }

    /// Handles one button action, then redraws the snippet.
    pub fn update<I2C, D, S>(
        &mut self,
        buttons: ButtonSnapshot,
        clock: &mut Clock<I2C>,
        display: &mut D,
        storage: &mut S,
    ) -> Result<(), Error<I2C::Error, D::Error>>
    where
        I2C: I2c,
        D: CharacterDisplay,
        S: Storage,
    {
        match buttons.action() {
            Some(Button::Left) => {
                if let Some(column) = self.screen.layout().previous(self.column) {
                    self.move_arrow(display, column).map_err(Error::Display)?;
                }
            }
            Some(Button::Right) => {
                if let Some(column) = self.screen.layout().next(self.column) {
                    self.move_arrow(display, column).map_err(Error::Display)?;
                }
            }
            Some(Button::Up) => self.adjust(clock.image_mut(), Step::Up),
            Some(Button::Down) => self.adjust(clock.image_mut(), Step::Down),
            Some(Button::Enter) => self.confirm(clock, display, storage)?,
            Some(Button::Exit) => {
                debug!("editor exit requested");
                self.ready_to_exit = true;
            }
            None => {}
        }
        self.redraw(clock.image(), display).map_err(Error::Display)
    }

    /// Steps the digit under the arrow. Out-of-bounds candidates, including
    /// a decrement below zero, are dropped.
    pub fn adjust(&mut self, image: &mut RegisterImage, step: Step) {
        let Some(field) = self.field() else {
            return;
        };
        let current = field.get(image, &self.staged);
        let candidate = match step {
            Step::Up => current.wrapping_add(1),
            Step::Down => current.wrapping_sub(1),
        };
        if field.accepts(image, candidate) {
            field.set(image, &mut self.staged, candidate);
        }
    }

    fn confirm<I2C, D, S>(
        &mut self,
        clock: &mut Clock<I2C>,
        display: &mut D,
        storage: &mut S,
    ) -> Result<(), Error<I2C::Error, D::Error>>
    where
        I2C: I2c,
        D: CharacterDisplay,
        S: Storage,
    {
        match self.screen {
            Screen::Alarm => {
                clock.commit(RegisterRange::ALARM2)?;
                storage.write_if_changed(storage_map::ALARM_ENABLED, self.staged.alarm_enabled);
                clock.clear_alarm_match()?;
            }
            Screen::Time => clock.commit(RegisterRange::TIME)?,
            Screen::Date => clock.commit(RegisterRange::DATE)?,
            Screen::Day => clock.commit(RegisterRange::DAY)?,
            Screen::Timeout => {
                let timeout = self.staged.timeout().max(1);
                storage.write_if_changed(storage_map::TIMEOUT, timeout);
            }
        }
        info!("committed {:?} screen", self.screen);

        match self.screen.next() {
            Some(next) => {
                self.screen = next;
                self.enter_screen(clock, display, storage)
            }
            None => {
                self.ready_to_exit = true;
                Ok(())
            }
        }
    }

    fn enter_screen<I2C, D, S>(
        &mut self,
        clock: &mut Clock<I2C>,
        display: &mut D,
        storage: &mut S,
    ) -> Result<(), Error<I2C::Error, D::Error>>
    where
        I2C: I2c,
        D: CharacterDisplay,
        S: Storage,
    {
        let layout = self.screen.layout();
        self.move_arrow(display, layout.rightmost())
            .map_err(Error::Display)?;
        display
            .write_at(LINE_1, &[layout.glyph])
            .map_err(Error::Display)?;
        display
            .write_at(layout.label_address, layout.label)
            .map_err(Error::Display)?;

        match self.screen {
            Screen::Alarm => {
                clock.refresh(RegisterRange::ALARM2)?;
                self.staged.alarm_enabled = u8::from(storage.read(storage_map::ALARM_ENABLED) != 0);
            }
            Screen::Time => clock.refresh(RegisterRange::TIME)?,
            Screen::Date => clock.refresh(RegisterRange::DATE)?,
            Screen::Day => {
                clock.refresh(RegisterRange::DAY)?;
                // Date leftovers
                display
                    .write_at(LINE_1 + 0x04, b"       ")
                    .map_err(Error::Display)?;
            }
            Screen::Timeout => {
                self.staged.load_timeout(storage.read(storage_map::TIMEOUT));
                // Third letter of the day name
                display
                    .write_at(LINE_1 + 0x03, b" ")
                    .map_err(Error::Display)?;
            }
        }
        debug!("entered {:?} screen", self.screen);
        Ok(())
    }

    fn move_arrow<D: CharacterDisplay>(&mut self, display: &mut D, column: u8) -> Result<(), D::Error> {
        display.write_at(LINE_2 + self.column, b" ")?;
        self.column = column;
        display.write_at(LINE_2 + self.column, &[glyph::ARROW])
    }

    fn redraw<D: CharacterDisplay>(&self, image: &RegisterImage, display: &mut D) -> Result<(), D::Error> {
        display.set_cursor(LINE_1 + 0x01)?;
        match self.screen {
            Screen::Alarm => {
                display.write_bytes(&alarm_digits(image))?;
                let marker = if self.staged.alarm_enabled != 0 {
                    glyph::BELL
                } else {
                    b'X'
                };
                display.write_char(marker)
            }
            Screen::Time => display.write_bytes(&time_digits(image)),
            Screen::Date => display.write_bytes(&date_digits(image)),
            Screen::Day => display.write_bytes(day_name(image.day().day())),
            Screen::Timeout => display.write_bytes(&[
                digit(self.staged.timeout_tens),
                digit(self.staged.timeout_ones),
            ]),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegAddr;

    const SCREENS: [Screen; 5] = [
        Screen::Alarm,
        Screen::Time,
        Screen::Date,
        Screen::Day,
        Screen::Timeout,
    ];

    fn editor_at(screen: Screen, column: u8) -> Editor {
        let mut editor = Editor::new();
        editor.screen = screen;
        editor.column = column;
        editor
    }

    #[test]
    fn test_every_layout_column_is_editable() {
        for screen in SCREENS {
            let layout = screen.layout();
            for column in 0..=11 {
                assert_eq!(
                    Field::at(screen, column).is_some(),
                    layout.columns.contains(&column),
                    "{:?} column {}",
                    screen,
                    column
                );
            }
        }
    }

    #[test]
    fn test_arrow_skips_separators() {
        let layout = Screen::Time.layout();
        assert_eq!(layout.next(2), Some(4));
        assert_eq!(layout.next(5), Some(7));
        assert_eq!(layout.previous(7), Some(5));
        assert_eq!(layout.previous(1), None);
        assert_eq!(layout.next(8), None);
        assert_eq!(Screen::Date.last_column(), 10);
        assert_eq!(Screen::Day.last_column(), 1);
    }

    #[test]
    fn test_hour_cannot_reach_24() {
        let mut image = RegisterImage::new();
        image.set_raw(RegAddr::Hours, 0x19);

        // 19 -> tens up to 2 would give 29
        let mut editor = editor_at(Screen::Time, 1);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Hours), 0x19);

        // 23, then ones up to 4 is rejected
        image.set_raw(RegAddr::Hours, 0x23);
        let mut editor = editor_at(Screen::Time, 2);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Hours), 0x23);

        // 13 -> 23 is fine
        image.set_raw(RegAddr::Hours, 0x13);
        let mut editor = editor_at(Screen::Time, 1);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Hours), 0x23);
    }

    #[test]
    fn test_alarm_hour_keeps_mask_bit() {
        let mut image = RegisterImage::new();
        image.set_raw(RegAddr::Alarm2Hours, 0x89);
        let mut editor = editor_at(Screen::Alarm, 1);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Alarm2Hours), 0x99);
        editor.adjust(&mut image, Step::Up);
        // 29 is not an hour
        assert_eq!(image.raw(RegAddr::Alarm2Hours), 0x99);
    }

    #[test]
    fn test_date_and_month_bounds() {
        let mut image = RegisterImage::new();
        image.set_raw(RegAddr::Date, 0x25);
        let mut editor = editor_at(Screen::Date, 1);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Date), 0x25);

        image.set_raw(RegAddr::Date, 0x31);
        let mut editor = editor_at(Screen::Date, 2);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Date), 0x31);

        image.set_raw(RegAddr::Month, 0x83);
        let mut editor = editor_at(Screen::Date, 4);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Month), 0x83);

        image.set_raw(RegAddr::Month, 0x12);
        let mut editor = editor_at(Screen::Date, 5);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.raw(RegAddr::Month), 0x12);
        editor.adjust(&mut image, Step::Down);
        assert_eq!(image.raw(RegAddr::Month), 0x11);

        let mut editor = editor_at(Screen::Date, 8);
        editor.adjust(&mut image, Step::Up);
        assert!(image.month().century());
        editor.adjust(&mut image, Step::Up);
        assert!(image.month().century());
    }

    #[test]
    fn test_weekday_stays_in_range() {
        let mut image = RegisterImage::new();
        image.set_raw(RegAddr::Day, 1);
        let mut editor = editor_at(Screen::Day, 1);
        editor.adjust(&mut image, Step::Down);
        assert_eq!(image.day().day(), 1);
        image.set_raw(RegAddr::Day, 7);
        editor.adjust(&mut image, Step::Up);
        assert_eq!(image.day().day(), 7);
    }

    #[test]
    fn test_up_then_down_restores_value() {
        let samples = [
            [0x00, 0x00, 0x00, 0x01, 0x01, 0x01, 0x00],
            [0x59, 0x59, 0x23, 0x07, 0x31, 0x92, 0x99],
            [0x30, 0x45, 0x19, 0x04, 0x29, 0x09, 0x50],
            [0x09, 0x09, 0x09, 0x03, 0x09, 0x10, 0x09],
        ];
        for sample in samples {
            let mut bytes = [0u8; 19];
            bytes[..7].copy_from_slice(&sample);
            bytes[0x0B] = sample[1];
            bytes[0x0C] = sample[2];
            for screen in SCREENS {
                for &column in screen.layout().columns {
                    for (first, second) in [(Step::Up, Step::Down), (Step::Down, Step::Up)] {
                        let mut image = RegisterImage::from_bytes(bytes);
                        let mut editor = editor_at(screen, column);
                        editor.staged.load_timeout(sample[0] % 100);
                        let before = (image, editor.staged);

                        editor.adjust(&mut image, first);
                        let moved = (image, editor.staged) != before;
                        editor.adjust(&mut image, second);
                        if moved {
                            assert_eq!(
                                (image, editor.staged),
                                before,
                                "{:?} column {} {:?}",
                                screen,
                                column,
                                first
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_staged_timeout_clamps_on_load() {
        let mut staged = Staged::default();
        staged.load_timeout(0);
        assert_eq!(staged.timeout(), 1);
        staged.load_timeout(250);
        assert_eq!(staged.timeout(), 99);
        staged.load_timeout(42);
        assert_eq!((staged.timeout_tens, staged.timeout_ones), (4, 2));
    }
}
