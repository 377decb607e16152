//! Trading calendar.
//!
//! A session is a weekday that is not a holiday. Session hours are held in local exchange time
//! with a fixed UTC offset; daylight saving changes are not modelled.

use std::collections::{HashMap, HashSet};

use time::macros::{offset, time};
use time::{Date, Duration, PrimitiveDateTime, Time, UtcOffset, Weekday};

use crate::clock::DateTime;

/// One trading day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Session {
    pub date: Date,
    pub open: DateTime,
    pub close: DateTime,
}

impl Session {
    pub fn minutes(&self) -> i64 {
        (*self.close - *self.open) / 60
    }

    /// Open is excluded, close is included.
    pub fn contains(&self, date: &DateTime) -> bool {
        *date > self.open && *date <= self.close
    }
}

#[derive(Clone, Debug)]
pub struct TradingCalendar {
    open: Time,
    close: Time,
    utc_offset: UtcOffset,
    holidays: HashSet<Date>,
    early_closes: HashMap<Date, Time>,
}

impl TradingCalendar {
    pub fn new(open: Time, close: Time, utc_offset: UtcOffset) -> Self {
        Self {
            open,
            close,
            utc_offset,
            holidays: HashSet::new(),
            early_closes: HashMap::new(),
        }
    }

    /// Regular US equity hours, 09:30 to 16:00 at UTC-05:00.
    pub fn nyse() -> Self {
        Self::new(time!(9:30), time!(16:00), offset!(-5))
    }

    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = Date>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn with_early_close(mut self, date: Date, close: Time) -> Self {
        self.early_closes.insert(date, close);
        self
    }

    pub fn is_session(&self, date: Date) -> bool {
        match date.weekday() {
            Weekday::Saturday | Weekday::Sunday => false,
            _ => !self.holidays.contains(&date),
        }
    }

    pub fn session(&self, date: Date) -> Option<Session> {
        if !self.is_session(date) {
            return None;
        }
        let close = self.early_closes.get(&date).copied().unwrap_or(self.close);
        Some(Session {
            date,
            open: self.local_to_utc(date, self.open),
            close: self.local_to_utc(date, close),
        })
    }

    /// Length of a regular, full-day session.
    pub fn regular_session_minutes(&self) -> i64 {
        (self.close - self.open).whole_minutes()
    }

    /// Both ends are inclusive.
    pub fn sessions_between(&self, start: Date, end: Date) -> Vec<Date> {
        let mut sessions = Vec::new();
        let mut date = start;
        while date <= end {
            if self.is_session(date) {
                sessions.push(date);
            }
            match date.next_day() {
                Some(next) => date = next,
                None => break,
            }
        }
        sessions
    }

    /// Sessions within the Monday to Sunday week containing `date`.
    pub fn sessions_in_week(&self, date: Date) -> Vec<Date> {
        let from_monday = i64::from(date.weekday().number_days_from_monday());
        let monday = date
            .checked_sub(Duration::days(from_monday))
            .unwrap_or(Date::MIN);
        let sunday = monday.checked_add(Duration::days(6)).unwrap_or(Date::MAX);
        self.sessions_between(monday, sunday)
    }

    /// Sessions within the calendar month containing `date`.
    pub fn sessions_in_month(&self, date: Date) -> Vec<Date> {
        let first = date
            .checked_sub(Duration::days(i64::from(date.day()) - 1))
            .unwrap_or(Date::MIN);
        let days = date.month().length(date.year());
        let last = first
            .checked_add(Duration::days(i64::from(days) - 1))
            .unwrap_or(Date::MAX);
        self.sessions_between(first, last)
    }

    fn local_to_utc(&self, date: Date, time: Time) -> DateTime {
        PrimitiveDateTime::new(date, time)
            .assume_offset(self.utc_offset)
            .into()
    }
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self::nyse()
    }
}
