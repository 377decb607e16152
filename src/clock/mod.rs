use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::vec::IntoIter;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::calendar::{Session, TradingCalendar};

/// Unix timestamp in seconds.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct DateTime(i64);

impl DateTime {
    pub fn plus_minutes(&self, minutes: i64) -> Self {
        DateTime(self.0 + minutes * 60)
    }
}

impl Deref for DateTime {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<i64> for DateTime {
    fn from(v: i64) -> Self {
        DateTime(v)
    }
}

impl From<DateTime> for i64 {
    fn from(v: DateTime) -> Self {
        v.0
    }
}

impl From<OffsetDateTime> for DateTime {
    fn from(v: OffsetDateTime) -> Self {
        DateTime(v.unix_timestamp())
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match OffsetDateTime::from_unix_timestamp(self.0) {
            Ok(t) => write!(
                f,
                "{}-{:02}-{:02} {:02}:{:02}:{:02}Z",
                t.year(),
                t.month() as u8,
                t.day(),
                t.hour(),
                t.minute(),
                t.second()
            ),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

///Clock is a reference to the sessions of a run, shared by every component that needs to know
///which trading day the simulation is on.
///
///The clock only ever contains sessions of the calendar it was built with. Days on which the
///market is closed are never visited so nothing downstream has to check for them.
pub type Clock = Rc<RefCell<ClockInner>>;

#[derive(Debug)]
pub struct ClockInner {
    //We have a position and Vec because we should be able to return an iterator without changing
    //the state of the Clock
    pos: usize,
    sessions: Vec<Session>,
}

impl ClockInner {
    pub fn now(&self) -> Option<Session> {
        self.sessions.get(self.pos).copied()
    }

    pub fn has_next(&self) -> bool {
        self.pos + 1 < self.sessions.len()
    }

    pub fn tick(&mut self) {
        self.pos += 1;
        if self.pos >= self.sessions.len() {
            panic!("Client has ticked past the number of sessions");
        }
    }

    //Doesn't change the iteration state, used for clients to setup data using clock
    pub fn peek(&self) -> IntoIter<Session> {
        self.sessions.clone().into_iter()
    }

    /// Get length of clock
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check to see if sessions are empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

pub struct ClockBuilder {
    pub start: Date,
    pub end: Date,
    pub sessions: Vec<Session>,
}

impl ClockBuilder {
    pub fn build(self) -> Clock {
        Rc::new(RefCell::new(ClockInner {
            sessions: self.sessions,
            pos: 0,
        }))
    }

    pub fn with_calendar(&self, calendar: &TradingCalendar) -> Self {
        let sessions = calendar
            .sessions_between(self.start, self.end)
            .into_iter()
            .filter_map(|date| calendar.session(date))
            .collect();
        Self {
            start: self.start,
            end: self.end,
            sessions,
        }
    }

    //Runs for length given + 1 day
    pub fn with_length_in_days(start: Date, length_in_days: i64) -> Self {
        let end = start
            .checked_add(Duration::days(length_in_days))
            .unwrap_or(Date::MAX);
        Self {
            start,
            end,
            sessions: Vec::new(),
        }
    }

    pub fn with_length_in_dates(start: Date, end: Date) -> Self {
        Self {
            start,
            end,
            sessions: Vec::new(),
        }
    }
}
