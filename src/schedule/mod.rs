//! Schedules for running algorithm functions
//!
//! A function is registered with a [DateRule], which picks the sessions it runs on, and a
//! [TimeRule], which picks the time within the session. Both are plain values: nothing is
//! evaluated until the driver asks the [Scheduler] what is due in a given session.

use derive_more::{Display, Error};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::algorithm::{AlgorithmError, TradingApi};
use crate::calendar::{Session, TradingCalendar};
use crate::clock::DateTime;
use crate::data::BarData;

pub const MAX_WEEK_OFFSET: u8 = 5;
pub const MAX_MONTH_OFFSET: u8 = 23;

#[derive(Debug, Display, Error)]
pub enum ScheduleError {
    #[display("days_offset {days_offset} must be less than {max}")]
    DaysOffsetOutOfRange { days_offset: u8, max: u8 },
    #[display("offset of {minutes} minutes does not fit a {session_minutes} minute session")]
    OffsetOutsideSession { minutes: i64, session_minutes: i64 },
    #[display("clock session on {date} does not match the calendar")]
    CalendarMismatch { date: Date },
}

/// Returns [bool] when it is time to trade.
///
/// Controls which sessions a scheduled function can run on. Implementors only see trading
/// sessions, closed days never reach this check.
pub trait TradingSchedule {
    fn should_trade(&self, calendar: &TradingCalendar, date: Date) -> bool;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum DateRule {
    EveryDay,
    WeekStart { days_offset: u8 },
    WeekEnd { days_offset: u8 },
    MonthStart { days_offset: u8 },
    MonthEnd { days_offset: u8 },
}

impl DateRule {
    pub fn every_day() -> Self {
        DateRule::EveryDay
    }

    pub fn week_start(days_offset: u8) -> Self {
        DateRule::WeekStart { days_offset }
    }

    pub fn week_end(days_offset: u8) -> Self {
        DateRule::WeekEnd { days_offset }
    }

    pub fn month_start(days_offset: u8) -> Self {
        DateRule::MonthStart { days_offset }
    }

    pub fn month_end(days_offset: u8) -> Self {
        DateRule::MonthEnd { days_offset }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        let (days_offset, max) = match self {
            DateRule::EveryDay => return Ok(()),
            DateRule::WeekStart { days_offset } | DateRule::WeekEnd { days_offset } => {
                (*days_offset, MAX_WEEK_OFFSET)
            }
            DateRule::MonthStart { days_offset } | DateRule::MonthEnd { days_offset } => {
                (*days_offset, MAX_MONTH_OFFSET)
            }
        };
        if days_offset >= max {
            return Err(ScheduleError::DaysOffsetOutOfRange { days_offset, max });
        }
        Ok(())
    }
}

impl TradingSchedule for DateRule {
    fn should_trade(&self, calendar: &TradingCalendar, date: Date) -> bool {
        if !calendar.is_session(date) {
            return false;
        }

        //Periods with fewer sessions than the offset do not fire at all
        let (sessions, days_offset, from_end) = match self {
            DateRule::EveryDay => return true,
            DateRule::WeekStart { days_offset } => {
                (calendar.sessions_in_week(date), *days_offset, false)
            }
            DateRule::WeekEnd { days_offset } => {
                (calendar.sessions_in_week(date), *days_offset, true)
            }
            DateRule::MonthStart { days_offset } => {
                (calendar.sessions_in_month(date), *days_offset, false)
            }
            DateRule::MonthEnd { days_offset } => {
                (calendar.sessions_in_month(date), *days_offset, true)
            }
        };

        let target = if from_end {
            sessions.iter().rev().nth(days_offset as usize)
        } else {
            sessions.get(days_offset as usize)
        };
        target == Some(&date)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum TimeRule {
    MarketOpen { minutes: i64 },
    MarketClose { minutes: i64 },
}

impl TimeRule {
    /// Runs `hours` and `minutes` after the open. Zero offset runs in the first minute.
    pub fn market_open(hours: u32, minutes: u32) -> Self {
        TimeRule::MarketOpen {
            minutes: Self::offset(hours, minutes),
        }
    }

    /// Runs `hours` and `minutes` before the close. Zero offset runs in the last minute.
    pub fn market_close(hours: u32, minutes: u32) -> Self {
        TimeRule::MarketClose {
            minutes: Self::offset(hours, minutes),
        }
    }

    fn offset(hours: u32, minutes: u32) -> i64 {
        (i64::from(hours) * 60 + i64::from(minutes)).max(1)
    }

    pub fn minutes(&self) -> i64 {
        match self {
            TimeRule::MarketOpen { minutes } | TimeRule::MarketClose { minutes } => *minutes,
        }
    }

    pub fn validate(&self, calendar: &TradingCalendar) -> Result<(), ScheduleError> {
        let session_minutes = calendar.regular_session_minutes();
        let minutes = self.minutes();
        let fits = match self {
            TimeRule::MarketOpen { .. } => minutes <= session_minutes,
            TimeRule::MarketClose { .. } => minutes < session_minutes,
        };
        if !fits {
            return Err(ScheduleError::OffsetOutsideSession {
                minutes,
                session_minutes,
            });
        }
        Ok(())
    }

    /// Time the rule fires in `session`, `None` when that falls outside the session.
    pub fn trigger(&self, session: &Session) -> Option<DateTime> {
        let at = match self {
            TimeRule::MarketOpen { minutes } => session.open.plus_minutes(*minutes),
            TimeRule::MarketClose { minutes } => session.close.plus_minutes(-*minutes),
        };
        if session.contains(&at) {
            Some(at)
        } else {
            None
        }
    }
}

/// Signature of every scheduled function: context, trading api, market data.
pub type ScheduledFunction<C> =
    Box<dyn FnMut(&mut C, &mut TradingApi<'_>, &BarData<'_>) -> Result<(), AlgorithmError>>;

pub struct ScheduledEntry<C> {
    pub name: &'static str,
    pub date_rule: DateRule,
    pub time_rule: TimeRule,
    func: ScheduledFunction<C>,
}

/// Functions registered during initialization, in registration order.
pub struct Scheduler<C> {
    entries: Vec<ScheduledEntry<C>>,
}

impl<C> Scheduler<C> {
    pub fn register<F>(
        &mut self,
        calendar: &TradingCalendar,
        func: F,
        date_rule: DateRule,
        time_rule: TimeRule,
    ) -> Result<(), ScheduleError>
    where
        F: FnMut(&mut C, &mut TradingApi<'_>, &BarData<'_>) -> Result<(), AlgorithmError>
            + 'static,
    {
        date_rule.validate()?;
        time_rule.validate(calendar)?;
        let name = std::any::type_name::<F>();
        debug!(
            "SCHEDULER: Registered {} with {:?} and {:?}",
            name, date_rule, time_rule
        );
        self.entries.push(ScheduledEntry {
            name,
            date_rule,
            time_rule,
            func: Box::new(func),
        });
        Ok(())
    }

    /// Registered functions that fire within `session`, ordered by trigger time. Functions that
    /// trigger at the same time keep registration order.
    pub fn due(&self, calendar: &TradingCalendar, session: &Session) -> Vec<(DateTime, usize)> {
        let mut due = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if !entry.date_rule.should_trade(calendar, session.date) {
                continue;
            }
            match entry.time_rule.trigger(session) {
                Some(at) => due.push((at, idx)),
                None => warn!(
                    "SCHEDULER: Skipping {} on {}, {} minute offset is outside the session",
                    entry.name,
                    session.date,
                    entry.time_rule.minutes()
                ),
            }
        }
        //Stable so ties keep registration order
        due.sort_by_key(|(at, _)| *at);
        due
    }

    pub fn invoke(
        &mut self,
        idx: usize,
        context: &mut C,
        api: &mut TradingApi<'_>,
        data: &BarData<'_>,
    ) -> Option<Result<(), AlgorithmError>> {
        let entry = self.entries.get_mut(idx)?;
        Some((entry.func)(context, api, data))
    }

    pub fn name(&self, idx: usize) -> Option<&'static str> {
        self.entries.get(idx).map(|entry| entry.name)
    }

    pub fn entries(&self) -> &[ScheduledEntry<C>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
