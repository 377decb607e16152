//! Algorithms and the api they are written against.
//!
//! An algorithm is a context type implementing [Algorithm]. The driver calls
//! [Algorithm::initialize] exactly once with an [InitApi], which gives access to instrument lookup
//! and the scheduler. The value returned becomes the context of the run: the driver owns it and
//! passes it by mutable reference to every scheduled function, one call at a time.
//!
//! Scheduled functions receive a [TradingApi], the only way an algorithm can affect the
//! portfolio, and a [BarData] view of market data for the current session.

pub mod hello_world;

use derive_more::{Display, Error};
use log::debug;

use crate::asset::{Asset, AssetError, AssetFinder, Sid};
use crate::calendar::TradingCalendar;
use crate::clock::DateTime;
use crate::data::BarData;
use crate::optimize::{Constraint, Objective, OptimizeError, Optimizer};
use crate::schedule::{DateRule, ScheduleError, Scheduler, TimeRule};

#[derive(Debug, Display, Error)]
pub enum AlgorithmError {
    #[display("resolution failure: {_0}")]
    Resolution(AssetError),
    #[display("allocation failure: {_0}")]
    Allocation(OptimizeError),
    #[display("schedule error: {_0}")]
    Schedule(ScheduleError),
}

impl From<AssetError> for AlgorithmError {
    fn from(v: AssetError) -> Self {
        AlgorithmError::Resolution(v)
    }
}

impl From<OptimizeError> for AlgorithmError {
    fn from(v: OptimizeError) -> Self {
        AlgorithmError::Allocation(v)
    }
}

impl From<ScheduleError> for AlgorithmError {
    fn from(v: ScheduleError) -> Self {
        AlgorithmError::Schedule(v)
    }
}

pub trait Algorithm: Sized + 'static {
    /// Called once before any session. Errors here stop the run before it starts.
    fn initialize(api: &mut InitApi<'_, Self>) -> Result<Self, AlgorithmError>;

    /// Called at the start of every session, before any scheduled function.
    fn before_trading_start(&mut self, _data: &BarData<'_>) -> Result<(), AlgorithmError> {
        Ok(())
    }
}

/// Api available during [Algorithm::initialize].
pub struct InitApi<'a, C> {
    assets: &'a dyn AssetFinder,
    calendar: &'a TradingCalendar,
    scheduler: &'a mut Scheduler<C>,
}

impl<'a, C> InitApi<'a, C> {
    pub fn new(
        assets: &'a dyn AssetFinder,
        calendar: &'a TradingCalendar,
        scheduler: &'a mut Scheduler<C>,
    ) -> Self {
        Self {
            assets,
            calendar,
            scheduler,
        }
    }

    pub fn sid(&self, sid: u64) -> Result<Asset, AlgorithmError> {
        Ok(self.assets.resolve_sid(&Sid::from(sid))?)
    }

    pub fn symbol(&self, symbol: &str) -> Result<Asset, AlgorithmError> {
        Ok(self.assets.resolve_symbol(symbol)?)
    }

    pub fn schedule_function<F>(
        &mut self,
        func: F,
        date_rule: DateRule,
        time_rule: TimeRule,
    ) -> Result<(), AlgorithmError>
    where
        F: FnMut(&mut C, &mut TradingApi<'_>, &BarData<'_>) -> Result<(), AlgorithmError>
            + 'static,
    {
        Ok(self
            .scheduler
            .register(self.calendar, func, date_rule, time_rule)?)
    }
}

/// Api available to scheduled functions.
pub struct TradingApi<'a> {
    optimizer: &'a mut dyn Optimizer,
    now: DateTime,
}

impl<'a> TradingApi<'a> {
    pub fn new(optimizer: &'a mut dyn Optimizer, now: DateTime) -> Self {
        Self { optimizer, now }
    }

    /// Checks the request and hands it to the optimizer. Nothing is retried on failure.
    pub fn order_optimal_portfolio(
        &mut self,
        objective: Objective,
        constraints: Vec<Constraint>,
    ) -> Result<(), AlgorithmError> {
        objective.validate()?;
        for constraint in &constraints {
            constraint.validate()?;
        }
        debug!("ENGINE: Sending objective to optimizer at {}", self.now);
        self.optimizer
            .order_optimal_portfolio(&self.now, &objective, &constraints)?;
        Ok(())
    }

    pub fn get_datetime(&self) -> DateTime {
        self.now
    }
}
