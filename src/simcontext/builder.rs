use log::info;

use crate::algorithm::{Algorithm, AlgorithmError, InitApi};
use crate::asset::StaticAssetFinder;
use crate::calendar::TradingCalendar;
use crate::clock::Clock;
use crate::input::PriceSource;
use crate::optimize::Optimizer;
use crate::schedule::{ScheduleError, Scheduler};

use super::{RunReport, SimContext};

pub struct SimContextBuilder<O, P>
where
    O: Optimizer,
    P: PriceSource,
{
    clock: Option<Clock>,
    calendar: TradingCalendar,
    assets: StaticAssetFinder,
    optimizer: Option<O>,
    source: Option<P>,
}

impl<O, P> SimContextBuilder<O, P>
where
    O: Optimizer,
    P: PriceSource,
{
    pub fn with_clock(&mut self, clock: Clock) -> &mut Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_calendar(&mut self, calendar: TradingCalendar) -> &mut Self {
        self.calendar = calendar;
        self
    }

    pub fn with_assets(&mut self, assets: StaticAssetFinder) -> &mut Self {
        self.assets = assets;
        self
    }

    pub fn with_optimizer(&mut self, optimizer: O) -> &mut Self {
        self.optimizer = Some(optimizer);
        self
    }

    pub fn with_source(&mut self, source: P) -> &mut Self {
        self.source = Some(source);
        self
    }

    /// Runs [Algorithm::initialize]. No context is created if initialization fails, so nothing
    /// that was scheduled can ever run.
    ///
    /// Every session on the clock must be a session of the builder's calendar, with the same hours.
    /// A clock built from a different calendar fails with [ScheduleError::CalendarMismatch].
    pub fn init<A: Algorithm>(&mut self) -> Result<SimContext<A, O, P>, AlgorithmError> {
        let (Some(clock), Some(optimizer), Some(source)) =
            (self.clock.take(), self.optimizer.take(), self.source.take())
        else {
            panic!("SimContext must have clock, optimizer, and source");
        };

        //Rules are resolved against this calendar so the clock must agree with it
        for session in clock.borrow().peek() {
            if self.calendar.session(session.date) != Some(session) {
                return Err(ScheduleError::CalendarMismatch { date: session.date }.into());
            }
        }

        let mut scheduler = Scheduler::new();
        let algorithm = {
            let mut api = InitApi::new(&self.assets, &self.calendar, &mut scheduler);
            A::initialize(&mut api)?
        };
        info!(
            "ENGINE: Initialized algorithm with {:?} scheduled functions",
            scheduler.len()
        );

        Ok(SimContext {
            clock,
            calendar: self.calendar.clone(),
            scheduler,
            algorithm,
            optimizer,
            source,
            report: RunReport::default(),
            finished: false,
        })
    }

    pub fn new() -> Self {
        Self {
            clock: None,
            calendar: TradingCalendar::nyse(),
            assets: StaticAssetFinder::new(),
            optimizer: None,
            source: None,
        }
    }
}

impl<O, P> Default for SimContextBuilder<O, P>
where
    O: Optimizer,
    P: PriceSource,
{
    fn default() -> Self {
        Self::new()
    }
}
