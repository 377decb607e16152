mod builder;
mod report;

pub use builder::SimContextBuilder;
pub use report::{Invocation, Outcome, RunReport, BEFORE_TRADING_START};

use log::{info, warn};

use crate::algorithm::{Algorithm, TradingApi};
use crate::calendar::{Session, TradingCalendar};
use crate::clock::Clock;
use crate::data::BarData;
use crate::input::PriceSource;
use crate::optimize::Optimizer;
use crate::schedule::Scheduler;

///Provides context for a single run of an algorithm. Once a run has started, all communication
///with the components of a simulation should happen through this context.
///
///The context owns the algorithm state and everything the algorithm touches. Callbacks run one at
///a time on the calling thread, in session order and then in trigger-time order within a session.
pub struct SimContext<A, O, P>
where
    A: Algorithm,
    O: Optimizer,
    P: PriceSource,
{
    clock: Clock,
    calendar: TradingCalendar,
    scheduler: Scheduler<A>,
    algorithm: A,
    optimizer: O,
    source: P,
    report: RunReport,
    finished: bool,
}

impl<A, O, P> SimContext<A, O, P>
where
    A: Algorithm,
    O: Optimizer,
    P: PriceSource,
{
    pub fn run(&mut self) -> &RunReport {
        if self.finished {
            return &self.report;
        }

        loop {
            let now = self.clock.borrow().now();
            let Some(session) = now else {
                break;
            };
            self.run_session(&session);

            if !self.clock.borrow().has_next() {
                break;
            }
            self.clock.borrow_mut().tick();
        }

        self.finished = true;
        info!(
            "ENGINE: Finished run over {:?} sessions with {:?} failed invocations",
            self.report.sessions,
            self.report.failures().len()
        );
        &self.report
    }

    fn run_session(&mut self, session: &Session) {
        self.report.sessions += 1;

        let data = BarData::new(&self.source, *session, session.open);
        if let Err(e) = self.algorithm.before_trading_start(&data) {
            warn!("ENGINE: before_trading_start failed on {}: {}", session.date, e);
            self.report.invocations.push(Invocation {
                function: BEFORE_TRADING_START,
                at: session.open,
                outcome: Outcome::Failed(e.to_string()),
            });
        }

        for (at, idx) in self.scheduler.due(&self.calendar, session) {
            let data = BarData::new(&self.source, *session, at);
            let mut api = TradingApi::new(&mut self.optimizer, at);
            let Some(res) = self
                .scheduler
                .invoke(idx, &mut self.algorithm, &mut api, &data)
            else {
                continue;
            };

            let function = self.scheduler.name(idx).unwrap_or("unknown");
            let outcome = match res {
                Ok(()) => Outcome::Completed,
                Err(e) => {
                    //Failure is local to this invocation, the next scheduled run tries again
                    warn!("ENGINE: {} failed at {}: {}", function, at, e);
                    Outcome::Failed(e.to_string())
                }
            };
            self.report.invocations.push(Invocation {
                function,
                at,
                outcome,
            });
        }
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }
}
