//! # What is Hestia?
//!
//! Hestia runs trading algorithms that are written as a pair of callbacks: one run once at the
//! start to set up state and register a schedule, and one or more run on that schedule during
//! each trading session. The bundled [Hello World](algorithm::hello_world) algorithm holds 100%
//! of the portfolio in a single security and resubmits that target every day, 90 minutes after
//! the open.
//!
//! A run is composed of:
//!     * Algorithm - the context type and its callbacks, see [algorithm].
//!     * Calendar - decides which days are sessions and when they open and close.
//!     * Clock - the sessions of the run, visited in order.
//!     * Scheduler - date and time rules deciding when each callback fires.
//!     * Price source - daily bars exposed to callbacks through [BarData](data::BarData).
//!     * Optimizer - turns an objective and constraints into orders.
//!
//! Hestia does not contain an optimizer, an order book, or any execution logic. The
//! [Optimizer](optimize::Optimizer) trait is the boundary: algorithms describe the portfolio they
//! want and everything that happens afterwards belongs to the implementation on the other side.
//! [RecordingOptimizer](optimize::RecordingOptimizer) is a paper implementation that keeps every
//! request, which is sufficient for checking that an algorithm asks for the right thing at the
//! right time.
//!
//! # Execution
//!
//! Everything runs on one thread. The driver, [SimContext](simcontext::SimContext), owns the
//! algorithm context and calls one callback at a time. Within a session, functions fire in
//! trigger-time order and each registered function fires at most once. Days on which the market
//! is closed are never part of the clock so no callback fires on them.
//!
//! Errors are never retried. A failure during initialization means no context is created and
//! nothing runs. A failure inside a scheduled function is logged and recorded in the
//! [RunReport](simcontext::RunReport) and the run continues with the next scheduled call.

pub mod algorithm;
pub mod asset;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod data;
pub mod input;
pub mod optimize;
pub mod schedule;
pub mod simcontext;
pub mod types;
