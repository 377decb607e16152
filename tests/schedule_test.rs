use time::macros::{date, time};

use hestia::algorithm::{Algorithm, AlgorithmError, InitApi, TradingApi};
use hestia::asset::{Asset, StaticAssetFinder};
use hestia::calendar::TradingCalendar;
use hestia::clock::{ClockBuilder, DateTime};
use hestia::data::BarData;
use hestia::input::{Bar, CalliopeBuilder};
use hestia::optimize::{Constraint, Objective, OptimizeError, Optimizer, RecordingOptimizer};
use hestia::schedule::ScheduleError;
use hestia::simcontext::{Outcome, SimContextBuilder, BEFORE_TRADING_START};

/// Rejects the first `reject` requests, then accepts everything.
struct FlakyOptimizer {
    reject: usize,
    accepted: Vec<DateTime>,
}

impl Optimizer for FlakyOptimizer {
    fn order_optimal_portfolio(
        &mut self,
        now: &DateTime,
        _objective: &Objective,
        _constraints: &[Constraint],
    ) -> Result<(), OptimizeError> {
        if self.reject > 0 {
            self.reject -= 1;
            return Err(OptimizeError::Infeasible {
                reason: "no liquidity".to_string(),
            });
        }
        self.accepted.push(*now);
        Ok(())
    }
}

struct Weekly {
    asset: Asset,
    sessions_seen: usize,
    prices: Vec<f64>,
    calls: Vec<&'static str>,
}

fn open_weekly(
    context: &mut Weekly,
    api: &mut TradingApi<'_>,
    data: &BarData<'_>,
) -> Result<(), AlgorithmError> {
    context.calls.push("open_weekly");
    if let Some(price) = data.current_price(&context.asset) {
        context.prices.push(*price);
    }
    let constraints = vec![
        Constraint::max_gross_exposure(1.0),
        Constraint::with_equal_bounds(-0.5, 0.5),
    ];
    api.order_optimal_portfolio(Objective::target_weights([(context.asset.sid, 0.5)]), constraints)
}

fn close_month_end(
    context: &mut Weekly,
    api: &mut TradingApi<'_>,
    _data: &BarData<'_>,
) -> Result<(), AlgorithmError> {
    context.calls.push("close_month_end");
    api.order_optimal_portfolio(Objective::target_weights(Vec::<(u64, f64)>::new()), vec![])
}

fn broken(
    context: &mut Weekly,
    api: &mut TradingApi<'_>,
    _data: &BarData<'_>,
) -> Result<(), AlgorithmError> {
    context.calls.push("broken");
    api.order_optimal_portfolio(Objective::target_weights([(context.asset.sid, 3.0)]), vec![])
}

impl Algorithm for Weekly {
    fn initialize(api: &mut InitApi<'_, Self>) -> Result<Self, AlgorithmError> {
        let asset = api.symbol("AAPL")?;
        api.schedule_function(
            close_month_end,
            hestia::schedule::DateRule::month_end(0),
            hestia::schedule::TimeRule::market_close(0, 30),
        )?;
        api.schedule_function(
            open_weekly,
            hestia::schedule::DateRule::week_start(0),
            hestia::schedule::TimeRule::market_open(1, 30),
        )?;
        Ok(Self {
            asset,
            sessions_seen: 0,
            prices: Vec::new(),
            calls: Vec::new(),
        })
    }

    fn before_trading_start(&mut self, _data: &BarData<'_>) -> Result<(), AlgorithmError> {
        self.sessions_seen += 1;
        Ok(())
    }
}

fn assets() -> StaticAssetFinder {
    StaticAssetFinder::new().with_asset(Asset::equity(24, "AAPL", "NASDAQ"))
}

#[test]
fn test_that_weekly_and_month_end_rules_fire_on_expected_sessions() {
    //Tue 19/1/21 to Fri 5/2/21, Monday 18th is a holiday
    let calendar = TradingCalendar::nyse().with_holidays(vec![date!(2021 - 01 - 18)]);
    let clock = ClockBuilder::with_length_in_dates(date!(2021 - 01 - 19), date!(2021 - 02 - 05))
        .with_calendar(&calendar)
        .build();

    let mut source = CalliopeBuilder::new();
    for session in clock.borrow().peek() {
        source.add_bar(session.date, 24, Bar::new(100.0, 101.0, 99.0, 100.5, 1000.0));
    }

    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_calendar(calendar.clone())
        .with_assets(assets())
        .with_optimizer(RecordingOptimizer::new())
        .with_source(source.build())
        .init::<Weekly>()
        .unwrap();
    let report = sim.run().clone();

    assert_eq!(report.sessions, 14);
    assert_eq!(sim.algorithm().sessions_seen, 14);
    //Tue 19th (holiday Monday), Mon 25th, Mon 1st, then Fri 29th for month end
    assert_eq!(
        sim.algorithm().calls,
        vec!["open_weekly", "open_weekly", "close_month_end", "open_weekly"]
    );
    assert_eq!(sim.algorithm().prices, vec![100.5, 100.5, 100.5]);

    let month_end = report.invocations_of("close_month_end");
    assert_eq!(month_end.len(), 1);
    let session = calendar.session(date!(2021 - 01 - 29)).unwrap();
    assert_eq!(*session.close - *month_end[0].at, 30 * 60);

    let requests = sim.optimizer().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].constraints.len(), 2);
    assert!(requests[2].constraints.is_empty());
}

#[test]
fn test_that_allocation_failure_does_not_stop_run() {
    let calendar = TradingCalendar::nyse();
    //Mon 4/1/21 to Fri 15/1/21, two week starts
    let clock = ClockBuilder::with_length_in_dates(date!(2021 - 01 - 04), date!(2021 - 01 - 15))
        .with_calendar(&calendar)
        .build();

    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_assets(assets())
        .with_optimizer(FlakyOptimizer {
            reject: 1,
            accepted: Vec::new(),
        })
        .with_source(CalliopeBuilder::new().build())
        .init::<Weekly>()
        .unwrap();
    let report = sim.run().clone();

    let weekly = report.invocations_of("open_weekly");
    assert_eq!(weekly.len(), 2);
    assert!(matches!(weekly[0].outcome, Outcome::Failed(_)));
    assert_eq!(weekly[1].outcome, Outcome::Completed);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(sim.optimizer().accepted.len(), 1);
    //No bars so nothing recorded, but the function still ran
    assert!(sim.algorithm().prices.is_empty());
}

struct EarlyClose;

fn first_minute(
    _context: &mut EarlyClose,
    _api: &mut TradingApi<'_>,
    _data: &BarData<'_>,
) -> Result<(), AlgorithmError> {
    Ok(())
}

impl Algorithm for EarlyClose {
    fn initialize(api: &mut InitApi<'_, Self>) -> Result<Self, AlgorithmError> {
        api.schedule_function(
            first_minute,
            hestia::schedule::DateRule::every_day(),
            hestia::schedule::TimeRule::market_open(0, 1),
        )?;
        api.schedule_function(
            |_, _, _| Ok(()),
            hestia::schedule::DateRule::every_day(),
            hestia::schedule::TimeRule::market_open(1, 0),
        )?;
        Ok(EarlyClose)
    }
}

#[test]
fn test_that_invalid_objective_is_recorded_every_session() {
    struct Invalid {
        inner: Weekly,
    }

    impl Algorithm for Invalid {
        fn initialize(api: &mut InitApi<'_, Self>) -> Result<Self, AlgorithmError> {
            let asset = api.sid(24)?;
            api.schedule_function(
                |ctx: &mut Invalid, api, data| broken(&mut ctx.inner, api, data),
                hestia::schedule::DateRule::every_day(),
                hestia::schedule::TimeRule::market_open(1, 0),
            )?;
            Ok(Invalid {
                inner: Weekly {
                    asset,
                    sessions_seen: 0,
                    prices: Vec::new(),
                    calls: Vec::new(),
                },
            })
        }
    }

    let calendar = TradingCalendar::nyse();
    let clock = ClockBuilder::with_length_in_days(date!(2021 - 01 - 04), 4)
        .with_calendar(&calendar)
        .build();
    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_assets(assets())
        .with_optimizer(RecordingOptimizer::new())
        .with_source(CalliopeBuilder::new().build())
        .init::<Invalid>()
        .unwrap();
    let report = sim.run().clone();

    assert_eq!(report.failures().len(), 5);
    assert_eq!(sim.algorithm().inner.calls.len(), 5);
    assert!(sim.optimizer().requests().is_empty());
}

#[test]
fn test_that_trigger_past_early_close_is_skipped_for_that_session() {
    let calendar = TradingCalendar::nyse().with_early_close(date!(2021 - 01 - 05), time!(9:31));
    let clock = ClockBuilder::with_length_in_dates(date!(2021 - 01 - 04), date!(2021 - 01 - 06))
        .with_calendar(&calendar)
        .build();
    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_calendar(calendar.clone())
        .with_optimizer(RecordingOptimizer::new())
        .with_source(CalliopeBuilder::new().build())
        .init::<EarlyClose>()
        .unwrap();
    let report = sim.run().clone();

    assert_eq!(report.sessions, 3);
    //One minute fits the shortened session, an hour does not
    assert_eq!(report.invocations.len(), 5);
    assert_eq!(report.invocations_of("first_minute").len(), 3);
    assert!(report.failures().is_empty());

    let session = calendar.session(date!(2021 - 01 - 05)).unwrap();
    let on_early_close: Vec<_> = report
        .invocations
        .iter()
        .filter(|invocation| session.contains(&invocation.at))
        .collect();
    assert_eq!(on_early_close.len(), 1);
    assert!(on_early_close[0].function.ends_with("first_minute"));
}

struct Gapped {
    runs: usize,
}

fn count_run(
    context: &mut Gapped,
    _api: &mut TradingApi<'_>,
    _data: &BarData<'_>,
) -> Result<(), AlgorithmError> {
    context.runs += 1;
    Ok(())
}

impl Algorithm for Gapped {
    fn initialize(api: &mut InitApi<'_, Self>) -> Result<Self, AlgorithmError> {
        api.schedule_function(
            count_run,
            hestia::schedule::DateRule::every_day(),
            hestia::schedule::TimeRule::market_open(1, 30),
        )?;
        Ok(Gapped { runs: 0 })
    }

    fn before_trading_start(&mut self, data: &BarData<'_>) -> Result<(), AlgorithmError> {
        //Fails on the second session only
        if data.session().date == date!(2021 - 01 - 05) {
            return Err(OptimizeError::Infeasible {
                reason: "no data".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[test]
fn test_that_failed_before_trading_start_is_recorded() {
    let calendar = TradingCalendar::nyse();
    let clock = ClockBuilder::with_length_in_dates(date!(2021 - 01 - 04), date!(2021 - 01 - 06))
        .with_calendar(&calendar)
        .build();
    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_optimizer(RecordingOptimizer::new())
        .with_source(CalliopeBuilder::new().build())
        .init::<Gapped>()
        .unwrap();
    let report = sim.run().clone();

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].function, BEFORE_TRADING_START);
    let session = calendar.session(date!(2021 - 01 - 05)).unwrap();
    assert_eq!(failures[0].at, session.open);
    //Scheduled functions still run that session
    assert_eq!(sim.algorithm().runs, 3);
    assert_eq!(report.invocations_of("count_run").len(), 3);
}

#[test]
fn test_that_clock_from_other_calendar_is_rejected() {
    //Clock knows about the holiday on Monday 18th, the default calendar does not
    let calendar = TradingCalendar::nyse().with_holidays(vec![date!(2021 - 01 - 18)]);
    let clock = ClockBuilder::with_length_in_dates(date!(2021 - 01 - 18), date!(2021 - 01 - 22))
        .with_calendar(&calendar)
        .build();

    let res = SimContextBuilder::new()
        .with_clock(clock.clone())
        .with_assets(assets())
        .with_optimizer(RecordingOptimizer::new())
        .with_source(CalliopeBuilder::new().build())
        .init::<Weekly>();
    assert!(matches!(
        res,
        Err(AlgorithmError::Schedule(ScheduleError::CalendarMismatch { .. }))
    ));

    //Same clock with the matching calendar fires on Tuesday 19th
    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_calendar(calendar)
        .with_assets(assets())
        .with_optimizer(RecordingOptimizer::new())
        .with_source(CalliopeBuilder::new().build())
        .init::<Weekly>()
        .unwrap();
    let report = sim.run().clone();
    assert_eq!(report.sessions, 4);
    assert_eq!(report.invocations_of("open_weekly").len(), 1);
}
