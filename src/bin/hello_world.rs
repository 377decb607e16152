use std::env;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use hestia::algorithm::hello_world::HelloWorld;
use hestia::clock::ClockBuilder;
use hestia::config::RunConfig;
use hestia::input::Calliope;
use hestia::optimize::RecordingOptimizer;
use hestia::simcontext::SimContextBuilder;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    let calendar = config.calendar()?;
    let clock = ClockBuilder::with_length_in_days(config.start_date()?, config.length_in_days)
        .with_calendar(&calendar)
        .build();

    let assets = config.asset_finder();
    let source = match config.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            Calliope::random_with_rng(&clock, assets.sids(), config.price_range, &mut rng)
        }
        None => Calliope::random(&clock, assets.sids(), config.price_range),
    };

    info!("Running Hello World over {:?} sessions", clock.borrow().len());
    let mut sim = SimContextBuilder::new()
        .with_clock(clock)
        .with_calendar(calendar)
        .with_assets(assets)
        .with_optimizer(RecordingOptimizer::new())
        .with_source(source)
        .init::<HelloWorld>()
        .context("algorithm failed to initialize")?;

    let report = sim.run();
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
