use std::collections::HashMap;

use log::debug;
use rand::{thread_rng, Rng};
use rand_distr::{Distribution, Uniform};
use time::Date;

use crate::asset::Sid;
use crate::clock::Clock;

use super::{Bar, PriceSource};

// Calliope holds daily bars in memory. It is not a feed, everything is known before the run starts
// and lookups are keyed on session date.
#[derive(Clone, Debug, Default)]
pub struct Calliope {
    inner: HashMap<Date, HashMap<Sid, Bar>>,
}

impl Calliope {
    pub fn get_bars(&self, date: &Date) -> Option<Vec<(Sid, Bar)>> {
        let date_row = self.inner.get(date)?;
        Some(date_row.iter().map(|(k, v)| (*k, v.clone())).collect())
    }

    pub fn from_hashmap(inner: HashMap<Date, HashMap<Sid, Bar>>) -> Self {
        Self { inner }
    }

    /// Generates one bar per session on the clock for every sid with prices drawn uniformly from
    /// `price_range`.
    pub fn random(clock: &Clock, sids: Vec<Sid>, price_range: (f64, f64)) -> Self {
        let mut rng = thread_rng();
        Self::random_with_rng(clock, sids, price_range, &mut rng)
    }

    pub fn random_with_rng<R: Rng>(
        clock: &Clock,
        sids: Vec<Sid>,
        price_range: (f64, f64),
        rng: &mut R,
    ) -> Self {
        let low = price_range.0.min(price_range.1);
        let mut high = price_range.0.max(price_range.1);
        if high <= low {
            high = low + 1.0;
        }
        let price_dist = Uniform::new(low, high);
        let volume_dist = Uniform::new(100_000.0_f64, 1_000_000.0);

        let mut builder = CalliopeBuilder::new();
        for session in clock.borrow().peek() {
            for sid in &sids {
                let open = price_dist.sample(rng);
                let close = price_dist.sample(rng);
                let bar = Bar::new(
                    open,
                    open.max(close),
                    open.min(close),
                    close,
                    volume_dist.sample(rng).floor(),
                );
                builder.add_bar(session.date, *sid, bar);
            }
        }
        debug!("DATA: Generated bars for {:?} sids", sids.len());
        builder.build()
    }
}

impl PriceSource for Calliope {
    fn get_bar(&self, date: &Date, sid: &Sid) -> Option<&Bar> {
        self.inner.get(date)?.get(sid)
    }
}

pub struct CalliopeBuilder {
    inner: HashMap<Date, HashMap<Sid, Bar>>,
}

impl CalliopeBuilder {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    pub fn build(&mut self) -> Calliope {
        let inner = std::mem::take(&mut self.inner);
        Calliope::from_hashmap(inner)
    }

    pub fn add_bar(&mut self, date: Date, sid: impl Into<Sid>, bar: Bar) -> &mut Self {
        self.inner.entry(date).or_default().insert(sid.into(), bar);
        self
    }
}

impl Default for CalliopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
