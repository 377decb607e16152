//! Price data used by algorithms through [BarData](crate::data::BarData).

pub mod calliope;

pub use calliope::{Calliope, CalliopeBuilder};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::asset::Sid;
use crate::types::Price;

/// Daily bar for a single security.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Bar {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume,
        }
    }
}

/// Source of bars by session date.
///
/// A missing bar means the security did not trade in that session.
pub trait PriceSource {
    fn get_bar(&self, date: &Date, sid: &Sid) -> Option<&Bar>;
}
