//! Market-data accessor passed to every scheduled function.

use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::calendar::Session;
use crate::clock::DateTime;
use crate::input::{Bar, PriceSource};
use crate::types::Price;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    /// Last traded price, the close of the session bar.
    Price,
    Volume,
}

/// View of the price source at the time a callback runs.
///
/// Lookups return the bar of the current session so a callback never sees later sessions.
pub struct BarData<'a> {
    source: &'a dyn PriceSource,
    session: Session,
    now: DateTime,
}

impl<'a> BarData<'a> {
    pub fn new(source: &'a dyn PriceSource, session: Session, now: DateTime) -> Self {
        Self {
            source,
            session,
            now,
        }
    }

    fn bar(&self, asset: &Asset) -> Option<&'a Bar> {
        self.source.get_bar(&self.session.date, &asset.sid)
    }

    pub fn current(&self, asset: &Asset, field: BarField) -> Option<f64> {
        let bar = self.bar(asset)?;
        let value = match field {
            BarField::Open => *bar.open,
            BarField::High => *bar.high,
            BarField::Low => *bar.low,
            BarField::Close | BarField::Price => *bar.close,
            BarField::Volume => bar.volume,
        };
        Some(value)
    }

    pub fn current_price(&self, asset: &Asset) -> Option<Price> {
        self.bar(asset).map(|bar| bar.close)
    }

    pub fn current_volume(&self, asset: &Asset) -> Option<f64> {
        self.bar(asset).map(|bar| bar.volume)
    }

    /// Tradable asset with a bar in the current session.
    pub fn can_trade(&self, asset: &Asset) -> bool {
        asset.tradable && self.bar(asset).is_some()
    }

    pub fn get_datetime(&self) -> DateTime {
        self.now
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
