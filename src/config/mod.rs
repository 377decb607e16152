//! Run configuration read from JSON.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use time::macros::format_description;
use time::Date;

use crate::algorithm::hello_world::AAPL_SID;
use crate::asset::{Asset, StaticAssetFinder};
use crate::calendar::TradingCalendar;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AssetConfig {
    pub sid: u64,
    pub symbol: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_tradable")]
    pub tradable: bool,
}

fn default_exchange() -> String {
    "NASDAQ".to_string()
}

fn default_tradable() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// First day of the run, `YYYY-MM-DD`.
    pub start: String,
    pub length_in_days: i64,
    pub holidays: Vec<String>,
    pub assets: Vec<AssetConfig>,
    /// Fixes generated prices when set.
    pub seed: Option<u64>,
    pub price_range: (f64, f64),
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start: "2021-01-04".to_string(),
            length_in_days: 365,
            holidays: Vec::new(),
            assets: vec![AssetConfig {
                sid: AAPL_SID,
                symbol: "AAPL".to_string(),
                exchange: default_exchange(),
                tradable: true,
            }],
            seed: None,
            price_range: (90.0, 100.0),
        }
    }
}

fn parse_date(value: &str) -> Result<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, format).with_context(|| format!("invalid date {:?}", value))
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("could not read config {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(contents).context("malformed config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        parse_date(&self.start)?;
        for holiday in &self.holidays {
            parse_date(holiday)?;
        }
        if self.length_in_days < 0 {
            bail!("length_in_days cannot be negative, got {}", self.length_in_days);
        }
        let (low, high) = self.price_range;
        if !low.is_finite() || !high.is_finite() || low <= 0.0 || low >= high {
            bail!("price_range must be positive and increasing, got {:?}", self.price_range);
        }
        Ok(())
    }

    pub fn start_date(&self) -> Result<Date> {
        parse_date(&self.start)
    }

    pub fn calendar(&self) -> Result<TradingCalendar> {
        let holidays = self
            .holidays
            .iter()
            .map(|holiday| parse_date(holiday))
            .collect::<Result<Vec<Date>>>()?;
        Ok(TradingCalendar::nyse().with_holidays(holidays))
    }

    pub fn asset_finder(&self) -> StaticAssetFinder {
        let mut finder = StaticAssetFinder::new();
        for config in &self.assets {
            let mut asset = Asset::equity(config.sid, &config.symbol, &config.exchange);
            asset.tradable = config.tradable;
            finder.add_asset(asset);
        }
        finder
    }
}
