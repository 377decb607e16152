//! Instrument references and lookup.
//!
//! Algorithms never construct an [Asset] themselves. They ask the [AssetFinder] provided during
//! initialization to resolve an identifier and keep the returned reference for the whole run.

use std::collections::HashMap;
use std::fmt;

use derive_more::{Display, Error};
use log::debug;
use serde::{Deserialize, Serialize};

/// Numeric security identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Sid(u64);

impl Sid {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Sid {
    fn from(v: u64) -> Self {
        Sid(v)
    }
}

impl From<Sid> for u64 {
    fn from(v: Sid) -> Self {
        v.0
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sid({})", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Asset {
    pub sid: Sid,
    pub symbol: String,
    pub exchange: String,
    pub tradable: bool,
}

impl Asset {
    pub fn equity(sid: impl Into<Sid>, symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            symbol: symbol.into(),
            exchange: exchange.into(),
            tradable: true,
        }
    }

    pub fn untradable(mut self) -> Self {
        self.tradable = false;
        self
    }
}

#[derive(Debug, Display, Error)]
pub enum AssetError {
    #[display("no asset with sid {sid}")]
    UnknownSid { sid: u64 },
    #[display("no asset with symbol {symbol}")]
    UnknownSymbol { symbol: String },
    #[display("{symbol} (sid {sid}) is not tradable")]
    Untradable { sid: u64, symbol: String },
}

/// Maps identifiers to instrument references.
///
/// Implementors only provide the raw lookups, the provided `resolve_*` methods enforce that the
/// asset can actually be traded.
pub trait AssetFinder {
    fn lookup_sid(&self, sid: &Sid) -> Option<&Asset>;
    fn lookup_symbol(&self, symbol: &str) -> Option<&Asset>;

    fn resolve_sid(&self, sid: &Sid) -> Result<Asset, AssetError> {
        let asset = self
            .lookup_sid(sid)
            .ok_or(AssetError::UnknownSid { sid: sid.id() })?;
        check_tradable(asset)
    }

    fn resolve_symbol(&self, symbol: &str) -> Result<Asset, AssetError> {
        let asset = self
            .lookup_symbol(symbol)
            .ok_or_else(|| AssetError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;
        check_tradable(asset)
    }
}

fn check_tradable(asset: &Asset) -> Result<Asset, AssetError> {
    if !asset.tradable {
        return Err(AssetError::Untradable {
            sid: asset.sid.id(),
            symbol: asset.symbol.clone(),
        });
    }
    debug!("ASSETS: Resolved {} to {}", asset.sid, asset.symbol);
    Ok(asset.clone())
}

/// Fixed universe of assets held in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticAssetFinder {
    by_sid: HashMap<Sid, Asset>,
    by_symbol: HashMap<String, Sid>,
}

impl StaticAssetFinder {
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.add_asset(asset);
        self
    }

    pub fn add_asset(&mut self, asset: Asset) {
        //A replaced sid gives up its old symbol
        if let Some(old) = self.by_sid.get(&asset.sid) {
            if old.symbol != asset.symbol && self.by_symbol.get(&old.symbol) == Some(&asset.sid) {
                self.by_symbol.remove(&old.symbol);
            }
        }
        //A symbol reassigned to a new sid points at the latest one
        self.by_symbol.insert(asset.symbol.clone(), asset.sid);
        self.by_sid.insert(asset.sid, asset);
    }

    pub fn sids(&self) -> Vec<Sid> {
        let mut sids: Vec<Sid> = self.by_sid.keys().copied().collect();
        sids.sort();
        sids
    }

    pub fn len(&self) -> usize {
        self.by_sid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sid.is_empty()
    }

    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetFinder for StaticAssetFinder {
    fn lookup_sid(&self, sid: &Sid) -> Option<&Asset> {
        self.by_sid.get(sid)
    }

    fn lookup_symbol(&self, symbol: &str) -> Option<&Asset> {
        let sid = self.by_symbol.get(symbol)?;
        self.by_sid.get(sid)
    }
}
