//! Generic types used across package

use std::collections::HashMap;
use std::ops::Deref;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::asset::Sid;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Price(f64);

impl Deref for Price {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Default for Price {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<Price> for f64 {
    fn from(v: Price) -> Self {
        v.0
    }
}

impl From<f64> for Price {
    fn from(v: f64) -> Self {
        Price(v)
    }
}

///Size of a position in a portfolio in percentage terms.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct PortfolioWeight(f64);

impl Deref for PortfolioWeight {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<PortfolioWeight> for f64 {
    fn from(v: PortfolioWeight) -> Self {
        v.0
    }
}

impl From<f64> for PortfolioWeight {
    fn from(v: f64) -> Self {
        PortfolioWeight(v)
    }
}

///Portfolio state in terms of percentage weight allocated to a security, keyed by [Sid].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PortfolioAllocation(HashMap<Sid, PortfolioWeight>);

impl PortfolioAllocation {
    pub fn get(&self, sid: &Sid) -> Option<&PortfolioWeight> {
        self.0.get(sid)
    }

    pub fn insert(&mut self, sid: impl Into<Sid>, value: impl Into<PortfolioWeight>) {
        self.0.insert(sid.into(), value.into());
    }

    //Sorted so that the output does not depend on HashMap ordering
    pub fn keys(&self) -> Vec<Sid> {
        self.0.keys().copied().sorted().collect_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sid, &PortfolioWeight)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn new() -> Self {
        Self(HashMap::new())
    }
}

impl<S, W> FromIterator<(S, W)> for PortfolioAllocation
where
    S: Into<Sid>,
    W: Into<PortfolioWeight>,
{
    fn from_iter<I: IntoIterator<Item = (S, W)>>(iter: I) -> Self {
        let mut allocation = PortfolioAllocation::new();
        for (sid, weight) in iter {
            allocation.insert(sid, weight);
        }
        allocation
    }
}
