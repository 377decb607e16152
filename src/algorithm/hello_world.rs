//! Holds 100% of the portfolio in AAPL, rebalancing every session 90 minutes after the open.

use crate::asset::Asset;
use crate::data::BarData;
use crate::optimize::Objective;
use crate::schedule::{DateRule, TimeRule};

use super::{Algorithm, AlgorithmError, InitApi, TradingApi};

pub const AAPL_SID: u64 = 24;

pub struct HelloWorld {
    pub aapl: Asset,
}

impl Algorithm for HelloWorld {
    fn initialize(api: &mut InitApi<'_, Self>) -> Result<Self, AlgorithmError> {
        let aapl = api.sid(AAPL_SID)?;

        api.schedule_function(
            rebalance,
            DateRule::every_day(),
            TimeRule::market_open(1, 30),
        )?;

        Ok(Self { aapl })
    }
}

pub fn target(context: &HelloWorld) -> Objective {
    Objective::target_weights([(context.aapl.sid, 1.0)])
}

pub fn rebalance(
    context: &mut HelloWorld,
    api: &mut TradingApi<'_>,
    _data: &BarData<'_>,
) -> Result<(), AlgorithmError> {
    //No constraints, the optimizer just keeps us fully in AAPL
    let constraints = Vec::new();
    api.order_optimal_portfolio(target(context), constraints)
}
