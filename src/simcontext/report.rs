use serde::Serialize;

use crate::clock::DateTime;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Outcome {
    Completed,
    Failed(String),
}

/// Name recorded when [Algorithm::before_trading_start](crate::algorithm::Algorithm::before_trading_start)
/// fails. Successful calls are not recorded.
pub const BEFORE_TRADING_START: &str = "before_trading_start";

/// Single call of a scheduled function.
#[derive(Clone, Debug, Serialize)]
pub struct Invocation {
    pub function: &'static str,
    pub at: DateTime,
    pub outcome: Outcome,
}

/// What happened during a run. Populated by the driver, the algorithm cannot write to it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub sessions: usize,
    pub invocations: Vec<Invocation>,
}

impl RunReport {
    pub fn failures(&self) -> Vec<&Invocation> {
        self.invocations
            .iter()
            .filter(|invocation| matches!(invocation.outcome, Outcome::Failed(_)))
            .collect()
    }

    pub fn invocations_of(&self, function: &str) -> Vec<&Invocation> {
        self.invocations
            .iter()
            .filter(|invocation| invocation.function.ends_with(function))
            .collect()
    }
}
