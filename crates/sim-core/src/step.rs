use crate::observation::Direction;
use crate::trade::TradeRecord;

/// Account snapshot emitted once per processed observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub index: u64,
    pub ts_millis: Option<u64>,
    pub bid: f64,
    pub ask: f64,
    pub signal: Direction,
    pub capital: f64,
    pub cumulative_pnl: f64,
    pub completed_trades: u64,
    pub running_accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub step: StepRecord,
    pub closed_trade: Option<TradeRecord>,
    pub opened_position: bool,
}
