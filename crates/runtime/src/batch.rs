use sim_core::{Observation, SimConfig, SimState, StepRecord, TradeRecord};

use crate::error::RunError;
use crate::tape::{observation_from_row, TapeRow};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub steps: Vec<StepRecord>,
    pub trades: Vec<TradeRecord>,
    pub final_state: SimState,
}

/// Drives the machine over a pre-validated sequence to completion.
pub fn run_batch(config: &SimConfig, observations: &[Observation]) -> BatchOutcome {
    let mut state = SimState::new(config);
    let mut steps = Vec::with_capacity(observations.len());
    let mut trades = Vec::new();

    for observation in observations {
        let outcome = state.advance(config, observation);
        if let Some(trade) = outcome.closed_trade {
            trades.push(trade);
        }
        steps.push(outcome.step);
    }

    BatchOutcome {
        steps,
        trades,
        final_state: state,
    }
}

/// Validates every raw row before the first step runs, so a malformed row
/// aborts the whole run and no partial prefix of results is ever returned.
pub fn run_batch_rows(config: &SimConfig, rows: &[TapeRow]) -> Result<BatchOutcome, RunError> {
    let mut observations = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        observations.push(observation_from_row(index as u64, row)?);
    }

    Ok(run_batch(config, &observations))
}
