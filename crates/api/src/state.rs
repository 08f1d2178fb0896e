use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use runtime::tape::format_ts_millis;
use sim_core::{Observation, SimConfig, StepRecord};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartRunError {
    RunIdOverflow,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StreamEvent {
    Connected {
        run_id: u64,
    },
    PriceUpdate {
        bid: f64,
        ask: f64,
        signal: u8,
        earnings: f64,
        operations: u64,
        accuracy: f64,
        timestamp: Option<String>,
    },
    RunFailed {
        message: String,
    },
    RunComplete {
        steps: u64,
        trades: u64,
    },
}

impl StreamEvent {
    pub fn connected(run_id: u64) -> Self {
        Self::Connected { run_id }
    }

    pub fn price_update(step: &StepRecord) -> Self {
        Self::PriceUpdate {
            bid: step.bid,
            ask: step.ask,
            signal: step.signal.as_flag(),
            earnings: step.cumulative_pnl,
            operations: step.completed_trades,
            accuracy: step.running_accuracy,
            timestamp: step.ts_millis.and_then(format_ts_millis),
        }
    }

    pub fn run_failed(message: impl Into<String>) -> Self {
        Self::RunFailed {
            message: message.into(),
        }
    }

    pub fn run_complete(steps: u64, trades: u64) -> Self {
        Self::RunComplete { steps, trades }
    }
}

/// Shared server state: the preloaded tape, the default simulation settings,
/// and the pacing interval applied to every streaming run.
#[derive(Clone, Debug)]
pub struct AppState {
    tape: Arc<Vec<Observation>>,
    sim_config: SimConfig,
    pace: Duration,
    next_run_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(tape: Vec<Observation>, sim_config: SimConfig, pace: Duration) -> Self {
        Self {
            tape: Arc::new(tape),
            sim_config,
            pace,
            next_run_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn begin_run(&self) -> Result<u64, StartRunError> {
        let previous = self
            .next_run_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .map_err(|_| StartRunError::RunIdOverflow)?;

        Ok(previous + 1)
    }

    pub fn tape(&self) -> Arc<Vec<Observation>> {
        Arc::clone(&self.tape)
    }

    pub fn sim_config(&self) -> SimConfig {
        self.sim_config
    }

    pub fn pace(&self) -> Duration {
        self.pace
    }
}
