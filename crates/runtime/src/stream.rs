use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sim_core::{SimConfig, SimState, StepRecord};
use tokio::sync::mpsc;

use crate::error::RunError;
use crate::journal::{JournalEvent, JournalEventKind, JournalWriter};
use crate::source::ObservationSource;

pub const DEFAULT_SINK_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkMessage {
    Step(StepRecord),
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Delivery handle for one streaming run. The bounded channel gives the run
/// backpressure against a slow consumer, and a dropped receiver is the
/// disconnect signal.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    updates: mpsc::Sender<SinkMessage>,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<SinkMessage>) {
        let (updates, receiver) = mpsc::channel(capacity);
        (Self { updates }, receiver)
    }

    pub async fn send(&self, step: StepRecord) -> Result<(), SinkClosed> {
        self.updates
            .send(SinkMessage::Step(step))
            .await
            .map_err(|_| SinkClosed)
    }

    /// Best effort; a consumer that is already gone simply misses the notice.
    pub async fn notify_error(&self, message: &str) {
        let _ = self
            .updates
            .send(SinkMessage::Failed {
                message: message.to_string(),
            })
            .await;
    }

    pub fn is_closed(&self) -> bool {
        self.updates.is_closed()
    }
}

/// Cooperative cancellation signal shared between the consumer-facing side
/// and the driver loop.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stopped: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEnd {
    Exhausted { steps: u64, trades: u64 },
    Disconnected { steps: u64 },
    Failed(RunError),
}

/// Advances the machine one observation at a time, publishing each snapshot
/// to the sink and suspending for the pacing interval between steps.
///
/// Cancellation is checked before the next observation is pulled; a step that
/// already started always runs to completion. A closed sink or a raised stop
/// flag is an expected termination, not a failure.
pub async fn run_stream<S, J>(
    config: SimConfig,
    mut source: S,
    sink: ChannelSink,
    pace: Duration,
    stop: StopFlag,
    mut journal: J,
) -> StreamEnd
where
    S: ObservationSource,
    J: JournalWriter,
{
    let mut state = SimState::new(&config);
    let mut delivered = 0u64;
    journal.write(JournalEvent::new(0, JournalEventKind::RunStarted, None));

    loop {
        if stop.is_stopped() || sink.is_closed() {
            journal.write(JournalEvent::new(
                delivered,
                JournalEventKind::ConsumerDisconnected,
                None,
            ));
            return StreamEnd::Disconnected { steps: delivered };
        }

        let observation = match source.next_observation() {
            Ok(Some(observation)) => observation,
            Ok(None) => {
                journal.write(JournalEvent::new(
                    delivered,
                    JournalEventKind::TapeExhausted,
                    None,
                ));
                return StreamEnd::Exhausted {
                    steps: delivered,
                    trades: state.completed_trades(),
                };
            }
            Err(err) => {
                let err = RunError::from(err);
                sink.notify_error(&err.to_string()).await;
                journal.write(JournalEvent::new(
                    delivered,
                    JournalEventKind::RunFailed,
                    Some(err.to_string()),
                ));
                return StreamEnd::Failed(err);
            }
        };

        let outcome = state.advance(&config, &observation);
        if outcome.opened_position {
            journal.write(JournalEvent::new(
                observation.index,
                JournalEventKind::PositionOpened,
                None,
            ));
        }
        if outcome.closed_trade.is_some() {
            journal.write(JournalEvent::new(
                observation.index,
                JournalEventKind::PositionClosed,
                None,
            ));
        }

        if sink.send(outcome.step).await.is_err() {
            journal.write(JournalEvent::new(
                delivered,
                JournalEventKind::ConsumerDisconnected,
                None,
            ));
            return StreamEnd::Disconnected { steps: delivered };
        }
        delivered += 1;

        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    }
}
