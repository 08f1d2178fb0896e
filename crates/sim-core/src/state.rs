use crate::config::SimConfig;
use crate::observation::{Direction, Observation};
use crate::step::{StepOutcome, StepRecord};
use crate::trade::TradeRecord;

/// A flat book carries no entry fields at all; they only exist while short.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Flat,
    Short { entry_price: f64, entry_index: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    capital: f64,
    position: Position,
    completed_trades: u64,
    correct_predictions: u64,
    steps_seen: u64,
}

impl SimState {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            capital: config.initial_capital,
            position: Position::Flat,
            completed_trades: 0,
            correct_predictions: 0,
            steps_seen: 0,
        }
    }

    pub fn capital(&self) -> f64 {
        self.capital
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_short(&self) -> bool {
        matches!(self.position, Position::Short { .. })
    }

    pub fn completed_trades(&self) -> u64 {
        self.completed_trades
    }

    pub fn steps_seen(&self) -> u64 {
        self.steps_seen
    }

    /// Advances the machine by exactly one observation.
    ///
    /// The exit check runs before the entry check, and the entry check reads
    /// the post-exit position, so a forced close and a fresh short can both
    /// happen on the same bar.
    pub fn advance(&mut self, config: &SimConfig, observation: &Observation) -> StepOutcome {
        let mut closed_trade = None;
        if let Position::Short {
            entry_price,
            entry_index,
        } = self.position
        {
            if observation.index.saturating_sub(entry_index) >= config.holding_horizon {
                let profit_loss = (entry_price - observation.close) * config.trade_quantity;
                let exit_commission =
                    observation.close * config.trade_quantity * config.commission_rate;
                let net_pnl = profit_loss - exit_commission;

                self.capital += net_pnl;
                self.completed_trades += 1;
                self.position = Position::Flat;
                closed_trade = Some(TradeRecord {
                    entry_index,
                    exit_index: observation.index,
                    entry_price,
                    exit_price: observation.close,
                    net_pnl,
                });
            }
        }

        let mut opened_position = false;
        if self.position == Position::Flat && observation.predicted == Direction::Down {
            let entry_commission =
                observation.close * config.trade_quantity * config.commission_rate;

            self.capital -= entry_commission;
            self.position = Position::Short {
                entry_price: observation.close,
                entry_index: observation.index,
            };
            opened_position = true;
        }

        if observation.actual == Some(observation.predicted) {
            self.correct_predictions += 1;
        }

        // steps_seen moves before the snapshot is built, so the accuracy
        // denominator is never zero at read time.
        self.steps_seen += 1;

        let step = StepRecord {
            index: observation.index,
            ts_millis: observation.ts_millis,
            bid: observation.bid(),
            ask: observation.ask(),
            signal: observation.predicted,
            capital: self.capital,
            cumulative_pnl: self.capital - config.initial_capital,
            completed_trades: self.completed_trades,
            running_accuracy: self.correct_predictions as f64 / self.steps_seen as f64,
        };

        StepOutcome {
            step,
            closed_trade,
            opened_position,
        }
    }
}
