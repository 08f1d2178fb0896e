use serde::Serialize;
use sim_core::{SimConfig, StepRecord, TradeRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub final_capital: f64,
    pub total_pnl: f64,
    pub total_return_pct: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

/// Read-only aggregation over completed run history.
pub fn summarize(
    config: &SimConfig,
    steps: &[StepRecord],
    trades: &[TradeRecord],
) -> SessionSummary {
    let final_capital = steps
        .last()
        .map(|step| step.capital)
        .unwrap_or(config.initial_capital);
    let total_pnl = final_capital - config.initial_capital;
    let total_return_pct = (total_pnl / config.initial_capital) * 100.0;

    let wins: Vec<f64> = trades
        .iter()
        .filter(|trade| trade.is_win())
        .map(|trade| trade.net_pnl)
        .collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter(|trade| !trade.is_win())
        .map(|trade| trade.net_pnl)
        .collect();

    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins.len() as f64 / trades.len() as f64
    };

    SessionSummary {
        final_capital,
        total_pnl,
        total_return_pct,
        trade_count: trades.len(),
        win_rate,
        avg_win: average_or_zero(&wins),
        avg_loss: average_or_zero(&losses),
    }
}

pub fn equity_curve(initial_capital: f64, steps: &[StepRecord]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(steps.len() + 1);
    curve.push(initial_capital);
    curve.extend(steps.iter().map(|step| step.capital));
    curve
}

fn average_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
