use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use runtime::analytics::{equity_curve, summarize, SessionSummary};
use runtime::batch::{run_batch, run_batch_rows, BatchOutcome};
use runtime::error::RunError;
use runtime::tape::{format_ts_millis, TapeRow};
use sim_core::{SimConfig, StepRecord, TradeRecord};

use crate::state::AppState;
use crate::ws;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/simulations", post(run_simulation))
        .route("/ws/prices", get(ws::prices_socket))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct PingResponse {
    message: &'static str,
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

#[derive(Debug, Deserialize)]
pub struct SimulationRequest {
    pub initial_capital: Option<f64>,
    pub trade_quantity: Option<f64>,
    pub commission_rate: Option<f64>,
    pub holding_horizon: Option<u64>,
    /// Inline tape rows; the server's preloaded tape is used when absent.
    pub observations: Option<Vec<TapeRow>>,
}

impl SimulationRequest {
    fn resolve_config(&self, defaults: SimConfig) -> Result<SimConfig, sim_core::SimConfigError> {
        SimConfig::new(
            self.initial_capital.unwrap_or(defaults.initial_capital),
            self.trade_quantity.unwrap_or(defaults.trade_quantity),
            self.commission_rate.unwrap_or(defaults.commission_rate),
            self.holding_horizon.unwrap_or(defaults.holding_horizon),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub summary: SessionSummary,
    pub equity_curve: Vec<f64>,
    pub steps: Vec<StepDto>,
    pub trades: Vec<TradeDto>,
}

#[derive(Debug, Serialize)]
pub struct StepDto {
    pub index: u64,
    pub timestamp: Option<String>,
    pub bid: f64,
    pub ask: f64,
    pub signal: u8,
    pub capital: f64,
    pub earnings: f64,
    pub operations: u64,
    pub accuracy: f64,
}

impl From<&StepRecord> for StepDto {
    fn from(step: &StepRecord) -> Self {
        Self {
            index: step.index,
            timestamp: step.ts_millis.and_then(format_ts_millis),
            bid: step.bid,
            ask: step.ask,
            signal: step.signal.as_flag(),
            capital: step.capital,
            earnings: step.cumulative_pnl,
            operations: step.completed_trades,
            accuracy: step.running_accuracy,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TradeDto {
    pub entry_index: u64,
    pub exit_index: u64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub net_pnl: f64,
}

impl From<&TradeRecord> for TradeDto {
    fn from(trade: &TradeRecord) -> Self {
        Self {
            entry_index: trade.entry_index,
            exit_index: trade.exit_index,
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            net_pnl: trade.net_pnl,
        }
    }
}

async fn run_simulation(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, (StatusCode, String)> {
    let config = request
        .resolve_config(state.sim_config())
        .map_err(|err| (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))?;

    let outcome = match &request.observations {
        Some(rows) => run_batch_rows(&config, rows).map_err(|err| match err {
            RunError::MalformedObservation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        })?,
        None => run_batch(&config, state.tape().as_slice()),
    };

    Ok(Json(simulation_response(&config, outcome)))
}

fn simulation_response(config: &SimConfig, outcome: BatchOutcome) -> SimulationResponse {
    SimulationResponse {
        summary: summarize(config, &outcome.steps, &outcome.trades),
        equity_curve: equity_curve(config.initial_capital, &outcome.steps),
        steps: outcome.steps.iter().map(StepDto::from).collect(),
        trades: outcome.trades.iter().map(TradeDto::from).collect(),
    }
}
