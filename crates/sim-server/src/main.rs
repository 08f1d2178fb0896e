mod config;
mod wiring;

use std::error::Error;
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

use api::AppState;
use runtime::analytics::{summarize, SessionSummary};
use runtime::batch::run_batch;
use runtime::export::SessionCsvWriter;
use runtime::tape;
use sim_core::{Observation, SimConfig, StepRecord};
use tokio::net::TcpListener;

use crate::config::{Config, RunMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    let sim_config = config.sim_config()?;
    let observations = tape::load_tape(Path::new(&config.tape_path))?;

    match config.mode {
        RunMode::Batch => run_batch_session(&config, &sim_config, &observations),
        RunMode::Serve => {
            tape::ensure_timestamped(&observations)?;
            let state = AppState::new(
                observations,
                sim_config,
                Duration::from_millis(config.stream_interval_ms),
            );
            let listener = TcpListener::bind(config.listen_addr).await?;
            axum::serve(listener, wiring::build_app(state)).await?;
            Ok(())
        }
    }
}

fn run_batch_session(
    config: &Config,
    sim_config: &SimConfig,
    observations: &[Observation],
) -> Result<(), Box<dyn Error>> {
    let outcome = run_batch(sim_config, observations);
    let summary = summarize(sim_config, &outcome.steps, &outcome.trades);

    write_session_artifact(&config.session_output_path, &outcome.steps)?;
    print_summary(&summary);
    Ok(())
}

fn write_session_artifact(path: &str, steps: &[StepRecord]) -> Result<(), std::io::Error> {
    let artifact_path = Path::new(path);

    if let Some(parent) = artifact_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(artifact_path)?;
    let mut writer = SessionCsvWriter::new(file);
    writer.write_header()?;
    writer.append_steps(steps)?;
    writer.flush()
}

fn print_summary(summary: &SessionSummary) {
    println!("final capital:  {:.2}", summary.final_capital);
    println!("total pnl:      {:.2}", summary.total_pnl);
    println!("total return:   {:.2}%", summary.total_return_pct);
    println!("closed trades:  {}", summary.trade_count);
    println!("win rate:       {:.1}%", summary.win_rate * 100.0);
    println!("avg win:        {:.2}", summary.avg_win);
    println!("avg loss:       {:.2}", summary.avg_loss);
}
