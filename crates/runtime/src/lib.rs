pub mod analytics;
pub mod batch;
pub mod error;
pub mod export;
pub mod journal;
pub mod source;
pub mod stream;
pub mod tape;

pub fn module_ready() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use sim_core::SimConfig;

    use crate::analytics::summarize;
    use crate::batch::run_batch_rows;
    use crate::tape::TapeRow;

    fn row(close: f64, signal: u8) -> TapeRow {
        TapeRow {
            ts: None,
            close: Some(close),
            spread: Some(0.0),
            signal: Some(signal),
            direction: Some(signal),
        }
    }

    #[test]
    fn rows_run_end_to_end_into_a_session_summary() {
        let config = SimConfig::default();
        let mut rows = vec![row(100.0, 0)];
        for index in 1..=10 {
            rows.push(row(100.0 - index as f64, 1));
        }

        let outcome = run_batch_rows(&config, &rows).unwrap();
        let summary = summarize(&config, &outcome.steps, &outcome.trades);

        assert_eq!(summary.trade_count, 1);
        assert_eq!(summary.win_rate, 1.0);
        assert!((summary.final_capital - 10_981.0).abs() < 1e-9);
        // Every prediction matched its realized direction.
        assert_eq!(outcome.steps.last().unwrap().running_accuracy, 1.0);
    }
}
