use std::io::{self, Write};

use sim_core::StepRecord;

use crate::tape::format_ts_millis;

pub const SESSION_CSV_HEADER: &str = "index,ts,bid,ask,signal,capital,pnl,trades,accuracy\n";

/// Writes the per-step history of a completed run as a CSV artifact.
pub struct SessionCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> SessionCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(SESSION_CSV_HEADER.as_bytes())
    }

    pub fn append_steps(&mut self, steps: &[StepRecord]) -> io::Result<()> {
        for step in steps {
            let ts = step
                .ts_millis
                .and_then(format_ts_millis)
                .unwrap_or_default();
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{}",
                step.index,
                ts,
                step.bid,
                step.ask,
                step.signal.as_flag(),
                step.capital,
                step.cumulative_pnl,
                step.completed_trades,
                step.running_accuracy
            )?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
