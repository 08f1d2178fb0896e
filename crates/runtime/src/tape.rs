use std::path::Path;

use serde::Deserialize;
use sim_core::{Direction, Observation};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::RunError;

pub const TAPE_CSV_HEADER: &str = "ts,close,spread,signal,direction";

/// One raw tape row. Every field is optional so that a missing cell surfaces
/// as a validation error with the row index, not a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TapeRow {
    pub ts: Option<String>,
    pub close: Option<f64>,
    pub spread: Option<f64>,
    pub signal: Option<u8>,
    pub direction: Option<u8>,
}

pub fn observation_from_row(index: u64, row: &TapeRow) -> Result<Observation, RunError> {
    let close = row.close.ok_or_else(|| malformed(index, "missing close"))?;
    let spread = row.spread.ok_or_else(|| malformed(index, "missing spread"))?;
    let signal_flag = row.signal.ok_or_else(|| malformed(index, "missing signal"))?;
    let predicted = Direction::from_flag(signal_flag)
        .ok_or_else(|| malformed(index, "signal flag must be 0 or 1"))?;

    let actual = match row.direction {
        Some(flag) => Some(
            Direction::from_flag(flag)
                .ok_or_else(|| malformed(index, "direction flag must be 0 or 1"))?,
        ),
        None => None,
    };

    let ts_millis = match row.ts.as_deref() {
        Some(raw) => Some(parse_ts_millis(raw).map_err(|reason| malformed(index, &reason))?),
        None => None,
    };

    Observation::new(index, ts_millis, close, spread, predicted, actual)
        .map_err(|err| malformed(index, &err.to_string()))
}

pub fn load_tape(path: &Path) -> Result<Vec<Observation>, RunError> {
    let mut reader =
        csv::Reader::from_path(path).map_err(|err| RunError::SourceUnavailable(err.to_string()))?;

    let mut observations = Vec::new();
    for (index, result) in reader.deserialize::<TapeRow>().enumerate() {
        let index = index as u64;
        let row = result.map_err(|err| RunError::MalformedObservation {
            index,
            reason: err.to_string(),
        })?;
        observations.push(observation_from_row(index, &row)?);
    }

    Ok(observations)
}

/// Streaming delivery stamps every update, so a tape that feeds it must carry
/// a timestamp on every row.
pub fn ensure_timestamped(observations: &[Observation]) -> Result<(), RunError> {
    for observation in observations {
        if observation.ts_millis.is_none() {
            return Err(RunError::MalformedObservation {
                index: observation.index,
                reason: "streaming requires a ts value on every row".to_string(),
            });
        }
    }
    Ok(())
}

pub fn parse_ts_millis(raw: &str) -> Result<u64, String> {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|err| format!("ts is not RFC 3339: {err}"))?;
    let millis = parsed.unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).map_err(|_| "ts is before the unix epoch".to_string())
}

pub fn format_ts_millis(ts_millis: u64) -> Option<String> {
    let datetime =
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts_millis) * 1_000_000).ok()?;
    datetime.format(&Rfc3339).ok()
}

fn malformed(index: u64, reason: &str) -> RunError {
    RunError::MalformedObservation {
        index,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use sim_core::Direction;

    use super::{
        ensure_timestamped, format_ts_millis, load_tape, observation_from_row, parse_ts_millis,
        TapeRow, TAPE_CSV_HEADER,
    };
    use crate::error::RunError;

    fn write_temp_tape(contents: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("runtime-tape-{unique}.csv"));
        fs::write(&path, contents).expect("temp tape should be writable");
        path
    }

    fn row(close: Option<f64>, spread: Option<f64>, signal: Option<u8>) -> TapeRow {
        TapeRow {
            ts: None,
            close,
            spread,
            signal,
            direction: None,
        }
    }

    #[test]
    fn complete_row_validates_into_an_observation() {
        let row = TapeRow {
            ts: Some("2024-03-01T14:30:00Z".to_string()),
            close: Some(100.5),
            spread: Some(0.5),
            signal: Some(0),
            direction: Some(1),
        };

        let observation = observation_from_row(7, &row).unwrap();

        assert_eq!(observation.index, 7);
        assert_eq!(observation.close, 100.5);
        assert_eq!(observation.predicted, Direction::Down);
        assert_eq!(observation.actual, Some(Direction::Up));
        assert_eq!(observation.ts_millis, Some(1_709_303_400_000));
    }

    #[test]
    fn missing_required_cells_are_reported_with_the_row_index() {
        let err = observation_from_row(4, &row(None, Some(0.5), Some(0))).unwrap_err();
        assert_eq!(
            err,
            RunError::MalformedObservation {
                index: 4,
                reason: "missing close".to_string(),
            }
        );

        let err = observation_from_row(5, &row(Some(100.0), None, Some(0))).unwrap_err();
        assert!(matches!(
            err,
            RunError::MalformedObservation { index: 5, .. }
        ));

        let err = observation_from_row(6, &row(Some(100.0), Some(0.5), None)).unwrap_err();
        assert!(matches!(
            err,
            RunError::MalformedObservation { index: 6, .. }
        ));
    }

    #[test]
    fn out_of_range_signal_flag_is_malformed() {
        let err = observation_from_row(0, &row(Some(100.0), Some(0.5), Some(2))).unwrap_err();

        assert_eq!(
            err,
            RunError::MalformedObservation {
                index: 0,
                reason: "signal flag must be 0 or 1".to_string(),
            }
        );
    }

    #[test]
    fn loads_a_well_formed_tape_file() {
        let path = write_temp_tape(&format!(
            "{TAPE_CSV_HEADER}\n\
             2024-03-01T14:30:00Z,100.0,0.5,0,0\n\
             2024-03-01T14:31:00Z,99.5,0.5,1,1\n"
        ));

        let observations = load_tape(&path).unwrap();

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].index, 0);
        assert_eq!(observations[0].predicted, Direction::Down);
        assert_eq!(observations[1].index, 1);
        assert_eq!(observations[1].close, 99.5);

        fs::remove_file(&path).expect("temp tape should be removable");
    }

    #[test]
    fn empty_cell_in_a_tape_file_fails_with_the_row_index() {
        let path = write_temp_tape(&format!(
            "{TAPE_CSV_HEADER}\n\
             2024-03-01T14:30:00Z,100.0,0.5,0,0\n\
             2024-03-01T14:31:00Z,,0.5,1,1\n"
        ));

        let err = load_tape(&path).unwrap_err();

        assert_eq!(
            err,
            RunError::MalformedObservation {
                index: 1,
                reason: "missing close".to_string(),
            }
        );

        fs::remove_file(&path).expect("temp tape should be removable");
    }

    #[test]
    fn missing_tape_file_is_a_source_availability_failure() {
        let err = load_tape(&std::env::temp_dir().join("runtime-tape-does-not-exist.csv"))
            .unwrap_err();

        assert!(matches!(err, RunError::SourceUnavailable(_)));
    }

    #[test]
    fn ts_parse_and_format_round_trip() {
        let millis = parse_ts_millis("2024-03-01T14:30:00Z").unwrap();

        assert_eq!(format_ts_millis(millis), Some("2024-03-01T14:30:00Z".to_string()));
    }

    #[test]
    fn rejects_non_rfc3339_and_pre_epoch_timestamps() {
        assert!(parse_ts_millis("yesterday").is_err());
        assert!(parse_ts_millis("1969-12-31T23:59:59Z").is_err());
    }

    #[test]
    fn untimestamped_rows_are_rejected_for_streaming() {
        let with_ts = observation_from_row(
            0,
            &TapeRow {
                ts: Some("2024-03-01T14:30:00Z".to_string()),
                close: Some(100.0),
                spread: Some(0.0),
                signal: Some(1),
                direction: None,
            },
        )
        .unwrap();
        let without_ts =
            observation_from_row(1, &row(Some(100.0), Some(0.0), Some(1))).unwrap();

        assert!(ensure_timestamped(&[with_ts]).is_ok());

        let err = ensure_timestamped(&[with_ts, without_ts]).unwrap_err();
        assert!(matches!(
            err,
            RunError::MalformedObservation { index: 1, .. }
        ));
    }
}
