use std::sync::Arc;

use sim_core::Observation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Unavailable(String),
    Malformed { index: u64, reason: String },
}

/// Pull-based supplier of ordered observations. `Ok(None)` is the clean end
/// of the sequence; an error aborts the run.
pub trait ObservationSource {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError>;
}

impl<S: ObservationSource + ?Sized> ObservationSource for &mut S {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError> {
        (**self).next_observation()
    }
}

/// Replays a shared, pre-validated tape. Never fails.
#[derive(Debug, Clone)]
pub struct TapeSource {
    observations: Arc<Vec<Observation>>,
    cursor: usize,
}

impl TapeSource {
    pub fn new(observations: Arc<Vec<Observation>>) -> Self {
        Self {
            observations,
            cursor: 0,
        }
    }

    pub fn from_observations(observations: Vec<Observation>) -> Self {
        Self::new(Arc::new(observations))
    }
}

impl ObservationSource for TapeSource {
    fn next_observation(&mut self) -> Result<Option<Observation>, SourceError> {
        let next = self.observations.get(self.cursor).copied();
        if next.is_some() {
            self.cursor += 1;
        }
        Ok(next)
    }
}
