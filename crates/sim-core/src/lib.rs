mod config;
mod observation;
mod state;
mod step;
mod trade;

pub use config::{SimConfig, SimConfigError};
pub use observation::{Direction, Observation, ObservationError};
pub use state::{Position, SimState};
pub use step::{StepOutcome, StepRecord};
pub use trade::TradeRecord;

pub fn module_ready() -> bool {
    true
}
