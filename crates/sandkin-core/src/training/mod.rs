//! Controller optimization: fitness tasks and the cross-entropy trainer

mod cem;
mod fitness;

pub use cem::{Candidate, Trainer, TrainerState, TrainerStats, DEFAULT_TIME_BUDGET, STUCK_PATIENCE};
pub use fitness::{RolloutStart, Task};
