pub mod acceleration;
pub mod results;

pub use acceleration::Acceleration;
pub use results::{PollOutcome, RunSummary, ShakeEvent, SyncOutcome};
