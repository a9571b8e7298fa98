pub mod constants;
pub mod numeric;
pub mod progress;
pub mod timestamp;

pub use constants::*;
pub use numeric::{round_opt, round_to, to_int};
pub use progress::ProgressReporter;
pub use timestamp::parse_observation_time;
