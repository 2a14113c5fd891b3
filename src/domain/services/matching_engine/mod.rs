pub mod engine;

pub use engine::{run_match, Fill, MatchOutcome};
