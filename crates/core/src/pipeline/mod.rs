pub mod orchestrator;
pub mod pacing;

pub use orchestrator::{MalformedBlockPolicy, Orchestrator};
pub use pacing::{FixedDelayPacer, Pacer};
