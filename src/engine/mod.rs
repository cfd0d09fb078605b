pub mod core;
pub mod messages;
pub mod state;
pub mod worker;

// Re-export key components
pub use core::CollectorEngine;
pub use messages::UpdateOutcome;
pub use state::CollectorState;
pub use worker::{run_event_loop, run_until};
