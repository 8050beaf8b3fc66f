//! Tick-driven workout simulation.
//!
//! - [`TickController`]: owns one active run and advances it one tick at a time
//! - [`SimulationDriver`]: runs a controller on a fixed tokio cadence
//! - [`SessionSummary`]: the finalized record handed to a storage collaborator

mod controller;
mod driver;
mod state;
mod summary;

pub use controller::{TickController, coaching_interval_seconds};
pub use driver::SimulationDriver;
pub use state::{CoachingCue, PaceAdvice, SimulationEvent, SimulationPhase, SimulationState};
pub use summary::SessionSummary;
