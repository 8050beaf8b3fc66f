//! Course engine for virtual-GPS outdoor workouts.
//!
//! This crate turns a course definition into a tick-by-tick stream of position
//! and physiological metrics, resolves point-to-point routes through an ordered
//! chain of external directions providers, and suggests nearby round-trip
//! courses.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use courses::prelude::*;
//!
//! let course = catalog::course("hangang-riverside")?;
//! let mut controller = TickController::new(SimulationConfig::default());
//! controller.start(course)?;
//! for event in controller.tick(None) {
//!     println!("{event:?}");
//! }
//!
//! let resolver = RouteResolver::from_config(&ResolverConfig::from_env());
//! let route = resolver
//!     .resolve(&RouteRequest::new(start, end, ActivityType::Run))
//!     .await;
//! ```

pub mod candidates;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod geo_math;
pub mod interpolation;
pub mod models;
pub mod physiology;
pub mod profiles;
pub mod routing;
pub mod simulation;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::candidates::CandidateCourseGenerator;
    pub use crate::catalog;
    pub use crate::config::{PositionSource, ProviderCredentials, ResolverConfig, SimulationConfig};
    pub use crate::errors::{CourseError, ExportError, ProviderError, SimulationError};
    pub use crate::interpolation::interpolate;
    pub use crate::models::{
        Bounds, CourseCandidate, CourseDefinition, DifficultyTier, Instruction, LatLng,
        PaceSegment, Position, RouteResult, Waypoint,
    };
    pub use crate::profiles::{ActivityProfile, ActivityType, TravelMode};
    pub use crate::routing::{
        FALLBACK_PROVIDER, ProviderRoute, RouteProvider, RouteRequest, RouteResolver,
    };
    pub use crate::simulation::{
        CoachingCue, PaceAdvice, SessionSummary, SimulationDriver, SimulationEvent,
        SimulationPhase, SimulationState, TickController,
    };
}
