//! Boat navigation over the globe.
//!
//! [`NavigationStateMachine`] integrates an [`InputAxis`] into a position on
//! the unit sphere once per tick, rejecting moves onto land, and derives the
//! boat and camera poses. [`SimulationLoop`] drives it from a [`TimeSource`].

mod input;
mod navigation;
mod simulation;

pub use input::{AxisKey, InputAxis};
pub use navigation::{NavigationParams, NavigationStateMachine, NavigatorState, Pose, TickOutcome};
pub use simulation::{
    FIXED_DT, FixedTimeSource, MAX_FRAME_TIME, SimulationLoop, TimeSource, WallClock,
};
