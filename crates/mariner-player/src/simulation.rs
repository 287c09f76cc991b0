//! Tick scheduling for navigation.

use std::time::Instant;

use mariner_planet::{GlobeError, GlobeSurface};
use tracing::{info, warn};

use crate::input::InputAxis;
use crate::navigation::{NavigationStateMachine, TickOutcome};

/// Simulation step used by headless runs: 60 Hz.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Longest frame the wall clock reports, so a stall does not teleport the boat.
pub const MAX_FRAME_TIME: f32 = 0.25;

/// Supplies the elapsed time for each tick.
pub trait TimeSource {
    /// Seconds since the previous call.
    fn delta(&mut self) -> f32;
}

/// Reports the same step every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTimeSource {
    dt: f32,
}

impl FixedTimeSource {
    pub fn new(dt: f32) -> Self {
        Self { dt }
    }
}

impl Default for FixedTimeSource {
    fn default() -> Self {
        Self::new(FIXED_DT)
    }
}

impl TimeSource for FixedTimeSource {
    fn delta(&mut self) -> f32 {
        self.dt
    }
}

/// Measures real elapsed time, clamped to [`MAX_FRAME_TIME`].
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    previous: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.previous).as_secs_f32();
        self.previous = now;
        if elapsed > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                elapsed * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            return MAX_FRAME_TIME;
        }
        elapsed
    }
}

/// Owns the navigation state, the input axis and the clock, and runs ticks
/// until told to stop.
pub struct SimulationLoop<T: TimeSource = FixedTimeSource> {
    navigation: NavigationStateMachine,
    input: InputAxis,
    time: T,
    total_sim_time: f64,
}

impl<T: TimeSource> SimulationLoop<T> {
    pub fn new(navigation: NavigationStateMachine, time: T) -> Self {
        Self {
            navigation,
            input: InputAxis::new(),
            time,
            total_sim_time: 0.0,
        }
    }

    pub fn navigation(&self) -> &NavigationStateMachine {
        &self.navigation
    }

    pub fn input(&self) -> &InputAxis {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputAxis {
        &mut self.input
    }

    /// Simulated seconds across all completed ticks.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }

    /// Run one tick with the current input.
    pub fn step<S>(&mut self, surface: Option<&mut S>) -> Result<TickOutcome, GlobeError>
    where
        S: GlobeSurface + ?Sized,
    {
        let dt = self.time.delta();
        let outcome = self.navigation.tick(dt, self.input.value(), surface)?;
        if outcome == TickOutcome::Continue {
            self.total_sim_time += f64::from(dt);
        }
        Ok(outcome)
    }

    /// Run up to `max_ticks` ticks, letting `script` adjust the input before
    /// each one. Stops early on [`TickOutcome::Exit`]. Returns the number of
    /// ticks completed.
    pub fn run<S>(
        &mut self,
        surface: &mut S,
        max_ticks: u64,
        mut script: impl FnMut(u64, &mut InputAxis),
    ) -> Result<u64, GlobeError>
    where
        S: GlobeSurface + ?Sized,
    {
        let mut completed = 0;
        while completed < max_ticks {
            script(completed, &mut self.input);
            if self.step(Some(&mut *surface))? == TickOutcome::Exit {
                break;
            }
            completed += 1;
        }
        info!(
            ticks = completed,
            blocked = self.navigation.blocked_ticks(),
            sim_time = self.total_sim_time,
            "Simulation finished"
        );
        Ok(completed)
    }
}
