//! Per-tick boat navigation on the unit sphere.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use mariner_config::{GlobeConfig, NavigationConfig};
use mariner_coords::UnitSpherePoint;
use mariner_math::{NEARLY_ZERO, from_look_at};
use mariner_planet::{GlobeError, GlobeSurface};
use tracing::{debug, trace, warn};

/// Tuning for [`NavigationStateMachine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationParams {
    /// World-space radius of the globe.
    pub globe_scale: f32,
    /// Radius of the water line on the unit globe.
    pub water_surface_height: f32,
    /// Unit-sphere lengths travelled per second at full input.
    pub boat_speed: f32,
    pub camera_distance_min: f32,
    pub camera_distance_max: f32,
    /// Camera distance change per second at full zoom input.
    pub camera_zoom_speed: f32,
}

impl NavigationParams {
    pub fn from_config(navigation: &NavigationConfig, globe: &GlobeConfig) -> Self {
        Self {
            globe_scale: navigation.globe_scale,
            water_surface_height: globe.water_surface_height,
            boat_speed: navigation.boat_speed,
            camera_distance_min: navigation.camera_distance_min,
            camera_distance_max: navigation.camera_distance_max,
            camera_zoom_speed: navigation.camera_zoom_speed,
        }
    }
}

impl Default for NavigationParams {
    fn default() -> Self {
        Self::from_config(&NavigationConfig::default(), &GlobeConfig::default())
    }
}

/// The navigator's integrated state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigatorState {
    /// Boat direction from the globe center.
    pub position: UnitSpherePoint,
    /// Facing within the local tangent plane, in `[0, 2π)`. 0 faces east.
    pub heading: f32,
    pub camera_distance: f32,
}

/// World-space placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// What the scheduler should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The globe surface is gone; stop ticking.
    Exit,
}

/// Integrates input into boat and camera motion, one tick at a time.
///
/// A move whose destination is land is dropped as a whole: the position and
/// heading keep their previous values bit for bit. Zoom still applies.
#[derive(Clone, Debug)]
pub struct NavigationStateMachine {
    params: NavigationParams,
    state: NavigatorState,
    boat: Pose,
    camera: Pose,
    ticks: u64,
    blocked_ticks: u64,
    last_move_blocked: bool,
}

impl NavigationStateMachine {
    /// Start at `start` facing east with the camera at its closest distance.
    ///
    /// The camera begins on the `+X` axis looking at the globe center, and
    /// follows the boat from the first tick on.
    pub fn new(params: NavigationParams, start: UnitSpherePoint) -> Self {
        let distance = params.camera_distance_min;
        let state = NavigatorState {
            position: start,
            heading: 0.0,
            camera_distance: distance,
        };
        let unit = start.to_cartesian();
        Self {
            params,
            state,
            boat: Pose {
                position: boat_position(unit, &params),
                rotation: boat_rotation(unit, 0.0),
            },
            camera: Pose {
                position: (params.globe_scale + distance) * Vec3::X,
                rotation: from_look_at(Vec3::NEG_X, Vec3::Z),
            },
            ticks: 0,
            blocked_ticks: 0,
            last_move_blocked: false,
        }
    }

    pub fn params(&self) -> &NavigationParams {
        &self.params
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn boat(&self) -> Pose {
        self.boat
    }

    pub fn camera(&self) -> Pose {
        self.camera
    }

    /// Ticks run to completion so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks whose move was rejected because the destination was land.
    pub fn blocked_ticks(&self) -> u64 {
        self.blocked_ticks
    }

    pub fn last_move_blocked(&self) -> bool {
        self.last_move_blocked
    }

    /// Advance by `dt` seconds under `input` (see [`crate::InputAxis`]).
    ///
    /// Without a `surface` nothing is mutated and [`TickOutcome::Exit`] is
    /// returned. Visibility dispatch errors are passed through.
    pub fn tick<S>(
        &mut self,
        dt: f32,
        input: Vec3,
        surface: Option<&mut S>,
    ) -> Result<TickOutcome, GlobeError>
    where
        S: GlobeSurface + ?Sized,
    {
        let Some(surface) = surface else {
            warn!(tick = self.ticks, "Globe surface missing, stopping navigation");
            return Ok(TickOutcome::Exit);
        };

        let camera_right = self.camera.rotation * Vec3::X;
        let camera_up = self.camera.rotation * Vec3::Z;
        let direction = (camera_right * input.x + camera_up * input.y).normalize_or_zero();
        let delta = direction * self.params.boat_speed * dt;

        let old_unit = self.state.position.to_cartesian();
        let candidate = UnitSpherePoint::from_cartesian((old_unit + delta).normalize());

        self.last_move_blocked = surface.is_land_at_point(candidate);
        if self.last_move_blocked {
            self.blocked_ticks += 1;
            debug!(
                azimuthal = candidate.azimuthal,
                polar = candidate.polar,
                "Move blocked by land"
            );
        } else {
            self.state.position = candidate;
            if input.x.abs() > NEARLY_ZERO || input.y.abs() > NEARLY_ZERO {
                self.state.heading = heading_from_input(input.x, input.y);
            }
        }

        surface.update_visibility(self.state.position)?;

        let unit = self.state.position.to_cartesian();
        self.boat = Pose {
            position: boat_position(unit, &self.params),
            rotation: boat_rotation(unit, self.state.heading),
        };

        self.state.camera_distance = (self.state.camera_distance
            + input.z * dt * self.params.camera_zoom_speed)
            .clamp(self.params.camera_distance_min, self.params.camera_distance_max);
        self.camera = Pose {
            position: self.boat.position + self.state.camera_distance * unit,
            rotation: from_look_at(-unit, Vec3::Z),
        };

        self.ticks += 1;
        trace!(
            tick = self.ticks,
            azimuthal = self.state.position.azimuthal,
            polar = self.state.position.polar,
            heading = self.state.heading,
            camera_distance = self.state.camera_distance,
            "Navigation tick"
        );
        Ok(TickOutcome::Continue)
    }
}

/// Facing angle of a steering input, in `[0, 2π)`.
pub(crate) fn heading_from_input(x: f32, y: f32) -> f32 {
    let heading = y.atan2(x);
    if heading < 0.0 { heading + TAU } else { heading }
}

fn boat_position(unit: Vec3, params: &NavigationParams) -> Vec3 {
    params.water_surface_height * params.globe_scale * unit
}

/// Boat rotation facing `heading` in the tangent plane at `unit`, with up
/// pointing away from the globe center. Degenerate at the poles.
fn boat_rotation(unit: Vec3, heading: f32) -> Quat {
    let right = Vec3::Z.cross(unit);
    let tangent_up = unit.cross(right);
    let forward = (heading.cos() * right + heading.sin() * tangent_up).normalize_or_zero();
    from_look_at(forward, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    /// Surface where everything with azimuth inside `land` is land.
    struct MockSurface {
        land: Option<(f32, f32)>,
        visibility_updates: Vec<UnitSpherePoint>,
    }

    impl MockSurface {
        fn ocean() -> Self {
            Self {
                land: None,
                visibility_updates: Vec::new(),
            }
        }

        fn land_between(min: f32, max: f32) -> Self {
            Self {
                land: Some((min, max)),
                visibility_updates: Vec::new(),
            }
        }
    }

    impl GlobeSurface for MockSurface {
        fn is_land_at_point(&self, point: UnitSpherePoint) -> bool {
            self.land
                .is_some_and(|(min, max)| (min..=max).contains(&point.azimuthal))
        }

        fn get_height_at_point(&self, _point: UnitSpherePoint) -> f32 {
            0.95
        }

        fn update_visibility(&mut self, position: UnitSpherePoint) -> Result<(), GlobeError> {
            self.visibility_updates.push(position);
            Ok(())
        }
    }

    const DT: f32 = 1.0 / 60.0;

    fn machine() -> NavigationStateMachine {
        NavigationStateMachine::new(NavigationParams::default(), UnitSpherePoint::new(0.0, 0.0))
    }

    #[test]
    fn test_initial_camera_pose() {
        let nav = machine();
        let camera = nav.camera();
        assert_eq!(camera.position, Vec3::new(27.0, 0.0, 0.0));
        let forward = camera.rotation * Vec3::Y;
        assert!((forward - Vec3::NEG_X).length() < 1e-5, "camera should face the globe");
        assert_eq!(nav.state().camera_distance, 7.0);
        assert_eq!(nav.state().heading, 0.0);
    }

    #[test]
    fn test_missing_surface_exits_without_mutation() {
        let mut nav = machine();
        let before = *nav.state();
        let outcome = nav
            .tick::<MockSurface>(DT, Vec3::new(1.0, 1.0, 1.0), None)
            .unwrap();
        assert_eq!(outcome, TickOutcome::Exit);
        assert_eq!(*nav.state(), before);
        assert_eq!(nav.ticks(), 0);
        assert_eq!(nav.camera().position, Vec3::new(27.0, 0.0, 0.0));
    }

    #[test]
    fn test_moves_along_camera_right() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        let right = nav.camera().rotation * Vec3::X;
        nav.tick(DT, Vec3::X, Some(&mut surface)).unwrap();

        let moved = nav.state().position.to_cartesian() - Vec3::X;
        assert!(moved.length() > 0.0, "boat should move");
        assert!(
            moved.normalize().dot(right) > 0.999,
            "move {moved:?} should follow camera right {right:?}"
        );
        let expected = 0.07 * DT;
        assert!(
            (moved.length() - expected).abs() < 1e-5,
            "step length {} should be speed·dt {expected}",
            moved.length()
        );
    }

    #[test]
    fn test_land_rejects_move_bit_identically() {
        let mut nav = machine();
        // The start sits at azimuth 0 on the coast; stepping along camera
        // right increases the azimuth and runs aground.
        let mut surface = MockSurface::land_between(1e-6, PI);
        let before = *nav.state();
        nav.tick(DT, Vec3::new(1.0, 0.3, 0.0), Some(&mut surface))
            .unwrap();
        assert!(nav.last_move_blocked());
        assert_eq!(
            nav.state().position.azimuthal.to_bits(),
            before.position.azimuthal.to_bits()
        );
        assert_eq!(nav.state().position.polar.to_bits(), before.position.polar.to_bits());
        assert_eq!(nav.state().heading, before.heading, "heading must not change on land");
        assert_eq!(nav.blocked_ticks(), 1);
        // Visibility is still refreshed around the unchanged position.
        assert_eq!(surface.visibility_updates, vec![before.position]);
    }

    #[test]
    fn test_heading_wraps_into_range() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        nav.tick(DT, Vec3::new(0.0, -1.0, 0.0), Some(&mut surface))
            .unwrap();
        let heading = nav.state().heading;
        assert!((heading - 3.0 * FRAC_PI_2).abs() < 1e-5, "got {heading}");

        nav.tick(DT, Vec3::new(-1.0, 0.0, 0.0), Some(&mut surface))
            .unwrap();
        assert!((nav.state().heading - PI).abs() < 1e-5);
    }

    #[test]
    fn test_idle_input_keeps_heading() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        nav.tick(DT, Vec3::new(0.0, 1.0, 0.0), Some(&mut surface))
            .unwrap();
        let heading = nav.state().heading;
        nav.tick(DT, Vec3::ZERO, Some(&mut surface)).unwrap();
        assert_eq!(nav.state().heading, heading);
    }

    #[test]
    fn test_heading_from_input() {
        assert_eq!(heading_from_input(1.0, 0.0), 0.0);
        assert!((heading_from_input(0.0, 1.0) - FRAC_PI_2).abs() < 1e-6);
        let h = heading_from_input(1.0, -1e-3);
        assert!(h > 6.0 && h < TAU, "small negative angles should wrap, got {h}");
    }

    #[test]
    fn test_zoom_clamps() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        for _ in 0..600 {
            nav.tick(DT, Vec3::Z, Some(&mut surface)).unwrap();
        }
        assert_eq!(nav.state().camera_distance, 20.0);
        for _ in 0..600 {
            nav.tick(DT, Vec3::NEG_Z, Some(&mut surface)).unwrap();
        }
        assert_eq!(nav.state().camera_distance, 7.0);
    }

    #[test]
    fn test_camera_follows_boat() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        nav.tick(DT, Vec3::new(0.5, 0.5, 1.0), Some(&mut surface))
            .unwrap();
        let unit = nav.state().position.to_cartesian();
        let boat = nav.boat();
        assert!((boat.position - 0.95 * 20.0 * unit).length() < 1e-5);
        let camera = nav.camera();
        let expected = boat.position + nav.state().camera_distance * unit;
        assert!((camera.position - expected).length() < 1e-5);
        let forward = camera.rotation * Vec3::Y;
        assert!(forward.dot(-unit) > 0.9999, "camera should look at the globe center");
    }

    #[test]
    fn test_boat_stands_on_surface() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        nav.tick(DT, Vec3::new(0.0, 1.0, 0.0), Some(&mut surface))
            .unwrap();
        let unit = nav.state().position.to_cartesian();
        let rotation = nav.boat().rotation;
        assert!((rotation * Vec3::Z).dot(unit) > 0.9999, "boat up should be radial");
        assert!((rotation * Vec3::Y).dot(unit).abs() < 1e-4, "forward should be tangent");
    }

    #[test]
    fn test_visibility_follows_committed_position() {
        let mut nav = machine();
        let mut surface = MockSurface::ocean();
        nav.tick(DT, Vec3::Y, Some(&mut surface)).unwrap();
        nav.tick(DT, Vec3::Y, Some(&mut surface)).unwrap();
        assert_eq!(surface.visibility_updates.len(), 2);
        assert_eq!(surface.visibility_updates[1], nav.state().position);
    }
}
