//! Platform riding.
//!
//! The tracker keeps the agent's position in the local frame of the surface it last stood
//! on. Each tick, while the agent is walkable on that surface, it moves the agent along
//! with the surface and infers the surface velocity from the displacement. When the agent
//! leaves the surface the inferred velocity is handed back as a liftoff impulse.

use crate::{
    config::PlatformMode,
    physics::PhysicsEngine,
    state::KinematicState,
    types::{Pose, Quat, SurfaceId, Vec3, controller_up},
    utils::project_on_plane,
};

/// Weak reference to the surface the agent stands on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundReference {
    pub surface: SurfaceId,
    /// Agent position in the surface's local frame.
    pub local_position: Vec3,
    /// Surface rotation when last sampled.
    pub rotation: Quat,
}

/// What following the ground did this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FollowOutcome {
    /// Velocity change to apply to the agent.
    pub impulse: Vec3,
    /// Surface rotation since the last sample, when rotation is inherited.
    pub rotation_delta: Option<Quat>,
}

#[derive(Clone, Debug, Default)]
pub struct PlatformTracker {
    reference: Option<GroundReference>,
    ground_velocity: Vec3,
}

impl PlatformTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn reference(&self) -> Option<&GroundReference> {
        self.reference.as_ref()
    }

    #[inline]
    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Surface velocity inferred on the last follow.
    #[inline]
    pub fn ground_velocity(&self) -> Vec3 {
        self.ground_velocity
    }

    /// Re-anchor the agent on `surface` at `pose`.
    pub fn refresh(&mut self, surface: SurfaceId, pose: Pose, agent_position: Vec3) {
        self.reference = Some(GroundReference {
            surface,
            local_position: pose.inverse_transform_point(agent_position),
            rotation: pose.rotation,
        });
    }

    pub fn clear(&mut self) {
        self.reference = None;
        self.ground_velocity = Vec3::zeros();
    }

    /// Carry the agent with its ground for one tick.
    ///
    /// While walkable on a live surface: infers the ground velocity and, unless `mode` is
    /// [`PlatformMode::None`], moves `state.position` onto the surface. The first tick after
    /// landing also returns an impulse cancelling the horizontal ground velocity.
    ///
    /// Otherwise the reference is dropped; with an inheriting mode the last ground velocity
    /// comes back as a liftoff impulse.
    pub fn follow<P: PhysicsEngine + ?Sized>(
        &mut self,
        physics: &P,
        state: &mut KinematicState,
        mode: PlatformMode,
        dt: f32,
    ) -> FollowOutcome {
        let live = self
            .reference
            .filter(|_| state.is_walkable)
            .and_then(|r| physics.surface_pose(r.surface).map(|pose| (r, pose)));

        let Some((reference, pose)) = live else {
            let impulse = if mode.inherits_position() {
                self.ground_velocity
            } else {
                Vec3::zeros()
            };
            self.clear();
            return FollowOutcome {
                impulse,
                rotation_delta: None,
            };
        };

        let mut outcome = FollowOutcome::default();
        if mode.inherits_rotation() {
            outcome.rotation_delta = Some(reference.rotation.inverse() * pose.rotation);
        }

        let target = pose.transform_point(reference.local_position);
        if dt > 0.0 {
            self.ground_velocity = (target - state.position) / dt;
        }

        if mode.inherits_position() {
            state.position = target;
            if !state.was_grounded {
                outcome.impulse = -project_on_plane(self.ground_velocity, controller_up());
            }
        }

        if let Some(r) = self.reference.as_mut() {
            r.rotation = pose.rotation;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPhysics;

    const EPS: f32 = 1.0e-4;
    const DT: f32 = 0.02;

    fn standing() -> KinematicState {
        KinematicState {
            is_grounded: true,
            is_walkable: true,
            was_grounded: true,
            was_walkable: true,
            ..KinematicState::at(Vec3::new(0.0, 1.0, 0.0))
        }
    }

    #[test]
    fn rides_a_translating_surface() {
        let mut physics = ScriptedPhysics::new();
        let id = SurfaceId(1);
        physics.set_surface(id, Pose::identity());
        let mut tracker = PlatformTracker::new();
        let mut state = standing();
        tracker.refresh(id, Pose::identity(), state.position);

        physics.set_surface(id, Pose::from_translation(Vec3::new(0.1, 0.0, 0.0)));
        let outcome = tracker.follow(&physics, &mut state, PlatformMode::Position, DT);

        assert!((state.position - Vec3::new(0.1, 1.0, 0.0)).norm() < EPS);
        assert!((tracker.ground_velocity() - Vec3::new(5.0, 0.0, 0.0)).norm() < EPS);
        assert_eq!(outcome.impulse, Vec3::zeros());
    }

    #[test]
    fn landing_cancels_horizontal_ground_velocity_once() {
        let mut physics = ScriptedPhysics::new();
        let id = SurfaceId(1);
        physics.set_surface(id, Pose::identity());
        let mut tracker = PlatformTracker::new();
        let mut state = KinematicState {
            was_grounded: false,
            ..standing()
        };
        tracker.refresh(id, Pose::identity(), state.position);

        physics.set_surface(id, Pose::from_translation(Vec3::new(0.1, 0.02, 0.0)));
        let outcome = tracker.follow(&physics, &mut state, PlatformMode::Position, DT);
        assert!((outcome.impulse - Vec3::new(-5.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn liftoff_returns_ground_velocity_and_clears() {
        let mut physics = ScriptedPhysics::new();
        let id = SurfaceId(1);
        physics.set_surface(id, Pose::identity());
        let mut tracker = PlatformTracker::new();
        let mut state = standing();
        tracker.refresh(id, Pose::identity(), state.position);
        physics.set_surface(id, Pose::from_translation(Vec3::new(0.0, 0.0, 0.1)));
        tracker.follow(&physics, &mut state, PlatformMode::Position, DT);

        state.is_walkable = false;
        let outcome = tracker.follow(&physics, &mut state, PlatformMode::Position, DT);
        assert!((outcome.impulse - Vec3::new(0.0, 0.0, 5.0)).norm() < EPS);
        assert!(!tracker.has_reference());
        assert_eq!(tracker.ground_velocity(), Vec3::zeros());
    }

    #[test]
    fn vanished_surface_is_dropped() {
        let physics = ScriptedPhysics::new();
        let mut tracker = PlatformTracker::new();
        let mut state = standing();
        tracker.refresh(SurfaceId(9), Pose::identity(), state.position);

        tracker.follow(&physics, &mut state, PlatformMode::Position, DT);
        assert!(!tracker.has_reference());
        assert!((state.position - Vec3::new(0.0, 1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn none_mode_never_moves_the_agent() {
        let mut physics = ScriptedPhysics::new();
        let id = SurfaceId(1);
        physics.set_surface(id, Pose::identity());
        let mut tracker = PlatformTracker::new();
        let mut state = standing();
        tracker.refresh(id, Pose::identity(), state.position);
        physics.set_surface(id, Pose::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        let outcome = tracker.follow(&physics, &mut state, PlatformMode::None, DT);
        assert!((state.position - Vec3::new(0.0, 1.0, 0.0)).norm() < EPS);
        assert_eq!(outcome.impulse, Vec3::zeros());

        state.is_walkable = false;
        let outcome = tracker.follow(&physics, &mut state, PlatformMode::None, DT);
        assert_eq!(outcome.impulse, Vec3::zeros());
    }

    #[test]
    fn rotation_delta_is_reported_once_per_change() {
        let mut physics = ScriptedPhysics::new();
        let id = SurfaceId(1);
        physics.set_surface(id, Pose::identity());
        let mut tracker = PlatformTracker::new();
        let mut state = KinematicState {
            position: Vec3::new(1.0, 0.0, 0.0),
            ..standing()
        };
        tracker.refresh(id, Pose::identity(), state.position);

        let turn = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        physics.set_surface(id, Pose::new(Vec3::zeros(), turn));
        let first = tracker.follow(&physics, &mut state, PlatformMode::PositionAndRotation, DT);
        let delta = first.rotation_delta.unwrap_or_else(Quat::identity);
        assert!(delta.angle_to(&turn) < EPS);
        // +X swung a quarter turn about +Y lands on -Z.
        assert!((state.position - Vec3::new(0.0, 0.0, -1.0)).norm() < EPS);

        let second = tracker.follow(&physics, &mut state, PlatformMode::PositionAndRotation, DT);
        let delta = second.rotation_delta.unwrap_or_else(Quat::identity);
        assert!(delta.angle() < EPS);
    }
}
