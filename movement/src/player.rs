//! Player / avatar collaborator.
//!
//! The host owns the visible player: its pose, velocity, tracking data and the per-player
//! physics tunables. The controller reads these every tick and writes back a pose and a
//! velocity at the end of the tick.

use crate::types::{Pose, Quat, Vec3};

/// How a teleport orients the player and its tracked play space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpawnOrientation {
    #[default]
    Default,
    AlignPlayerWithSpawnPoint,
    AlignRoomWithSpawnPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingKind {
    /// Origin of the tracked play space.
    Origin,
    Head,
}

pub trait PlayerApi {
    /// `false` while the player is transiently unavailable (e.g. mid world load).
    fn is_valid(&self) -> bool;

    fn in_vr(&self) -> bool;

    fn position(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    fn teleport_to(
        &mut self,
        position: Vec3,
        rotation: Quat,
        orientation: SpawnOrientation,
        lerp_on_remote: bool,
    );

    fn tracking_pose(&self, kind: TrackingKind) -> Pose;

    fn avatar_eye_height(&self) -> f32;

    /// Scale between tracked space and world space (1 unless the host rescales the camera).
    fn camera_scale(&self) -> f32;

    fn gravity_strength(&self) -> f32;

    fn set_gravity_strength(&mut self, strength: f32);

    fn jump_impulse(&self) -> f32;

    fn set_jump_impulse(&mut self, impulse: f32);

    fn walk_speed(&self) -> f32;

    fn set_walk_speed(&mut self, speed: f32);

    fn strafe_speed(&self) -> f32;

    fn set_strafe_speed(&mut self, speed: f32);

    fn run_speed(&self) -> f32;

    fn set_run_speed(&mut self, speed: f32);

    /// Respawn at the default spawn, or at spawn `index`.
    fn respawn(&mut self, index: Option<usize>);

    /// Place (or remove, with `None`) the helper collider the player stands on.
    ///
    /// Only called when the config names a ground proxy. Hosts without one can leave
    /// this empty.
    fn set_ground_proxy(&mut self, center: Option<Vec3>);
}
