//! Headless stand-in for the host player.
//!
//! Keeps the pose, velocity and tunables the controller reads and writes, plus enough
//! tracking state (play-space origin, head offset, VR flag) to exercise the VR paths
//! without a headset.

use movement::{PlayerApi, Pose, Quat, SpawnOrientation, TrackingKind, Vec3};

#[derive(Clone, Debug)]
pub struct HeadlessPlayer {
    pub valid: bool,
    pub vr: bool,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// Tracked head relative to the play-space origin, in the origin's frame.
    pub head_offset: Vec3,
    pub head_rotation: Quat,
    pub eye_height: f32,
    pub camera_scale: f32,
    pub gravity_strength: f32,
    pub jump_impulse: f32,
    pub walk_speed: f32,
    pub strafe_speed: f32,
    pub run_speed: f32,
    pub spawn_points: Vec<Pose>,
    /// Last value pushed by the controller.
    pub ground_proxy: Option<Vec3>,
    pub teleport_count: usize,
    respawn_pending: bool,
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self {
            valid: true,
            vr: false,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            head_offset: Vec3::new(0.0, 1.6, 0.0),
            head_rotation: Quat::identity(),
            eye_height: 1.6,
            camera_scale: 1.0,
            gravity_strength: 1.0,
            jump_impulse: 3.0,
            walk_speed: 2.0,
            strafe_speed: 2.0,
            run_speed: 4.0,
            spawn_points: Vec::new(),
            ground_proxy: None,
            teleport_count: 0,
            respawn_pending: false,
        }
    }
}

impl HeadlessPlayer {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Whether a respawn happened since the last call. The driver forwards it to the
    /// controller.
    pub fn take_respawn(&mut self) -> bool {
        std::mem::take(&mut self.respawn_pending)
    }
}

impl PlayerApi for HeadlessPlayer {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn in_vr(&self) -> bool {
        self.vr
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn teleport_to(
        &mut self,
        position: Vec3,
        rotation: Quat,
        orientation: SpawnOrientation,
        _lerp_on_remote: bool,
    ) {
        log::trace!("teleport to {position:?} ({orientation:?})");
        self.position = position;
        self.rotation = rotation;
        self.teleport_count += 1;
    }

    fn tracking_pose(&self, kind: TrackingKind) -> Pose {
        // The play-space origin sits on the player.
        match kind {
            TrackingKind::Origin => Pose::new(self.position, self.rotation),
            TrackingKind::Head => Pose::new(
                self.position + self.rotation * self.head_offset * self.camera_scale,
                self.rotation * self.head_rotation,
            ),
        }
    }

    fn avatar_eye_height(&self) -> f32 {
        self.eye_height
    }

    fn camera_scale(&self) -> f32 {
        self.camera_scale
    }

    fn gravity_strength(&self) -> f32 {
        self.gravity_strength
    }

    fn set_gravity_strength(&mut self, strength: f32) {
        self.gravity_strength = strength;
    }

    fn jump_impulse(&self) -> f32 {
        self.jump_impulse
    }

    fn set_jump_impulse(&mut self, impulse: f32) {
        self.jump_impulse = impulse;
    }

    fn walk_speed(&self) -> f32 {
        self.walk_speed
    }

    fn set_walk_speed(&mut self, speed: f32) {
        self.walk_speed = speed;
    }

    fn strafe_speed(&self) -> f32 {
        self.strafe_speed
    }

    fn set_strafe_speed(&mut self, speed: f32) {
        self.strafe_speed = speed;
    }

    fn run_speed(&self) -> f32 {
        self.run_speed
    }

    fn set_run_speed(&mut self, speed: f32) {
        self.run_speed = speed;
    }

    fn respawn(&mut self, index: Option<usize>) {
        let spawn = match index {
            Some(i) => self.spawn_points.get(i),
            None => self.spawn_points.first(),
        };
        let Some(spawn) = spawn.copied() else {
            log::warn!("no spawn point for respawn index {index:?}");
            return;
        };
        self.position = spawn.translation;
        self.rotation = spawn.rotation;
        self.velocity = Vec3::zeros();
        self.respawn_pending = true;
    }

    fn set_ground_proxy(&mut self, center: Option<Vec3>) {
        self.ground_proxy = center;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_follows_origin_and_scale() {
        let mut player = HeadlessPlayer::at(Vec3::new(1.0, 0.0, 0.0));
        player.camera_scale = 2.0;
        player.head_offset = Vec3::new(0.1, 1.0, 0.0);
        let head = player.tracking_pose(TrackingKind::Head);
        assert!((head.translation - Vec3::new(1.2, 2.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn respawn_uses_spawn_points() {
        let mut player = HeadlessPlayer::default();
        player.spawn_points = vec![
            Pose::from_translation(Vec3::new(0.0, 5.0, 0.0)),
            Pose::from_translation(Vec3::new(9.0, 1.0, 0.0)),
        ];
        player.velocity = Vec3::new(1.0, 1.0, 1.0);

        player.respawn(Some(1));
        assert_eq!(player.position, Vec3::new(9.0, 1.0, 0.0));
        assert_eq!(player.velocity, Vec3::zeros());
        assert!(player.take_respawn());
        assert!(!player.take_respawn());

        player.respawn(Some(7));
        assert!(!player.take_respawn());
    }
}
