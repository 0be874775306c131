/*!
VR play-space reconciliation.

In VR the user can lean or take a step inside the tracked play space. That lateral head
motion must move the capsule without feeding its velocity, or every lean would look like
a push to the collision response. The reconciler samples the head position relative to the
play-space origin each tick and hands out the frame-to-frame delta as a one-shot
displacement, which the stepper adds to the next sweep-move.
*/

use crate::{
    constants::{VR_BIAS_BLEND_OFFSET, VR_LOOK_DOWN_BIAS_DEG, VR_LOOK_UP_BIAS_DEG},
    types::{Pose, Quat, Vec3},
    utils::{look_rotation, pitch, project_on_plane},
};

#[derive(Clone, Debug, Default)]
pub struct VrOffsetReconciler {
    /// Head position in play space, unscaled and flattened.
    local_play_position: Vec3,
    local_play_delta: Vec3,
    play_rotation: Quat,
    camera_scale: f32,
}

impl VrOffsetReconciler {
    pub fn new() -> Self {
        Self {
            camera_scale: 1.0,
            ..Self::default()
        }
    }

    #[inline]
    pub fn local_play_position(&self) -> Vec3 {
        self.local_play_position
    }

    /// Sample the tracked head against the play-space origin.
    pub fn sample(&mut self, origin: Pose, head: Pose, camera_scale: f32) {
        let scale = if camera_scale > 0.0 { camera_scale } else { 1.0 };
        let mut local = origin.rotation.inverse() * (head.translation - origin.translation) / scale;
        local.y = 0.0;

        self.local_play_delta = local - self.local_play_position;
        self.local_play_position = local;
        self.play_rotation = origin.rotation;
        self.camera_scale = scale;
    }

    /// Forget the play-space offset (desktop, or after leaving VR).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// World-space displacement of the head since the previous sample.
    pub fn offset(&self) -> Vec3 {
        self.play_rotation * self.local_play_delta * self.camera_scale
    }
}

/// Rotation taking input space (x = strafe, z = forward) to world space in VR.
///
/// The head forward is pitched toward the horizon before flattening, more strongly the
/// closer the user looks straight up or down, so steering stays usable at steep angles.
pub fn vr_input_to_world(head_rotation: Quat, up: Vec3) -> Quat {
    let forward = head_rotation * Vec3::z();
    let s = forward.dot(&up);
    let bias = if s >= 0.0 {
        VR_LOOK_UP_BIAS_DEG
    } else {
        VR_LOOK_DOWN_BIAS_DEG
    };
    let t = (s * s - VR_BIAS_BLEND_OFFSET).clamp(0.0, 1.0);
    let biased = head_rotation * pitch(bias);
    let blended = head_rotation.try_slerp(&biased, t, 1.0e-6).unwrap_or(head_rotation);
    let move_forward = project_on_plane(blended * Vec3::z(), up);
    look_rotation(move_forward, up)
}
