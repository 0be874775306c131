use nalgebra as na;

use crate::types::{Quat, Vec3};

/// Below this squared length a vector is treated as having no direction.
const DIRECTION_EPS_SQ: f32 = 1.0e-10;

/// Normalize `v`, or return zero when it is too short to have a direction.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq > DIRECTION_EPS_SQ {
        v / len_sq.sqrt()
    } else {
        Vec3::zeros()
    }
}

/// Component of `v` along `onto`. Zero when `onto` has no length.
#[inline]
pub fn project(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.norm_squared();
    if len_sq < f32::EPSILON {
        return Vec3::zeros();
    }
    onto * (v.dot(&onto) / len_sq)
}

/// Remove the component of `v` along `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    let len_sq = normal.norm_squared();
    if len_sq < f32::EPSILON {
        return v;
    }
    v - normal * (v.dot(&normal) / len_sq)
}

/// Unsigned angle between two vectors in degrees. Zero if either has no length.
#[inline]
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.norm_squared() * b.norm_squared()).sqrt();
    if denom < 1.0e-15 {
        return 0.0;
    }
    let cos = (a.dot(&b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Move `current` toward `target` by at most `max_delta` meters.
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let dist = to_target.norm();
    if dist <= max_delta || dist == 0.0 {
        return target;
    }
    current + to_target / dist * max_delta
}

/// Scale `v` down so its length does not exceed `max_len`.
#[inline]
pub fn clamp_magnitude(v: Vec3, max_len: f32) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq > max_len * max_len {
        v / len_sq.sqrt() * max_len
    } else {
        v
    }
}

/// Rotation whose local +Z faces `forward`, keeping `up` as close to +Y as possible.
///
/// Returns identity when `forward` is degenerate.
#[inline]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    if forward.norm_squared() <= DIRECTION_EPS_SQ {
        return Quat::identity();
    }
    na::UnitQuaternion::face_towards(&forward, &up)
}

/// Keep only the rotation about +Y (heading) of `rotation`.
///
/// Derived from the rotated forward vector so pitch/roll never leak into the yaw.
#[inline]
pub fn yaw_only(rotation: Quat) -> Quat {
    let forward = rotation * Vec3::z();
    let yaw = if forward.x.abs() <= f32::EPSILON && forward.z.abs() <= f32::EPSILON {
        // Looking straight up/down: fall back to the rotated right vector.
        let right = rotation * Vec3::x();
        (-right.z).atan2(right.x)
    } else {
        forward.x.atan2(forward.z)
    };
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), yaw)
}

/// Rotation of `angle_deg` degrees about local +X (pitch).
#[inline]
pub fn pitch(angle_deg: f32) -> Quat {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::x_axis(), angle_deg.to_radians())
}
