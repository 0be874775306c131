/*!
Core math aliases and the small value types exchanged between the locomotion
components and the host collaborators.

This module intentionally contains no algorithms beyond pose arithmetic. It defines:
- math aliases (`Vec3`, `Quat`)
- `Pose`: a rigid transform used for surfaces, tracking data and teleports
- `SurfaceId`: an opaque handle to an external scene node (weak, lookup only)

Conventions
- Units are meters and seconds.
- The world is right-handed with +Y up; "forward" is local +Z.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// World "up" used by the controller. Gravity may point elsewhere, but the capsule
/// axis and the movement plane for non-walkable states always use this.
#[inline]
pub fn controller_up() -> Vec3 {
    Vec3::y()
}

/// Opposite of [`controller_up`].
#[inline]
pub fn controller_down() -> Vec3 {
    -Vec3::y()
}

/// A rigid transform (translation + rotation) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    #[inline]
    pub fn identity() -> Self {
        Self::from_translation(Vec3::zeros())
    }

    /// Local point -> world point.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * local
    }

    /// World point -> local point.
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.translation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Opaque identity of an external collider / scene node.
///
/// The controller never owns what this refers to. Every use goes through a lookup on
/// the physics collaborator, which answers `None` once the node is inactive or gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);
