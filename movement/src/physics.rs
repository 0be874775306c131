//! Physics engine collaborator.
//!
//! The controller never integrates collisions itself. It asks the host for:
//! - one collision-aware sweep-move per tick (the capsule moves by the largest
//!   non-penetrating part of the requested motion and reports its contacts),
//! - ray and sphere casts for ground snapping,
//! - a sphere overlap count for the menu heuristic,
//! - lookups of the surfaces it rides on.
//!
//! Every call is synchronous and returns within the tick.

use crate::{
    config::CapsuleShape,
    contact::ContactBuffer,
    layers::{Layer, LayerMask},
    types::{Pose, SurfaceId, Vec3},
};

/// Parameters for a single sweep-move.
#[derive(Clone, Copy, Debug)]
pub struct SweepRequest {
    /// Agent position (the capsule's feet) before the move.
    pub position: Vec3,
    pub capsule: CapsuleShape,
    /// Requested world-space displacement for this tick (meters).
    pub motion: Vec3,
    /// The agent's own collider, excluded from the sweep along with anything it ignores.
    pub collider: Option<SurfaceId>,
    /// Layers the capsule collides with.
    pub mask: LayerMask,
    /// Let the host climb small steps on its own.
    pub climb_steps: bool,
}

/// A ray or shape cast hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    /// World-space point on the hit surface.
    pub point: Vec3,
    /// World-space surface normal at `point`.
    pub normal: Vec3,
    /// Distance traveled along the cast direction.
    pub distance: f32,
    pub surface: Option<SurfaceId>,
}

pub trait PhysicsEngine {
    /// World gravity (direction and magnitude).
    fn gravity(&self) -> Vec3;

    /// Move the capsule by `req.motion`, stopping at contacts, and record every contact in
    /// `contacts` in report order. Returns the new agent position.
    fn sweep_move(&mut self, req: &SweepRequest, contacts: &mut ContactBuffer) -> Vec3;

    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32, mask: LayerMask)
    -> Option<CastHit>;

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit>;

    /// Number of colliders on `mask` overlapping the sphere, counting at most `capacity`.
    fn overlap_sphere_count(
        &self,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
        capacity: usize,
    ) -> usize;

    fn ignore_collision(&mut self, a: SurfaceId, b: SurfaceId);

    /// Layers that colliders on `layer` collide with.
    fn collision_mask(&self, layer: Layer) -> LayerMask;

    /// Current pose of a surface, or `None` if it is inactive or no longer exists.
    fn surface_pose(&self, surface: SurfaceId) -> Option<Pose>;
}
