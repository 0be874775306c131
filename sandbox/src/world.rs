//! Rapier-backed collision world for the headless host.
//!
//! This module builds an in-memory Rapier scene from a set of surface definitions and
//! implements the controller's [`PhysicsEngine`] collaborator on top of it.
//!
//! Design notes
//! - Deterministic: definitions are inserted sorted by `id`.
//! - Query-focused: no dynamics are simulated. A `CollisionPipeline` step after every
//!   mutation keeps the broad-phase BVH current for queries and the KCC.
//! - Surfaces carry a collision [`Layer`] in the collider's `user_data`.
//! - Colliders are parentless so surfaces can be moved directly (moving platforms).

use std::collections::{HashMap, HashSet};

use nalgebra as na;
use rapier3d::{
    control::{
        CharacterAutostep, CharacterCollision, CharacterLength, KinematicCharacterController,
    },
    na::{Quaternion, Translation3, UnitQuaternion},
    parry::{
        query::{self, ShapeCastOptions},
        shape::{Ball, Shape},
    },
    prelude::*,
};

use movement::{
    CapsuleShape, CastHit, ContactBuffer, ContactEvent, Layer, LayerCollisionMatrix, LayerMask,
    PhysicsEngine, Pose, Quat, SurfaceId, SweepRequest, Vec3,
};

/// Time step handed to the KCC. Only used by features the sandbox leaves off
/// (ground snapping, dynamic-body pushes), so any positive value works.
const SWEEP_DT_S: f32 = 1.0 / 60.0;

/// Contacts whose normal has a smaller vertical component are side contacts (walls).
///
/// The KCC reports vertical faces with noise around 1e-5 in the normal's y.
const SIDE_CONTACT_MAX_NORMAL_Y: f32 = 0.01;

/// Definition of one world surface.
///
/// Conventions
/// - Units are meters.
/// - For planes, the normal is derived from the pose: `normal = rotation * +Y`, and the
///   plane passes through `translation + normal * offset_along_normal`.
#[derive(Clone, Debug)]
pub struct SurfaceDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: SurfaceShape,
    pub layer: Layer,
}

impl SurfaceDef {
    pub fn new(id: u32, translation: Vec3, shape: SurfaceShape) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
            layer: Layer::DEFAULT,
        }
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }
}

#[derive(Clone, Debug)]
pub enum SurfaceShape {
    /// Infinite plane (half-space).
    Plane { offset_along_normal: f32 },
    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },
}

pub struct SandboxWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    pipeline: CollisionPipeline,
    gravity: Vec3,
    matrix: LayerCollisionMatrix,
    ignored: HashSet<(SurfaceId, SurfaceId)>,
    by_def_id: HashMap<u32, SurfaceId>,
}

impl SandboxWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            pipeline: CollisionPipeline::new(),
            gravity,
            matrix: LayerCollisionMatrix::new(),
            ignored: HashSet::new(),
            by_def_id: HashMap::new(),
        }
    }

    /// Build a world from a list of surface definitions.
    pub fn build(gravity: Vec3, mut defs: Vec<SurfaceDef>) -> Self {
        // Ensure deterministic insertion order.
        defs.sort_by_key(|d| d.id);

        let mut world = Self::new(gravity);
        for def in &defs {
            let handle = world.colliders.insert(collider_from_def(def));
            world.by_def_id.insert(def.id, surface_id(handle));
        }
        world.refresh();
        log::debug!("sandbox world built with {} surfaces", defs.len());
        world
    }

    /// Insert one surface and return its id.
    pub fn insert(&mut self, def: &SurfaceDef) -> SurfaceId {
        let id = surface_id(self.colliders.insert(collider_from_def(def)));
        self.by_def_id.insert(def.id, id);
        self.refresh();
        id
    }

    /// Id of the surface built from definition `def_id`.
    pub fn surface(&self, def_id: u32) -> Option<SurfaceId> {
        self.by_def_id.get(&def_id).copied()
    }

    /// Move a surface. Returns `false` if it no longer exists.
    pub fn set_surface_pose(&mut self, id: SurfaceId, pose: Pose) -> bool {
        let Some(collider) = self.colliders.get_mut(collider_handle(id)) else {
            return false;
        };
        collider.set_position(isometry(pose.translation, pose.rotation));
        self.refresh();
        true
    }

    /// Disabled surfaces are skipped by every query and report no pose.
    pub fn set_surface_enabled(&mut self, id: SurfaceId, enabled: bool) -> bool {
        let Some(collider) = self.colliders.get_mut(collider_handle(id)) else {
            return false;
        };
        collider.set_enabled(enabled);
        self.refresh();
        true
    }

    pub fn remove(&mut self, id: SurfaceId) -> bool {
        let removed = self
            .colliders
            .remove(
                collider_handle(id),
                &mut IslandManager::new(),
                &mut self.bodies,
                false,
            )
            .is_some();
        if removed {
            self.by_def_id.retain(|_, v| *v != id);
            self.ignored.retain(|(a, b)| *a != id && *b != id);
            self.refresh();
        }
        removed
    }

    pub fn layer_matrix_mut(&mut self) -> &mut LayerCollisionMatrix {
        &mut self.matrix
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Update the broad and narrow phases after a mutation.
    fn refresh(&mut self) {
        let hooks = ();
        let events = ();
        self.pipeline.step(
            0.0,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &hooks,
            &events,
        );
    }

    /// Whether a query for `agent` with `mask` may touch `collider`.
    fn accepts(
        &self,
        mask: LayerMask,
        agent: Option<SurfaceId>,
        handle: ColliderHandle,
        collider: &Collider,
    ) -> bool {
        if !collider.is_enabled() || !mask.has(layer_of(collider)) {
            return false;
        }
        let Some(agent) = agent else {
            return true;
        };
        let other = surface_id(handle);
        other != agent && !self.ignored.contains(&ordered(agent, other))
    }
}

impl PhysicsEngine for SandboxWorld {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn sweep_move(&mut self, req: &SweepRequest, contacts: &mut ContactBuffer) -> Vec3 {
        let kcc = KinematicCharacterController {
            offset: CharacterLength::Absolute(req.capsule.skin_width),
            slide: true,
            autostep: req.climb_steps.then(CharacterAutostep::default),
            snap_to_ground: None,
            // Slope handling belongs to the controller; the KCC only resolves overlaps.
            max_slope_climb_angle: std::f32::consts::PI,
            min_slope_slide_angle: std::f32::consts::PI,
            ..KinematicCharacterController::default()
        };

        let shape = capsule_shape(&req.capsule);
        let center = req.position + req.capsule.center;
        let pos = isometry(center, Quat::identity());
        let motion = vector![req.motion.x, req.motion.y, req.motion.z];

        let predicate = |handle: ColliderHandle, collider: &Collider| {
            self.accepts(req.mask, req.collider, handle, collider)
        };
        let filter = QueryFilter::default().predicate(&predicate);
        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        );

        let corrected = kcc.move_shape(
            SWEEP_DT_S,
            &query_pipeline,
            &shape,
            &pos,
            motion,
            |collision| {
                contacts.push(contact_from_collision(&collision));
            },
        );

        req.position
            + Vec3::new(
                corrected.translation.x,
                corrected.translation.y,
                corrected.translation.z,
            )
    }

    fn raycast(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let predicate = |handle: ColliderHandle, collider: &Collider| {
            self.accepts(mask, None, handle, collider)
        };
        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            QueryFilter::default().predicate(&predicate),
        );

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![dir.x, dir.y, dir.z],
        );
        let (handle, hit) =
            query_pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;

        Some(CastHit {
            point: origin + dir * hit.time_of_impact,
            normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
            distance: hit.time_of_impact,
            surface: Some(surface_id(handle)),
        })
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let dir = dir.try_normalize(f32::EPSILON)?;
        let ball = Ball::new(radius);
        let start = isometry(origin, Quat::identity());
        let vel = vector![dir.x, dir.y, dir.z];

        let mut best: Option<CastHit> = None;
        for (handle, collider) in self.colliders.iter() {
            if !self.accepts(mask, None, handle, collider) {
                continue;
            }
            let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance.max(0.0));
            opts.stop_at_penetration = true;
            let Ok(Some(hit)) = query::cast_shapes(
                &start,
                &vel,
                &ball as &dyn Shape,
                collider.position(),
                &Vector::zeros(),
                collider.shape(),
                opts,
            ) else {
                continue;
            };
            if best.is_some_and(|b| b.distance <= hit.time_of_impact) {
                continue;
            }

            // Normal on the ball points into the surface; flip it to face the ball.
            let n1 = hit.normal1.into_inner();
            let mut normal = Vec3::new(n1.x, n1.y, n1.z);
            if normal.dot(&dir) > 0.0 {
                normal = -normal;
            }
            let center = origin + dir * hit.time_of_impact;
            best = Some(CastHit {
                point: center - normal * radius,
                normal,
                distance: hit.time_of_impact,
                surface: Some(surface_id(handle)),
            });
        }
        best
    }

    fn overlap_sphere_count(
        &self,
        center: Vec3,
        radius: f32,
        mask: LayerMask,
        capacity: usize,
    ) -> usize {
        let ball = Ball::new(radius);
        let pos = isometry(center, Quat::identity());
        self.colliders
            .iter()
            .filter(|(handle, collider)| self.accepts(mask, None, *handle, collider))
            .filter(|(_, collider)| {
                query::intersection_test(&pos, &ball, collider.position(), collider.shape())
                    .unwrap_or(false)
            })
            .take(capacity)
            .count()
    }

    fn ignore_collision(&mut self, a: SurfaceId, b: SurfaceId) {
        self.ignored.insert(ordered(a, b));
    }

    fn collision_mask(&self, layer: Layer) -> LayerMask {
        self.matrix.collision_mask(layer)
    }

    fn surface_pose(&self, surface: SurfaceId) -> Option<Pose> {
        let collider = self.colliders.get(collider_handle(surface))?;
        if !collider.is_enabled() {
            return None;
        }
        let iso = collider.position();
        let t = iso.translation.vector;
        let q = iso.rotation.quaternion();
        Some(Pose::new(
            Vec3::new(t.x, t.y, t.z),
            Quat::from_quaternion(na::Quaternion::new(q.w, q.i, q.j, q.k)),
        ))
    }
}

/// Turn one KCC collision into a contact event.
///
/// The KCC casts the world against the character, so `normal1`/`witness1` belong to the
/// hit collider and are already in world space.
fn contact_from_collision(collision: &CharacterCollision) -> ContactEvent {
    let n = collision.hit.normal1.into_inner();
    let w = collision.hit.witness1;
    let t = collision.character_pos.translation.vector;
    ContactEvent {
        normal: Vec3::new(n.x, n.y, n.z),
        point: side_contact_point(
            Vec3::new(w.x, w.y, w.z),
            Vec3::new(n.x, n.y, n.z),
            Vec3::new(t.x, t.y, t.z),
        ),
        surface: Some(surface_id(collision.handle)),
    }
}

/// Contact point reported for a surface touching a capsule centered at `center`.
///
/// A near-vertical surface touches the whole straight section of the capsule; the witness
/// the cast picks on it is arbitrary (often level with a cap center), so it is moved to
/// the capsule's mid height.
fn side_contact_point(witness: Vec3, normal: Vec3, center: Vec3) -> Vec3 {
    if normal.dot(&Vec3::y()).abs() < SIDE_CONTACT_MAX_NORMAL_Y {
        Vec3::new(witness.x, center.y, witness.z)
    } else {
        witness
    }
}

fn collider_from_def(def: &SurfaceDef) -> Collider {
    let builder = match &def.shape {
        SurfaceShape::Plane {
            offset_along_normal,
        } => {
            // n ⋅ x = dist, with the half-space placed at `n * dist`.
            let n = def.rotation * Vec3::y();
            let dist = n.dot(&def.translation) + *offset_along_normal;
            let unit_n = UnitVector::new_normalize(vector![n.x, n.y, n.z]);
            let at = n * dist;
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                .translation(vector![at.x, at.y, at.z])
        }
        SurfaceShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .position(isometry(def.translation, def.rotation))
        }
        SurfaceShape::Ball { radius } => {
            ColliderBuilder::ball(*radius).position(isometry(def.translation, def.rotation))
        }
        SurfaceShape::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius)
            .position(isometry(def.translation, def.rotation)),
    };
    builder.user_data(def.layer.0 as u128).build()
}

fn capsule_shape(capsule: &CapsuleShape) -> Capsule {
    Capsule::new_y(capsule.cap_offset().max(0.0), capsule.radius)
}

fn isometry(translation: Vec3, rotation: Quat) -> Isometry<Real> {
    let q = rotation.quaternion();
    Isometry::from_parts(
        Translation3::new(translation.x, translation.y, translation.z),
        UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.i, q.j, q.k)),
    )
}

fn layer_of(collider: &Collider) -> Layer {
    Layer((collider.user_data & 0xff) as u8)
}

fn ordered(a: SurfaceId, b: SurfaceId) -> (SurfaceId, SurfaceId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

pub(crate) fn surface_id(handle: ColliderHandle) -> SurfaceId {
    let (index, generation) = handle.into_raw_parts();
    SurfaceId(((generation as u64) << 32) | index as u64)
}

fn collider_handle(id: SurfaceId) -> ColliderHandle {
    ColliderHandle::from_raw_parts((id.0 & 0xffff_ffff) as u32, (id.0 >> 32) as u32)
}
