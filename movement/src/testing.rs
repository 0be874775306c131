//! Scripted collaborators for unit tests.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use crate::{
    contact::{ContactBuffer, ContactEvent},
    events::LocomotionEvents,
    layers::{Layer, LayerCollisionMatrix, LayerMask},
    physics::{CastHit, PhysicsEngine, SweepRequest},
    player::{PlayerApi, SpawnOrientation, TrackingKind},
    types::{Pose, Quat, SurfaceId, Vec3, controller_up},
};

/// One scripted sweep-move result.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSweep {
    /// Displacement actually applied; `None` applies the full request.
    pub displacement: Option<Vec3>,
    pub contacts: Vec<ContactEvent>,
}

/// Physics double with an optional infinite floor and per-call scripts.
///
/// Sweeps pop `sweeps` first. Without a script the capsule moves freely and, if `floor` is
/// set, is stopped on the floor plane with one upward contact under its feet.
#[derive(Clone, Debug)]
pub struct ScriptedPhysics {
    pub gravity: Vec3,
    /// Height and surface of a horizontal floor.
    pub floor: Option<(f32, Option<SurfaceId>)>,
    pub sweeps: VecDeque<ScriptedSweep>,
    pub requests: Vec<SweepRequest>,
    pub surfaces: HashMap<SurfaceId, Pose>,
    pub menu_colliders: usize,
    pub ignored: Vec<(SurfaceId, SurfaceId)>,
    pub matrix: LayerCollisionMatrix,
    pub ray_override: Option<Option<CastHit>>,
    pub sphere_override: Option<Option<CastHit>>,
}

impl ScriptedPhysics {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            floor: None,
            sweeps: VecDeque::new(),
            requests: Vec::new(),
            surfaces: HashMap::new(),
            menu_colliders: 0,
            ignored: Vec::new(),
            matrix: LayerCollisionMatrix::new(),
            ray_override: None,
            sphere_override: None,
        }
    }

    pub fn with_floor(height: f32, surface: Option<SurfaceId>) -> Self {
        let mut physics = Self::new();
        physics.floor = Some((height, surface));
        if let Some(id) = surface {
            physics.set_surface(id, Pose::identity());
        }
        physics
    }

    pub fn set_surface(&mut self, id: SurfaceId, pose: Pose) {
        self.surfaces.insert(id, pose);
    }

    pub fn remove_surface(&mut self, id: SurfaceId) {
        self.surfaces.remove(&id);
    }

    fn floor_hit(&self, origin: Vec3, lift: f32, max_distance: f32) -> Option<CastHit> {
        let (height, surface) = self.floor?;
        let distance = origin.y - lift - height;
        (0.0..=max_distance).contains(&distance).then(|| CastHit {
            point: Vec3::new(origin.x, height, origin.z),
            normal: controller_up(),
            distance,
            surface,
        })
    }
}

impl PhysicsEngine for ScriptedPhysics {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn sweep_move(&mut self, req: &SweepRequest, contacts: &mut ContactBuffer) -> Vec3 {
        self.requests.push(*req);

        if let Some(script) = self.sweeps.pop_front() {
            for contact in script.contacts {
                contacts.push(contact);
            }
            return req.position + script.displacement.unwrap_or(req.motion);
        }

        let mut end = req.position + req.motion;
        if let Some((height, surface)) = self.floor {
            let rest = height + req.capsule.skin_width;
            if end.y <= rest {
                end.y = rest;
                contacts.push(ContactEvent {
                    normal: controller_up(),
                    point: Vec3::new(end.x, height, end.z),
                    surface,
                });
            }
        }
        end
    }

    fn raycast(
        &self,
        origin: Vec3,
        _dir: Vec3,
        max_distance: f32,
        _mask: LayerMask,
    ) -> Option<CastHit> {
        match self.ray_override {
            Some(hit) => hit,
            None => self.floor_hit(origin, 0.0, max_distance),
        }
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        _dir: Vec3,
        max_distance: f32,
        _mask: LayerMask,
    ) -> Option<CastHit> {
        match self.sphere_override {
            Some(hit) => hit,
            None => self.floor_hit(origin, radius, max_distance),
        }
    }

    fn overlap_sphere_count(&self, _: Vec3, _: f32, _: LayerMask, capacity: usize) -> usize {
        self.menu_colliders.min(capacity)
    }

    fn ignore_collision(&mut self, a: SurfaceId, b: SurfaceId) {
        self.ignored.push((a, b));
    }

    fn collision_mask(&self, layer: Layer) -> LayerMask {
        self.matrix.collision_mask(layer)
    }

    fn surface_pose(&self, surface: SurfaceId) -> Option<Pose> {
        self.surfaces.get(&surface).copied()
    }
}

/// Player double. Teleports move it; tracking follows its pose.
#[derive(Clone, Debug)]
pub struct FakePlayer {
    pub valid: bool,
    pub vr: bool,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    /// Head relative to the player, in the player's frame.
    pub head_local: Vec3,
    pub head_rotation: Quat,
    pub eye_height: f32,
    pub camera_scale: f32,
    pub gravity_strength: f32,
    pub jump_impulse: f32,
    pub walk_speed: f32,
    pub strafe_speed: f32,
    pub run_speed: f32,
    pub teleports: Vec<(Vec3, Quat, SpawnOrientation)>,
    pub velocity_writes: usize,
    pub respawns: Vec<Option<usize>>,
    pub ground_proxy: Option<Vec3>,
}

impl FakePlayer {
    pub fn new() -> Self {
        Self {
            valid: true,
            vr: false,
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            head_local: Vec3::new(0.0, 1.0, 0.0),
            head_rotation: Quat::identity(),
            eye_height: 1.0,
            camera_scale: 1.0,
            gravity_strength: 1.0,
            jump_impulse: 3.0,
            walk_speed: 2.0,
            strafe_speed: 2.0,
            run_speed: 4.0,
            teleports: Vec::new(),
            velocity_writes: 0,
            respawns: Vec::new(),
            ground_proxy: None,
        }
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

impl PlayerApi for FakePlayer {
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
        self.velocity_writes += 1;
    }

    fn teleport_to(
        &mut self,
        position: Vec3,
        rotation: Quat,
        orientation: SpawnOrientation,
        _lerp_on_remote: bool,
    ) {
        self.position = position;
        self.rotation = rotation;
        self.teleports.push((position, rotation, orientation));
    }

    fn tracking_pose(&self, kind: TrackingKind) -> Pose {
        match kind {
            TrackingKind::Origin => Pose::new(self.position, self.rotation),
            TrackingKind::Head => Pose::new(
                self.position + self.rotation * self.head_local,
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
        self.respawns.push(index);
    }

    fn set_ground_proxy(&mut self, center: Option<Vec3>) {
        self.ground_proxy = center;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub jumped: usize,
    pub grounded: usize,
    pub teleported: usize,
}

/// Counts hook calls into a shared cell the test keeps a handle to.
#[derive(Clone, Debug, Default)]
pub struct CountingEvents(pub Rc<RefCell<EventCounts>>);

impl LocomotionEvents for CountingEvents {
    fn on_jumped(&mut self) {
        self.0.borrow_mut().jumped += 1;
    }

    fn on_grounded(&mut self) {
        self.0.borrow_mut().grounded += 1;
    }

    fn on_teleported(&mut self) {
        self.0.borrow_mut().teleported += 1;
    }
}
