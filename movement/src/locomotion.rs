/*!
Locomotion stepper.

[`Locomotion`] owns one agent's kinematic state and runs its fixed per-tick pipeline:

1. cache the host state (gravity, player tunables, tracking, stance)
2. sample input
3. follow the ground (platform riding)
4. integrate walk input, the jump state machine and gravity
5. sweep-move and resolve the contacts
6. ground snap
7. sync the host player

The physics engine and the player are borrowed per call; the stepper never holds on to
them. Diagnostics are owned and chosen at construction.
*/

use crate::{
    config::{AgentConfig, CapsuleShape},
    constants::{
        AIR_CONTROL_FACTOR, CROUCH_SPEED_MULTIPLIER, GROUND_SNAP_PADDING, MOVING_SPEED_EPS,
        PACKAGE_VERSION, PRONE_SPEED_MULTIPLIER, RESPAWN_UP_SPEED,
    },
    contact::ContactBuffer,
    diagnostics::{Color, Diagnostics, LogDiagnostics},
    events::{LocomotionEvents, NoEvents},
    input::{InputSampler, InputState, RawInput, probe_menu},
    layers::LayerMask,
    physics::{PhysicsEngine, SweepRequest},
    platform::PlatformTracker,
    player::{PlayerApi, SpawnOrientation, TrackingKind},
    resolver::{ResolveContext, contact_color, resolve_contacts, walkable_response},
    state::{KinematicState, Stance},
    types::{Quat, Vec3, controller_down, controller_up},
    utils::{
        angle_deg, clamp_magnitude, move_towards, normalize_or_zero, project, project_on_plane,
        yaw_only,
    },
    vr::{VrOffsetReconciler, vr_input_to_world},
};

/// How long the platform impulse arrows stay on screen (seconds).
const IMPULSE_ARROW_DURATION_S: f32 = 5.0;

/// Scale applied to the inferred ground velocity arrow.
const GROUND_VELOCITY_ARROW_SCALE: f32 = 0.1;

/// Host state sampled at the start of every tick.
#[derive(Clone, Copy, Debug)]
struct Frame {
    gravity: Vec3,
    dt: f32,
    in_vr: bool,
    player_position: Vec3,
    player_rotation: Quat,
    play_rotation: Quat,
    head_position: Vec3,
    input_to_world: Quat,
    camera_scale: f32,
    avatar_height: f32,
    stance: Stance,
    gravity_strength: f32,
    jump_impulse: f32,
    walk_speed: f32,
    strafe_speed: f32,
    run_speed: f32,
}

impl Frame {
    fn from_config(config: &AgentConfig) -> Self {
        Self {
            gravity: Vec3::zeros(),
            dt: 0.0,
            in_vr: false,
            player_position: Vec3::zeros(),
            player_rotation: Quat::identity(),
            play_rotation: Quat::identity(),
            head_position: Vec3::zeros(),
            input_to_world: Quat::identity(),
            camera_scale: 1.0,
            avatar_height: 1.0,
            stance: Stance::Standing,
            gravity_strength: 1.0,
            jump_impulse: 0.0,
            walk_speed: config.walk_speed,
            strafe_speed: config.strafe_speed,
            run_speed: config.run_speed,
        }
    }
}

/// Optional parts of a teleport request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TeleportOptions {
    /// Target facing. Defaults to the player's current rotation.
    pub rotation: Option<Quat>,
    /// Without a mode only the heading of `rotation` is used and the tracked room is
    /// carried along with the player.
    pub orientation: Option<SpawnOrientation>,
    /// Hint for remote observers to interpolate instead of jumping.
    pub lerp_on_remote: bool,
}

pub struct Locomotion<D: Diagnostics = LogDiagnostics> {
    config: AgentConfig,
    capsule: CapsuleShape,
    state: KinematicState,
    platform: PlatformTracker,
    vr: VrOffsetReconciler,
    sampler: InputSampler,
    input: InputState,
    contacts: ContactBuffer,
    mask: LayerMask,
    frame: Frame,
    look_rotation: Quat,
    motion_offset: Vec3,
    active: bool,
    started: bool,
    force_grounded: bool,
    events: Box<dyn LocomotionEvents>,
    diagnostics: D,
}

impl Locomotion<LogDiagnostics> {
    /// Controller that reports through the `log` facade.
    pub fn with_logging(config: AgentConfig) -> Self {
        Self::new(config, LogDiagnostics)
    }
}

impl<D: Diagnostics> Locomotion<D> {
    /// Build a controller. Configuration faults are reported and replaced, never fatal.
    pub fn new(config: AgentConfig, mut diagnostics: D) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                diagnostics.warn(&format!("invalid agent config, using sanitized copy: {err}"));
                config.sanitized()
            }
        };

        Self {
            capsule: config.capsule,
            state: KinematicState::default(),
            platform: PlatformTracker::new(),
            vr: VrOffsetReconciler::new(),
            sampler: InputSampler::new(),
            input: InputState::default(),
            contacts: ContactBuffer::new(config.contact_capacity),
            mask: LayerMask::all(),
            frame: Frame::from_config(&config),
            look_rotation: Quat::identity(),
            motion_offset: Vec3::zeros(),
            active: true,
            started: false,
            force_grounded: false,
            events: Box::new(NoEvents),
            diagnostics,
            config,
        }
    }

    pub fn with_events(mut self, events: Box<dyn LocomotionEvents>) -> Self {
        self.events = events;
        self
    }

    // ---------------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------------

    #[inline]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current capsule (differs from the configured one while height adjust is on).
    #[inline]
    pub fn capsule(&self) -> &CapsuleShape {
        &self.capsule
    }

    #[inline]
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[inline]
    pub fn platform(&self) -> &PlatformTracker {
        &self.platform
    }

    #[inline]
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    #[inline]
    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Simulated agent position (the capsule's feet).
    #[inline]
    pub fn agent_position(&self) -> Vec3 {
        self.state.position
    }

    #[inline]
    pub fn look_rotation(&self) -> Quat {
        self.look_rotation
    }

    /// Collision mask used by every query.
    #[inline]
    pub fn collision_mask(&self) -> LayerMask {
        self.mask
    }

    // ---------------------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------------------

    /// Push the configured tunables to the player and place the agent on it.
    ///
    /// Does nothing while the player is invalid; [`Locomotion::tick`] retries.
    pub fn start<P, A>(&mut self, physics: &mut P, player: &mut A)
    where
        P: PhysicsEngine + ?Sized,
        A: PlayerApi + ?Sized,
    {
        if !player.is_valid() {
            return;
        }
        self.refresh_frame(physics, player, self.frame.dt);

        self.set_walk_speed(player, self.config.walk_speed);
        self.set_strafe_speed(player, self.config.strafe_speed);
        self.set_run_speed(player, self.config.run_speed);
        let impulse = (self.config.jump.height
            * self.frame.gravity_strength
            * self.frame.gravity.norm()
            * 2.0)
            .max(0.0)
            .sqrt();
        self.set_jump_impulse(player, impulse);

        self.mask = physics.collision_mask(self.config.agent_layer);
        if let Some(proxy) = self.config.ground_proxy {
            if let Some(agent) = self.config.agent_collider {
                physics.ignore_collision(agent, proxy.collider);
            }
            self.mask.remove(proxy.layer);
        }

        self.snap_to_player(player);
        self.started = true;
        self.diagnostics
            .info(&format!("movement controller v{PACKAGE_VERSION} started"));
    }

    /// Run one simulation tick of `dt` seconds.
    ///
    /// Skipped entirely, leaving every piece of state untouched, while the player is
    /// invalid or `dt` is not a positive time step.
    pub fn tick<P, A>(&mut self, physics: &mut P, player: &mut A, raw: &RawInput, dt: f32)
    where
        P: PhysicsEngine + ?Sized,
        A: PlayerApi + ?Sized,
    {
        if !player.is_valid() || !(dt > 0.0) || !dt.is_finite() {
            return;
        }
        if !self.started {
            self.start(physics, player);
        }

        // 1) Cache host state and sample input.
        self.refresh_frame(physics, player, dt);
        let menu = probe_menu(physics, self.frame.player_position, &self.config.menu_probe);
        let previous = self.input;
        self.input = self.sampler.sample(raw, menu, self.frame.in_vr, &previous);

        if !self.active {
            return;
        }

        // 2) Ride the ground, then integrate velocity.
        self.apply_ground(physics);
        self.apply_walk();
        self.apply_jump();
        self.apply_gravity();

        // 3) Sweep-move with velocity plus the one-shot offset.
        let motion = self.state.velocity * dt + self.motion_offset;
        self.sweep(physics, motion);

        // 4) Recover floor contact lost between ticks.
        self.apply_ground_snap(physics);

        // 5) Mirror into the host player.
        self.apply_to_player(player);

        if self.config.debug_draw {
            self.draw_frame();
        }
    }

    // ---------------------------------------------------------------------------------
    // Per-tick stages
    // ---------------------------------------------------------------------------------

    fn refresh_frame<P, A>(&mut self, physics: &P, player: &A, dt: f32)
    where
        P: PhysicsEngine + ?Sized,
        A: PlayerApi + ?Sized,
    {
        let f = &mut self.frame;
        f.gravity = physics.gravity();
        f.dt = dt;
        f.in_vr = player.in_vr();
        f.player_position = player.position();
        f.player_rotation = player.rotation();
        f.gravity_strength = player.gravity_strength();
        f.jump_impulse = player.jump_impulse();
        f.walk_speed = player.walk_speed();
        f.strafe_speed = player.strafe_speed();
        f.run_speed = player.run_speed();

        let scale = player.camera_scale();
        f.camera_scale = if scale > 0.0 { scale } else { 1.0 };
        let height = player.avatar_eye_height();
        f.avatar_height = if height > 0.0 { height } else { 1.0 };

        let origin = player.tracking_pose(TrackingKind::Origin);
        let head = player.tracking_pose(TrackingKind::Head);
        f.head_position = head.translation;
        f.play_rotation = origin.rotation;

        let upright = (head.translation.y - f.player_position.y) / f.avatar_height;
        f.stance = Stance::from_upright(upright);

        if f.in_vr {
            self.vr.sample(origin, head, f.camera_scale);
            f.input_to_world = vr_input_to_world(head.rotation, controller_up());
        } else {
            self.vr.reset();
            f.input_to_world = f.play_rotation;
        }

        if self.sampler.look_enabled {
            self.look_rotation = f.play_rotation;
        }

        let adjust = self.config.height_adjust;
        if adjust.enabled {
            let mut height = (head.translation - self.state.position).dot(&controller_up());
            if adjust.clamp {
                height = height.clamp(adjust.min_height, adjust.max_height);
            }
            height = height.max(2.0 * self.capsule.radius);
            self.capsule = self.capsule.with_height(height);
        }
    }

    fn apply_ground<P: PhysicsEngine + ?Sized>(&mut self, physics: &P) {
        let outcome =
            self.platform
                .follow(physics, &mut self.state, self.config.platform_mode, self.frame.dt);

        if let Some(delta) = outcome.rotation_delta {
            self.look_rotation *= delta;
        }
        if outcome.impulse != Vec3::zeros() {
            if self.config.debug_draw {
                let at = self.state.position;
                self.diagnostics.draw_arrow(
                    at,
                    at + outcome.impulse * GROUND_VELOCITY_ARROW_SCALE,
                    Color::Magenta,
                    IMPULSE_ARROW_DURATION_S,
                );
            }
            self.add_force(outcome.impulse);
        }
    }

    fn apply_walk(&mut self) {
        if self.frame.in_vr {
            // Head sway moves the capsule without touching velocity.
            self.motion_offset += self.vr.offset();
        }

        if self.input.hold_move {
            let mut multiplier = self.height_scale();
            match self.frame.stance {
                Stance::Standing => {}
                Stance::Crouching => multiplier *= CROUCH_SPEED_MULTIPLIER,
                Stance::Prone => multiplier *= PRONE_SPEED_MULTIPLIER,
            }

            let axes = Vec3::new(self.input.move_x, 0.0, self.input.move_y);
            let mut local = clamp_magnitude(axes, 1.0) * multiplier;
            local.x *= self.frame.strafe_speed;
            local.z *= if self.input.hold_run {
                self.frame.run_speed
            } else {
                self.frame.walk_speed
            };

            let movement = self.input_to_movement(local);
            if self.state.is_walkable && !self.input.hold_jump {
                self.state.velocity = movement;
            } else {
                let max_delta = AIR_CONTROL_FACTOR
                    * self.frame.run_speed
                    * self.height_scale()
                    * self.frame.dt;
                self.target_velocity(movement, max_delta);
            }
        } else if self.platform.has_reference()
            && self.state.is_walkable
            && !self.input.hold_jump
        {
            self.state.velocity = Vec3::zeros();
        }
    }

    fn apply_jump(&mut self) {
        let up = self.gravity_up();

        if self.state.is_jumping {
            let denom = self.frame.gravity_strength * self.frame.gravity.norm();
            let apex = if denom > 0.0 {
                self.frame.jump_impulse / denom
            } else {
                0.0
            };

            if self.config.jump.cancel && !self.input.hold_jump {
                let rising = project(self.state.velocity, up);
                self.add_force(-rising * 0.5);
                self.state.is_jumping = false;
            } else if self.state.jump_time < apex {
                self.state.jump_time += self.frame.dt;
            } else {
                self.state.jump_time = apex;
                self.state.is_jumping = false;
            }
        }

        if self.state.is_walkable && self.input.hold_jump {
            self.state.jump_time = 0.0;
            self.state.is_jumping = true;
            let kick = up * (self.frame.jump_impulse * self.height_scale())
                - project(self.state.velocity, up);
            self.add_force(kick);
            self.events.on_jumped();
        }
    }

    fn apply_gravity(&mut self) {
        let scale = self.frame.gravity_strength * self.height_scale() * self.frame.dt;
        self.add_force(self.frame.gravity * scale);
    }

    /// Unground, sweep, resolve contacts. The one-shot offset is consumed either way.
    fn sweep<P: PhysicsEngine + ?Sized>(&mut self, physics: &mut P, motion: Vec3) {
        self.state.unground();

        self.contacts.clear();
        let request = SweepRequest {
            position: self.state.position,
            capsule: self.capsule,
            motion,
            collider: self.config.agent_collider,
            mask: self.mask,
            climb_steps: !self.config.step_handling_disabled,
        };
        self.state.position = physics.sweep_move(&request, &mut self.contacts);

        let ctx = self.resolve_context();
        let outcome = resolve_contacts(
            &mut self.state,
            &mut self.input,
            &self.contacts,
            &ctx,
            &mut self.diagnostics,
        );
        if let Some((surface, pose)) = outcome
            .floor_surface
            .and_then(|surface| physics.surface_pose(surface).map(|pose| (surface, pose)))
        {
            self.platform.refresh(surface, pose, self.state.position);
        }

        if self.state.just_grounded() {
            self.events.on_grounded();
        }

        self.motion_offset = Vec3::zeros();
    }

    fn apply_ground_snap<P: PhysicsEngine + ?Sized>(&mut self, physics: &P) {
        if !self.config.ground_snap.enabled {
            return;
        }
        if !self.state.was_walkable || self.state.is_grounded || self.state.is_jumping {
            return;
        }

        let up = controller_up();
        let down = controller_down();
        let skin = self.capsule.skin_width;
        let r = self.capsule.radius + skin;
        let origin = self.state.position + up * (r + GROUND_SNAP_PADDING);
        let distance = self.config.ground_snap.max_distance + r + GROUND_SNAP_PADDING;

        // The center has to be above ground, not just the rim of the capsule.
        if physics.raycast(origin, down, distance, self.mask).is_none() {
            return;
        }
        let Some(hit) = physics.sphere_cast(origin, r, down, distance, self.mask) else {
            return;
        };
        if angle_deg(hit.normal, self.gravity_up()) > self.config.slope_limit_deg {
            return;
        }

        let bottom_cap = hit.point + hit.normal * r;
        self.state.is_grounded = true;
        self.state.is_walkable = true;
        self.state.ground_up = hit.normal;
        self.state.walkable_up = hit.normal;
        self.state.position = bottom_cap + down * (r - skin);
        if let Some((surface, pose)) = hit
            .surface
            .and_then(|surface| physics.surface_pose(surface).map(|pose| (surface, pose)))
        {
            self.platform.refresh(surface, pose, self.state.position);
        }

        if !self.config.jump.auto_repeat {
            self.input.consume_jump();
        }
        self.state.velocity = walkable_response(self.state.velocity, &self.input, self.frame.gravity);

        if self.config.debug_draw {
            let color = contact_color(&self.state);
            self.diagnostics.draw_line(bottom_cap, hit.point, color, 0.0);
            self.diagnostics
                .draw_circle(hit.point, hit.normal, 0.25, color, 0.0);
        }
    }

    fn apply_to_player<A: PlayerApi + ?Sized>(&mut self, player: &mut A) {
        if self.input.main_menu_open() {
            player.set_velocity(Vec3::zeros());
            return;
        }

        if self.config.ground_proxy.is_some() {
            let enabled = self.state.is_grounded || self.force_grounded;
            player.set_ground_proxy(enabled.then_some(self.state.position));
        }

        let look = self.look_rotation;
        let pos = self.state.position
            - look * self.vr.local_play_position() * self.frame.camera_scale;
        let orientation = if self.frame.in_vr {
            SpawnOrientation::AlignRoomWithSpawnPoint
        } else {
            SpawnOrientation::Default
        };
        player.teleport_to(
            pos + controller_down() * self.capsule.skin_width,
            look,
            orientation,
            true,
        );

        let player_moving = self.state.velocity.norm() > MOVING_SPEED_EPS;
        let ground_moving = self.platform.ground_velocity().norm() > MOVING_SPEED_EPS;
        if (player_moving && !self.state.is_grounded) || self.state.is_steep || ground_moving {
            let mut velocity = self.state.velocity / self.frame.avatar_height;
            if self.frame.in_vr && ground_moving {
                velocity += self.vr.offset() / self.frame.dt;
            }
            player.set_velocity(velocity);
        }
    }

    fn draw_frame(&mut self) {
        let at = self.state.position;
        let right = self.input_to_movement(Vec3::x());
        let forward = self.input_to_movement(Vec3::z());
        let d = &mut self.diagnostics;
        d.draw_arrow(at, at + right, Color::Red, 0.0);
        d.draw_arrow(at, at + forward, Color::Blue, 0.0);
        d.draw_arrow(at, at + self.state.velocity, Color::Cyan, 0.0);
        if self.state.is_walkable {
            let ground = self.platform.ground_velocity() * GROUND_VELOCITY_ARROW_SCALE;
            d.draw_arrow(at, at + ground, Color::Magenta, 0.0);
        }
    }

    // ---------------------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------------------

    fn height_scale(&self) -> f32 {
        if self.config.scale_by_avatar_height {
            self.frame.avatar_height
        } else {
            1.0
        }
    }

    fn gravity_up(&self) -> Vec3 {
        let up = normalize_or_zero(-self.frame.gravity);
        if up == Vec3::zeros() { controller_up() } else { up }
    }

    fn resolve_context(&self) -> ResolveContext {
        ResolveContext {
            capsule: self.capsule,
            slope_limit_deg: self.config.slope_limit_deg,
            gravity: self.frame.gravity,
            auto_repeat_jump: self.config.jump.auto_repeat,
            debug_draw: self.config.debug_draw,
        }
    }

    /// Input space (x = strafe, z = forward) to a direction along the movement plane.
    fn input_to_movement(&self, local: Vec3) -> Vec3 {
        let world = self.frame.input_to_world * local;
        onto_movement_plane(world, self.state.movement_up())
    }

    /// Snap the agent onto the player (the head's floor position in VR).
    fn snap_to_player<A: PlayerApi + ?Sized>(&mut self, player: &A) {
        let position = if player.in_vr() {
            let origin = player.tracking_pose(TrackingKind::Origin);
            let head = player.tracking_pose(TrackingKind::Head);
            self.vr.sample(origin, head, player.camera_scale());
            Vec3::new(head.translation.x, player.position().y, head.translation.z)
        } else {
            player.position()
        };
        self.state.detach();
        self.state.position = position;
    }

    // ---------------------------------------------------------------------------------
    // Public API
    // ---------------------------------------------------------------------------------

    /// Resume simulating, picking up the player's current velocity.
    pub fn enable<A: PlayerApi + ?Sized>(&mut self, player: &A) {
        self.active = true;
        self.state.velocity = player.velocity();
        self.snap_to_player(player);
    }

    pub fn disable(&mut self) {
        self.active = false;
    }

    pub fn set_can_move(&mut self, can_move: bool) {
        self.sampler.move_enabled = can_move;
    }

    pub fn set_can_look(&mut self, can_look: bool) {
        self.sampler.look_enabled = can_look;
    }

    pub fn enable_inputs(&mut self) {
        self.set_can_move(true);
        self.set_can_look(true);
    }

    pub fn disable_inputs(&mut self) {
        self.set_can_move(false);
        self.set_can_look(false);
    }

    /// Teleport the player and re-snap the agent onto it.
    pub fn teleport_to<A: PlayerApi + ?Sized>(
        &mut self,
        player: &mut A,
        position: Vec3,
        options: TeleportOptions,
    ) {
        let rotation = options.rotation.unwrap_or_else(|| player.rotation());
        match options.orientation {
            Some(orientation) => {
                player.teleport_to(position, rotation, orientation, options.lerp_on_remote);
            }
            None => {
                // Carry the tracked room along: keep the origin's offset from the player.
                let rotation = yaw_only(rotation);
                let player_pos = player.position();
                let inv_player_rot = player.rotation().inverse();
                let origin = player.tracking_pose(TrackingKind::Origin);

                let pos_offset = origin.translation - player_pos;
                let rot_offset = inv_player_rot * origin.rotation;
                let target_rot = rotation * rot_offset;
                let target_pos = position + inv_player_rot * rotation * pos_offset;
                player.teleport_to(
                    target_pos,
                    target_rot,
                    SpawnOrientation::AlignRoomWithSpawnPoint,
                    options.lerp_on_remote,
                );
            }
        }
        self.snap_to_player(player);
        self.events.on_teleported();
    }

    /// Ask the host to respawn the player; the agent follows via
    /// [`Locomotion::on_player_respawn`].
    pub fn respawn<A: PlayerApi + ?Sized>(&mut self, player: &mut A, spawn_index: Option<usize>) {
        player.respawn(spawn_index);
    }

    /// Host notification that the local player respawned.
    pub fn on_player_respawn<A: PlayerApi + ?Sized>(&mut self, player: &A) {
        self.snap_to_player(player);
        self.state.velocity = self.gravity_up() * RESPAWN_UP_SPEED;
    }

    /// Host notification that the avatar eye height changed from `previous`.
    ///
    /// With height scaling on, shrinking scales velocity down with the avatar so a small
    /// avatar doesn't keep a large avatar's momentum.
    pub fn on_avatar_eye_height_changed<A: PlayerApi + ?Sized>(&mut self, player: &A, previous: f32) {
        let current = player.avatar_eye_height();
        if current > 0.0 {
            self.frame.avatar_height = current;
        }
        if !self.config.scale_by_avatar_height || !(previous > 0.0) || current >= previous {
            return;
        }

        let ratio = current / previous;
        let v = &mut self.state.velocity;
        if v.dot(&controller_up()) > 0.0 {
            v.y *= ratio;
        }
        v.x *= ratio;
        v.z *= ratio;
    }

    pub fn gravity_strength(&self) -> f32 {
        self.frame.gravity_strength
    }

    pub fn set_gravity_strength<A: PlayerApi + ?Sized>(&mut self, player: &mut A, strength: f32) {
        self.frame.gravity_strength = strength;
        player.set_gravity_strength(strength);
    }

    /// Effective gravity magnitude (world gravity × strength × height scale).
    pub fn gravity_magnitude(&self) -> f32 {
        self.frame.gravity.norm() * self.frame.gravity_strength * self.height_scale()
    }

    pub fn jump_impulse(&self) -> f32 {
        self.frame.jump_impulse
    }

    pub fn set_jump_impulse<A: PlayerApi + ?Sized>(&mut self, player: &mut A, impulse: f32) {
        self.frame.jump_impulse = impulse;
        player.set_jump_impulse(impulse);
    }

    /// Apex height of a jump. Zero without gravity.
    pub fn jump_height(&self) -> f32 {
        let g = self.gravity_magnitude();
        if g == 0.0 {
            return 0.0;
        }
        self.frame.jump_impulse * self.frame.jump_impulse / (g * 2.0)
    }

    pub fn set_jump_height<A: PlayerApi + ?Sized>(&mut self, player: &mut A, height: f32) {
        let impulse = (height * self.gravity_magnitude() * 2.0).max(0.0).sqrt();
        self.set_jump_impulse(player, impulse);
    }

    pub fn run_speed(&self) -> f32 {
        self.frame.run_speed
    }

    pub fn set_run_speed<A: PlayerApi + ?Sized>(&mut self, player: &mut A, speed: f32) {
        self.frame.run_speed = speed;
        player.set_run_speed(speed);
    }

    pub fn strafe_speed(&self) -> f32 {
        self.frame.strafe_speed
    }

    pub fn set_strafe_speed<A: PlayerApi + ?Sized>(&mut self, player: &mut A, speed: f32) {
        self.frame.strafe_speed = speed;
        player.set_strafe_speed(speed);
    }

    pub fn walk_speed(&self) -> f32 {
        self.frame.walk_speed
    }

    pub fn set_walk_speed<A: PlayerApi + ?Sized>(&mut self, player: &mut A, speed: f32) {
        self.frame.walk_speed = speed;
        player.set_walk_speed(speed);
    }

    /// Player position as of the last tick.
    pub fn position(&self) -> Vec3 {
        self.frame.player_position
    }

    /// Player rotation as of the last tick.
    pub fn rotation(&self) -> Quat {
        self.frame.player_rotation
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    /// Overwrite the velocity. Launching upward faster than one tick of gravity detaches
    /// the agent from the ground.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.state.velocity = velocity;
        if velocity.dot(&controller_up()) >= self.gravity_magnitude() * self.frame.dt {
            self.state.detach();
        }
    }

    /// Instantaneous velocity change.
    #[inline]
    pub fn add_force(&mut self, force: Vec3) {
        self.state.velocity += force;
    }

    /// Ease the velocity along the movement plane toward `target` by at most `max_delta`.
    ///
    /// On a steep surface the part of the change that would push up the slope is dropped.
    pub fn target_velocity(&mut self, target: Vec3, max_delta: f32) {
        let movement_up = self.state.movement_up();
        let flat = project_on_plane(self.state.velocity, movement_up);
        let mut delta = move_towards(flat, target, max_delta) - flat;

        if self.state.is_steep {
            let ground_out = normalize_or_zero(project_on_plane(self.state.ground_up, movement_up));
            let into_slope = ground_out.dot(&delta).min(0.0);
            delta -= ground_out * into_slope;
        }

        self.add_force(delta);
    }

    /// Standing on walkable ground.
    pub fn is_grounded(&self) -> bool {
        self.state.is_walkable
    }

    pub fn force_grounded(&self) -> bool {
        self.force_grounded
    }

    pub fn set_force_grounded(&mut self, grounded: bool) {
        self.force_grounded = grounded;
    }
}

/// Project `world` along the controller up onto the plane with normal `movement_up`,
/// keeping its length.
pub fn onto_movement_plane(world: Vec3, movement_up: Vec3) -> Vec3 {
    let up = controller_up();
    let denom = movement_up.dot(&up);
    let t = if denom.abs() > f32::EPSILON {
        -movement_up.dot(&world) / denom
    } else {
        0.0
    };
    normalize_or_zero(world + up * t) * world.norm()
}
