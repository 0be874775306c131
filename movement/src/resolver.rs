/*!
Collision resolution.

After each sweep-move the stepper feeds the buffered contacts through
[`resolve_contacts`], in report order. Each contact is classified against the capsule's
cap centers ([`classify_contact`]) and then applied to the [`KinematicState`]:

- floor: the point lies on or below the bottom cap center. Marks the agent grounded and
  records `ground_up` (and `walkable_up` when walkable). Walkable if the surface angle
  is within the slope limit, steep otherwise.
- ceiling: the point lies on or above the top cap center. Ends a jump in progress.
- wall: anything else.

Contacts the agent is moving away from are ignored. Once a contact in a sweep made the
agent walkable, later contacts in the same sweep cannot revert it.
*/

use crate::{
    config::CapsuleShape,
    contact::{ContactBuffer, ContactEvent},
    diagnostics::{Color, Diagnostics},
    input::InputState,
    state::KinematicState,
    types::{SurfaceId, Vec3, controller_down, controller_up},
    utils::{angle_deg, normalize_or_zero, project_on_plane},
};

/// Radius of the debug circle drawn on each contact.
const CONTACT_MARKER_RADIUS: f32 = 0.25;

/// Cap centers of a capsule standing at an agent position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleGeometry {
    pub bottom_cap: Vec3,
    pub top_cap: Vec3,
}

impl CapsuleGeometry {
    pub fn at(position: Vec3, capsule: &CapsuleShape) -> Self {
        let center = position + capsule.center;
        let offset = capsule.cap_offset();
        Self {
            bottom_cap: center + controller_down() * offset,
            top_cap: center + controller_up() * offset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactClass {
    Floor { slope_deg: f32, walkable: bool },
    Ceiling,
    Wall,
}

/// Per-sweep constants for resolving contacts.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext {
    pub capsule: CapsuleShape,
    pub slope_limit_deg: f32,
    /// World gravity. Its opposite is the reference "up" for slope angles.
    pub gravity: Vec3,
    pub auto_repeat_jump: bool,
    pub debug_draw: bool,
}

impl ResolveContext {
    /// Opposite of the gravity direction, or the controller up without gravity.
    pub fn gravity_up(&self) -> Vec3 {
        let up = normalize_or_zero(-self.gravity);
        if up == Vec3::zeros() { controller_up() } else { up }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResolveOutcome {
    /// Surface of the last floor contact that named one.
    pub floor_surface: Option<SurfaceId>,
    /// Contacts taken from the buffer.
    pub processed: usize,
    /// Contacts the physics engine reported but the buffer dropped.
    pub dropped: usize,
}

/// Classify a contact by where it touches the capsule.
pub fn classify_contact(
    geometry: &CapsuleGeometry,
    contact: &ContactEvent,
    up: Vec3,
    slope_limit_deg: f32,
) -> ContactClass {
    if (contact.point - geometry.bottom_cap).dot(&controller_down()) >= 0.0 {
        let normal_angle = angle_deg(contact.normal, up);
        let to_foot_angle = angle_deg(contact.point - geometry.bottom_cap, up);
        let slope_deg = normal_angle.min(to_foot_angle);
        ContactClass::Floor {
            slope_deg,
            walkable: slope_deg <= slope_limit_deg,
        }
    } else if (contact.point - geometry.top_cap).dot(&controller_up()) >= 0.0 {
        ContactClass::Ceiling
    } else {
        ContactClass::Wall
    }
}

/// Velocity left after standing on walkable ground.
///
/// Zero unless the player is steering or jumping, in which case only the component along
/// gravity is removed.
#[inline]
pub fn walkable_response(velocity: Vec3, input: &InputState, gravity: Vec3) -> Vec3 {
    if input.hold_move || input.hold_jump {
        project_on_plane(velocity, gravity)
    } else {
        Vec3::zeros()
    }
}

/// Apply one contact to the state. Returns the class if the agent was moving into it.
pub fn apply_contact(
    state: &mut KinematicState,
    input: &mut InputState,
    contact: &ContactEvent,
    ctx: &ResolveContext,
) -> Option<ContactClass> {
    if normalize_or_zero(state.velocity).dot(&contact.normal) >= 0.0 {
        return None;
    }

    let geometry = CapsuleGeometry::at(state.position, &ctx.capsule);
    let class = classify_contact(&geometry, contact, ctx.gravity_up(), ctx.slope_limit_deg);
    match class {
        ContactClass::Floor { walkable, .. } => {
            state.is_grounded = true;
            state.ground_up = contact.normal;
            if walkable {
                state.is_walkable = true;
                state.walkable_up = contact.normal;
                if !ctx.auto_repeat_jump {
                    input.consume_jump();
                }
            } else {
                state.is_steep = true;
            }
        }
        ContactClass::Ceiling => state.is_jumping = false,
        ContactClass::Wall => {}
    }

    state.velocity = if state.is_walkable {
        walkable_response(state.velocity, input, ctx.gravity)
    } else {
        project_on_plane(state.velocity, contact.normal)
    };

    Some(class)
}

/// Color of the contact markers for the current flags.
pub fn contact_color(state: &KinematicState) -> Color {
    match (state.is_grounded, state.is_steep) {
        (true, false) => Color::Green,
        (true, true) => Color::Yellow,
        (false, _) => Color::Red,
    }
}

/// Resolve every buffered contact of one sweep-move, in report order.
///
/// Raises a single warning if the buffer dropped contacts.
pub fn resolve_contacts<D: Diagnostics + ?Sized>(
    state: &mut KinematicState,
    input: &mut InputState,
    contacts: &ContactBuffer,
    ctx: &ResolveContext,
    diag: &mut D,
) -> ResolveOutcome {
    let mut outcome = ResolveOutcome {
        processed: contacts.len(),
        ..ResolveOutcome::default()
    };

    if let Some(reported) = contacts.overflow() {
        outcome.dropped = reported - contacts.capacity();
        diag.warn(&format!(
            "contact count ({reported}) exceeded contact buffer size ({})",
            contacts.capacity()
        ));
    }

    for contact in contacts.as_slice() {
        let class = apply_contact(state, input, contact, ctx);
        if matches!(class, Some(ContactClass::Floor { .. })) && contact.surface.is_some() {
            outcome.floor_surface = contact.surface;
        }

        if ctx.debug_draw {
            let geometry = CapsuleGeometry::at(state.position, &ctx.capsule);
            let color = contact_color(state);
            diag.draw_line(geometry.bottom_cap, contact.point, color, 0.0);
            diag.draw_circle(
                contact.point,
                contact.normal,
                CONTACT_MARKER_RADIUS,
                color,
                0.0,
            );
        }
    }

    outcome
}
