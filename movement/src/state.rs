use crate::{
    constants::{CROUCHING_UPRIGHT_RATIO, STANDING_UPRIGHT_RATIO},
    types::{Vec3, controller_up},
};

/// Posture inferred from how high the head is relative to the avatar's eye height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stance {
    #[default]
    Standing,
    Crouching,
    Prone,
}

impl Stance {
    /// `upright` is head height above the feet divided by the avatar eye height.
    pub fn from_upright(upright: f32) -> Self {
        if upright > STANDING_UPRIGHT_RATIO {
            Stance::Standing
        } else if upright > CROUCHING_UPRIGHT_RATIO {
            Stance::Crouching
        } else {
            Stance::Prone
        }
    }
}

/// Mutable per-agent motion state, owned by the locomotion stepper.
///
/// The `was_*` flags hold the previous sweep's `is_*` flags. They are written only by
/// [`KinematicState::unground`], which runs once per sweep-move.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicState {
    /// Agent position (the capsule's feet), mirrored into the host capsule.
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_grounded: bool,
    pub was_grounded: bool,
    pub is_steep: bool,
    pub was_steep: bool,
    pub is_walkable: bool,
    pub was_walkable: bool,
    /// Normal of the last floor contact.
    pub ground_up: Vec3,
    /// Normal of the last walkable floor contact. Steep contacts never write it.
    pub walkable_up: Vec3,
    /// Time spent rising in the current jump (seconds).
    pub jump_time: f32,
    pub is_jumping: bool,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            is_grounded: false,
            was_grounded: false,
            is_steep: false,
            was_steep: false,
            is_walkable: false,
            was_walkable: false,
            ground_up: controller_up(),
            walkable_up: controller_up(),
            jump_time: 0.0,
            is_jumping: false,
        }
    }
}

impl KinematicState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Shift the current contact flags into `was_*` and clear them.
    pub fn unground(&mut self) {
        self.was_grounded = self.is_grounded;
        self.was_steep = self.is_steep;
        self.was_walkable = self.is_walkable;
        self.is_grounded = false;
        self.is_steep = false;
        self.is_walkable = false;
    }

    /// Drop the current contact flags without touching `was_*`.
    ///
    /// Used between ticks (teleports, launches) so the next tick sees the agent as
    /// having left the ground.
    pub fn detach(&mut self) {
        self.is_grounded = false;
        self.is_steep = false;
        self.is_walkable = false;
    }

    /// "Up" of the plane movement input is projected onto.
    pub fn movement_up(&self) -> Vec3 {
        if self.is_walkable {
            self.walkable_up
        } else {
            controller_up()
        }
    }

    /// `true` on the sweep that turned the agent from airborne into grounded.
    pub fn just_grounded(&self) -> bool {
        !self.was_grounded && self.is_grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stance_bands() {
        assert_eq!(Stance::from_upright(0.9), Stance::Standing);
        assert_eq!(Stance::from_upright(0.5), Stance::Crouching);
        assert_eq!(Stance::from_upright(0.4), Stance::Prone);
        assert_eq!(Stance::from_upright(0.1), Stance::Prone);
    }

    #[test]
    fn unground_shifts_flags_once() {
        let mut state = KinematicState {
            is_grounded: true,
            is_walkable: true,
            ..KinematicState::default()
        };

        state.unground();
        assert!(state.was_grounded && state.was_walkable && !state.was_steep);
        assert!(!state.is_grounded && !state.is_walkable && !state.is_steep);

        // A second unground with nothing in between records "airborne".
        state.unground();
        assert!(!state.was_grounded && !state.was_walkable);
    }

    #[test]
    fn detach_keeps_previous_flags() {
        let mut state = KinematicState {
            is_walkable: true,
            is_grounded: true,
            was_walkable: true,
            ..KinematicState::default()
        };
        state.detach();
        assert!(!state.is_walkable);
        assert!(state.was_walkable);
    }

    #[test]
    fn movement_up_tracks_walkable_ground() {
        let tilted = Vec3::new(0.0, 1.0, 1.0).normalize();
        let mut state = KinematicState {
            walkable_up: tilted,
            ground_up: Vec3::new(1.0, 0.1, 0.0).normalize(),
            ..KinematicState::default()
        };
        assert_eq!(state.movement_up(), controller_up());
        state.is_walkable = true;
        assert_eq!(state.movement_up(), tilted);
    }
}
