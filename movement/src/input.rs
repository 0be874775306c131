/*!
Input sampling.

The host accumulates raw axis values and button states from its input events and hands
them to the controller as a [`RawInput`] each tick. [`InputSampler::sample`] turns that
into the frame-local [`InputState`] the stepper consumes.

Menu detection
- The host has no "menu is open" signal. Its menus do spawn colliders on a dedicated layer
  around the player, so the sampler counts colliders on that layer in a sphere around the
  player's last known position: 8..=10 means the main menu, 11..=12 the quick menu.
- This breaks as soon as the host adds or removes a collider in that band. It is the only
  signal available.
*/

use crate::{
    config::MenuProbeConfig,
    constants::{MAIN_MENU_COUNTS, QUICK_MENU_COUNTS},
    layers::LayerMask,
    physics::PhysicsEngine,
    types::Vec3,
};

/// Raw per-tick input as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawInput {
    pub move_x: f32,
    pub move_y: f32,
    pub look_x: f32,
    pub look_y: f32,
    /// Jump button is held.
    pub jump: bool,
    /// Desktop run modifier (e.g. shift) is held.
    pub run_modifier: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    MainMenu,
    QuickMenu,
}

impl MenuState {
    pub fn from_collider_count(count: usize) -> Self {
        if MAIN_MENU_COUNTS.contains(&count) {
            MenuState::MainMenu
        } else if QUICK_MENU_COUNTS.contains(&count) {
            MenuState::QuickMenu
        } else {
            MenuState::Closed
        }
    }

    pub fn any_open(self) -> bool {
        self != MenuState::Closed
    }

    pub fn main_open(self) -> bool {
        self == MenuState::MainMenu
    }
}

/// Count menu colliders around `center` and classify the result.
pub fn probe_menu<P: PhysicsEngine + ?Sized>(
    physics: &P,
    center: Vec3,
    probe: &MenuProbeConfig,
) -> MenuState {
    let mask = LayerMask::empty().with(probe.layer);
    let count = physics.overlap_sphere_count(center, probe.radius, mask, probe.capacity);
    MenuState::from_collider_count(count.min(probe.capacity))
}

/// Input for one tick. Recomputed from scratch every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub move_x: f32,
    pub move_y: f32,
    pub hold_move: bool,
    pub hold_run: bool,
    pub hold_jump: bool,
    pub look_x: f32,
    pub look_y: f32,
    pub hold_look: bool,
    pub menu: MenuState,
    /// Set when a landing consumed the jump this tick.
    pub jump_consumed: bool,
}

impl InputState {
    pub fn menu_open(&self) -> bool {
        self.menu.any_open()
    }

    pub fn main_menu_open(&self) -> bool {
        self.menu.main_open()
    }

    /// Drop the jump hold until the raw button is released.
    pub fn consume_jump(&mut self) {
        self.hold_jump = false;
        self.jump_consumed = true;
    }
}

/// Turns raw input into [`InputState`], honoring the move/look enables and menu occlusion.
#[derive(Clone, Debug)]
pub struct InputSampler {
    pub move_enabled: bool,
    pub look_enabled: bool,
    jump_latched: bool,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self {
            move_enabled: true,
            look_enabled: true,
            jump_latched: false,
        }
    }
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this tick's input.
    ///
    /// `previous` is last tick's state; a jump it consumed stays consumed until the raw
    /// jump button is released.
    pub fn sample(
        &mut self,
        raw: &RawInput,
        menu: MenuState,
        in_vr: bool,
        previous: &InputState,
    ) -> InputState {
        if previous.jump_consumed {
            self.jump_latched = true;
        }
        if !raw.jump {
            self.jump_latched = false;
        }

        let mut out = InputState {
            menu,
            hold_jump: raw.jump && !self.jump_latched,
            ..InputState::default()
        };

        if self.move_enabled && !menu.main_open() {
            out.move_x = raw.move_x.clamp(-1.0, 1.0);
            out.move_y = raw.move_y.clamp(-1.0, 1.0);
            out.hold_move = out.move_x != 0.0 || out.move_y != 0.0;
            out.hold_run = in_vr || raw.run_modifier;
        } else {
            out.hold_jump = false;
        }

        if !in_vr && menu.any_open() {
            out.hold_jump = false;
        }

        let look_blocked = if in_vr {
            menu.main_open()
        } else {
            menu.any_open()
        };
        if self.look_enabled && !look_blocked {
            out.look_x = raw.look_x.clamp(-1.0, 1.0);
            out.look_y = raw.look_y.clamp(-1.0, 1.0);
            out.hold_look = out.look_x != 0.0 || out.look_y != 0.0;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_forward_jump() -> RawInput {
        RawInput {
            move_y: 1.0,
            look_x: 0.5,
            jump: true,
            ..RawInput::default()
        }
    }

    #[test]
    fn menu_bands() {
        assert_eq!(MenuState::from_collider_count(0), MenuState::Closed);
        assert_eq!(MenuState::from_collider_count(7), MenuState::Closed);
        assert_eq!(MenuState::from_collider_count(8), MenuState::MainMenu);
        assert_eq!(MenuState::from_collider_count(10), MenuState::MainMenu);
        assert_eq!(MenuState::from_collider_count(11), MenuState::QuickMenu);
        assert_eq!(MenuState::from_collider_count(12), MenuState::QuickMenu);
        assert_eq!(MenuState::from_collider_count(13), MenuState::Closed);
    }

    #[test]
    fn derives_holds_from_axes() {
        let mut sampler = InputSampler::new();
        let input = sampler.sample(
            &raw_forward_jump(),
            MenuState::Closed,
            false,
            &InputState::default(),
        );
        assert!(input.hold_move);
        assert!(!input.hold_run);
        assert!(input.hold_jump);
        assert!(input.hold_look);
    }

    #[test]
    fn run_is_always_held_in_vr() {
        let mut sampler = InputSampler::new();
        let input = sampler.sample(
            &raw_forward_jump(),
            MenuState::Closed,
            true,
            &InputState::default(),
        );
        assert!(input.hold_run);
    }

    #[test]
    fn main_menu_zeroes_move_jump_and_look() {
        let mut sampler = InputSampler::new();
        let input = sampler.sample(
            &raw_forward_jump(),
            MenuState::MainMenu,
            false,
            &InputState::default(),
        );
        assert_eq!((input.move_x, input.move_y), (0.0, 0.0));
        assert!(!input.hold_move && !input.hold_jump && !input.hold_look);
    }

    #[test]
    fn quick_menu_blocks_jump_and_look_on_desktop_only() {
        let mut sampler = InputSampler::new();
        let desktop = sampler.sample(
            &raw_forward_jump(),
            MenuState::QuickMenu,
            false,
            &InputState::default(),
        );
        assert!(desktop.hold_move);
        assert!(!desktop.hold_jump);
        assert!(!desktop.hold_look);

        let vr = sampler.sample(
            &raw_forward_jump(),
            MenuState::QuickMenu,
            true,
            &InputState::default(),
        );
        assert!(vr.hold_jump);
        assert!(vr.hold_look);
    }

    #[test]
    fn disabled_look_is_zeroed() {
        let mut sampler = InputSampler::new();
        sampler.look_enabled = false;
        let input = sampler.sample(
            &raw_forward_jump(),
            MenuState::Closed,
            false,
            &InputState::default(),
        );
        assert_eq!(input.look_x, 0.0);
        assert!(!input.hold_look);
        assert!(input.hold_move);
    }

    #[test]
    fn consumed_jump_stays_consumed_until_release() {
        let mut sampler = InputSampler::new();
        let raw = raw_forward_jump();

        let mut first = sampler.sample(&raw, MenuState::Closed, false, &InputState::default());
        first.consume_jump();

        let second = sampler.sample(&raw, MenuState::Closed, false, &first);
        assert!(!second.hold_jump);

        let released = RawInput {
            jump: false,
            ..raw
        };
        let third = sampler.sample(&released, MenuState::Closed, false, &second);
        assert!(!third.hold_jump);

        let pressed_again = sampler.sample(&raw, MenuState::Closed, false, &third);
        assert!(pressed_again.hold_jump);
    }
}
