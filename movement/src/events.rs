//! Gameplay hooks fired by the stepper.

/// Hooks for code that reacts to locomotion (sounds, animation triggers, scoring).
///
/// Every method defaults to doing nothing.
pub trait LocomotionEvents {
    /// A jump started this tick.
    fn on_jumped(&mut self) {}

    /// A sweep-move brought the agent from airborne to grounded.
    fn on_grounded(&mut self) {}

    /// A teleport finished and the agent was re-snapped to the player.
    fn on_teleported(&mut self) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoEvents;

impl LocomotionEvents for NoEvents {}
