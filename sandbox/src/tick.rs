//! Fixed-rate tick driver.
//!
//! Owns one agent with its world and player and advances it with a clamped variable
//! timestep, the same way a host would from its frame or network tick.

use movement::{AgentConfig, Diagnostics, Locomotion, LogDiagnostics, RawInput};

use crate::{player::HeadlessPlayer, world::SandboxWorld};

/// Driver tick frequency (Hz).
pub const TICK_HZ: u32 = 60;

/// Max dt (seconds) for a single tick.
///
/// Stalls (debugger, slow frame) advance at most this much so one tick can't tunnel
/// through thin geometry.
pub const MAX_TICK_DT_S: f32 = 0.10;

pub struct Sandbox<D: Diagnostics = LogDiagnostics> {
    pub world: SandboxWorld,
    pub player: HeadlessPlayer,
    pub locomotion: Locomotion<D>,
    ticks: u64,
}

impl Sandbox<LogDiagnostics> {
    pub fn new(world: SandboxWorld, player: HeadlessPlayer, config: AgentConfig) -> Self {
        Self::with_diagnostics(world, player, config, LogDiagnostics)
    }
}

impl<D: Diagnostics> Sandbox<D> {
    pub fn with_diagnostics(
        mut world: SandboxWorld,
        mut player: HeadlessPlayer,
        config: AgentConfig,
        diagnostics: D,
    ) -> Self {
        let mut locomotion = Locomotion::new(config, diagnostics);
        locomotion.start(&mut world, &mut player);
        log::debug!("sandbox ready at {:?}", locomotion.agent_position());
        Self {
            world,
            player,
            locomotion,
            ticks: 0,
        }
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick of `dt` seconds (clamped to [`MAX_TICK_DT_S`]).
    pub fn step(&mut self, raw: &RawInput, dt: f32) {
        if !(dt > 0.0) {
            log::debug!("skipping tick with dt {dt}");
            return;
        }
        let dt = dt.min(MAX_TICK_DT_S);

        if self.player.take_respawn() {
            self.locomotion.on_player_respawn(&self.player);
        }
        self.locomotion
            .tick(&mut self.world, &mut self.player, raw, dt);
        self.ticks += 1;
    }

    /// Run `ticks` ticks at [`TICK_HZ`] with the same input.
    pub fn run(&mut self, raw: &RawInput, ticks: usize) {
        let dt = 1.0 / TICK_HZ as f32;
        for _ in 0..ticks {
            self.step(raw, dt);
        }
    }

    /// Respawn the player; the agent follows on the next tick.
    pub fn respawn(&mut self, index: Option<usize>) {
        self.locomotion.respawn(&mut self.player, index);
    }
}
