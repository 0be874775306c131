pub mod config;
pub mod constants;
pub mod contact;
pub mod diagnostics;
pub mod events;
pub mod input;
pub mod layers;
pub mod locomotion;
pub mod physics;
pub mod platform;
pub mod player;
pub mod resolver;
pub mod state;
pub mod types;
pub mod utils;
pub mod vr;

#[cfg(test)]
mod testing;

pub use config::{
    AgentConfig, CapsuleShape, ConfigError, GroundProxy, GroundSnapConfig, HeightAdjust,
    JumpConfig, MenuProbeConfig, PlatformMode,
};
pub use constants::{GRAVITY_MPS2, PACKAGE_VERSION};
pub use contact::{ContactBuffer, ContactEvent};
pub use diagnostics::{Color, Diagnostics, Level, LogDiagnostics, NoopDiagnostics, RecordingDiagnostics};
pub use events::{LocomotionEvents, NoEvents};
pub use input::{InputSampler, InputState, MenuState, RawInput};
pub use layers::{Layer, LayerCollisionMatrix, LayerMask};
pub use locomotion::{Locomotion, TeleportOptions};
pub use physics::{CastHit, PhysicsEngine, SweepRequest};
pub use platform::{GroundReference, PlatformTracker};
pub use player::{PlayerApi, SpawnOrientation, TrackingKind};
pub use state::{KinematicState, Stance};
pub use types::{Pose, Quat, SurfaceId, Vec3, controller_down, controller_up};
pub use vr::VrOffsetReconciler;
