pub mod player;
pub mod tick;
pub mod world;

pub use player::HeadlessPlayer;
pub use tick::{MAX_TICK_DT_S, Sandbox, TICK_HZ};
pub use world::{SandboxWorld, SurfaceDef, SurfaceShape};

// Re-export Rapier so hosts can build extra geometry without a direct dependency.
pub use rapier3d;
