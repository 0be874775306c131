/// Version reported when a controller starts.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Skin width of the reference host capsule (meters).
pub const DEFAULT_SKIN_WIDTH: f32 = 0.005;

/// Height of the reference host capsule (meters).
pub const DEFAULT_CAPSULE_HEIGHT: f32 = 1.6;

/// Radius of the reference host capsule (meters).
pub const DEFAULT_CAPSULE_RADIUS: f32 = 0.2;

/// Capsule center offset along up for the reference shape (meters).
pub const DEFAULT_CAPSULE_CENTER: f32 = 0.8;

/// Speed multiplier applied while crouching.
pub const CROUCH_SPEED_MULTIPLIER: f32 = 0.5;

/// Speed multiplier applied while prone.
pub const PRONE_SPEED_MULTIPLIER: f32 = 0.1;

/// Head height (relative to eye height) above which the player counts as standing.
pub const STANDING_UPRIGHT_RATIO: f32 = 0.65;

/// Head height (relative to eye height) above which the player counts as crouching.
pub const CROUCHING_UPRIGHT_RATIO: f32 = 0.4;

/// Speeds at or below this (m/s) are considered "not moving" when syncing to the player.
pub const MOVING_SPEED_EPS: f32 = 0.01;

/// Padding used by the ground-snap probe so it does not start inside colliders (meters).
pub const GROUND_SNAP_PADDING: f32 = 0.01;

/// Airborne acceleration toward the input velocity, as a multiple of run speed (1/s).
pub const AIR_CONTROL_FACTOR: f32 = 5.0;

/// Upward speed given to the agent when the player respawns (m/s).
pub const RESPAWN_UP_SPEED: f32 = 2.0;

/// Pitch (degrees) applied to the VR head forward when looking up.
pub const VR_LOOK_UP_BIAS_DEG: f32 = 52.0;

/// Pitch (degrees) applied to the VR head forward when looking down.
pub const VR_LOOK_DOWN_BIAS_DEG: f32 = -66.0;

/// Offset subtracted from `dot(head_forward, up)^2` to get the VR pitch blend factor.
pub const VR_BIAS_BLEND_OFFSET: f32 = 0.2;

/// Default bound of the per-sweep contact buffer.
pub const DEFAULT_CONTACT_CAPACITY: usize = 8;

/// Default menu probe radius around the player (meters).
pub const MENU_PROBE_RADIUS: f32 = 10.0;

/// Layer the host places its menu colliders on.
pub const MENU_PROBE_LAYER: u8 = 19;

/// Maximum number of colliders the menu probe counts.
pub const MENU_PROBE_CAPACITY: usize = 12;

/// Collider counts (inclusive) that mean the main menu is open.
pub const MAIN_MENU_COUNTS: std::ops::RangeInclusive<usize> = 8..=10;

/// Collider counts (inclusive) that mean the quick menu is open.
pub const QUICK_MENU_COUNTS: std::ops::RangeInclusive<usize> = 11..=12;

/// Default walk speed (m/s).
pub const DEFAULT_WALK_SPEED: f32 = 2.0;

/// Default strafe speed (m/s).
pub const DEFAULT_STRAFE_SPEED: f32 = 2.0;

/// Default run speed (m/s).
pub const DEFAULT_RUN_SPEED: f32 = 4.0;

/// Default slope limit (degrees).
pub const DEFAULT_SLOPE_LIMIT_DEG: f32 = 60.0;

/// Default ground-snap distance (meters).
pub const DEFAULT_GROUND_SNAP_DISTANCE: f32 = 0.25;

/// Default jump apex height (meters).
pub const DEFAULT_JUMP_HEIGHT: f32 = 1.0;

/// Default gravity magnitude used by hosts that don't override it (m/s^2).
pub const GRAVITY_MPS2: f32 = 9.81;
