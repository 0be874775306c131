/*!
Agent configuration.

`AgentConfig` is supplied by the host once per session and treated as immutable by the
controller. Values are expressed in meters, seconds and degrees.

Notes
- Faults are never fatal: [`AgentConfig::validate`] reports them and
  [`AgentConfig::sanitized`] replaces each with a neutral value. The controller logs the
  error and runs with the sanitized copy.
- Per-player tunables that the host also stores (speeds, jump impulse, gravity strength)
  are only *initial* values here; the live values are owned by the player collaborator.
*/

use thiserror::Error;

use crate::{
    constants::*,
    layers::Layer,
    types::{SurfaceId, Vec3, controller_up},
};

/// What the agent inherits from the surface it stands on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlatformMode {
    None,
    #[default]
    Position,
    PositionAndRotation,
}

impl PlatformMode {
    pub fn inherits_position(self) -> bool {
        self != PlatformMode::None
    }

    pub fn inherits_rotation(self) -> bool {
        self == PlatformMode::PositionAndRotation
    }
}

/// Capsule dimensions, expressed relative to the agent position (the feet).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    /// Total height including both caps.
    pub height: f32,
    /// Offset from the agent position to the capsule center.
    pub center: Vec3,
    /// Separation the sweep-move keeps from surfaces.
    pub skin_width: f32,
}

impl CapsuleShape {
    /// The capsule the reference host uses for its own players.
    pub fn default_shape() -> Self {
        Self {
            radius: DEFAULT_CAPSULE_RADIUS,
            height: DEFAULT_CAPSULE_HEIGHT,
            center: controller_up() * DEFAULT_CAPSULE_CENTER,
            skin_width: DEFAULT_SKIN_WIDTH,
        }
    }

    /// A capsule standing on the agent position with the given height and radius.
    pub fn custom(height: f32, radius: f32) -> Self {
        Self {
            radius,
            height,
            center: controller_up() * (height * 0.5),
            skin_width: DEFAULT_SKIN_WIDTH,
        }
    }

    /// Distance from the capsule center to either cap center.
    #[inline]
    pub fn cap_offset(&self) -> f32 {
        self.height * 0.5 - self.radius
    }

    /// The same capsule resized to `height`, still standing on the agent position.
    pub fn with_height(self, height: f32) -> Self {
        Self {
            height,
            center: controller_up() * (height * 0.5),
            ..self
        }
    }
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self::default_shape()
    }
}

/// Capsule height following the tracked head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightAdjust {
    pub enabled: bool,
    pub clamp: bool,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for HeightAdjust {
    fn default() -> Self {
        Self {
            enabled: false,
            clamp: false,
            min_height: 0.0,
            max_height: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSnapConfig {
    pub enabled: bool,
    /// Maximum distance the agent can be pulled down by (meters).
    pub max_distance: f32,
}

impl Default for GroundSnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_distance: DEFAULT_GROUND_SNAP_DISTANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JumpConfig {
    /// Apex height of a full jump (meters).
    pub height: f32,
    /// Holding jump keeps jumping on every landing.
    pub auto_repeat: bool,
    /// Releasing jump early halves the upward velocity.
    pub cancel: bool,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_JUMP_HEIGHT,
            auto_repeat: true,
            cancel: true,
        }
    }
}

/// Heuristic menu detection: count colliders on `layer` within `radius` of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuProbeConfig {
    pub radius: f32,
    pub layer: Layer,
    pub capacity: usize,
}

impl Default for MenuProbeConfig {
    fn default() -> Self {
        Self {
            radius: MENU_PROBE_RADIUS,
            layer: Layer(MENU_PROBE_LAYER),
            capacity: MENU_PROBE_CAPACITY,
        }
    }
}

/// Helper collider the host player stands on while the agent is grounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundProxy {
    pub collider: SurfaceId,
    pub layer: Layer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentConfig {
    pub capsule: CapsuleShape,
    pub height_adjust: HeightAdjust,
    /// Collider id of the agent capsule in the host world, if it has one.
    pub agent_collider: Option<SurfaceId>,
    /// Layer of the agent capsule; its collision mask filters every query.
    pub agent_layer: Layer,
    /// The sweep-move never climbs steps on its own.
    pub step_handling_disabled: bool,
    pub slope_limit_deg: f32,
    pub ground_snap: GroundSnapConfig,
    pub jump: JumpConfig,
    pub walk_speed: f32,
    pub strafe_speed: f32,
    pub run_speed: f32,
    pub platform_mode: PlatformMode,
    /// Multiply speeds, jump and gravity by the avatar eye height.
    pub scale_by_avatar_height: bool,
    pub contact_capacity: usize,
    pub menu_probe: MenuProbeConfig,
    pub ground_proxy: Option<GroundProxy>,
    pub debug_draw: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            capsule: CapsuleShape::default_shape(),
            height_adjust: HeightAdjust::default(),
            agent_collider: None,
            agent_layer: Layer::DEFAULT,
            step_handling_disabled: true,
            slope_limit_deg: DEFAULT_SLOPE_LIMIT_DEG,
            ground_snap: GroundSnapConfig::default(),
            jump: JumpConfig::default(),
            walk_speed: DEFAULT_WALK_SPEED,
            strafe_speed: DEFAULT_STRAFE_SPEED,
            run_speed: DEFAULT_RUN_SPEED,
            platform_mode: PlatformMode::default(),
            scale_by_avatar_height: false,
            contact_capacity: DEFAULT_CONTACT_CAPACITY,
            menu_probe: MenuProbeConfig::default(),
            ground_proxy: None,
            debug_draw: false,
        }
    }
}

/// Configuration faults. None of these stop the controller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("capsule radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("skin width must not be negative, got {0}")]
    NegativeSkinWidth(f32),
    #[error("capsule bottom cap sits above the agent position (center {center}, height {height})")]
    UnreachableBottomCap { center: f32, height: f32 },
    #[error("slope limit must be within 0..=180 degrees, got {0}")]
    InvalidSlopeLimit(f32),
    #[error("ground snap distance must not be negative, got {0}")]
    NegativeSnapDistance(f32),
    #[error("height clamp bounds must be finite (min {min}, max {max})")]
    NonFiniteHeightClamp { min: f32, max: f32 },
    #[error("height clamp is inverted (min {min} > max {max})")]
    InvertedHeightClamp { min: f32, max: f32 },
    #[error("contact buffer must hold at least one contact")]
    EmptyContactBuffer,
}

impl AgentConfig {
    /// Report the first configuration fault, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.capsule;
        if !(c.radius > 0.0) {
            return Err(ConfigError::NonPositiveRadius(c.radius));
        }
        if c.skin_width < 0.0 {
            return Err(ConfigError::NegativeSkinWidth(c.skin_width));
        }
        // The lowest point of the capsule must not float above the feet, otherwise
        // gravity can never bring the bottom cap into contact with the ground.
        let center_up = c.center.dot(&controller_up());
        if center_up - c.height.max(2.0 * c.radius) * 0.5 > c.skin_width {
            return Err(ConfigError::UnreachableBottomCap {
                center: center_up,
                height: c.height,
            });
        }
        if !(0.0..=180.0).contains(&self.slope_limit_deg) {
            return Err(ConfigError::InvalidSlopeLimit(self.slope_limit_deg));
        }
        if self.ground_snap.max_distance < 0.0 {
            return Err(ConfigError::NegativeSnapDistance(
                self.ground_snap.max_distance,
            ));
        }
        let h = &self.height_adjust;
        if h.clamp && !(h.min_height.is_finite() && h.max_height.is_finite()) {
            return Err(ConfigError::NonFiniteHeightClamp {
                min: h.min_height,
                max: h.max_height,
            });
        }
        if h.clamp && h.min_height > h.max_height {
            return Err(ConfigError::InvertedHeightClamp {
                min: h.min_height,
                max: h.max_height,
            });
        }
        if self.contact_capacity == 0 {
            return Err(ConfigError::EmptyContactBuffer);
        }
        Ok(())
    }

    /// A copy with every fault replaced by a neutral value.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        if !(out.capsule.radius > 0.0) {
            out.capsule.radius = DEFAULT_CAPSULE_RADIUS;
        }
        out.capsule.skin_width = out.capsule.skin_width.max(0.0);
        let c = out.capsule;
        let center_up = c.center.dot(&controller_up());
        if center_up - c.height.max(2.0 * c.radius) * 0.5 > c.skin_width {
            out.capsule = c.with_height(c.height.max(2.0 * c.radius));
        }
        out.slope_limit_deg = if out.slope_limit_deg.is_finite() {
            out.slope_limit_deg.clamp(0.0, 180.0)
        } else {
            DEFAULT_SLOPE_LIMIT_DEG
        };
        out.ground_snap.max_distance = out.ground_snap.max_distance.max(0.0);
        let fallback = HeightAdjust::default();
        if !out.height_adjust.min_height.is_finite() {
            out.height_adjust.min_height = fallback.min_height;
        }
        if !out.height_adjust.max_height.is_finite() {
            out.height_adjust.max_height = fallback.max_height;
        }
        if out.height_adjust.min_height > out.height_adjust.max_height {
            std::mem::swap(
                &mut out.height_adjust.min_height,
                &mut out.height_adjust.max_height,
            );
        }
        out.contact_capacity = out.contact_capacity.max(1);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AgentConfig::default().validate(), Ok(()));
    }

    #[test]
    fn custom_shape_stands_on_feet() {
        let shape = CapsuleShape::custom(2.0, 0.5);
        assert!((shape.center.y - 1.0).abs() < 1.0e-6);
        assert!((shape.cap_offset() - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn floating_capsule_is_rejected_and_sanitized() {
        let mut config = AgentConfig::default();
        config.capsule.center = Vec3::new(0.0, 3.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnreachableBottomCap { .. })
        ));

        let fixed = config.sanitized();
        assert_eq!(fixed.validate(), Ok(()));
        assert!((fixed.capsule.center.y - fixed.capsule.height * 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn zero_radius_is_replaced() {
        let mut config = AgentConfig::default();
        config.capsule.radius = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveRadius(0.0)));
        assert_eq!(config.sanitized().capsule.radius, DEFAULT_CAPSULE_RADIUS);
    }

    #[test]
    fn inverted_clamp_is_swapped() {
        let mut config = AgentConfig::default();
        config.height_adjust = HeightAdjust {
            enabled: true,
            clamp: true,
            min_height: 2.0,
            max_height: 1.0,
        };
        assert!(config.validate().is_err());
        let fixed = config.sanitized();
        assert_eq!(fixed.height_adjust.min_height, 1.0);
        assert_eq!(fixed.height_adjust.max_height, 2.0);
    }

    #[test]
    fn non_finite_clamp_falls_back_to_defaults() {
        let mut config = AgentConfig::default();
        config.height_adjust = HeightAdjust {
            enabled: true,
            clamp: true,
            min_height: f32::NAN,
            max_height: f32::INFINITY,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFiniteHeightClamp { .. })
        ));

        let fixed = config.sanitized();
        assert_eq!(fixed.validate(), Ok(()));
        assert_eq!(fixed.height_adjust.min_height, 0.0);
        assert_eq!(fixed.height_adjust.max_height, 100.0);
    }

    #[test]
    fn platform_mode_flags() {
        assert!(!PlatformMode::None.inherits_position());
        assert!(PlatformMode::Position.inherits_position());
        assert!(!PlatformMode::Position.inherits_rotation());
        assert!(PlatformMode::PositionAndRotation.inherits_rotation());
    }
}
