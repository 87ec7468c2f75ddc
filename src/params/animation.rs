//! Mapping from the smoothed level to visual parameters.

use serde::Deserialize;

/// How fast an eased value approaches its target
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseRate {
    /// Fixed fraction of the remaining distance per frame
    PerFrame(f32),

    /// Fraction per second, scaled by the frame delta
    PerSecond(f32),
}

impl EaseRate {
    /// Interpolation factor for a frame of `delta_s` seconds, clamped to 0..=1
    pub fn factor(self, delta_s: f32) -> f32 {
        let raw = match self {
            Self::PerFrame(fraction) => fraction,
            Self::PerSecond(rate) => rate * delta_s,
        };
        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Signal a parameter target follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drive {
    /// Power-curve shaped beat value (0..=1)
    Beat,
    /// Raw smoothed level
    Level,
}

/// One eased scalar: target = base + drive * range
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EasedParam {
    pub base: f32,
    pub range: f32,
    pub rate: EaseRate,
    /// Value before the first frame
    pub initial: f32,
    #[serde(default = "default_drive")]
    pub drive: Drive,
}

fn default_drive() -> Drive {
    Drive::Beat
}

impl EasedParam {
    const fn beat(base: f32, range: f32, per_frame: f32, initial: f32) -> Self {
        Self {
            base,
            range,
            rate: EaseRate::PerFrame(per_frame),
            initial,
            drive: Drive::Beat,
        }
    }

    /// Target value for the given beat and level
    pub fn target(&self, beat: f32, level: f32) -> f32 {
        let signal = match self.drive {
            Drive::Beat => beat,
            Drive::Level => level,
        };
        self.base + signal * self.range
    }
}

/// Power-curve remap of the level into a beat value
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BeatShaping {
    /// Pre-curve gain (dimensionless)
    pub gain: f32,

    /// Exponent; above 1 keeps quiet passages calm
    pub curve: f32,
}

impl Default for BeatShaping {
    fn default() -> Self {
        Self {
            gain: 1.6,
            curve: 1.1,
        }
    }
}

/// Full level → visual mapping
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    pub beat: BeatShaping,

    // === Outer shell ===
    pub outer_scale: EasedParam,
    pub outer_distort: EasedParam,
    pub outer_emissive: EasedParam,
    pub roughness: EasedParam,

    // === Inner core ===
    pub inner_scale: EasedParam,
    pub inner_distort: EasedParam,
    pub inner_emissive: EasedParam,

    // === Key light ===
    pub light_intensity: EasedParam,

    /// Surface color → album primary color
    pub surface_color_rate: EaseRate,

    /// Emissive color → album accent color
    pub emissive_color_rate: EaseRate,

    /// Key light color → album accent color
    pub light_color_rate: EaseRate,

    // === Motion ===
    /// Outer yaw speed at rest (radians per second)
    pub outer_spin_base: f32,

    /// Extra outer yaw speed at full beat (radians per second)
    pub outer_spin_beat: f32,

    /// Inner yaw speed, opposite direction (radians per second)
    pub inner_spin: f32,

    /// Outer pitch wobble frequency (radians per second)
    pub wobble_rate: f32,

    /// Outer pitch wobble amplitude (radians)
    pub wobble_amplitude: f32,

    // === Ambient and background glow (follow the level directly) ===
    /// Formula: ambient = ambient_base + level * ambient_range
    pub ambient_base: f32,
    pub ambient_range: f32,

    /// Formula: glow_scale = glow_scale_base + level * glow_scale_range
    pub glow_scale_base: f32,
    pub glow_scale_range: f32,

    /// Formula: glow_blur = glow_blur_base + level * glow_blur_range (pixels)
    pub glow_blur_base: f32,
    pub glow_blur_range: f32,

    /// Formula: core_glow_scale = 1 + level * core_glow_range
    pub core_glow_range: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            beat: BeatShaping::default(),

            outer_scale: EasedParam::beat(1.35, 0.55, 0.1, 1.35),
            outer_distort: EasedParam::beat(0.18, 0.6, 0.14, 0.18),
            outer_emissive: EasedParam::beat(0.7, 0.9, 0.16, 0.7),
            roughness: EasedParam::beat(0.32, -0.14, 0.08, 0.32),

            inner_scale: EasedParam::beat(0.75, 0.22, 0.12, 0.8),
            inner_distort: EasedParam::beat(0.08, 0.25, 0.2, 0.12),
            inner_emissive: EasedParam::beat(1.2, 1.4, 0.18, 1.2),

            light_intensity: EasedParam {
                drive: Drive::Level,
                ..EasedParam::beat(1.1, 1.1, 0.1, 1.5)
            },

            surface_color_rate: EaseRate::PerSecond(2.0),
            emissive_color_rate: EaseRate::PerSecond(1.5),
            light_color_rate: EaseRate::PerSecond(1.5),

            outer_spin_base: 0.14,
            outer_spin_beat: 0.24,
            inner_spin: 0.2,
            wobble_rate: 0.3,
            wobble_amplitude: 0.05,

            ambient_base: 0.45,
            ambient_range: 0.25,
            glow_scale_base: 0.86,
            glow_scale_range: 0.28,
            glow_blur_base: 70.0,
            glow_blur_range: 40.0,
            core_glow_range: 0.15,
        }
    }
}
