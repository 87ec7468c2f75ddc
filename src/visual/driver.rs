//! Animation driver: eases every visual parameter toward level-driven targets.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::catalog::Palette;
use crate::params::{AnimationParams, BeatShaping, EaseRate, EasedParam};

/// Power-curve beat value in 0..=1
///
/// `clamp((level * gain)^curve, 0, 1)`; non-finite levels count as silence.
pub fn shape_beat(level: f32, shaping: &BeatShaping) -> f32 {
    if !level.is_finite() {
        return 0.0;
    }
    let beat = (level.max(0.0) * shaping.gain).powf(shaping.curve);
    if beat.is_finite() {
        beat.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSnapshot {
    /// Smoothed level this frame was driven by
    pub level: f32,
    pub beat: f32,

    pub outer_scale: f32,
    pub outer_distort: f32,
    pub outer_emissive: f32,
    pub roughness: f32,

    pub inner_scale: f32,
    pub inner_distort: f32,
    pub inner_emissive: f32,

    pub light_intensity: f32,

    /// Linear RGB
    pub surface_color: Vec3,
    pub emissive_color: Vec3,
    pub light_color: Vec3,

    /// Radians
    pub outer_yaw: f32,
    pub outer_pitch: f32,
    pub inner_yaw: f32,

    pub ambient_intensity: f32,
    pub glow_scale: f32,
    /// Pixels
    pub glow_blur: f32,
    pub core_glow_scale: f32,
}

fn ease(current: &mut f32, target: f32, factor: f32) {
    *current += (target - *current) * factor;
}

fn ease_color(current: &mut Vec3, target: Vec3, rate: EaseRate, delta_s: f32) {
    *current = current.lerp(target, rate.factor(delta_s));
}

/// Owns the eased state and the active palette
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    params: AnimationParams,
    palette: Palette,
    state: AnimationSnapshot,
}

impl AnimationDriver {
    pub fn new(params: AnimationParams, palette: Palette) -> Self {
        let state = AnimationSnapshot {
            level: 0.0,
            beat: 0.0,
            outer_scale: params.outer_scale.initial,
            outer_distort: params.outer_distort.initial,
            outer_emissive: params.outer_emissive.initial,
            roughness: params.roughness.initial,
            inner_scale: params.inner_scale.initial,
            inner_distort: params.inner_distort.initial,
            inner_emissive: params.inner_emissive.initial,
            light_intensity: params.light_intensity.initial,
            surface_color: palette.primary,
            emissive_color: palette.accent,
            light_color: palette.accent,
            outer_yaw: 0.0,
            outer_pitch: 0.0,
            inner_yaw: 0.0,
            ambient_intensity: params.ambient_base,
            glow_scale: params.glow_scale_base,
            glow_blur: params.glow_blur_base,
            core_glow_scale: 1.0,
        };
        Self {
            params,
            palette,
            state,
        }
    }

    pub fn params(&self) -> &AnimationParams {
        &self.params
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Retarget colors; displayed colors keep easing from where they are
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Advance one frame
    ///
    /// `level` is the smoothed level, `delta_s` the frame time and
    /// `elapsed_s` wall-clock seconds since start.
    pub fn step(&mut self, level: f32, delta_s: f32, elapsed_s: f64) -> AnimationSnapshot {
        let level = if level.is_finite() { level.max(0.0) } else { 0.0 };
        let delta_s = if delta_s.is_finite() { delta_s.max(0.0) } else { 0.0 };
        let beat = shape_beat(level, &self.params.beat);

        let p = &self.params;
        let s = &mut self.state;
        s.level = level;
        s.beat = beat;

        let scalar = |current: &mut f32, param: &EasedParam| {
            ease(current, param.target(beat, level), param.rate.factor(delta_s));
        };
        scalar(&mut s.outer_scale, &p.outer_scale);
        scalar(&mut s.outer_distort, &p.outer_distort);
        scalar(&mut s.outer_emissive, &p.outer_emissive);
        scalar(&mut s.roughness, &p.roughness);
        scalar(&mut s.inner_scale, &p.inner_scale);
        scalar(&mut s.inner_distort, &p.inner_distort);
        scalar(&mut s.inner_emissive, &p.inner_emissive);
        scalar(&mut s.light_intensity, &p.light_intensity);

        ease_color(
            &mut s.surface_color,
            self.palette.primary,
            p.surface_color_rate,
            delta_s,
        );
        ease_color(
            &mut s.emissive_color,
            self.palette.accent,
            p.emissive_color_rate,
            delta_s,
        );
        ease_color(
            &mut s.light_color,
            self.palette.accent,
            p.light_color_rate,
            delta_s,
        );

        s.outer_yaw = (s.outer_yaw + delta_s * (p.outer_spin_base + beat * p.outer_spin_beat))
            .rem_euclid(TAU);
        s.outer_pitch = ((elapsed_s * f64::from(p.wobble_rate)).sin() as f32) * p.wobble_amplitude;
        s.inner_yaw = (s.inner_yaw - delta_s * p.inner_spin).rem_euclid(TAU);

        s.ambient_intensity = p.ambient_base + level * p.ambient_range;
        s.glow_scale = p.glow_scale_base + level * p.glow_scale_range;
        s.glow_blur = p.glow_blur_base + level * p.glow_blur_range;
        s.core_glow_scale = 1.0 + level * p.core_glow_range;

        *s
    }

    /// Latest published state
    pub fn snapshot(&self) -> AnimationSnapshot {
        self.state
    }
}
