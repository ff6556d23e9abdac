//! Stateless numeric primitives shared by the planner and the presentation
//! layer: range interpolation, the equal-power crossfade curve and a spring
//! ease for entrance motion.

use serde::{Deserialize, Serialize};

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Behavior of [`interpolate`] for inputs outside the input range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolate {
    /// Hold the nearest output bound.
    #[default]
    Clamp,
    /// Continue the line past the bounds.
    Extend,
}

/// Map `input` from `input_range` onto `output_range`.
///
/// A degenerate input range (both ends equal) yields the start of the output
/// range for inputs at or before it and the end otherwise.
pub fn interpolate(
    input: f64,
    input_range: (f64, f64),
    output_range: (f64, f64),
    extrapolate: Extrapolate,
) -> f64 {
    let (in0, in1) = input_range;
    let (out0, out1) = output_range;
    let span = in1 - in0;
    if span == 0.0 {
        return if input <= in0 { out0 } else { out1 };
    }
    let mut t = (input - in0) / span;
    if extrapolate == Extrapolate::Clamp {
        t = t.clamp(0.0, 1.0);
    }
    lerp(out0, out1, t)
}

/// Equal-power crossfade weights `(outgoing, incoming)` at progress `p`.
///
/// `outgoing² + incoming² == 1` for every `p` in [0, 1].
pub fn equal_power(p: f64) -> (f64, f64) {
    let p = p.clamp(0.0, 1.0);
    ((1.0 - p).sqrt(), p.sqrt())
}

/// Physical parameters of the entrance spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
    /// Never report a value past the target.
    pub overshoot_clamping: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 100.0,
            damping: 10.0,
            overshoot_clamping: false,
        }
    }
}

/// Position of a damped spring released at rest from 0 towards 1, sampled
/// `frame` frames after release.
pub fn spring(frame: f64, fps: f64, config: &SpringConfig) -> f64 {
    if fps <= 0.0 || config.mass <= 0.0 || config.stiffness <= 0.0 {
        return 1.0;
    }
    let t = frame / fps;
    if t <= 0.0 {
        return 0.0;
    }

    let omega0 = (config.stiffness / config.mass).sqrt();
    let zeta = config.damping.max(0.0) / (2.0 * (config.stiffness * config.mass).sqrt());
    let decay = (-zeta * omega0 * t).exp();

    let value = if (zeta - 1.0).abs() < 1e-9 {
        1.0 - decay * (1.0 + omega0 * t)
    } else if zeta < 1.0 {
        let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
        1.0 - decay
            * ((omega_d * t).cos() + (zeta * omega0 / omega_d) * (omega_d * t).sin())
    } else {
        let omega_d = omega0 * (zeta * zeta - 1.0).sqrt();
        1.0 - decay
            * ((omega_d * t).cosh() + (zeta * omega0 / omega_d) * (omega_d * t).sinh())
    };

    if config.overshoot_clamping {
        value.min(1.0)
    } else {
        value
    }
}
