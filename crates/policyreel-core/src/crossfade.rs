use serde::{Deserialize, Serialize};

use crate::math::equal_power;

/// Curve used to blend two overlapping scenes across their shared window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CrossfadeCurve {
    /// `sqrt` on both sides so combined intensity stays constant.
    #[default]
    EqualPower,
    Linear,
    /// Smoothstep: slow at both ends of the window.
    EaseInOut,
}

impl CrossfadeCurve {
    /// Opacities `(outgoing, incoming)` at crossfade progress `p` in [0, 1].
    pub fn weights(&self, p: f64) -> (f64, f64) {
        let p = p.clamp(0.0, 1.0);
        match self {
            CrossfadeCurve::EqualPower => equal_power(p),
            CrossfadeCurve::Linear => (1.0 - p, p),
            CrossfadeCurve::EaseInOut => {
                let s = p * p * (3.0 - 2.0 * p);
                (1.0 - s, s)
            }
        }
    }
}

impl std::fmt::Display for CrossfadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrossfadeCurve::EqualPower => "equal-power",
            CrossfadeCurve::Linear => "linear",
            CrossfadeCurve::EaseInOut => "ease-in-out",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [CrossfadeCurve; 3] = [
        CrossfadeCurve::EqualPower,
        CrossfadeCurve::Linear,
        CrossfadeCurve::EaseInOut,
    ];

    #[test]
    fn test_crossfade_endpoints() {
        for curve in CURVES {
            let (out0, in0) = curve.weights(0.0);
            let (out1, in1) = curve.weights(1.0);
            assert!((out0 - 1.0).abs() < 1e-9 && in0.abs() < 1e-9, "{}", curve);
            assert!(out1.abs() < 1e-9 && (in1 - 1.0).abs() < 1e-9, "{}", curve);
        }
    }

    #[test]
    fn test_incoming_weight_never_decreases() {
        for curve in CURVES {
            let mut prev = 0.0;
            for step in 0..=50 {
                let (_, incoming) = curve.weights(step as f64 / 50.0);
                assert!(incoming >= prev, "{} at step {}", curve, step);
                prev = incoming;
            }
        }
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        let (out, inc) = CrossfadeCurve::EaseInOut.weights(0.5);
        assert!((out - 0.5).abs() < 1e-12 && (inc - 0.5).abs() < 1e-12);
        let (_, early) = CrossfadeCurve::EaseInOut.weights(0.1);
        assert!(early < 0.1);
    }

    #[test]
    fn test_crossfade_curve_serde_names() {
        let curve: CrossfadeCurve = serde_json::from_str("\"equal-power\"").unwrap();
        assert_eq!(curve, CrossfadeCurve::EqualPower);
        assert_eq!(
            serde_json::to_string(&CrossfadeCurve::EaseInOut).unwrap(),
            "\"ease-in-out\""
        );
    }
}
