//! Seconds-to-frames conversion.
//!
//! Narration timing arrives in seconds; every scene boundary is stored in
//! whole frames. The two rounding modes below are the only places where
//! that conversion happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A non-negative span of time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(f64);

impl Duration {
    /// Negative and NaN inputs collapse to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds.max(0.0))
    }

    pub fn from_frames(frames: u64, fps: f64) -> Self {
        if fps > 0.0 {
            Self::from_seconds(frames as f64 / fps)
        } else {
            Self::zero()
        }
    }

    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    /// Frames needed to cover the whole span (ceiling).
    pub fn frame_count(&self, fps: f64) -> u64 {
        (self.0 * fps).ceil() as u64
    }

    /// Nearest whole number of frames, halves rounding up.
    pub fn nearest_frames(&self, fps: f64) -> u64 {
        (self.0 * fps).round() as u64
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.0 + rhs.0)
    }
}

/// Saturates at zero.
impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        Duration::from_seconds(self.0 - rhs.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}s", self.0)
    }
}

/// An offset from the start of the composition, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_seconds(seconds: f64) -> Self {
        Self(seconds.max(0.0))
    }

    /// Start of `frame` at `fps`.
    pub fn from_frame(frame: u64, fps: f64) -> Self {
        Self(Duration::from_frames(frame, fps).as_seconds())
    }

    pub fn as_seconds(&self) -> f64 {
        self.0
    }

    /// The frame this instant falls inside.
    pub fn to_frame(&self, fps: f64) -> u64 {
        (self.0 * fps).floor() as u64
    }

    /// The frame boundary closest to this instant.
    pub fn nearest_frame(&self, fps: f64) -> u64 {
        (self.0 * fps).round() as u64
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs.as_seconds())
    }
}

/// `mm:ss.cc`, minutes uncapped.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis = (self.0 * 100.0).round() as u64;
        write!(f, "{:02}:{:02}.{:02}", centis / 6000, (centis / 100) % 60, centis % 100)
    }
}
