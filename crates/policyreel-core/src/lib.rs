//! # policyreel-core
//!
//! Foundational types shared by every policyreel crate: timing
//! configuration, frame/second conversion, crossfade and spring curves,
//! content hashing and the error type.

pub mod config;
pub mod crossfade;
pub mod error;
pub mod hash;
pub mod math;
pub mod time;

pub use config::*;

pub use crossfade::CrossfadeCurve;
pub use error::{ReelError, ReelResult};
pub use hash::{hash_json, ContentHash};
pub use math::{equal_power, interpolate, spring, Extrapolate, SpringConfig};
pub use time::{Duration, Timestamp};
