//! Deterministic test signals for fingerprint fixtures.

mod noise;
mod signal;

pub use noise::{add_noise, signal_power, white_noise};
pub use signal::{chirp, silence_then, tone};
