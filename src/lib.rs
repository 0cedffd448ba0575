pub mod config;
pub mod constants;
pub mod error;
pub mod fingerprint;
pub mod output;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::FingerprintConfig;
pub use error::{FingerprintError, Result};
pub use fingerprint::{
    ComparisonResult, FingerprintStream, build_fingerprint, compare_fingerprints,
};
pub use signal_processing::{SpectrumTransform, apply_filter, design_filter};
pub use wav::save_wav;
