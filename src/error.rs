use thiserror::Error;

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Invalid WAV file: {0}")]
    Format(String),

    #[error("Sound has {0} bits per sample; only 8 or 16 bits per sample are supported")]
    UnsupportedBitDepth(u16),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filter uses {taps} taps but only {available} coefficients were designed")]
    TapCount { taps: usize, available: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fingerprint build cancelled after {frames} frames")]
    Cancelled { frames: usize },
}

pub type Result<T> = std::result::Result<T, FingerprintError>;
