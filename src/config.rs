//! Configuration for fingerprint building and comparison.
//!
//! `FingerprintConfig::default()` gives the corrected pipeline. Use
//! `FingerprintConfig::legacy()` for the legacy SoundComparer decoding, tap
//! count and scoring.
//!
//! Every section can be loaded from TOML; missing keys keep their defaults:
//!
//! ```toml
//! [filter]
//! band_from = 300.0
//! band_to = 3400.0
//! window = "hamming"
//!
//! [compare]
//! frame_match_threshold = 0.8
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::constants::{
    BIN_MATCH_TOLERANCE, DECIMATION_STRIDE, DEFAULT_ATTENUATION_DB, DEFAULT_BAND_FROM_HZ,
    DEFAULT_BAND_TO_HZ, DEFAULT_DESIGN_RATE_HZ, DEFAULT_FFT_POINT, DEFAULT_FRAME_LEN,
    DEFAULT_KAISER_ALPHA, DEFAULT_TRANSITION_HZ, FRAME_MATCH_THRESHOLD, LEGACY_TAP_COUNT,
    NOISE_SKIP_HIGH, NOISE_SKIP_LOW, WAVEFORM_CAPACITY,
};
use crate::error::{FingerprintError, Result};

/// Window applied to the ideal sinc response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    /// Kaiser window; attenuation and transition band come from the caller
    Kaiser,
    /// Hann (raised cosine), 44 dB stopband
    Hann,
    /// Hamming, 53 dB stopband
    Hamming,
    /// Blackman, 74 dB stopband
    Blackman,
    /// Rectangular (truncated sinc), 21 dB stopband
    Rectangular,
}

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    LowPass,
    HighPass,
    BandPass,
}

/// How PCM bytes are turned into decimated samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SampleDecode {
    /// Byte-level reproduction of the legacy reader: the noise skip inspects raw
    /// bytes and drops the first non-noise byte, and 16-bit data discards one
    /// sample before each kept sample.
    Legacy,
    /// One kept sample per `stride` samples for both bit depths; the noise skip
    /// inspects the high byte of each candidate sample and keeps the first one
    /// outside the noise range.
    Strided,
}

/// Denominator of the overall similarity percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PercentageBasis {
    /// Frames actually compared: `min(frames_a, frames_b)`
    Compared,
    /// Frame count of the longer fingerprint, as legacy reports used.
    /// Trailing frames of the longer fingerprint count as mismatches in effect.
    Longest,
}

/// Denominator of a single frame's match ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FrameRatio {
    /// Matched bins divided by the bins present in that frame
    ComparedBins,
    /// Matched bins divided by `fft_point / 2`, as legacy reports used.
    /// Short trailing frames can never reach the match threshold this way.
    FullSpectrum,
}

/// Complete fingerprint configuration
///
/// # Example
/// ```
/// use soundcompare::config::{FingerprintConfig, WindowKind};
///
/// let mut config = FingerprintConfig::default();
/// config.filter.window = WindowKind::Hamming;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Band-pass filter applied to every frame
    pub filter: FilterConfig,
    /// Frame segmentation and FFT size
    pub frame: FrameConfig,
    /// PCM decoding and decimation
    pub decode: DecodeConfig,
    /// Fingerprint comparison thresholds
    pub compare: CompareConfig,
}

/// Filter design configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Sample rate the coefficients are designed for, in Hz
    pub sample_rate: f32,
    /// Passband start in Hz
    pub band_from: f32,
    /// Passband end in Hz
    pub band_to: f32,
    /// Window function
    pub window: WindowKind,
    /// Response type
    pub kind: FilterKind,
    /// Stopband attenuation in dB (Kaiser only; fixed windows override it)
    pub stopband_attenuation_db: f32,
    /// Transition band width in Hz (Kaiser only; fixed windows override it)
    pub transition_band_hz: f32,
    /// Kaiser window shape parameter
    pub kaiser_alpha: f32,
    /// Filter order; must be even, 0 derives it from attenuation and transition band
    pub order: usize,
    /// Number of taps used by the convolution; `None` uses every coefficient
    pub taps: Option<usize>,
}

/// Frame segmentation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Samples per analysis frame
    pub frame_len: usize,
    /// FFT size in points (power of two)
    pub fft_point: usize,
    /// Samples shared between consecutive frames
    pub overlap: usize,
}

/// PCM decoding configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Byte-level legacy reader or strided sample reader
    pub mode: SampleDecode,
    /// Decimation stride in samples
    pub stride: usize,
    /// Leading values strictly between `noise_low` and `noise_high` are skipped
    pub noise_low: u8,
    pub noise_high: u8,
    /// Capacity of the display waveform
    pub waveform_capacity: usize,
}

/// Comparison configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Maximum absolute difference between two bins counted as a match
    pub tolerance: i16,
    /// Minimum match ratio for a frame to count as matching
    pub frame_match_threshold: f32,
    /// Denominator of the overall percentage
    pub basis: PercentageBasis,
    /// Denominator of each frame's match ratio
    pub frame_ratio: FrameRatio,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_DESIGN_RATE_HZ,
            band_from: DEFAULT_BAND_FROM_HZ,
            band_to: DEFAULT_BAND_TO_HZ,
            window: WindowKind::Blackman,
            kind: FilterKind::BandPass,
            stopband_attenuation_db: DEFAULT_ATTENUATION_DB,
            transition_band_hz: DEFAULT_TRANSITION_HZ,
            kaiser_alpha: DEFAULT_KAISER_ALPHA,
            order: 0,
            taps: None,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_len: DEFAULT_FRAME_LEN,
            fft_point: DEFAULT_FFT_POINT,
            overlap: 0,
        }
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            mode: SampleDecode::Strided,
            stride: DECIMATION_STRIDE,
            noise_low: NOISE_SKIP_LOW,
            noise_high: NOISE_SKIP_HIGH,
            waveform_capacity: WAVEFORM_CAPACITY,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tolerance: BIN_MATCH_TOLERANCE,
            frame_match_threshold: FRAME_MATCH_THRESHOLD,
            basis: PercentageBasis::Compared,
            frame_ratio: FrameRatio::ComparedBins,
        }
    }
}

impl FingerprintConfig {
    /// Legacy decoding, tap count and scoring
    pub fn legacy() -> Self {
        let mut config = Self::default();
        config.filter.taps = Some(LEGACY_TAP_COUNT);
        config.decode.mode = SampleDecode::Legacy;
        config.compare.basis = PercentageBasis::Longest;
        config.compare.frame_ratio = FrameRatio::FullSpectrum;
        config
    }

    /// Load a configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| FingerprintError::Config(format!("TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints before any processing starts
    pub fn validate(&self) -> Result<()> {
        let frame = &self.frame;
        if !frame.fft_point.is_power_of_two() || frame.fft_point < 2 {
            return Err(FingerprintError::Config(format!(
                "FFT size must be a power of two >= 2, got {}",
                frame.fft_point
            )));
        }
        if frame.frame_len == 0 || frame.overlap >= frame.frame_len {
            return Err(FingerprintError::Config(format!(
                "Overlap ({}) must be smaller than the frame length ({})",
                frame.overlap, frame.frame_len
            )));
        }

        let filter = &self.filter;
        if !filter.order.is_multiple_of(2) {
            return Err(FingerprintError::Config(format!(
                "Filter order must be even, got {}",
                filter.order
            )));
        }
        if filter.sample_rate <= 0.0 {
            return Err(FingerprintError::Config(format!(
                "Design sample rate must be positive, got {}",
                filter.sample_rate
            )));
        }
        if filter.taps == Some(0) {
            return Err(FingerprintError::Config(
                "Filter tap count must be at least 1".to_string(),
            ));
        }

        if self.decode.stride == 0 {
            return Err(FingerprintError::Config(
                "Decimation stride must be at least 1".to_string(),
            ));
        }
        if self.decode.noise_low > self.decode.noise_high {
            return Err(FingerprintError::Config(format!(
                "Noise skip range is inverted: ({}, {})",
                self.decode.noise_low, self.decode.noise_high
            )));
        }

        let threshold = self.compare.frame_match_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FingerprintError::Config(format!(
                "Frame match threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.compare.tolerance < 0 {
            return Err(FingerprintError::Config(format!(
                "Bin tolerance must not be negative, got {}",
                self.compare.tolerance
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FingerprintConfig::default().validate().is_ok());
        assert!(FingerprintConfig::legacy().validate().is_ok());
    }

    #[test]
    fn test_legacy_preset() {
        let config = FingerprintConfig::legacy();
        assert_eq!(config.filter.taps, Some(35));
        assert_eq!(config.decode.mode, SampleDecode::Legacy);
        assert_eq!(config.compare.basis, PercentageBasis::Longest);
        assert_eq!(config.compare.frame_ratio, FrameRatio::FullSpectrum);
        assert_eq!(config.filter.window, WindowKind::Blackman);
        assert_eq!(config.filter.band_from, 500.0);
        assert_eq!(config.filter.band_to, 4000.0);
    }

    #[test]
    fn test_toml_partial_override() {
        let config = FingerprintConfig::from_toml_str(
            r#"
            [filter]
            band_from = 300.0
            window = "hamming"

            [decode]
            mode = "legacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.filter.band_from, 300.0);
        assert_eq!(config.filter.band_to, 4000.0);
        assert_eq!(config.filter.window, WindowKind::Hamming);
        assert_eq!(config.decode.mode, SampleDecode::Legacy);
        assert_eq!(config.frame.frame_len, 512);
    }

    #[test]
    fn test_toml_rejects_odd_order() {
        let err = FingerprintConfig::from_toml_str("[filter]\norder = 81\n").unwrap_err();
        assert!(matches!(err, FingerprintError::Config(_)));
    }

    #[test]
    fn test_rejects_non_power_of_two_fft() {
        let mut config = FingerprintConfig::default();
        config.frame.fft_point = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overlap_not_below_frame_len() {
        let mut config = FingerprintConfig::default();
        config.frame.overlap = 512;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_stride() {
        let mut config = FingerprintConfig::default();
        config.decode.stride = 0;
        assert!(config.validate().is_err());
    }
}
