//! Named constants for the fingerprint pipeline
//!
//! The values follow the legacy SoundComparer decoding, tap count and
//! scoring. Changing any of them makes new fingerprints incomparable with
//! ones built under the old values.

/// Marker written after the last bin of every frame in a fingerprint artifact.
pub const FRAME_SENTINEL: i16 = -9999;

/// Samples advanced per retained sample while decimating the PCM stream.
pub const DECIMATION_STRIDE: usize = 5;

/// Exclusive lower bound of the unsigned byte values treated as leading noise.
/// Values around 128 are mid-scale for unsigned 8-bit PCM, i.e. near silence.
pub const NOISE_SKIP_LOW: u8 = 120;

/// Exclusive upper bound of the unsigned byte values treated as leading noise.
pub const NOISE_SKIP_HIGH: u8 = 140;

/// Capacity of the decimated waveform kept for display collaborators.
pub const WAVEFORM_CAPACITY: usize = 4096;

/// Default analysis frame length in samples.
pub const DEFAULT_FRAME_LEN: usize = 512;

/// Default FFT size in points.
pub const DEFAULT_FFT_POINT: usize = 512;

/// Sample rate the filter designer assumes unless configured otherwise.
/// Legacy artifacts were always designed at this rate, whatever the file's rate.
pub const DEFAULT_DESIGN_RATE_HZ: f32 = 11025.0;

/// Default passband used when building fingerprints.
pub const DEFAULT_BAND_FROM_HZ: f32 = 500.0;
pub const DEFAULT_BAND_TO_HZ: f32 = 4000.0;

/// Band applied by the low-pass entry point when no band is configured.
pub const LOW_PASS_DEFAULT_BAND: (f32, f32) = (0.0, 1000.0);

/// Band applied by the high-pass entry point when no band is configured.
pub const HIGH_PASS_DEFAULT_BAND: (f32, f32) = (2000.0, 4000.0);

/// Band used for coefficient design when no band is configured.
pub const DESIGN_DEFAULT_BAND: (f32, f32) = (1000.0, 1000.0);

/// Default stopband attenuation for Kaiser designs.
pub const DEFAULT_ATTENUATION_DB: f32 = 60.0;

/// Default transition band width for Kaiser designs.
pub const DEFAULT_TRANSITION_HZ: f32 = 500.0;

/// Default Kaiser window shape parameter.
pub const DEFAULT_KAISER_ALPHA: f32 = 4.0;

/// Largest filter order accepted, explicit or derived.
pub const MAX_FILTER_ORDER: usize = 4096;

/// Tap count of legacy artifacts, independent of the designed order.
pub const LEGACY_TAP_COUNT: usize = 35;

/// Maximum absolute difference for two quantized bins to count as equal.
pub const BIN_MATCH_TOLERANCE: i16 = 2;

/// Minimum fraction of matching bins for a frame to count as matching.
pub const FRAME_MATCH_THRESHOLD: f32 = 0.70;

/// Lowest log-magnitude value a spectrum bin can take (dB relative to the segment).
/// Keeps silent bins finite and far above the frame sentinel once quantized.
pub const SPECTRUM_FLOOR_DB: f32 = -200.0;
