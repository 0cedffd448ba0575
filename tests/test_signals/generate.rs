use std::path::{Path, PathBuf};

use soundcompare::save_wav;
use soundcompare::simulation::{tone, white_noise};

pub const SAMPLE_RATE: u32 = 8000;

/// Write mono samples in [-1, 1] as integer PCM
pub fn write_wav(dir: &Path, name: &str, samples: &[f32], bits: u16) -> PathBuf {
    let path = dir.join(name);
    save_wav(&path, samples, SAMPLE_RATE, bits).expect("Failed to write WAV fixture");
    path
}

/// Sine tone at half scale
pub fn write_tone_wav(dir: &Path, name: &str, freq_hz: f32, duration_secs: f32, bits: u16) -> PathBuf {
    let samples = tone(freq_hz, 0.5, duration_secs, SAMPLE_RATE);
    write_wav(dir, name, &samples, bits)
}

/// Seeded uniform white noise at half scale
pub fn write_noise_wav(dir: &Path, name: &str, duration_secs: f32, bits: u16, seed: u64) -> PathBuf {
    let len = (duration_secs * SAMPLE_RATE as f32) as usize;
    let samples = white_noise(len, 0.5, Some(seed));
    write_wav(dir, name, &samples, bits)
}
