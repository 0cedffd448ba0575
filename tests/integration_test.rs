mod test_signals;

use std::ops::ControlFlow;

use soundcompare::config::{FingerprintConfig, SampleDecode};
use soundcompare::fingerprint::{
    FingerprintStream, build_fingerprint, build_fingerprint_with_progress, fingerprint_path,
};
use soundcompare::{FingerprintError, compare_fingerprints};
use test_signals::{write_noise_wav, write_tone_wav};

/// Index of the first largest value
fn peak_index(frame: &[i16]) -> usize {
    let max = frame.iter().copied().max().unwrap();
    frame.iter().position(|&v| v == max).unwrap()
}

#[test]
fn test_tone_self_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "tone.wav", 1000.0, 2.0, 16);
    let config = FingerprintConfig::default();

    let summary = build_fingerprint(&wav, &config).unwrap();
    assert_eq!(summary.artifact_path, fingerprint_path(&wav));
    assert!(summary.artifact_path.exists());
    assert_eq!(summary.format.sample_rate, 8000);
    assert_eq!(summary.format.bits_per_sample, 16);
    assert!(summary.frame_count >= 5);

    let result = compare_fingerprints(&wav, &wav, &config).unwrap();
    assert_eq!(result.overall_percentage, 100.0);
    assert_eq!(result.mismatch_list(), "");
    assert_eq!(result.frames_compared, summary.frame_count);
}

#[test]
fn test_tone_spectrum_peak() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "tone.wav", 1000.0, 2.0, 16);
    let summary = build_fingerprint(&wav, &FingerprintConfig::default()).unwrap();
    let stream = summary.stream().unwrap();

    // Every fifth sample of a 1000 Hz tone at 8000 Hz aliases to bin 192;
    // stored bins start at bin 1
    let first = stream.frames().next().unwrap();
    assert_eq!(first.len(), 255);
    let peak = peak_index(first);
    assert!((188..=196).contains(&peak), "peak at index {}", peak);
    assert!(first[peak] >= -1);
}

#[test]
fn test_tone_versus_noise() {
    let dir = tempfile::tempdir().unwrap();
    let tone = write_tone_wav(dir.path(), "tone.wav", 1000.0, 2.0, 16);
    let noise = write_noise_wav(dir.path(), "noise.wav", 2.0, 16, 7);
    let config = FingerprintConfig::default();

    build_fingerprint(&tone, &config).unwrap();
    build_fingerprint(&noise, &config).unwrap();

    let result = compare_fingerprints(&tone, &noise, &config).unwrap();
    assert!(
        result.overall_percentage < 70.0,
        "tone vs noise scored {}%",
        result.overall_percentage
    );
    assert!(!result.mismatched_frames.is_empty());
}

#[test]
fn test_unsupported_bit_depth_creates_no_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "deep.wav", 1000.0, 0.5, 24);

    let err = build_fingerprint(&wav, &FingerprintConfig::default()).unwrap_err();
    assert!(matches!(err, FingerprintError::UnsupportedBitDepth(24)));
    assert!(!fingerprint_path(&wav).exists());
}

#[test]
fn test_eight_bit_input() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "tone8.wav", 1000.0, 2.0, 8);
    let config = FingerprintConfig::default();

    let summary = build_fingerprint(&wav, &config).unwrap();
    assert_eq!(summary.format.bits_per_sample, 8);
    assert!(summary.frame_count >= 5);
    assert!(!summary.waveform.is_empty());

    let result = compare_fingerprints(&wav, &wav, &config).unwrap();
    assert_eq!(result.overall_percentage, 100.0);
}

#[test]
fn test_legacy_mode() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "tone.wav", 1000.0, 2.0, 16);
    let config = FingerprintConfig::legacy();
    assert_eq!(config.decode.mode, SampleDecode::Legacy);

    let summary = build_fingerprint(&wav, &config).unwrap();
    assert!(summary.frame_count >= 2);

    // Full-spectrum ratios can only fail the short last frame
    let result = compare_fingerprints(&wav, &wav, &config).unwrap();
    let last = summary.frame_count - 1;
    assert!(result.mismatched_frames.iter().all(|&i| i == last));
    assert_eq!(result.frames_compared, summary.frame_count);
}

#[test]
fn test_cancelled_build_removes_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "tone.wav", 1000.0, 2.0, 16);

    let err = build_fingerprint_with_progress(&wav, &FingerprintConfig::default(), |progress| {
        if progress.frame >= 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .unwrap_err();

    assert!(matches!(err, FingerprintError::Cancelled { frames: 2 }));
    assert!(!fingerprint_path(&wav).exists());
}

#[test]
fn test_rebuild_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_noise_wav(dir.path(), "noise.wav", 1.0, 16, 3);
    let config = FingerprintConfig::default();

    let first = build_fingerprint(&wav, &config).unwrap().stream().unwrap();
    let second = build_fingerprint(&wav, &config).unwrap().stream().unwrap();
    assert_eq!(first, second);
    assert_eq!(FingerprintStream::load(fingerprint_path(&wav)).unwrap(), second);
}

#[test]
fn test_missing_artifact_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let wav = write_tone_wav(dir.path(), "tone.wav", 1000.0, 0.5, 16);
    let err = compare_fingerprints(&wav, &wav, &FingerprintConfig::default()).unwrap_err();
    assert!(matches!(err, FingerprintError::Io(_)));
}
