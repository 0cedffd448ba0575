use std::f32::consts::PI;

/// Sine tone in [-amplitude, amplitude]
pub fn tone(freq_hz: f32, amplitude: f32, duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let omega = 2.0 * PI * freq_hz / sample_rate as f32;
    (0..num_samples)
        .map(|i| amplitude * (omega * i as f32).sin())
        .collect()
}

/// Linear frequency sweep from `start_hz` to `end_hz`
pub fn chirp(
    start_hz: f32,
    end_hz: f32,
    amplitude: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let rate = (end_hz - start_hz) / duration_secs.max(f32::EPSILON);
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let phase = 2.0 * PI * (start_hz * t + 0.5 * rate * t * t);
            amplitude * phase.sin()
        })
        .collect()
}

/// Prepend `leading_secs` of digital silence to a signal
pub fn silence_then(signal: &[f32], leading_secs: f32, sample_rate: u32) -> Vec<f32> {
    let leading = (leading_secs * sample_rate as f32) as usize;
    let mut out = vec![0.0; leading];
    out.extend_from_slice(signal);
    out
}
