use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_power(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f32>() / signal.len() as f32
}

/// Uniform white noise in [-amplitude, amplitude]
pub fn white_noise(num_samples: usize, amplitude: f32, seed: Option<u64>) -> Vec<f32> {
    let mut rng = create_rng(seed);
    (0..num_samples)
        .map(|_| amplitude * (rng.random::<f32>() * 2.0 - 1.0))
        .collect()
}

/// Add Gaussian noise at the given SNR; output is clipped to [-1, 1]
pub fn add_noise(signal: &mut [f32], snr_db: f32, seed: Option<u64>) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f32.powf(snr_db / 10.0);
    let noise_std = (sig_power / snr_linear).sqrt();
    let Ok(normal) = Normal::new(0.0, noise_std as f64) else {
        return;
    };

    let mut rng = create_rng(seed);
    for sample in signal.iter_mut() {
        *sample = (*sample + normal.sample(&mut rng) as f32).clamp(-1.0, 1.0);
    }
}
