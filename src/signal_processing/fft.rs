use crate::constants::SPECTRUM_FLOOR_DB;
use crate::error::{FingerprintError, Result};

/// Direction of a complex transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftDirection {
    Forward,
    Inverse,
}

impl FftDirection {
    fn sign(self) -> f64 {
        match self {
            FftDirection::Forward => 1.0,
            FftDirection::Inverse => -1.0,
        }
    }
}

/// Reverse the lowest `bits` bits of `index`
pub fn bitrev(index: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS - bits)
}

/// Radix-2 decimation-in-time butterflies over bit-reversed input
///
/// Twiddle factors are advanced by complex multiplication within each stage
/// instead of calling `sin`/`cos` per butterfly. The butterflies accumulate with
/// a positive exponent, so a final swap of bins `i` and `n - i` turns the result
/// into the transform for `direction`. No scaling is applied.
///
/// `re` and `im` must have the same power-of-two length.
pub fn fft_in_place(re: &mut [f32], im: &mut [f32], direction: FftDirection) {
    let n = re.len();
    debug_assert_eq!(n, im.len());
    debug_assert!(n.is_power_of_two());

    let log2n = n.trailing_zeros();
    let sign = direction.sign();

    for s in 1..=log2n {
        let m = 1usize << s;
        let half = m / 2;
        let angle = sign * 2.0 * std::f64::consts::PI / m as f64;
        let (wm_re, wm_im) = (angle.cos() as f32, angle.sin() as f32);

        let (mut w_re, mut w_im) = (1.0f32, 0.0f32);
        for j in 0..half {
            for k in (j..n).step_by(m) {
                let k2 = k + half;
                let t_re = w_re * re[k2] - w_im * im[k2];
                let t_im = w_re * im[k2] + w_im * re[k2];
                let (u_re, u_im) = (re[k], im[k]);

                re[k] = u_re + t_re;
                im[k] = u_im + t_im;
                re[k2] = u_re - t_re;
                im[k2] = u_im - t_im;
            }

            let next_re = w_re * wm_re - w_im * wm_im;
            w_im = w_re * wm_im + w_im * wm_re;
            w_re = next_re;
        }
    }

    for i in 1..n / 2 {
        re.swap(i, n - i);
        im.swap(i, n - i);
    }
}

/// Per-frame log power spectrum over fixed-size FFT segments
///
/// A frame is cut into `fft_point` segments (the last one zero padded). Each
/// segment contributes `fft_point / 2` values to the spectrum:
///
/// - bin 0 is always zero
/// - bins holding data are `10 * log10(power / (max - min))` relative to that
///   segment, floored at -200 dB
/// - bins past the end of a short segment are zero
///
/// A segment whose reference power is not positive (a flat or silent segment)
/// yields all-zero bins.
pub struct SpectrumTransform {
    fft_point: usize,
    bit_reversed: Vec<usize>,
    re: Vec<f32>,
    im: Vec<f32>,
}

impl SpectrumTransform {
    /// Create a transform for `fft_point`-sized segments
    ///
    /// # Errors
    /// Returns `FingerprintError::Config` if `fft_point` is not a power of two of
    /// at least 2.
    pub fn new(fft_point: usize) -> Result<Self> {
        if fft_point < 2 || !fft_point.is_power_of_two() {
            return Err(FingerprintError::Config(format!(
                "FFT size must be a power of two >= 2, got {}",
                fft_point
            )));
        }

        let bits = fft_point.trailing_zeros();
        Ok(Self {
            fft_point,
            bit_reversed: (0..fft_point).map(|i| bitrev(i, bits)).collect(),
            re: vec![0.0; fft_point],
            im: vec![0.0; fft_point],
        })
    }

    pub fn fft_point(&self) -> usize {
        self.fft_point
    }

    /// Number of spectrum values produced for a frame of `frame_len` samples
    pub fn spectrum_len(&self, frame_len: usize) -> usize {
        frame_len.div_ceil(self.fft_point) * self.fft_point / 2
    }

    /// Log power spectrum of a frame
    pub fn transform(&mut self, frame: &[f32]) -> Vec<f32> {
        let n = self.fft_point;
        let half = n / 2;
        let mut spectrum = vec![0.0f32; self.spectrum_len(frame.len())];

        for (segment, out) in frame.chunks(n).zip(spectrum.chunks_mut(half)) {
            for (k, &sample) in segment.iter().enumerate() {
                let t = self.bit_reversed[k];
                self.re[t] = sample;
                self.im[t] = 0.0;
            }
            for k in segment.len()..n {
                let t = self.bit_reversed[k];
                self.re[t] = 0.0;
                self.im[t] = 0.0;
            }

            fft_in_place(&mut self.re, &mut self.im, FftDirection::Forward);
            self.re[0] = 0.0;
            self.im[0] = 0.0;

            let valid = segment.len() / 2;
            let mut max_power = f32::MIN;
            let mut min_power = f32::MAX;
            for (k, bin) in out.iter_mut().enumerate().take(valid) {
                *bin = self.re[k] * self.re[k] + self.im[k] * self.im[k];
                max_power = max_power.max(*bin);
                min_power = min_power.min(*bin);
            }

            let reference = max_power - min_power;
            if valid == 0 || reference <= 0.0 || !reference.is_finite() {
                log::debug!("Flat spectrum segment, reference power {}", reference);
                out.fill(0.0);
                continue;
            }

            for bin in out.iter_mut().take(valid).skip(1) {
                *bin = (10.0 * (*bin / reference).log10()).max(SPECTRUM_FLOOR_DB);
            }
        }

        spectrum
    }

    /// Forward DFT of natural-order data, in place
    pub fn forward(&self, re: &mut [f32], im: &mut [f32]) -> Result<()> {
        self.complex_transform(re, im, FftDirection::Forward)
    }

    /// Inverse DFT of natural-order data, in place, scaled by `1/n`
    pub fn inverse(&self, re: &mut [f32], im: &mut [f32]) -> Result<()> {
        self.complex_transform(re, im, FftDirection::Inverse)?;
        let scale = 1.0 / self.fft_point as f32;
        re.iter_mut().chain(im.iter_mut()).for_each(|x| *x *= scale);
        Ok(())
    }

    /// Inverse DFT without the `1/n` scaling
    pub fn inverse_unscaled(&self, re: &mut [f32], im: &mut [f32]) -> Result<()> {
        self.complex_transform(re, im, FftDirection::Inverse)
    }

    fn complex_transform(
        &self,
        re: &mut [f32],
        im: &mut [f32],
        direction: FftDirection,
    ) -> Result<()> {
        if re.len() != self.fft_point || im.len() != self.fft_point {
            return Err(FingerprintError::Config(format!(
                "Transform buffers must hold {} points, got {} and {}",
                self.fft_point,
                re.len(),
                im.len()
            )));
        }

        for (i, &j) in self.bit_reversed.iter().enumerate() {
            if i < j {
                re.swap(i, j);
                im.swap(i, j);
            }
        }
        fft_in_place(re, im, direction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin() * 10000.0)
            .collect()
    }

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    #[test]
    fn test_bitrev() {
        assert_eq!(bitrev(0, 3), 0);
        assert_eq!(bitrev(1, 3), 4);
        assert_eq!(bitrev(3, 3), 6);
        assert_eq!(bitrev(6, 3), 3);
        assert_eq!(bitrev(1, 9), 256);
    }

    #[test]
    fn test_rejects_bad_size() {
        assert!(SpectrumTransform::new(0).is_err());
        assert!(SpectrumTransform::new(1).is_err());
        assert!(SpectrumTransform::new(500).is_err());
        assert!(SpectrumTransform::new(512).is_ok());
    }

    #[test]
    fn test_sine_peak_bin() {
        let mut fft = SpectrumTransform::new(512).unwrap();
        let spectrum = fft.transform(&sine(1000.0, 8000.0, 512));

        assert_eq!(spectrum.len(), 256);
        assert_eq!(1 + argmax(&spectrum[1..]), 64, "Peak should be at 1000 * 512 / 8000");
        assert_relative_eq!(spectrum[64], 0.0, epsilon = 1e-4);
        assert_eq!(spectrum[0], 0.0);
    }

    #[test]
    fn test_forward_sign_convention() {
        let fft = SpectrumTransform::new(8).unwrap();
        let mut re = vec![0.0f32; 8];
        let mut im = vec![0.0f32; 8];
        re[1] = 1.0;
        fft.forward(&mut re, &mut im).unwrap();

        // DFT of a delayed impulse is exp(-2*pi*i*k/n)
        for k in 0..8 {
            let angle = -2.0 * PI * k as f32 / 8.0;
            assert_relative_eq!(re[k], angle.cos(), epsilon = 1e-5);
            assert_relative_eq!(im[k], angle.sin(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_round_trip() {
        let n = 64;
        let fft = SpectrumTransform::new(n).unwrap();
        let x: Vec<f32> = (0..n).map(|i| ((i * 37 % 11) as f32 - 5.0) * 0.25).collect();

        let mut re = x.clone();
        let mut im = vec![0.0f32; n];
        fft.forward(&mut re, &mut im).unwrap();
        let (spec_re, spec_im) = (re.clone(), im.clone());

        fft.inverse_unscaled(&mut re, &mut im).unwrap();
        for i in 0..n {
            assert_relative_eq!(re[i], n as f32 * x[i], epsilon = 1e-3);
            assert_relative_eq!(im[i], 0.0, epsilon = 1e-3);
        }

        let (mut re, mut im) = (spec_re, spec_im);
        fft.inverse(&mut re, &mut im).unwrap();
        for i in 0..n {
            assert_relative_eq!(re[i], x[i], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_transform_buffer_size_checked() {
        let fft = SpectrumTransform::new(16).unwrap();
        let mut re = vec![0.0f32; 8];
        let mut im = vec![0.0f32; 8];
        assert!(fft.forward(&mut re, &mut im).is_err());
    }

    #[test]
    fn test_silent_frame_is_all_zero() {
        let mut fft = SpectrumTransform::new(256).unwrap();
        let spectrum = fft.transform(&[0.0; 256]);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_short_segment_zero_padded() {
        let mut fft = SpectrumTransform::new(256).unwrap();
        let spectrum = fft.transform(&sine(1000.0, 8000.0, 100));

        assert_eq!(spectrum.len(), 128);
        assert_eq!(spectrum[0], 0.0);
        assert!(spectrum[1..50].iter().all(|&v| v <= 0.0));
        assert!(spectrum[50..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_multiple_segments() {
        let mut fft = SpectrumTransform::new(128).unwrap();
        let mut frame = sine(1000.0, 8000.0, 128);
        frame.extend(sine(2000.0, 8000.0, 128));
        let spectrum = fft.transform(&frame);

        assert_eq!(spectrum.len(), 128);
        // Bin 0 of each segment is forced to 0 dB, level with the peak
        assert_eq!(spectrum[0], 0.0);
        assert_eq!(spectrum[64], 0.0);
        assert_eq!(1 + argmax(&spectrum[1..64]), 16);
        assert_eq!(64 + 1 + argmax(&spectrum[65..]), 64 + 32);
    }

    #[test]
    fn test_impulse_is_flat_zero_db() {
        let mut fft = SpectrumTransform::new(64).unwrap();
        let mut frame = vec![0.0f32; 64];
        frame[0] = 1.0;
        let spectrum = fft.transform(&frame);

        // Cleared bin 0 is the minimum, so every other bin sits at the maximum
        for &v in &spectrum[1..] {
            assert_relative_eq!(v, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_values_never_below_floor() {
        let mut fft = SpectrumTransform::new(64).unwrap();
        let mut frame = vec![0.0f32; 64];
        frame[10] = 1.0;
        frame[11] = 1.0;
        let spectrum = fft.transform(&frame);
        // |X[k]|^2 = 2 + 2cos(2*pi*k/64) falls towards Nyquist
        assert!(spectrum.iter().all(|&v| v >= SPECTRUM_FLOOR_DB));
        assert!(spectrum[31] < -20.0);
    }
}
