use std::f32::consts::PI;

use crate::config::WindowKind;

/// Modified Bessel function of the first kind, order zero
///
/// Rational polynomial approximation (Abramowitz & Stegun 9.8.1 and 9.8.2)
/// with two branches split at |x| = 3.75. Relative error stays below about 1e-7.
pub fn bessel_i0(x: f32) -> f32 {
    let ax = (x as f64).abs();
    let ans = if ax < 3.75 {
        let y = (x as f64 / 3.75).powi(2);
        1.0 + y
            * (3.5156229
                + y * (3.0899424
                    + y * (1.2067492 + y * (0.2659732 + y * (0.360768e-1 + y * 0.45813e-2)))))
    } else {
        let y = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + y * (0.1328592e-1
                    + y * (0.225319e-2
                        + y * (-0.157565e-2
                            + y * (0.916281e-2
                                + y * (-0.2057706e-1
                                    + y * (0.2635537e-1
                                        + y * (-0.1647633e-1 + y * 0.392377e-2))))))))
    };
    ans as f32
}

impl WindowKind {
    /// Stopband attenuation (dB) and transition width factor implied by a fixed window
    ///
    /// The transition band in Hz is `factor * nyquist / order`. Kaiser has no fixed
    /// response: its attenuation and transition band come from the caller.
    pub fn fixed_response(self) -> Option<(f32, f32)> {
        match self {
            WindowKind::Kaiser => None,
            WindowKind::Hann => Some((44.0, 6.22)),
            WindowKind::Hamming => Some((53.0, 6.64)),
            WindowKind::Blackman => Some((74.0, 11.13)),
            WindowKind::Rectangular => Some((21.0, 1.84)),
        }
    }

    /// One side of the window, indexed by distance from the center tap
    ///
    /// Returns `half + 1` values; index 0 is the center and is left at zero because
    /// the designer writes the center tap directly.
    pub fn half_window(self, half: usize, kaiser_alpha: f32) -> Vec<f32> {
        let mut window = vec![0.0f32; half + 1];
        let o2 = half as f32;

        match self {
            WindowKind::Kaiser => {
                let norm = bessel_i0(kaiser_alpha);
                for (i, w) in window.iter_mut().enumerate().skip(1) {
                    let ratio = i as f32 / o2;
                    *w = bessel_i0(kaiser_alpha * (1.0 - ratio * ratio).sqrt()) / norm;
                }
            }
            WindowKind::Hann => {
                for (i, w) in window.iter_mut().enumerate().skip(1) {
                    *w = 0.5 + 0.5 * (PI / (o2 + 1.0) * i as f32).cos();
                }
            }
            WindowKind::Hamming => {
                for (i, w) in window.iter_mut().enumerate().skip(1) {
                    *w = 0.54 + 0.46 * (PI / o2 * i as f32).cos();
                }
            }
            WindowKind::Blackman => {
                for (i, w) in window.iter_mut().enumerate().skip(1) {
                    let x = PI / o2 * i as f32;
                    *w = 0.42 + 0.5 * x.cos() + 0.08 * (2.0 * x).cos();
                }
            }
            WindowKind::Rectangular => {
                window.iter_mut().skip(1).for_each(|w| *w = 1.0);
            }
        }

        window
    }
}
