use std::f32::consts::PI;

use crate::config::{FilterConfig, FilterKind, WindowKind};
use crate::constants::{
    DEFAULT_ATTENUATION_DB, DEFAULT_DESIGN_RATE_HZ, DEFAULT_KAISER_ALPHA, DEFAULT_TRANSITION_HZ,
    MAX_FILTER_ORDER,
};
use crate::error::{FingerprintError, Result};

/// Parameters of a windowed-sinc FIR design
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Passband start in Hz
    pub band_from: f32,
    /// Passband end in Hz
    pub band_to: f32,
    /// Stopband attenuation in dB
    pub stopband_attenuation_db: f32,
    /// Transition band width in Hz
    pub transition_band_hz: f32,
    /// Kaiser window shape parameter
    pub kaiser_alpha: f32,
    /// Even filter order; 0 derives it from attenuation and transition band
    pub order: usize,
    pub window: WindowKind,
    pub kind: FilterKind,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_DESIGN_RATE_HZ,
            band_from: 0.0,
            band_to: 0.0,
            stopband_attenuation_db: DEFAULT_ATTENUATION_DB,
            transition_band_hz: DEFAULT_TRANSITION_HZ,
            kaiser_alpha: DEFAULT_KAISER_ALPHA,
            order: 0,
            window: WindowKind::Kaiser,
            kind: FilterKind::BandPass,
        }
    }
}

impl From<&FilterConfig> for FilterSpec {
    fn from(config: &FilterConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            band_from: config.band_from,
            band_to: config.band_to,
            stopband_attenuation_db: config.stopband_attenuation_db,
            transition_band_hz: config.transition_band_hz,
            kaiser_alpha: config.kaiser_alpha,
            order: config.order,
            window: config.window,
            kind: config.kind,
        }
    }
}

impl FilterSpec {
    pub fn nyquist(&self) -> f32 {
        0.5 * self.sample_rate
    }

    /// Filter order used for design
    ///
    /// An explicit order must be even. An order of 0 is derived from the
    /// attenuation and transition band:
    /// `trunc(((A - 7.95) / (B * 14.36 / nyquist) + 1) * 2) - 1`,
    /// bumped to the next even value when odd. Orders above
    /// [`MAX_FILTER_ORDER`] are rejected.
    pub fn effective_order(&self) -> Result<usize> {
        if self.order > MAX_FILTER_ORDER {
            return Err(FingerprintError::Config(format!(
                "Filter order {} exceeds the maximum of {}",
                self.order, MAX_FILTER_ORDER
            )));
        }
        if self.order != 0 {
            if !self.order.is_multiple_of(2) {
                return Err(FingerprintError::Config(format!(
                    "Filter order must be even, got {}",
                    self.order
                )));
            }
            return Ok(self.order);
        }

        if self.sample_rate <= 0.0 || self.transition_band_hz <= 0.0 {
            return Err(FingerprintError::Config(format!(
                "Cannot derive filter order: sample_rate={}, transition_band={}",
                self.sample_rate, self.transition_band_hz
            )));
        }

        let normalized_band = self.transition_band_hz * 14.36 / self.nyquist();
        let raw = ((self.stopband_attenuation_db - 7.95) / normalized_band + 1.0) * 2.0;
        let order = raw.trunc() as i64 - 1;
        if order > MAX_FILTER_ORDER as i64 {
            return Err(FingerprintError::Config(format!(
                "Derived filter order {} exceeds the maximum of {} (transition={} Hz)",
                order, MAX_FILTER_ORDER, self.transition_band_hz
            )));
        }
        if order <= 0 {
            return Err(FingerprintError::Config(format!(
                "Derived filter order {} is not positive (attenuation={} dB, transition={} Hz)",
                order, self.stopband_attenuation_db, self.transition_band_hz
            )));
        }

        let order = order as usize;
        Ok(if order.is_multiple_of(2) { order } else { order + 1 })
    }

    /// Passband edge angles `(ps, pe)` in radians for the filter kind
    pub fn passband_angles(&self) -> (f32, f32) {
        let nyquist = self.nyquist();
        let band = self.transition_band_hz;
        match self.kind {
            FilterKind::BandPass => (
                PI / 2.0 * (self.band_from + self.band_to) / nyquist,
                PI / 2.0 * (self.band_to - self.band_from + band) / nyquist,
            ),
            FilterKind::LowPass => (0.0, PI * (self.band_to + band / 2.0) / nyquist),
            FilterKind::HighPass => (PI, PI * (1.0 - (self.band_from - band / 2.0) / nyquist)),
        }
    }
}

/// Resolve the order and the window-dependent response of a spec
///
/// Fixed windows (Hann, Hamming, Blackman, Rectangular) replace the stopband
/// attenuation and transition band with the values their shape implies for the
/// resolved order. Kaiser keeps the caller's values. The input is not modified.
pub fn derive_effective_spec(spec: &FilterSpec) -> Result<FilterSpec> {
    let order = spec.effective_order()?;
    let mut effective = FilterSpec { order, ..*spec };

    if let Some((attenuation, factor)) = spec.window.fixed_response() {
        effective.stopband_attenuation_db = attenuation;
        effective.transition_band_hz = factor * spec.nyquist() / order as f32;
    }

    Ok(effective)
}

/// Symmetric FIR tap vector of length `order + 1`
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    taps: Vec<f32>,
    spec: FilterSpec,
}

impl Coefficients {
    /// Wrap externally designed taps
    pub fn from_taps(taps: Vec<f32>, spec: FilterSpec) -> Self {
        Self { taps, spec }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.taps
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// The effective spec the taps were designed from
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }
}

/// Design a windowed-sinc FIR filter
///
/// The half impulse response `h[i] = w[i] * sin(i*pe) * cos(i*ps) / (i*pi)` is
/// mirrored around the center tap `pe/pi` to give a causal, linear-phase filter.
///
/// # Errors
/// Returns `FingerprintError::Config` if the order is odd or cannot be derived.
pub fn design_filter(spec: &FilterSpec) -> Result<Coefficients> {
    let effective = derive_effective_spec(spec)?;
    let order = effective.order;
    let o2 = order / 2;

    let window = effective.window.half_window(o2, effective.kaiser_alpha);
    let (ps, pe) = effective.passband_angles();

    let mut taps = vec![0.0f32; order + 1];
    taps[0] = pe / PI;
    for i in 1..=o2 {
        let x = i as f32;
        taps[i] = window[i] * (x * pe).sin() * (x * ps).cos() / (x * PI);
    }

    // Shift the impulse so the peak sits at o2
    for i in (o2 + 1)..=order {
        taps[i] = taps[i - o2];
    }
    for i in 0..o2 {
        taps[i] = taps[order - i];
    }
    taps[o2] = pe / PI;

    log::debug!(
        "Designed {:?} {:?} filter: order={} band={}-{} Hz attenuation={} dB transition={:.1} Hz",
        effective.window,
        effective.kind,
        order,
        effective.band_from,
        effective.band_to,
        effective.stopband_attenuation_db,
        effective.transition_band_hz
    );

    Ok(Coefficients {
        taps,
        spec: effective,
    })
}
