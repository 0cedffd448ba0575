use crate::config::{FilterConfig, FilterKind, WindowKind};
use crate::constants::{DESIGN_DEFAULT_BAND, HIGH_PASS_DEFAULT_BAND, LOW_PASS_DEFAULT_BAND};
use crate::error::Result;
use crate::signal_processing::{Coefficients, FilterSpec, FirFilter, design_filter};

/// Low-pass, high-pass and band-pass entry points over one filter design
///
/// Holds the configured band and window, designs coefficients on demand and
/// filters buffers in place. When no band is configured (both edges zero) each
/// entry point falls back to its own default band:
///
/// - low-pass: 0-1000 Hz
/// - high-pass: 2000-4000 Hz
/// - band-pass: the band of the last design, or 1000-1000 Hz before any design
pub struct FirFilterBank {
    spec: FilterSpec,
    taps: Option<usize>,
    design: Option<Coefficients>,
}

impl FirFilterBank {
    /// Create a bank from a base spec; `taps` of `None` uses every coefficient
    pub fn new(spec: FilterSpec, taps: Option<usize>) -> Self {
        Self {
            spec,
            taps,
            design: None,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(FilterSpec::from(config), config.taps)
    }

    /// Set the passband used by subsequent designs
    pub fn set_band(&mut self, band_from: f32, band_to: f32) {
        self.spec.band_from = band_from;
        self.spec.band_to = band_to;
    }

    fn band_configured(&self) -> bool {
        self.spec.band_from != 0.0 || self.spec.band_to != 0.0
    }

    /// Design coefficients for a window and response type
    pub fn calculate_coefficients(
        &mut self,
        window: WindowKind,
        kind: FilterKind,
    ) -> Result<&Coefficients> {
        let band = if self.band_configured() {
            (self.spec.band_from, self.spec.band_to)
        } else {
            DESIGN_DEFAULT_BAND
        };
        self.spec.window = window;
        self.spec.kind = kind;
        self.ensure_design(kind, band)
    }

    /// Low-pass filter a buffer in place
    pub fn low_pass(&mut self, buffer: &mut [f32]) -> Result<()> {
        let band = self.band_or(LOW_PASS_DEFAULT_BAND);
        self.filter(FilterKind::LowPass, band, buffer)
    }

    /// High-pass filter a buffer in place
    pub fn high_pass(&mut self, buffer: &mut [f32]) -> Result<()> {
        let band = self.band_or(HIGH_PASS_DEFAULT_BAND);
        self.filter(FilterKind::HighPass, band, buffer)
    }

    /// Band-pass filter a buffer in place
    pub fn band_pass(&mut self, buffer: &mut [f32]) -> Result<()> {
        let fallback = self
            .design
            .as_ref()
            .map(|c| (c.spec().band_from, c.spec().band_to))
            .unwrap_or(DESIGN_DEFAULT_BAND);
        let band = self.band_or(fallback);
        self.filter(FilterKind::BandPass, band, buffer)
    }

    /// Dispatch to the entry point for `kind`
    pub fn apply(&mut self, kind: FilterKind, buffer: &mut [f32]) -> Result<()> {
        match kind {
            FilterKind::LowPass => self.low_pass(buffer),
            FilterKind::HighPass => self.high_pass(buffer),
            FilterKind::BandPass => self.band_pass(buffer),
        }
    }

    /// Coefficients of the current design, if any
    pub fn coefficients(&self) -> Option<&Coefficients> {
        self.design.as_ref()
    }

    fn band_or(&self, fallback: (f32, f32)) -> (f32, f32) {
        if self.band_configured() {
            (self.spec.band_from, self.spec.band_to)
        } else {
            fallback
        }
    }

    fn filter(&mut self, kind: FilterKind, band: (f32, f32), buffer: &mut [f32]) -> Result<()> {
        let coefficients = self.ensure_design(kind, band)?.clone();
        let taps = self.taps.unwrap_or(coefficients.len());
        let mut fir = FirFilter::new(coefficients, taps)?;
        fir.process_buffer(buffer);
        Ok(())
    }

    /// Reuse the current design when kind, band and window still match
    fn ensure_design(&mut self, kind: FilterKind, band: (f32, f32)) -> Result<&Coefficients> {
        let wanted = FilterSpec {
            band_from: band.0,
            band_to: band.1,
            kind,
            ..self.spec
        };

        let design = match self.design.take() {
            Some(current) if matches_design(current.spec(), &wanted) => current,
            previous => match design_filter(&wanted) {
                Ok(fresh) => fresh,
                Err(e) => {
                    self.design = previous;
                    return Err(e);
                }
            },
        };

        Ok(self.design.insert(design))
    }
}

fn matches_design(designed: &FilterSpec, wanted: &FilterSpec) -> bool {
    designed.kind == wanted.kind
        && designed.window == wanted.window
        && designed.band_from == wanted.band_from
        && designed.band_to == wanted.band_to
}
