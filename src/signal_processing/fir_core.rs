use crate::error::{FingerprintError, Result};
use crate::signal_processing::Coefficients;

/// Direct-form FIR convolution over one buffer at a time
///
/// Holds the coefficient vector and a shift-register history of `taps` samples.
/// The history is cleared at the start of every buffer, so no state leaks from
/// one frame into the next.
pub struct FirFilter {
    coefficients: Coefficients,
    history: Vec<f32>,
}

impl FirFilter {
    /// Create a filter that convolves with the first `taps` coefficients
    ///
    /// # Errors
    /// Returns `FingerprintError::TapCount` if `taps` is zero or exceeds the
    /// number of coefficients.
    pub fn new(coefficients: Coefficients, taps: usize) -> Result<Self> {
        if taps == 0 || taps > coefficients.len() {
            return Err(FingerprintError::TapCount {
                taps,
                available: coefficients.len(),
            });
        }
        Ok(Self {
            coefficients,
            history: vec![0.0; taps],
        })
    }

    /// Create a filter that uses every coefficient
    pub fn with_all_taps(coefficients: Coefficients) -> Result<Self> {
        let taps = coefficients.len();
        Self::new(coefficients, taps)
    }

    /// Filter a buffer in place
    ///
    /// For each sample: shift it into history slot 0, take the dot product of
    /// history and coefficients, shift the history right by one, and write the
    /// result back over the input sample.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        let taps = self.history.len();
        let coeffs = &self.coefficients.as_slice()[..taps];
        self.history.fill(0.0);

        for sample in buffer.iter_mut() {
            self.history[0] = *sample;

            let y = self
                .history
                .iter()
                .zip(coeffs)
                .fold(0.0f32, |acc, (x, c)| acc + x * c);

            self.history.copy_within(0..taps - 1, 1);
            *sample = y;
        }
    }

    /// Get the number of taps used by the convolution
    pub fn num_taps(&self) -> usize {
        self.history.len()
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }
}

/// Apply coefficients to a frame in place using the first `taps` coefficients
pub fn apply_filter(coefficients: &Coefficients, taps: usize, frame: &mut [f32]) -> Result<()> {
    let mut filter = FirFilter::new(coefficients.clone(), taps)?;
    filter.process_buffer(frame);
    Ok(())
}
