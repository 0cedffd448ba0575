pub mod fft;
pub mod filter_design;
pub mod fir_core;
pub mod fir_filters;
pub mod window;

pub use fft::{FftDirection, SpectrumTransform, bitrev, fft_in_place};
pub use filter_design::{Coefficients, FilterSpec, derive_effective_spec, design_filter};
pub use fir_core::{FirFilter, apply_filter};
pub use fir_filters::FirFilterBank;
pub use window::bessel_i0;
