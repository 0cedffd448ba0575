pub mod generate;

pub use generate::{write_noise_wav, write_tone_wav};
