//! PCM decoding with decimation and a leading noise skip.

use std::io::{self, Read, Take};

use crate::config::{DecodeConfig, SampleDecode};
use crate::error::{FingerprintError, Result};
use crate::wav::WaveFormat;

const fn build_pcm8_table() -> [i16; 256] {
    let mut table = [0i16; 256];
    let mut b = 0;
    while b < 256 {
        table[b] = ((b as i16) - 128) << 8;
        b += 1;
    }
    table
}

/// Unsigned 8-bit PCM to signed 16-bit scale: `(b - 128) << 8`
pub const PCM8_TABLE: [i16; 256] = build_pcm8_table();

/// Reads one retained sample per `stride` from the data chunk of a WAV stream
///
/// Reading is bounded to the data chunk length. Construction consumes the
/// leading noise: values strictly inside `(noise_low, noise_high)` are skipped
/// one stride at a time.
///
/// In [`SampleDecode::Legacy`] mode the noise skip inspects raw bytes, the first
/// non-noise byte is dropped, and 16-bit data discards one sample before each
/// retained one. In [`SampleDecode::Strided`] mode the skip inspects the
/// unsigned high byte of each candidate sample and keeps the first one outside
/// the noise range.
pub struct DecimatingReader<R: Read> {
    inner: Take<R>,
    mode: SampleDecode,
    bytes_per_sample: usize,
    stride: usize,
    pending: Option<i16>,
    count: usize,
    skipped: usize,
}

impl<R: Read> DecimatingReader<R> {
    /// Wrap a reader positioned at the first byte of the data chunk
    ///
    /// # Errors
    /// Returns `FingerprintError::UnsupportedBitDepth` for anything other than
    /// 8 or 16 bits, or an I/O error from the noise skip.
    pub fn new(reader: R, format: &WaveFormat, data_len: u32, config: &DecodeConfig) -> Result<Self> {
        format.check_bit_depth()?;
        if config.stride == 0 {
            return Err(FingerprintError::Config(
                "Decimation stride must be at least 1".to_string(),
            ));
        }

        let mut decoder = Self {
            inner: reader.take(u64::from(data_len)),
            mode: config.mode,
            bytes_per_sample: format.bytes_per_sample(),
            stride: config.stride,
            pending: None,
            count: 0,
            skipped: 0,
        };

        let total = data_len as usize / decoder.bytes_per_sample;
        decoder.count = match config.mode {
            SampleDecode::Legacy => {
                let consumed = decoder.skip_noise_bytes(config.noise_low, config.noise_high)?;
                total.saturating_sub(consumed)
            }
            SampleDecode::Strided => {
                let skips = decoder.skip_noise_samples(config.noise_low, config.noise_high)?;
                total.saturating_sub(skips * decoder.stride)
            }
        };

        log::debug!(
            "Decoder {:?}: {} samples after skipping {} noise strides",
            decoder.mode,
            decoder.count,
            decoder.skipped
        );
        Ok(decoder)
    }

    /// Samples in the stream after the noise skip, before decimation
    pub fn count_samples(&self) -> usize {
        self.count
    }

    /// Number of noise strides skipped at the start of the stream
    pub fn noise_strides(&self) -> usize {
        self.skipped
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Next retained sample, or `None` once the data chunk is exhausted
    pub fn next_sample(&mut self) -> Result<Option<i16>> {
        if let Some(sample) = self.pending.take() {
            self.skip_bytes((self.stride - 1) * self.bytes_per_sample)?;
            return Ok(Some(sample));
        }

        match (self.mode, self.bytes_per_sample) {
            (SampleDecode::Legacy, 2) => {
                if self.read_raw()?.is_none() {
                    return Ok(None);
                }
                let sample = self.read_raw()?;
                self.skip_bytes(2 * (self.stride - 1))?;
                Ok(sample)
            }
            _ => {
                let sample = self.read_raw()?;
                self.skip_bytes((self.stride - 1) * self.bytes_per_sample)?;
                Ok(sample)
            }
        }
    }

    /// Fill `buf` with retained samples; returns how many were written
    pub fn read_into(&mut self, buf: &mut [f32]) -> Result<usize> {
        for (filled, slot) in buf.iter_mut().enumerate() {
            match self.next_sample()? {
                Some(sample) => *slot = f32::from(sample),
                None => return Ok(filled),
            }
        }
        Ok(buf.len())
    }

    /// Byte-level skip: returns the number of bytes consumed, including the
    /// dropped first non-noise byte
    fn skip_noise_bytes(&mut self, low: u8, high: u8) -> Result<usize> {
        let mut consumed = 1;
        let Some(mut b) = self.read_byte()? else {
            return Ok(consumed);
        };
        while low < b && b < high {
            self.skip_bytes(self.stride - 1)?;
            consumed += self.stride;
            self.skipped += 1;
            match self.read_byte()? {
                Some(next) => b = next,
                None => break,
            }
        }
        Ok(consumed)
    }

    /// Sample-level skip: returns the number of strides skipped
    fn skip_noise_samples(&mut self, low: u8, high: u8) -> Result<usize> {
        while let Some(sample) = self.read_raw()? {
            if !is_noise(self.high_byte(sample), low, high) {
                self.pending = Some(sample);
                break;
            }
            self.skip_bytes((self.stride - 1) * self.bytes_per_sample)?;
            self.skipped += 1;
        }
        Ok(self.skipped)
    }

    fn high_byte(&self, sample: i16) -> u8 {
        ((sample >> 8) + 128) as u8
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_raw(&mut self) -> Result<Option<i16>> {
        if self.bytes_per_sample == 1 {
            return Ok(self.read_byte()?.map(|b| PCM8_TABLE[usize::from(b)]));
        }
        let mut buf = [0u8; 2];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => Ok(Some(i16::from_le_bytes(buf))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn skip_bytes(&mut self, n: usize) -> Result<()> {
        io::copy(&mut (&mut self.inner).take(n as u64), &mut io::sink())?;
        Ok(())
    }
}

fn is_noise(value: u8, low: u8, high: u8) -> bool {
    low < value && value < high
}
