use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::config::FingerprintConfig;
use crate::error::{FingerprintError, Result};
use crate::fingerprint::decode::DecimatingReader;
use crate::fingerprint::stream::{FingerprintStream, FingerprintWriter, fingerprint_path};
use crate::signal_processing::{FirFilter, FirFilterBank, SpectrumTransform};
use crate::wav::{WaveFormat, read_header};

/// Build progress, reported after every emitted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Frames written so far
    pub frame: usize,
    /// Frames planned from the sample count
    pub total_frames: usize,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        if self.total_frames == 0 {
            1.0
        } else {
            self.frame as f32 / self.total_frames as f32
        }
    }
}

/// Result of encoding one WAV stream
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub format: WaveFormat,
    /// Frames written to the artifact
    pub frame_count: usize,
    /// Frames planned from the sample count; more than `frame_count` when the
    /// stream ran out early
    pub planned_frames: usize,
    /// Decimated raw samples for display
    pub waveform: Vec<i16>,
}

/// A fingerprint built from a WAV file on disk
#[derive(Debug, Clone)]
pub struct FingerprintSummary {
    pub wav_path: PathBuf,
    pub artifact_path: PathBuf,
    pub format: WaveFormat,
    pub frame_count: usize,
    pub waveform: Vec<i16>,
}

impl FingerprintSummary {
    /// Load the artifact written by the build
    pub fn stream(&self) -> Result<FingerprintStream> {
        FingerprintStream::load(&self.artifact_path)
    }
}

/// Decodes, filters and transforms a WAV stream into a fingerprint
///
/// Coefficients are designed and the tap count checked once at construction.
/// Each frame is band-pass filtered with a fresh history, transformed, and bins
/// `1..min(fft_point / 2, filled / 2)` are written followed by the sentinel.
pub struct FingerprintBuilder {
    config: FingerprintConfig,
    filter: FirFilter,
    fft: SpectrumTransform,
}

impl FingerprintBuilder {
    /// # Errors
    /// Returns `FingerprintError::Config` or `FingerprintError::TapCount` for an
    /// invalid configuration.
    pub fn new(config: &FingerprintConfig) -> Result<Self> {
        config.validate()?;

        let mut bank = FirFilterBank::from_config(&config.filter);
        let coefficients = bank
            .calculate_coefficients(config.filter.window, config.filter.kind)?
            .clone();
        let taps = config.filter.taps.unwrap_or(coefficients.len());
        let filter = FirFilter::new(coefficients, taps)?;

        log::debug!(
            "Fingerprint filter: {:?} {:?} {}-{} Hz, order {}, {} taps",
            config.filter.window,
            config.filter.kind,
            config.filter.band_from,
            config.filter.band_to,
            filter.coefficients().spec().order,
            filter.num_taps()
        );

        Ok(Self {
            config: config.clone(),
            filter,
            fft: SpectrumTransform::new(config.frame.fft_point)?,
        })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    /// Encode a complete WAV stream into `writer`
    ///
    /// `progress` is called after every frame; returning `ControlFlow::Break`
    /// stops the build with `FingerprintError::Cancelled`.
    pub fn build<R, W, F>(&mut self, mut reader: R, writer: W, progress: F) -> Result<BuildOutput>
    where
        R: Read,
        W: Write,
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let (format, data_len) = read_header(&mut reader)?;
        format.check_bit_depth()?;
        self.encode(reader, format, data_len, writer, progress)
    }

    /// Encode a WAV stream into an in-memory fingerprint
    pub fn build_stream<R: Read>(&mut self, reader: R) -> Result<(FingerprintStream, BuildOutput)> {
        let mut bytes = Vec::new();
        let output = self.build(reader, &mut bytes, |_| ControlFlow::Continue(()))?;
        let stream = FingerprintStream::read_from(bytes.as_slice())?;
        Ok((stream, output))
    }

    fn encode<R, W, F>(
        &mut self,
        data: R,
        format: WaveFormat,
        data_len: u32,
        writer: W,
        mut progress: F,
    ) -> Result<BuildOutput>
    where
        R: Read,
        W: Write,
        F: FnMut(Progress) -> ControlFlow<()>,
    {
        let frame_len = self.config.frame.frame_len;
        let overlap = self.config.frame.overlap;
        let half_spectrum = self.config.frame.fft_point / 2;

        let mut decoder = DecimatingReader::new(data, &format, data_len, &self.config.decode)?;
        let stride = decoder.stride();
        let step = frame_len - overlap;

        let count = decoder.count_samples();
        let planned_frames = count.saturating_sub(overlap * stride).div_ceil(step * stride);

        let mut waveform = WaveformSampler::new(
            self.config.decode.waveform_capacity,
            count,
            stride,
            step,
        );

        log::debug!(
            "{} samples after noise skip, {} frames of {} ({} overlap), stride {}",
            count,
            planned_frames,
            frame_len,
            overlap,
            stride
        );

        let mut overlap_buf = vec![0.0f32; overlap];
        decoder.read_into(&mut overlap_buf)?;

        let mut out = FingerprintWriter::new(writer);
        let mut frame = vec![0.0f32; frame_len];

        for index in 0..planned_frames {
            frame.fill(0.0);
            frame[..overlap].copy_from_slice(&overlap_buf);
            let fresh = decoder.read_into(&mut frame[overlap..])?;
            if fresh == 0 {
                log::debug!("Stream exhausted after {} of {} frames", index, planned_frames);
                break;
            }
            let filled = overlap + fresh;

            waveform.record(index, &frame);
            overlap_buf.copy_from_slice(&frame[frame_len - overlap..]);

            self.filter.process_buffer(&mut frame);
            let spectrum = self.fft.transform(&frame);

            let end = half_spectrum.min(filled / 2);
            out.write_frame(spectrum.get(1..end).unwrap_or(&[]))?;

            let report = Progress {
                frame: out.frames_written(),
                total_frames: planned_frames,
            };
            if progress(report).is_break() {
                out.flush()?;
                return Err(FingerprintError::Cancelled {
                    frames: report.frame,
                });
            }
        }

        out.flush()?;

        Ok(BuildOutput {
            format,
            frame_count: out.frames_written(),
            planned_frames,
            waveform: waveform.finish(),
        })
    }
}

/// Keeps every `interval`-th raw sample of each frame for display
struct WaveformSampler {
    samples: Vec<i16>,
    capacity: usize,
    interval: usize,
    per_frame: usize,
}

impl WaveformSampler {
    fn new(capacity: usize, count: usize, stride: usize, step: usize) -> Self {
        let interval = count
            .div_ceil((capacity * stride).max(1))
            .clamp(1, step.max(1));
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            interval,
            per_frame: step.div_ceil(interval),
        }
    }

    fn record(&mut self, frame_index: usize, frame: &[f32]) {
        for j in 0..self.per_frame {
            let index = j + frame_index * self.per_frame;
            if index >= self.capacity {
                break;
            }
            if self.samples.len() <= index {
                self.samples.resize(index + 1, 0);
            }
            self.samples[index] = frame[j * self.interval] as i16;
        }
    }

    fn finish(self) -> Vec<i16> {
        self.samples
    }
}

/// Build the fingerprint of a WAV file into `<wav path>.fft.dat`
pub fn build_fingerprint<P: AsRef<Path>>(
    wav_path: P,
    config: &FingerprintConfig,
) -> Result<FingerprintSummary> {
    build_fingerprint_with_progress(wav_path, config, |_| ControlFlow::Continue(()))
}

/// Build a fingerprint, reporting progress at frame boundaries
///
/// The header and bit depth are checked before the artifact is created. A
/// failed or cancelled build removes the partial artifact.
pub fn build_fingerprint_with_progress<P, F>(
    wav_path: P,
    config: &FingerprintConfig,
    progress: F,
) -> Result<FingerprintSummary>
where
    P: AsRef<Path>,
    F: FnMut(Progress) -> ControlFlow<()>,
{
    let wav_path = wav_path.as_ref();
    let mut builder = FingerprintBuilder::new(config)?;

    let mut reader = BufReader::new(File::open(wav_path)?);
    let (format, data_len) = read_header(&mut reader)?;
    format.check_bit_depth()?;

    let artifact_path = fingerprint_path(wav_path);
    let writer = BufWriter::new(File::create(&artifact_path)?);

    match builder.encode(reader, format, data_len, writer, progress) {
        Ok(output) => {
            log::info!(
                "Fingerprinted {}: {} frames -> {}",
                wav_path.display(),
                output.frame_count,
                artifact_path.display()
            );
            Ok(FingerprintSummary {
                wav_path: wav_path.to_path_buf(),
                artifact_path,
                format: output.format,
                frame_count: output.frame_count,
                waveform: output.waveform,
            })
        }
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(&artifact_path) {
                log::warn!(
                    "Could not remove partial artifact {}: {}",
                    artifact_path.display(),
                    remove_err
                );
            }
            Err(e)
        }
    }
}
