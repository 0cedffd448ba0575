//! Fingerprint artifact format.
//!
//! An artifact is a flat sequence of little-endian `i16` values. Each frame is
//! its quantized spectrum bins (bin 1 onwards) followed by [`FRAME_SENTINEL`].

use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::constants::FRAME_SENTINEL;
use crate::error::Result;

/// Artifact path for a WAV file: `<wav path>.fft.dat`
pub fn fingerprint_path<P: AsRef<Path>>(wav_path: P) -> PathBuf {
    let mut path = wav_path.as_ref().as_os_str().to_owned();
    path.push(".fft.dat");
    PathBuf::from(path)
}

/// Quantize a log-magnitude value for storage
///
/// Truncates toward zero and saturates at the `i16` range.
pub fn quantize(value: f32) -> i16 {
    value as i16
}

/// Appends frames to an artifact
pub struct FingerprintWriter<W: Write> {
    inner: W,
    frames: usize,
}

impl<W: Write> FingerprintWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, frames: 0 }
    }

    /// Write one frame of spectrum bins followed by the sentinel
    pub fn write_frame(&mut self, bins: &[f32]) -> Result<()> {
        for &bin in bins {
            self.inner.write_all(&quantize(bin).to_le_bytes())?;
        }
        self.inner.write_all(&FRAME_SENTINEL.to_le_bytes())?;
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// A whole fingerprint held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintStream {
    values: Vec<i16>,
    frame_count: usize,
}

impl FingerprintStream {
    /// Build a stream from frames of already quantized bins
    pub fn from_frames<I, F>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[i16]>,
    {
        let mut stream = Self::default();
        for frame in frames {
            stream.push_frame(frame.as_ref());
        }
        stream
    }

    /// Wrap raw artifact values; the frame count is the number of sentinels
    pub fn from_values(values: Vec<i16>) -> Self {
        let frame_count = values.iter().filter(|&&v| v == FRAME_SENTINEL).count();
        Self {
            values,
            frame_count,
        }
    }

    pub fn push_frame(&mut self, bins: &[i16]) {
        self.values.extend_from_slice(bins);
        self.values.push(FRAME_SENTINEL);
        self.frame_count += 1;
    }

    /// Read a stream to its end; a trailing odd byte is ignored
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        BufReader::new(reader).read_to_end(&mut bytes)?;
        let values = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self::from_values(values))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from(file)
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for value in &self.values {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_to(io::BufWriter::new(file))
    }

    /// Flattened values including sentinels
    pub fn values(&self) -> &[i16] {
        &self.values
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Frames without their sentinels; a trailing unterminated run is not a frame
    pub fn frames(&self) -> impl Iterator<Item = &[i16]> {
        let terminated = self
            .values
            .iter()
            .rposition(|&v| v == FRAME_SENTINEL)
            .map_or(0, |last| last + 1);
        self.values[..terminated]
            .split(|&v| v == FRAME_SENTINEL)
            .take(self.frame_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_path_appends_suffix() {
        assert_eq!(
            fingerprint_path("/tmp/take1.wav"),
            PathBuf::from("/tmp/take1.wav.fft.dat")
        );
    }

    #[test]
    fn test_quantize_truncates_and_saturates() {
        assert_eq!(quantize(-12.9), -12);
        assert_eq!(quantize(3.7), 3);
        assert_eq!(quantize(-200.0), -200);
        assert_eq!(quantize(1.0e9), i16::MAX);
    }

    #[test]
    fn test_writer_layout() {
        let mut writer = FingerprintWriter::new(Vec::new());
        writer.write_frame(&[-1.5, -20.0]).unwrap();
        writer.write_frame(&[]).unwrap();
        assert_eq!(writer.frames_written(), 2);

        let bytes = writer.into_inner();
        let stream = FingerprintStream::read_from(bytes.as_slice()).unwrap();
        assert_eq!(stream.values(), &[-1, -20, FRAME_SENTINEL, FRAME_SENTINEL]);
        assert_eq!(stream.frame_count(), 2);
    }

    #[test]
    fn test_frames_iterator() {
        let stream = FingerprintStream::from_frames([vec![1i16, 2, 3], vec![], vec![-4]]);
        let frames: Vec<&[i16]> = stream.frames().collect();
        assert_eq!(frames, vec![&[1i16, 2, 3][..], &[][..], &[-4][..]]);
    }

    #[test]
    fn test_unterminated_tail_is_not_a_frame() {
        let stream = FingerprintStream::from_values(vec![1, 2, FRAME_SENTINEL, 5, 6]);
        assert_eq!(stream.frame_count(), 1);
        assert_eq!(stream.frames().count(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav.fft.dat");
        let stream = FingerprintStream::from_frames([[-3i16, -7], [0, -200]]);
        stream.save(&path).unwrap();
        assert_eq!(FingerprintStream::load(&path).unwrap(), stream);
    }
}
