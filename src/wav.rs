//! RIFF/WAVE header parsing and WAV writing.

use std::io::{self, Read};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{FingerprintError, Result};

/// `wFormatTag` of the `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    Pcm,
    Float,
    Other(u16),
}

impl From<u16> for FormatTag {
    fn from(tag: u16) -> Self {
        match tag {
            1 => FormatTag::Pcm,
            3 => FormatTag::Float,
            other => FormatTag::Other(other),
        }
    }
}

/// Fields of the `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    pub format_tag: FormatTag,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl WaveFormat {
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Only 8- and 16-bit samples can be fingerprinted
    pub fn check_bit_depth(&self) -> Result<()> {
        match self.bits_per_sample {
            8 | 16 => Ok(()),
            bits => Err(FingerprintError::UnsupportedBitDepth(bits)),
        }
    }
}

fn truncated(e: io::Error) -> FingerprintError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        FingerprintError::Format("Truncated RIFF header".to_string())
    } else {
        FingerprintError::Io(e)
    }
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(truncated)?;
    Ok(buf)
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    Ok(u16::from_le_bytes(read_array(reader)?))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array(reader)?))
}

fn expect_id<R: Read>(reader: &mut R, id: &[u8; 4]) -> Result<()> {
    let found: [u8; 4] = read_array(reader)?;
    if &found != id {
        return Err(FingerprintError::Format(format!(
            "Expected '{}' chunk, found '{}'",
            String::from_utf8_lossy(id),
            String::from_utf8_lossy(&found)
        )));
    }
    Ok(())
}

/// Parse a WAV header and position the reader at the first PCM byte
///
/// Reads `RIFF`, the RIFF size, `WAVE`, the `fmt ` chunk (at least 16 bytes,
/// extra bytes skipped), then scans byte by byte for the `data` chunk id.
/// Returns the format and the data chunk length in bytes.
///
/// # Errors
/// Returns `FingerprintError::Format` for a malformed header or a missing
/// `data` chunk.
pub fn read_header<R: Read>(reader: &mut R) -> Result<(WaveFormat, u32)> {
    expect_id(reader, b"RIFF")?;
    read_u32(reader)?;
    expect_id(reader, b"WAVE")?;
    expect_id(reader, b"fmt ")?;

    let fmt_size = read_u32(reader)?;
    if fmt_size < 16 {
        return Err(FingerprintError::Format(format!(
            "Format chunk is {} bytes, expected at least 16",
            fmt_size
        )));
    }

    let format = WaveFormat {
        format_tag: FormatTag::from(read_u16(reader)?),
        channels: read_u16(reader)?,
        sample_rate: read_u32(reader)?,
        avg_bytes_per_sec: read_u32(reader)?,
        block_align: read_u16(reader)?,
        bits_per_sample: read_u16(reader)?,
    };

    let extra = u64::from(fmt_size - 16);
    let skipped = io::copy(&mut reader.by_ref().take(extra), &mut io::sink())?;
    if skipped != extra {
        return Err(FingerprintError::Format("Truncated format chunk".to_string()));
    }

    let mut window: [u8; 4] = read_array(reader)?;
    while &window != b"data" {
        let [next]: [u8; 1] = read_array(reader).map_err(|_| {
            FingerprintError::Format("No 'data' chunk found".to_string())
        })?;
        window.rotate_left(1);
        window[3] = next;
    }

    let data_len = read_u32(reader)?;
    log::debug!(
        "WAV header: {:?}, {} ch, {} Hz, {} bits, {} data bytes",
        format.format_tag,
        format.channels,
        format.sample_rate,
        format.bits_per_sample,
        data_len
    );

    Ok((format, data_len))
}

/// Write mono integer PCM samples given in [-1, 1]
///
/// Supports 8, 16, 24 and 32 bits per sample; 8-bit output is stored unsigned
/// as the WAV format requires.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
    bits_per_sample: u16,
) -> std::result::Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    let full_scale = ((1i64 << (bits_per_sample - 1)) - 1) as f32;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * full_scale).round();
        match bits_per_sample {
            8 => writer.write_sample(value as i8)?,
            16 => writer.write_sample(value as i16)?,
            _ => writer.write_sample(value as i32)?,
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(fmt_size: u32, bits: u16, extra_chunk: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&fmt_size.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&8000u32.to_le_bytes());
        bytes.extend_from_slice(&16000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&bits.to_le_bytes());
        bytes.extend(std::iter::repeat_n(0u8, fmt_size.saturating_sub(16) as usize));
        bytes.extend_from_slice(extra_chunk);
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        bytes
    }

    #[test]
    fn test_read_minimal_header() {
        let bytes = header(16, 16, &[]);
        let mut cursor = Cursor::new(bytes);
        let (format, data_len) = read_header(&mut cursor).unwrap();

        assert_eq!(format.format_tag, FormatTag::Pcm);
        assert_eq!(format.channels, 1);
        assert_eq!(format.sample_rate, 8000);
        assert_eq!(format.bits_per_sample, 16);
        assert_eq!(data_len, 4);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_skips_extended_fmt_and_other_chunks() {
        let mut list = Vec::new();
        list.extend_from_slice(b"LIST");
        list.extend_from_slice(&3u32.to_le_bytes());
        list.extend_from_slice(b"abc");
        let bytes = header(18, 8, &list);

        let (format, data_len) = read_header(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(format.bits_per_sample, 8);
        assert_eq!(data_len, 4);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = header(16, 16, &[]);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(
            read_header(&mut Cursor::new(bytes)),
            Err(FingerprintError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_short_fmt_chunk() {
        let bytes = header(14, 16, &[]);
        assert!(matches!(
            read_header(&mut Cursor::new(bytes)),
            Err(FingerprintError::Format(_))
        ));
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut bytes = header(16, 16, &[]);
        bytes.truncate(36);
        assert!(matches!(
            read_header(&mut Cursor::new(bytes)),
            Err(FingerprintError::Format(_))
        ));
    }

    #[test]
    fn test_bit_depth_check() {
        let (format, _) = read_header(&mut Cursor::new(header(16, 24, &[]))).unwrap();
        assert!(matches!(
            format.check_bit_depth(),
            Err(FingerprintError::UnsupportedBitDepth(24))
        ));
    }

    #[test]
    fn test_format_tag_values() {
        assert_eq!(FormatTag::from(1), FormatTag::Pcm);
        assert_eq!(FormatTag::from(3), FormatTag::Float);
        assert_eq!(FormatTag::from(0xFFFE), FormatTag::Other(0xFFFE));
    }

    #[test]
    fn test_save_wav_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        save_wav(&path, &[0.0, 0.5, -0.5, 1.0], 8000, 16).unwrap();

        let mut file = std::fs::File::open(&path).unwrap();
        let (format, data_len) = read_header(&mut file).unwrap();
        assert_eq!(format.bits_per_sample, 16);
        assert_eq!(format.sample_rate, 8000);
        assert_eq!(data_len, 8);

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![0, 16384, -16384, 32767]);
    }
}
