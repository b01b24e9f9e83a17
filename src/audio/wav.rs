//! Minimal RIFF/WAVE writer for 16-bit PCM, so synthesized buffers can be
//! handed to kira's WAV decoder.

use std::io::{self, Write};

pub const HEADER_LEN: usize = 44;

/// Write `samples` (interleaved when `channels > 1`) as 16-bit PCM.
/// Values are clamped to [-1, 1].
pub fn write_pcm16<W: Write>(out: &mut W, samples: &[f32], sample_rate: u32, channels: u16) -> io::Result<()> {
    let data_len = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;

    out.write_all(b"RIFF")?;
    out.write_all(&(36 + data_len).to_le_bytes())?;
    out.write_all(b"WAVE")?;

    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?;
    out.write_all(&1u16.to_le_bytes())?;
    out.write_all(&channels.to_le_bytes())?;
    out.write_all(&sample_rate.to_le_bytes())?;
    out.write_all(&byte_rate.to_le_bytes())?;
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&16u16.to_le_bytes())?;

    out.write_all(b"data")?;
    out.write_all(&data_len.to_le_bytes())?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        out.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

/// Mono buffer to an in-memory WAV file.
pub fn encode_mono(samples: &[f32], sample_rate: u32) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + samples.len() * 2);
    write_pcm16(&mut bytes, samples, sample_rate, 1)?;
    Ok(bytes)
}
