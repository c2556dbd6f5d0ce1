//! Sample quantization, little-endian encoding, and PCM hashing.

use pixtone_spec::SampleWidth;

/// Rounds a mixed value (half away from zero) and clamps it to the sample
/// range of `width`.
pub fn clip(value: f64, width: SampleWidth) -> i32 {
    quantize(value, width).0
}

/// Like [`clip`], also reporting whether clamping changed the value.
pub fn quantize(value: f64, width: SampleWidth) -> (i32, bool) {
    let min = f64::from(width.min_sample());
    let max = f64::from(width.max_sample());
    let rounded = value.round();
    if rounded > max {
        (width.max_sample(), true)
    } else if rounded < min {
        (width.min_sample(), true)
    } else {
        // NaN lands here and casts to 0.
        (rounded as i32, false)
    }
}

/// Appends one signed little-endian sample of `width.bytes()` bytes.
pub fn encode_sample(value: i32, width: SampleWidth, out: &mut Vec<u8>) {
    out.extend_from_slice(&value.to_le_bytes()[..width.bytes()]);
}

/// Encodes a whole sample sequence.
pub fn samples_to_pcm(samples: &[i32], width: SampleWidth) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * width.bytes());
    for &sample in samples {
        encode_sample(sample, width, &mut out);
    }
    out
}

/// Decodes signed little-endian samples; a trailing partial sample is ignored.
pub fn pcm_to_samples(pcm: &[u8], width: SampleWidth) -> Vec<i32> {
    let bytes = width.bytes();
    pcm.chunks_exact(bytes)
        .map(|chunk| {
            let mut buf = [0u8; 4];
            buf[..bytes].copy_from_slice(chunk);
            // Shift up and back down to sign-extend.
            let shift = 32 - 8 * bytes as u32;
            (i32::from_le_bytes(buf) << shift) >> shift
        })
        .collect()
}

/// Incremental BLAKE3 hash over the encoded sample stream.
#[derive(Debug, Clone, Default)]
pub struct PcmHasher {
    hasher: blake3::Hasher,
    scratch: Vec<u8>,
}

impl PcmHasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes one interleaved frame.
    pub fn update(&mut self, frame: &[i32], width: SampleWidth) {
        self.scratch.clear();
        for &sample in frame {
            encode_sample(sample, width, &mut self.scratch);
        }
        self.hasher.update(&self.scratch);
    }

    /// Hex digest of everything hashed so far.
    pub fn finalize(&self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

/// Computes the BLAKE3 hash of encoded PCM bytes.
pub fn pcm_hash(pcm: &[u8]) -> String {
    blake3::hash(pcm).to_hex().to_string()
}

/// Returns the payload of a WAVE file's `data` chunk.
pub fn extract_pcm_data(wav_data: &[u8]) -> Option<&[u8]> {
    if wav_data.len() < 12 || &wav_data[0..4] != b"RIFF" || &wav_data[8..12] != b"WAVE" {
        return None;
    }

    let mut pos = 12;
    while pos + 8 <= wav_data.len() {
        let chunk_id = &wav_data[pos..pos + 4];
        let size = u32::from_le_bytes([
            wav_data[pos + 4],
            wav_data[pos + 5],
            wav_data[pos + 6],
            wav_data[pos + 7],
        ]) as usize;
        let start = pos + 8;

        if chunk_id == b"data" {
            return wav_data.get(start..start + size);
        }

        // Chunks are word aligned.
        pos = start + size + (size % 2);
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_clip_rounds_half_away_from_zero() {
        assert_eq!(clip(0.5, SampleWidth::Bits16), 1);
        assert_eq!(clip(-0.5, SampleWidth::Bits16), -1);
        assert_eq!(clip(1.49, SampleWidth::Bits16), 1);
        assert_eq!(clip(-2.5, SampleWidth::Bits16), -3);
    }

    #[test]
    fn test_clip_limits() {
        assert_eq!(quantize(32767.4, SampleWidth::Bits16), (32767, false));
        assert_eq!(quantize(32767.5, SampleWidth::Bits16), (32767, true));
        assert_eq!(quantize(-32768.0, SampleWidth::Bits16), (-32768, false));
        assert_eq!(quantize(-40000.0, SampleWidth::Bits16), (-32768, true));
        assert_eq!(quantize(1e12, SampleWidth::Bits8), (127, true));
        assert_eq!(quantize(-1e12, SampleWidth::Bits32), (i32::MIN, true));
        assert_eq!(quantize(f64::NAN, SampleWidth::Bits16), (0, false));
    }

    #[test]
    fn test_encode_widths() {
        let mut out = Vec::new();
        encode_sample(-2, SampleWidth::Bits8, &mut out);
        encode_sample(-2, SampleWidth::Bits16, &mut out);
        encode_sample(0x012345, SampleWidth::Bits24, &mut out);
        encode_sample(-1, SampleWidth::Bits32, &mut out);
        assert_eq!(
            out,
            vec![0xFE, 0xFE, 0xFF, 0x45, 0x23, 0x01, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_pcm_decoding_sign_extends() {
        let samples = vec![-8_388_608, -1, 0, 1, 8_388_607];
        let pcm = samples_to_pcm(&samples, SampleWidth::Bits24);
        assert_eq!(pcm.len(), 15);
        assert_eq!(pcm_to_samples(&pcm, SampleWidth::Bits24), samples);
        assert_eq!(pcm_to_samples(&[0x80], SampleWidth::Bits8), vec![-128]);
    }

    #[test]
    fn test_hasher_matches_one_shot_hash() {
        let frames = [[1, 1], [-300, -300], [32767, 32767]];
        let mut hasher = PcmHasher::new();
        for frame in &frames {
            hasher.update(frame, SampleWidth::Bits16);
        }
        let flat: Vec<i32> = frames.iter().flatten().copied().collect();
        let expected = pcm_hash(&samples_to_pcm(&flat, SampleWidth::Bits16));
        assert_eq!(hasher.finalize(), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn test_extract_pcm_data() {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&0u32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"junk");
        wav.extend_from_slice(&3u32.to_le_bytes());
        wav.extend_from_slice(&[9, 9, 9, 0]);
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(&[1, 2, 3, 4]);

        assert_eq!(extract_pcm_data(&wav), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(extract_pcm_data(b"RIFF....AVI "), None);
    }
}
