//! Package raw PCM as an in-memory WAV file.

use crate::error::CaptureError;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Encode mono 16-bit samples at `sample_rate` as WAV bytes.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, CaptureError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(
            &mut cursor,
            WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        )
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
        for &s in samples {
            writer
                .write_sample(s)
                .map_err(|e| CaptureError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}
