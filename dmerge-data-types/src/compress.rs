//! Compressed page frame.
//!
//! Every column page is wrapped in a small frame so the read path is uniform:
//!
//! ```text
//! [0]      codec id (0 = none, 2 = lz4)
//! [1..5)   compressed payload length (u32 le)
//! [5..9)   raw (decompressed) length (u32 le)
//! [9..]    payload
//! ```
//!
//! The pass-through codec still writes the full header; `None` frames carry
//! the raw bytes with both lengths equal.

use crate::codec::{get_u8, get_u32_le, put_u8, put_u32_le};
use dmerge_result::{Error, Result};

const CODEC_NONE: u8 = 0;
const CODEC_LZ4: u8 = 2;

pub const FRAME_HEADER_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    None,
    Lz4,
}

/// Wrap `raw` in a frame, compressing the payload when asked to.
pub fn compress_frame(method: CompressionMethod, raw: &[u8]) -> Vec<u8> {
    let payload = match method {
        CompressionMethod::None => None,
        CompressionMethod::Lz4 => Some(lz4_flex::block::compress(raw)),
    };
    let payload = payload.as_deref().unwrap_or(raw);

    let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    put_u8(
        &mut out,
        match method {
            CompressionMethod::None => CODEC_NONE,
            CompressionMethod::Lz4 => CODEC_LZ4,
        },
    );
    put_u32_le(&mut out, payload.len() as u32);
    put_u32_le(&mut out, raw.len() as u32);
    out.extend_from_slice(payload);
    out
}

/// Unwrap a frame produced by [`compress_frame`].
pub fn decompress_frame(frame: &[u8]) -> Result<Vec<u8>> {
    let mut pos = 0;
    let codec = get_u8(frame, &mut pos)?;
    let compressed_len = get_u32_le(frame, &mut pos)? as usize;
    let raw_len = get_u32_le(frame, &mut pos)? as usize;
    let payload = frame
        .get(pos..pos + compressed_len)
        .ok_or_else(|| Error::Corrupted("compressed frame shorter than header claims".to_string()))?;

    match codec {
        CODEC_NONE => {
            if raw_len != compressed_len {
                return Err(Error::Corrupted(
                    "pass-through frame length mismatch".to_string(),
                ));
            }
            Ok(payload.to_vec())
        }
        CODEC_LZ4 => {
            let raw = lz4_flex::block::decompress(payload, raw_len).map_err(Error::corrupted)?;
            if raw.len() != raw_len {
                return Err(Error::Corrupted("lz4 frame length mismatch".to_string()));
            }
            Ok(raw)
        }
        other => Err(Error::Corrupted(format!("unknown codec id: {other}"))),
    }
}
