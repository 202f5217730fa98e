//! GIF container inspection.
//!
//! Counts image frames by walking the block stream of a GIF container
//! without LZW-decoding any pixel data. The walk is the authority on
//! animation: a ".gif" upload can be a single still frame, and a renamed
//! non-GIF payload has no valid block stream at all.
//!
//! Layout walked: header, logical screen descriptor, optional global color
//! table, then a sequence of extension blocks (0x21), image descriptors
//! (0x2C, each one frame), and the trailer (0x3B).

use stickerlab_core::TransformError;

const HEADER_LEN: usize = 6;
const LOGICAL_SCREEN_DESCRIPTOR_LEN: usize = 7;
const IMAGE_DESCRIPTOR_LEN: usize = 9;

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

fn malformed(detail: impl Into<String>) -> TransformError {
    TransformError::MalformedAsset(format!("gif: {}", detail.into()))
}

/// True when the buffer starts with a GIF signature.
pub fn has_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a")
}

/// Number of image frames in the container.
///
/// Fails with `MalformedAsset` on truncated streams and unrecognized block
/// introducers; a container with zero image descriptors is also malformed.
pub fn frame_count(bytes: &[u8]) -> Result<u32, TransformError> {
    if !has_signature(bytes) {
        return Err(malformed("missing GIF87a/GIF89a signature"));
    }
    if bytes.len() < HEADER_LEN + LOGICAL_SCREEN_DESCRIPTOR_LEN {
        return Err(malformed("truncated logical screen descriptor"));
    }

    // Global color table flag and size live in the packed byte of the
    // logical screen descriptor.
    let packed = bytes[10];
    let mut pos = HEADER_LEN + LOGICAL_SCREEN_DESCRIPTOR_LEN;
    if packed & 0x80 != 0 {
        pos += color_table_len(packed);
    }

    let mut frames: u32 = 0;
    loop {
        let introducer = *bytes
            .get(pos)
            .ok_or_else(|| malformed("stream ended without trailer"))?;
        pos += 1;

        match introducer {
            TRAILER => {
                if frames == 0 {
                    return Err(malformed("no image descriptors before trailer"));
                }
                return Ok(frames);
            }
            EXTENSION_INTRODUCER => {
                // label byte, then data sub-blocks
                pos = pos
                    .checked_add(1)
                    .filter(|p| *p <= bytes.len())
                    .ok_or_else(|| malformed("truncated extension block"))?;
                pos = skip_sub_blocks(bytes, pos)?;
            }
            IMAGE_SEPARATOR => {
                if pos + IMAGE_DESCRIPTOR_LEN > bytes.len() {
                    return Err(malformed("truncated image descriptor"));
                }
                let descriptor_packed = bytes[pos + IMAGE_DESCRIPTOR_LEN - 1];
                pos += IMAGE_DESCRIPTOR_LEN;
                if descriptor_packed & 0x80 != 0 {
                    pos += color_table_len(descriptor_packed);
                }
                // LZW minimum code size byte precedes the pixel sub-blocks
                if pos >= bytes.len() {
                    return Err(malformed("truncated image data"));
                }
                pos += 1;
                pos = skip_sub_blocks(bytes, pos)?;
                frames += 1;
            }
            other => {
                return Err(malformed(format!(
                    "unrecognized block introducer 0x{other:02X} at offset {}",
                    pos - 1
                )));
            }
        }
    }
}

/// 3 bytes per entry, 2^(n+1) entries.
fn color_table_len(packed: u8) -> usize {
    3 * (2usize << (packed & 0x07))
}

/// Advance past a chain of length-prefixed sub-blocks, including the zero
/// terminator.
fn skip_sub_blocks(bytes: &[u8], mut pos: usize) -> Result<usize, TransformError> {
    loop {
        let len = *bytes
            .get(pos)
            .ok_or_else(|| malformed("truncated sub-block chain"))?;
        pos += 1;
        if len == 0 {
            return Ok(pos);
        }
        pos += len as usize;
        if pos > bytes.len() {
            return Err(malformed("sub-block overruns buffer"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-assembled GIF89a with `frames` minimal 1x1 image blocks.
    fn tiny_gif(frames: usize) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"GIF89a");
        // 1x1 logical screen, global color table with 2 entries
        bytes.extend_from_slice(&[0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF]);
        for _ in 0..frames {
            // graphic control extension
            bytes.extend_from_slice(&[0x21, 0xF9, 0x04, 0x00, 0x0A, 0x00, 0x00, 0x00]);
            // image descriptor 1x1, no local color table
            bytes.extend_from_slice(&[0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
            // LZW min code size + one data sub-block + terminator
            bytes.extend_from_slice(&[0x02, 0x02, 0x4C, 0x01, 0x00]);
        }
        bytes.push(0x3B);
        bytes
    }

    #[test]
    fn single_frame_counts_one() {
        assert_eq!(frame_count(&tiny_gif(1)).unwrap(), 1);
    }

    #[test]
    fn five_frames_count_five() {
        assert_eq!(frame_count(&tiny_gif(5)).unwrap(), 5);
    }

    #[test]
    fn non_gif_bytes_are_rejected() {
        let err = frame_count(b"\xFF\xD8\xFF\xE0 not a gif").unwrap_err();
        assert!(matches!(err, TransformError::MalformedAsset(_)));
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let mut bytes = tiny_gif(2);
        bytes.truncate(bytes.len() - 8);
        let err = frame_count(&bytes).unwrap_err();
        assert!(matches!(err, TransformError::MalformedAsset(_)));
    }

    #[test]
    fn empty_container_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"GIF89a");
        bytes.extend_from_slice(&[0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        bytes.push(0x3B);
        let err = frame_count(&bytes).unwrap_err();
        assert!(matches!(err, TransformError::MalformedAsset(_)));
    }

    #[test]
    fn garbage_block_introducer_is_rejected() {
        let mut bytes = tiny_gif(1);
        let trailer = bytes.len() - 1;
        bytes[trailer] = 0x7E; // stomp the trailer
        bytes.push(0x3B);
        let err = frame_count(&bytes).unwrap_err();
        assert!(matches!(err, TransformError::MalformedAsset(_)));
    }
}
