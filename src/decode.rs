//! Stax payload decoding.
//!
//! [`from_png`] scans a PNG byte stream for the `stAx` chunk and decodes its
//! payload into a [`Stax`] value. Decoding is pure and synchronous: one pass
//! over an in-memory buffer, no I/O, no pixel data.
//!
//! Slice positions are not stored in the encoding. The decoder synthesizes
//! them from a single layout cursor owned by the decode call: `x` resets to 0
//! at the start of every frame and advances by `slice_width` per slice; `y`
//! starts at 0 and advances by `slice_height` after every completed frame,
//! accumulating across animations and across stacks until the decode call
//! ends. The pixel image is therefore an implicit grid: columns are slice
//! indices, rows are frames in decode order.

use std::fmt;

use thiserror::Error;

use crate::chunk;
use crate::models::{Animation, Frame, Slice, Stack, Stax};

/// The only payload version this decoder understands.
pub const SUPPORTED_VERSION: u8 = 0;

/// Record kind attached to truncation errors so a corrupt region can be
/// localized. There is no resynchronization: the first short read aborts
/// the whole decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Header,
    Stack,
    Animation,
    Frame,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Record::Header => "header",
            Record::Stack => "stack",
            Record::Animation => "animation",
            Record::Frame => "frame",
        };
        f.write_str(name)
    }
}

/// Error type for Stax decoding failures.
///
/// Every variant is surfaced to the caller unchanged; nothing is logged or
/// retried here. [`StaxError::ChunkNotFound`] is the one "soft" case: it is
/// how a plain, non-animated PNG reports itself, and callers routing both
/// kinds of image through one loader should treat it as "no Stax data"
/// rather than a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StaxError {
    /// Buffer ended before a required fixed-size field (signature or chunk
    /// header).
    #[error("png data too short")]
    TooShort,
    /// The 8 PNG signature bytes do not match.
    #[error("invalid png signature")]
    InvalidFormat,
    /// Well-formed PNG with no `stAx` chunk.
    #[error("no stAx chunk present")]
    ChunkNotFound,
    /// Unsupported payload version; the layout cannot be assumed compatible,
    /// so no best-effort parse is attempted.
    #[error("unsupported stax version {found}")]
    InvalidVersion { found: u8 },
    /// A nested record's declared length or count runs past the payload end.
    #[error("truncated stax data while reading {0} record")]
    Truncated(Record),
}

/// Decode the Stax structure embedded in a PNG byte stream.
///
/// This is the single entry point: it locates the `stAx` chunk and decodes
/// its payload. Pixel data is never touched; the caller decodes the PNG
/// image separately and carves it up using the returned geometry.
pub fn from_png(data: &[u8]) -> Result<Stax, StaxError> {
    from_chunk(chunk::find_stax(data)?)
}

/// Decode a bare `stAx` chunk payload.
pub fn from_chunk(data: &[u8]) -> Result<Stax, StaxError> {
    if data.len() < 7 {
        return Err(StaxError::Truncated(Record::Header));
    }
    let version = data[0];
    if version != SUPPORTED_VERSION {
        return Err(StaxError::InvalidVersion { found: version });
    }
    let slice_width = read_be16(&data[1..]);
    let slice_height = read_be16(&data[3..]);
    let stack_count = read_be16(&data[5..]);

    let mut cursor = LayoutCursor {
        slice_width,
        slice_height,
        slice_count: 0,
        x: 0,
        y: 0,
    };
    let mut offset = 7;
    let mut stacks = Vec::with_capacity(stack_count as usize);
    for _ in 0..stack_count {
        let (stack, used) = read_stack(&data[offset..], &mut cursor)?;
        offset += used;
        stacks.push(stack);
    }

    Ok(Stax {
        slice_width,
        slice_height,
        stacks,
    })
}

/// Slice-position state threaded through the nested record parsers. Owned by
/// one decode call; `y` is deliberately never reset between stacks (existing
/// asset files are packed against that accumulation).
struct LayoutCursor {
    slice_width: u16,
    slice_height: u16,
    slice_count: u16,
    x: u32,
    y: u32,
}

/// Parse one stack record, returning it and the exact byte count consumed.
/// Consumed counts must be exact: an off-by-one here desyncs every sibling
/// record that follows.
fn read_stack(data: &[u8], cursor: &mut LayoutCursor) -> Result<(Stack, usize), StaxError> {
    let (name, mut offset) = read_name(data, Record::Stack)?;

    if data.len() < offset + 4 {
        return Err(StaxError::Truncated(Record::Stack));
    }
    let slice_count = read_be16(&data[offset..]);
    let animation_count = read_be16(&data[offset + 2..]);
    offset += 4;

    cursor.slice_count = slice_count;

    let mut animations = Vec::with_capacity(animation_count as usize);
    for _ in 0..animation_count {
        let (animation, used) = read_animation(&data[offset..], cursor)?;
        offset += used;
        animations.push(animation);
    }

    Ok((
        Stack {
            name,
            slice_count,
            animations,
        },
        offset,
    ))
}

fn read_animation(data: &[u8], cursor: &mut LayoutCursor) -> Result<(Animation, usize), StaxError> {
    let (name, mut offset) = read_name(data, Record::Animation)?;

    if data.len() < offset + 6 {
        return Err(StaxError::Truncated(Record::Animation));
    }
    let frame_time = u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    let frame_count = read_be16(&data[offset + 4..]);
    offset += 6;

    let mut frames = Vec::with_capacity(frame_count as usize);
    for _ in 0..frame_count {
        cursor.x = 0;
        let (frame, used) = read_frame(&data[offset..], cursor)?;
        offset += used;
        cursor.y += cursor.slice_height as u32;
        frames.push(frame);
    }

    Ok((
        Animation {
            name,
            frame_time,
            frames,
        },
        offset,
    ))
}

/// Parse one frame record: exactly `slice_count` shading bytes, one per
/// slice. Positions come from the cursor, not the buffer.
fn read_frame(data: &[u8], cursor: &mut LayoutCursor) -> Result<(Frame, usize), StaxError> {
    let count = cursor.slice_count as usize;
    if data.len() < count {
        return Err(StaxError::Truncated(Record::Frame));
    }
    let mut slices = Vec::with_capacity(count);
    for &shading in &data[..count] {
        slices.push(Slice {
            x: cursor.x,
            y: cursor.y,
            shading,
        });
        cursor.x += cursor.slice_width as u32;
    }
    Ok((Frame { slices }, count))
}

/// Read a `[u8 length][bytes]` name prefix. Name bytes are taken as-is and
/// are not required to be valid UTF-8; invalid sequences are replaced.
fn read_name(data: &[u8], kind: Record) -> Result<(String, usize), StaxError> {
    let &len = data.first().ok_or(StaxError::Truncated(kind))?;
    let end = 1 + len as usize;
    if data.len() < end {
        return Err(StaxError::Truncated(kind));
    }
    Ok((String::from_utf8_lossy(&data[1..end]).into_owned(), end))
}

fn read_be16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-built payload: 16x16 slices, one stack "a" with 2 slices and one
    /// animation "run" of 3 frames.
    fn payload() -> Vec<u8> {
        let mut out = vec![0u8]; // version
        out.extend_from_slice(&16u16.to_be_bytes()); // slice width
        out.extend_from_slice(&16u16.to_be_bytes()); // slice height
        out.extend_from_slice(&1u16.to_be_bytes()); // stack count
        out.push(1); // name length
        out.push(b'a');
        out.extend_from_slice(&2u16.to_be_bytes()); // slice count
        out.extend_from_slice(&1u16.to_be_bytes()); // animation count
        out.push(3); // name length
        out.extend_from_slice(b"run");
        out.extend_from_slice(&7u32.to_be_bytes()); // frame time
        out.extend_from_slice(&3u16.to_be_bytes()); // frame count
        out.extend_from_slice(&[10, 11, 20, 21, 30, 31]); // 3 frames x 2 shading bytes
        out
    }

    #[test]
    fn test_decodes_structure() {
        let stax = from_chunk(&payload()).unwrap();
        assert_eq!(stax.slice_width, 16);
        assert_eq!(stax.slice_height, 16);
        assert_eq!(stax.stacks.len(), 1);

        let stack = &stax.stacks[0];
        assert_eq!(stack.name, "a");
        assert_eq!(stack.slice_count, 2);

        let anim = &stack.animations[0];
        assert_eq!(anim.name, "run");
        assert_eq!(anim.frame_time, 7);
        assert_eq!(anim.frames.len(), 3);
        assert_eq!(anim.frames[2].slices[1].shading, 31);
    }

    #[test]
    fn test_geometry_follows_cursor_rule() {
        let stax = from_chunk(&payload()).unwrap();
        let frames = &stax.stacks[0].animations[0].frames;
        let coords: Vec<Vec<(u32, u32)>> = frames
            .iter()
            .map(|f| f.slices.iter().map(|s| (s.x, s.y)).collect())
            .collect();
        assert_eq!(
            coords,
            vec![
                vec![(0, 0), (16, 0)],
                vec![(0, 16), (16, 16)],
                vec![(0, 32), (16, 32)],
            ]
        );
    }

    #[test]
    fn test_version_gate() {
        let mut data = payload();
        data[0] = 1;
        assert_eq!(from_chunk(&data), Err(StaxError::InvalidVersion { found: 1 }));
        data[0] = 255;
        assert_eq!(from_chunk(&data), Err(StaxError::InvalidVersion { found: 255 }));
    }

    #[test]
    fn test_truncation_at_every_offset_fails_cleanly() {
        let data = payload();
        for cut in 0..data.len() {
            let err = from_chunk(&data[..cut]).unwrap_err();
            assert!(
                matches!(err, StaxError::Truncated(_)),
                "cut at {} gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn test_empty_stack_list_is_valid() {
        let mut out = vec![0u8];
        out.extend_from_slice(&8u16.to_be_bytes());
        out.extend_from_slice(&8u16.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        let stax = from_chunk(&out).unwrap();
        assert!(stax.stacks.is_empty());
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        // The chunk length bounds the payload; anything after the declared
        // records is unreachable by the parser.
        let mut data = payload();
        data.extend_from_slice(&[0xDE, 0xAD]);
        assert!(from_chunk(&data).is_ok());
    }

    #[test]
    fn test_non_utf8_name_is_replaced_not_rejected() {
        let mut out = vec![0u8];
        out.extend_from_slice(&8u16.to_be_bytes());
        out.extend_from_slice(&8u16.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.push(2);
        out.extend_from_slice(&[0xFF, 0xFE]); // invalid UTF-8
        out.extend_from_slice(&1u16.to_be_bytes()); // slice count
        out.extend_from_slice(&0u16.to_be_bytes()); // animation count
        let stax = from_chunk(&out).unwrap();
        assert_eq!(stax.stacks[0].name, "\u{FFFD}\u{FFFD}");
    }
}
