//! Stax payload encoding and PNG embedding.
//!
//! The production pipeline only ever decodes, but authoring tools and the
//! round-trip tests need the reverse direction: serialize a [`Stax`] value
//! into a `stAx` chunk payload and splice that chunk into a PNG stream.
//! Output is bit-exact with what [`crate::decode`] expects.

use image::RgbaImage;
use thiserror::Error;

use crate::chunk::{self, IEND_CHUNK_TYPE, PNG_SIGNATURE, STAX_CHUNK_TYPE};
use crate::decode::StaxError;
use crate::models::Stax;

/// Error type for encoding failures.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Name prefixes carry a single length byte.
    #[error("name '{name}' is {len} bytes, maximum is 255")]
    NameTooLong { name: String, len: usize },
    /// Stack, animation and frame counts are encoded as u16.
    #[error("{what} count {count} exceeds the u16 range")]
    CountOutOfRange { what: &'static str, count: usize },
    /// Every frame must carry exactly the stack's declared slice count; the
    /// decoder reads that many shading bytes per frame, nothing marks a
    /// frame boundary.
    #[error("stack '{stack}' declares {declared} slices but a frame of '{animation}' has {actual}")]
    SliceCountMismatch {
        stack: String,
        animation: String,
        declared: u16,
        actual: usize,
    },
    /// The PNG stream being embedded into is itself malformed.
    #[error("malformed png stream: {0}")]
    Png(#[from] StaxError),
    /// Chunk streams end with IEND; without one there is no splice point.
    #[error("png stream has no IEND chunk")]
    MissingIend,
    /// Pixel encoding via the image crate failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Serialize a [`Stax`] value into a `stAx` chunk payload.
///
/// Slice `x`/`y` are never written; the decoder re-synthesizes them from its
/// layout cursor, so only names, counts, frame times and shading bytes are
/// stored.
pub fn to_chunk(stax: &Stax) -> Result<Vec<u8>, EncodeError> {
    let mut out = vec![crate::decode::SUPPORTED_VERSION];
    out.extend_from_slice(&stax.slice_width.to_be_bytes());
    out.extend_from_slice(&stax.slice_height.to_be_bytes());
    out.extend_from_slice(&as_u16(stax.stacks.len(), "stack")?.to_be_bytes());

    for stack in &stax.stacks {
        push_name(&mut out, &stack.name)?;
        out.extend_from_slice(&stack.slice_count.to_be_bytes());
        out.extend_from_slice(&as_u16(stack.animations.len(), "animation")?.to_be_bytes());

        for animation in &stack.animations {
            push_name(&mut out, &animation.name)?;
            out.extend_from_slice(&animation.frame_time.to_be_bytes());
            out.extend_from_slice(&as_u16(animation.frames.len(), "frame")?.to_be_bytes());

            for frame in &animation.frames {
                if frame.slices.len() != stack.slice_count as usize {
                    return Err(EncodeError::SliceCountMismatch {
                        stack: stack.name.clone(),
                        animation: animation.name.clone(),
                        declared: stack.slice_count,
                        actual: frame.slices.len(),
                    });
                }
                for slice in &frame.slices {
                    out.push(slice.shading);
                }
            }
        }
    }

    Ok(out)
}

/// Splice a `stAx` chunk into an existing PNG byte stream, immediately
/// before `IEND`. Any `stAx` chunk already present is dropped, so embedding
/// is idempotent.
pub fn embed(png: &[u8], stax: &Stax) -> Result<Vec<u8>, EncodeError> {
    chunk::check_signature(png)?;
    let body = to_chunk(stax)?;

    let mut out = Vec::with_capacity(png.len() + body.len() + 12);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut offset = PNG_SIGNATURE.len();
    let mut spliced = false;
    while offset < png.len() {
        if png.len() < offset + 8 {
            return Err(StaxError::TooShort.into());
        }
        let length =
            u32::from_be_bytes([png[offset], png[offset + 1], png[offset + 2], png[offset + 3]])
                as usize;
        let end = offset + 12 + length;
        if png.len() < end {
            return Err(StaxError::TooShort.into());
        }
        let chunk_type = &png[offset + 4..offset + 8];
        if *chunk_type == STAX_CHUNK_TYPE {
            offset = end;
            continue;
        }
        if *chunk_type == IEND_CHUNK_TYPE {
            chunk::write_chunk(&mut out, STAX_CHUNK_TYPE, &body);
            spliced = true;
        }
        out.extend_from_slice(&png[offset..end]);
        offset = end;
    }

    if !spliced {
        return Err(EncodeError::MissingIend);
    }
    Ok(out)
}

/// Encode a pixel sheet as PNG and embed the Stax structure in one step.
pub fn write_sheet(image: &RgbaImage, stax: &Stax) -> Result<Vec<u8>, EncodeError> {
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut png, image::ImageOutputFormat::Png)?;
    embed(&png.into_inner(), stax)
}

fn push_name(out: &mut Vec<u8>, name: &str) -> Result<(), EncodeError> {
    if name.len() > u8::MAX as usize {
        return Err(EncodeError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
        });
    }
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
    Ok(())
}

fn as_u16(count: usize, what: &'static str) -> Result<u16, EncodeError> {
    u16::try_from(count).map_err(|_| EncodeError::CountOutOfRange { what, count })
}
