//! Carving decoded pixel sheets with Stax geometry.
//!
//! The decoder only produces geometry; this module is where that geometry
//! meets pixels. Callers decode the PNG image with a standard codec, then
//! crop per-slice sub-images or composite a frame's layers into one still.

use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::models::{Frame, Slice, Stax};

/// Error type for sheet carving failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    /// The slice rectangle starts beyond the sheet entirely. Rectangles that
    /// merely overhang an edge are clipped instead.
    #[error("slice at ({x}, {y}) lies outside the {width}x{height} sheet")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Crop one slice's `slice_width` x `slice_height` rectangle out of the
/// sheet. Pixels past the sheet edge come back transparent.
pub fn carve(sheet: &RgbaImage, stax: &Stax, slice: &Slice) -> Result<RgbaImage, SheetError> {
    let (sheet_w, sheet_h) = sheet.dimensions();
    if slice.x >= sheet_w || slice.y >= sheet_h {
        return Err(SheetError::OutOfBounds {
            x: slice.x,
            y: slice.y,
            width: sheet_w,
            height: sheet_h,
        });
    }

    let w = stax.slice_width as u32;
    let h = stax.slice_height as u32;
    let mut out = RgbaImage::new(w, h);
    let copy_w = w.min(sheet_w - slice.x);
    let copy_h = h.min(sheet_h - slice.y);
    for dy in 0..copy_h {
        for dx in 0..copy_w {
            out.put_pixel(dx, dy, *sheet.get_pixel(slice.x + dx, slice.y + dy));
        }
    }
    Ok(out)
}

/// Composite a frame's layered slices into one still, index 0 at the bottom,
/// alpha-blending each layer over the result.
pub fn composite_frame(
    sheet: &RgbaImage,
    stax: &Stax,
    frame: &Frame,
) -> Result<RgbaImage, SheetError> {
    let mut out = RgbaImage::new(stax.slice_width as u32, stax.slice_height as u32);
    for slice in &frame.slices {
        let layer = carve(sheet, stax, slice)?;
        imageops::overlay(&mut out, &layer, 0, 0);
    }
    Ok(out)
}
