//! Stax - layered sprite/animation data embedded in PNG files
//!
//! This library provides functionality to:
//! - Decode the `stAx` ancillary chunk of a PNG into stacks, animations,
//!   frames and slices, with deterministic slice geometry
//! - Encode a Stax structure back into a CRC-correct `stAx` chunk and splice
//!   it into a PNG byte stream
//! - Carve and composite sprite stills out of the decoded pixel sheet

pub mod chunk;
pub mod cli;
pub mod decode;
pub mod encode;
pub mod models;
pub mod output;
pub mod sheet;

pub use decode::{from_png, StaxError};
pub use models::{Animation, Frame, Slice, Stack, Stax};
