//! Data model for decoded Stax sprite sheets.
//!
//! A sheet decodes into a hierarchy of stacks → animations → frames → slices.
//! Every type here is a plain immutable value: decode builds it once and the
//! caller shares it read-only from then on.

use serde::Serialize;

/// Root descriptor for one sprite sheet.
///
/// `slice_width` and `slice_height` are fixed for the whole sheet; every
/// slice in every stack carves a rectangle of exactly these dimensions out
/// of the decoded pixel image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stax {
    pub slice_width: u16,
    pub slice_height: u16,
    /// Ordered as encoded; the first stack is the default.
    pub stacks: Vec<Stack>,
}

impl Stax {
    /// Look up a stack by name. Linear first-match scan; duplicate names are
    /// not rejected at decode time, so the first occurrence wins.
    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.name == name)
    }
}

/// A named layer-group variant of a sprite (e.g. an alternate costume).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    pub name: String,
    /// Number of layered slices in every frame of this stack.
    pub slice_count: u16,
    /// Ordered as encoded; the first animation is the default.
    pub animations: Vec<Animation>,
}

impl Stack {
    /// Look up an animation by name. First match wins.
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }
}

/// A named, timed sequence of frames. Playback wraps: the last frame's
/// successor is frame 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Animation {
    pub name: String,
    /// Ticks each frame is displayed before advancing. Existing consumers
    /// advance on `timer > frame_time` (strict), so a value of N yields N+1
    /// ticks of display and 0 advances on tick 1, not every tick.
    pub frame_time: u32,
    pub frames: Vec<Frame>,
}

impl Animation {
    /// Bounds-checked frame access; out-of-range indices yield `None`.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

/// One still image of an animation, composed of layered slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Slice order is semantically meaningful: index identifies a fixed
    /// layer shared by convention across sheets (0 is the bottom layer).
    pub slices: Vec<Slice>,
}

impl Frame {
    /// Bounds-checked slice access; out-of-range indices yield `None`.
    pub fn slice(&self, index: usize) -> Option<&Slice> {
        self.slices.get(index)
    }
}

/// One layer's sub-image location within the decoded pixel buffer.
///
/// `x`/`y` are not stored in the encoding; the decoder synthesizes them from
/// its layout cursor (see [`crate::decode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub x: u32,
    pub y: u32,
    /// Opaque consumer-defined byte (e.g. a lighting/depth hint); read but
    /// never interpreted here.
    pub shading: u8,
}
