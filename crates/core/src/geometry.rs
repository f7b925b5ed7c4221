//! Preview-space and document-space geometry
//!
//! The preview is the on-screen rendering of one page; its pixel size
//! changes whenever the viewport is resized. Document space uses
//! resolution-independent fractions (0..1) of the page dimensions, which
//! stay stable across re-renders and are the only geometry the server
//! ever sees.

use serde::{Deserialize, Serialize};

/// Smallest preview dimension a reference frame will report.
///
/// Guards the divisions in [`NormalizedRect::from_preview`] against a
/// zero-sized preview (e.g. a page measured before layout settled).
const MIN_FRAME_DIMENSION: f32 = 1.0;

/// Smallest normalized extent for width/height.
///
/// Normalized width/height live in (0, 1]; a zero extent would produce an
/// invisible, unstampable field.
const MIN_NORMALIZED_EXTENT: f32 = 1.0e-6;

/// Pixel offset within the rendered preview of one page.
///
/// Origin (0, 0) at the top-left of the page image, x increasing to the
/// right, y increasing downward, matching the rendered bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewPoint {
    pub x: f32,
    pub y: f32,
}

impl PreviewPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pixel extent within the rendered preview of one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewSize {
    pub width: f32,
    pub height: f32,
}

impl PreviewSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum with another size.
    pub fn max(self, other: PreviewSize) -> PreviewSize {
        PreviewSize { width: self.width.max(other.width), height: self.height.max(other.height) }
    }
}

/// Preview page dimensions at the moment a position/size was written.
///
/// Every annotation carries the frame its coordinates were written in, so
/// normalization is computed against that frame and never against the
/// preview size at submission time. Without this, placements silently
/// drift when the viewport is resized between placement and submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    width: f32,
    height: f32,
}

impl ReferenceFrame {
    /// Create a frame from the rendered page dimensions.
    ///
    /// Dimensions are floored to [`MIN_FRAME_DIMENSION`]; the rendering
    /// engine reports the real pixel size, but a degenerate frame must
    /// never poison later normalization.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(MIN_FRAME_DIMENSION),
            height: height.max(MIN_FRAME_DIMENSION),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

/// A placement in document space: fractions of the page dimensions.
///
/// `x`/`y` are clamped to [0, 1] and `width`/`height` to (0, 1]. This is
/// the only geometry representation that crosses the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    /// Normalize a preview-space placement against its reference frame.
    ///
    /// The frame must be the one in effect when `position`/`size` were
    /// last written, not the frame at call time.
    pub fn from_preview(position: PreviewPoint, size: PreviewSize, frame: ReferenceFrame) -> Self {
        Self {
            x: (position.x / frame.width()).clamp(0.0, 1.0),
            y: (position.y / frame.height()).clamp(0.0, 1.0),
            width: (size.width / frame.width()).clamp(MIN_NORMALIZED_EXTENT, 1.0),
            height: (size.height / frame.height()).clamp(MIN_NORMALIZED_EXTENT, 1.0),
        }
    }

    /// Project a normalized placement back into a preview frame.
    ///
    /// Inverse of [`NormalizedRect::from_preview`]; used when re-rendering
    /// previously normalized placements against a new preview size.
    pub fn to_preview(&self, frame: ReferenceFrame) -> (PreviewPoint, PreviewSize) {
        (
            PreviewPoint::new(self.x * frame.width(), self.y * frame.height()),
            PreviewSize::new(self.width * frame.width(), self.height * frame.height()),
        )
    }
}
