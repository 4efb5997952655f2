// ── Preview-to-target placement ──
//
// The text block is positioned on a scaled-down preview of the target
// surface. Compositing needs the same position in full-resolution target
// pixels. Ratios are recomputed on every call; the preview size may change
// between renders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Preview factor used when none is configured.
pub const DEFAULT_PREVIEW_SCALE: f64 = 0.5;

/// The text block's rectangle in preview coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for PlacementRect {
    fn default() -> Self {
        Self {
            left: 50,
            top: 50,
            width: 300,
            height: 150,
        }
    }
}

impl PlacementRect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Move the rectangle so it stays inside a `preview_width` x
    /// `preview_height` surface. A rectangle larger than the surface is
    /// pinned to the origin on that axis. Size is never changed.
    pub fn clamped(self, preview_width: u32, preview_height: u32) -> Self {
        Self {
            left: self.left.min(preview_width.saturating_sub(self.width)),
            top: self.top.min(preview_height.saturating_sub(self.height)),
            ..self
        }
    }
}

/// Preview and target surface sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleContext {
    pub preview_width: u32,
    pub preview_height: u32,
    pub target_width: u32,
    pub target_height: u32,
}

impl ScaleContext {
    pub fn new(preview_width: u32, preview_height: u32, target_width: u32, target_height: u32) -> Self {
        Self {
            preview_width,
            preview_height,
            target_width,
            target_height,
        }
    }

    /// Derive the preview size as `target * factor`, truncated.
    pub fn from_target(target_width: u32, target_height: u32, factor: f64) -> Self {
        Self {
            preview_width: scale_down(target_width, factor),
            preview_height: scale_down(target_height, factor),
            target_width,
            target_height,
        }
    }
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn scale_down(length: u32, factor: f64) -> u32 {
    // Float-to-int `as` saturates; NaN and negatives become 0.
    (f64::from(length) * factor).trunc() as u32
}

/// A position in target pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPoint {
    pub x: u32,
    pub y: u32,
}

/// Map `rect`'s top-left corner from preview to target coordinates.
///
/// `x = floor(left * target_width / preview_width)`, likewise for `y`.
/// A zero-sized preview is rejected with [`CoreError::InvalidScale`].
pub fn to_target(rect: PlacementRect, scale: ScaleContext) -> Result<TargetPoint, CoreError> {
    if scale.preview_width == 0 || scale.preview_height == 0 {
        return Err(CoreError::InvalidScale {
            preview_width: scale.preview_width,
            preview_height: scale.preview_height,
        });
    }

    Ok(TargetPoint {
        x: map_axis(rect.left, scale.target_width, scale.preview_width),
        y: map_axis(rect.top, scale.target_height, scale.preview_height),
    })
}

fn map_axis(offset: u32, target: u32, preview: u32) -> u32 {
    let scaled = u64::from(offset) * u64::from(target) / u64::from(preview);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Preview and scaled positions of the text block, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacementStatus {
    pub rect: PlacementRect,
    pub scale: ScaleContext,
    pub target: TargetPoint,
}

impl PlacementStatus {
    /// Clamp `rect` to the preview and map it to the target.
    pub fn compute(rect: PlacementRect, scale: ScaleContext) -> Result<Self, CoreError> {
        let rect = rect.clamped(scale.preview_width, scale.preview_height);
        let target = to_target(rect, scale)?;
        Ok(Self {
            rect,
            scale,
            target,
        })
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Preview: {}, {}", self.rect.left, self.rect.top)?;
        write!(f, "Scaled: {}, {}", self.target.x, self.target.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn hd_half() -> ScaleContext {
        ScaleContext::new(960, 540, 1920, 1080)
    }

    #[test]
    fn half_scale_preview_doubles() {
        let point = to_target(PlacementRect::new(100, 50, 300, 150), hd_half()).unwrap();
        assert_eq!(point, TargetPoint { x: 200, y: 100 });
    }

    #[test]
    fn mapping_truncates() {
        let scale = ScaleContext::new(1000, 1000, 1920, 1080);
        let point = to_target(PlacementRect::new(333, 333, 1, 1), scale).unwrap();
        // 333 * 1.92 = 639.36, 333 * 1.08 = 359.64
        assert_eq!(point, TargetPoint { x: 639, y: 359 });
    }

    #[test]
    fn zero_preview_is_invalid_scale() {
        let scale = ScaleContext::new(0, 540, 1920, 1080);
        assert!(matches!(
            to_target(PlacementRect::default(), scale),
            Err(CoreError::InvalidScale {
                preview_width: 0,
                preview_height: 540
            })
        ));
    }

    #[test]
    fn large_values_saturate() {
        let scale = ScaleContext::new(1, 1, u32::MAX, u32::MAX);
        let point = to_target(PlacementRect::new(u32::MAX, 2, 0, 0), scale).unwrap();
        assert_eq!(point, TargetPoint { x: u32::MAX, y: u32::MAX });
    }

    #[test]
    fn preview_derived_from_target() {
        assert_eq!(ScaleContext::from_target(1920, 1080, 0.5), hd_half());
        let odd = ScaleContext::from_target(1366, 769, 0.5);
        assert_eq!((odd.preview_width, odd.preview_height), (683, 384));
        let nonsense = ScaleContext::from_target(1920, 1080, -1.0);
        assert_eq!(nonsense.preview_width, 0);
    }

    #[test]
    fn clamp_keeps_rect_inside_preview() {
        let rect = PlacementRect::new(900, 500, 300, 150).clamped(960, 540);
        assert_eq!(rect, PlacementRect::new(660, 390, 300, 150));

        let inside = PlacementRect::new(10, 20, 300, 150);
        assert_eq!(inside.clamped(960, 540), inside);
    }

    #[test]
    fn clamp_pins_oversized_rect_to_origin() {
        let rect = PlacementRect::new(40, 40, 2000, 100).clamped(960, 540);
        assert_eq!((rect.left, rect.top), (0, 40));
    }

    #[test]
    fn status_line_format() {
        let status = PlacementStatus::compute(PlacementRect::new(100, 50, 300, 150), hd_half()).unwrap();
        assert_eq!(status.to_string(), "Preview: 100, 50\nScaled: 200, 100");
    }
}
