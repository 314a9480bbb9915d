use serde::{Deserialize, Serialize};

use crate::models::{ImagePixel, ImageSize, ScreenPoint, WidgetRect};

pub const ZOOM_MIN: f64 = 1.0;
pub const ZOOM_MAX: f64 = 15.0;

/// Zoom change per button press or `+`/`-` key.
pub const BUTTON_ZOOM_STEP: f64 = 1.0;

/// Zoom change per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.3;

/// Pan distance in screen pixels per arrow key.
pub const KEY_PAN_STEP: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanKey {
    Up,
    Down,
    Left,
    Right,
}

/// Pan/zoom state of the minimap widget.
///
/// The rendered content is `translate(pan) scale(zoom)` with origin at the
/// widget's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: ZOOM_MIN,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

/// Compute new pan offsets so that `pivot` stays over the same content point
/// when zooming from `old_zoom` to `new_zoom`.
pub fn zoom_pan_at_pivot(
    pivot: ScreenPoint,
    old_zoom: f64,
    new_zoom: f64,
    old_pan_x: f64,
    old_pan_y: f64,
) -> (f64, f64) {
    let ratio = new_zoom / old_zoom;
    (
        pivot.x - (pivot.x - old_pan_x) * ratio,
        pivot.y - (pivot.y - old_pan_y) * ratio,
    )
}

/// Undo the pan/zoom transform: widget-relative point to image layout pixel.
pub fn to_image_pixel(screen: ScreenPoint, viewport: &ViewportState) -> ImagePixel {
    ImagePixel {
        x: (screen.x - viewport.pan_x) / viewport.zoom,
        y: (screen.y - viewport.pan_y) / viewport.zoom,
    }
}

/// Scale a layout pixel (image drawn to fill `widget` at zoom 1) to the image's
/// natural resolution. Each axis scales independently.
pub fn to_natural_pixel(layout: ImagePixel, widget: WidgetRect, image: ImageSize) -> ImagePixel {
    ImagePixel {
        x: layout.x * image.width / widget.width,
        y: layout.y * image.height / widget.height,
    }
}

impl ViewportState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_image_pixel(&self, screen: ScreenPoint) -> ImagePixel {
        to_image_pixel(screen, self)
    }

    /// Screen pixel to reference-image pixel in one step.
    pub fn to_reference_pixel(
        &self,
        screen: ScreenPoint,
        widget: WidgetRect,
        image: ImageSize,
    ) -> ImagePixel {
        to_natural_pixel(self.to_image_pixel(screen), widget, image)
    }

    /// Where a layout pixel currently appears on screen (for drawing the pin).
    pub fn to_screen(&self, pixel: ImagePixel) -> ScreenPoint {
        ScreenPoint::new(
            pixel.x * self.zoom + self.pan_x,
            pixel.y * self.zoom + self.pan_y,
        )
    }

    /// Zoom to `requested` (clamped to [`ZOOM_MIN`], [`ZOOM_MAX`]) keeping `pivot`
    /// fixed. Returns `false` when the clamped zoom equals the current one.
    pub fn zoom_at(&mut self, pivot: ScreenPoint, requested: f64) -> bool {
        let new_zoom = requested.clamp(ZOOM_MIN, ZOOM_MAX);
        if new_zoom == self.zoom {
            return false;
        }
        let (pan_x, pan_y) = zoom_pan_at_pivot(pivot, self.zoom, new_zoom, self.pan_x, self.pan_y);
        self.zoom = new_zoom;
        self.pan_x = pan_x;
        self.pan_y = pan_y;
        true
    }

    pub fn zoom_in(&mut self, widget: WidgetRect) -> bool {
        self.zoom_at(widget.center(), self.zoom + BUTTON_ZOOM_STEP)
    }

    pub fn zoom_out(&mut self, widget: WidgetRect) -> bool {
        self.zoom_at(widget.center(), self.zoom - BUTTON_ZOOM_STEP)
    }

    /// Wheel zoom anchored at the cursor. Positive `delta_y` (scroll down) zooms out.
    pub fn wheel(&mut self, cursor: ScreenPoint, delta_y: f64) -> bool {
        if delta_y == 0.0 || (self.zoom <= ZOOM_MIN && delta_y > 0.0) {
            return false;
        }
        let step = if delta_y > 0.0 {
            -WHEEL_ZOOM_STEP
        } else {
            WHEEL_ZOOM_STEP
        };
        self.zoom_at(cursor, self.zoom + step)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Arrow-key pan: the content moves in the direction of the arrow's opposite
    /// edge, i.e. `Up` reveals what is above.
    pub fn pan_key(&mut self, key: PanKey) {
        match key {
            PanKey::Up => self.pan_by(0.0, KEY_PAN_STEP),
            PanKey::Down => self.pan_by(0.0, -KEY_PAN_STEP),
            PanKey::Left => self.pan_by(KEY_PAN_STEP, 0.0),
            PanKey::Right => self.pan_by(-KEY_PAN_STEP, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET: WidgetRect = WidgetRect {
        width: 300.0,
        height: 225.0,
    };

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_identity_at_default_viewport() {
        let vp = ViewportState::default();
        let px = vp.to_image_pixel(ScreenPoint::new(120.0, 80.0));
        assert_close(px.x, 120.0);
        assert_close(px.y, 80.0);
    }

    #[test]
    fn test_to_image_pixel_undoes_pan_and_zoom() {
        let vp = ViewportState {
            zoom: 2.0,
            pan_x: -100.0,
            pan_y: 50.0,
        };
        let px = to_image_pixel(ScreenPoint::new(100.0, 150.0), &vp);
        assert_close(px.x, 100.0);
        assert_close(px.y, 50.0);
    }

    #[test]
    fn test_to_screen_is_inverse() {
        let vp = ViewportState {
            zoom: 3.3,
            pan_x: -240.0,
            pan_y: -17.5,
        };
        let screen = ScreenPoint::new(42.0, 199.0);
        let back = vp.to_screen(vp.to_image_pixel(screen));
        assert_close(back.x, screen.x);
        assert_close(back.y, screen.y);
    }

    #[test]
    fn test_button_zoom_keeps_center_fixed() {
        let mut vp = ViewportState::default();
        let center = WIDGET.center();
        let before = vp.to_image_pixel(center);
        assert!(vp.zoom_in(WIDGET));
        assert_close(vp.zoom, 2.0);
        let after = vp.to_image_pixel(center);
        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
        assert_close(vp.pan_x, -150.0);
        assert_close(vp.pan_y, -112.5);
    }

    #[test]
    fn test_wheel_zoom_keeps_cursor_fixed() {
        let mut vp = ViewportState {
            zoom: 2.0,
            pan_x: -30.0,
            pan_y: -10.0,
        };
        let cursor = ScreenPoint::new(75.0, 190.0);
        let before = vp.to_image_pixel(cursor);
        assert!(vp.wheel(cursor, -120.0));
        assert_close(vp.zoom, 2.3);
        let after = vp.to_image_pixel(cursor);
        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
    }

    #[test]
    fn test_wheel_down_zooms_out() {
        let mut vp = ViewportState {
            zoom: 2.0,
            pan_x: 0.0,
            pan_y: 0.0,
        };
        assert!(vp.wheel(ScreenPoint::new(0.0, 0.0), 100.0));
        assert_close(vp.zoom, 1.7);
    }

    #[test]
    fn test_wheel_out_at_min_is_noop() {
        let mut vp = ViewportState::default();
        assert!(!vp.wheel(ScreenPoint::new(10.0, 10.0), 100.0));
        assert_eq!(vp, ViewportState::default());
    }

    #[test]
    fn test_wheel_zero_delta_is_noop() {
        let mut vp = ViewportState::default();
        assert!(!vp.wheel(ScreenPoint::new(10.0, 10.0), 0.0));
        assert_eq!(vp, ViewportState::default());
    }

    #[test]
    fn test_zoom_clamps_at_max() {
        let mut vp = ViewportState::default();
        assert!(vp.zoom_at(WIDGET.center(), 40.0));
        assert_close(vp.zoom, ZOOM_MAX);
        let snapshot = vp;
        assert!(!vp.zoom_in(WIDGET));
        assert_eq!(vp, snapshot);
    }

    #[test]
    fn test_zoom_clamps_at_min() {
        let mut vp = ViewportState::default();
        assert!(!vp.zoom_out(WIDGET));
        assert!(!vp.zoom_at(WIDGET.center(), -3.0));
        assert_eq!(vp, ViewportState::default());
    }

    #[test]
    fn test_wheel_near_max_clamps() {
        let mut vp = ViewportState {
            zoom: 14.9,
            pan_x: 0.0,
            pan_y: 0.0,
        };
        assert!(vp.wheel(ScreenPoint::new(0.0, 0.0), -1.0));
        assert_close(vp.zoom, ZOOM_MAX);
        assert!(!vp.wheel(ScreenPoint::new(0.0, 0.0), -1.0));
    }

    #[test]
    fn test_pan_keys() {
        let mut vp = ViewportState::default();
        vp.pan_key(PanKey::Up);
        vp.pan_key(PanKey::Left);
        assert_close(vp.pan_x, 50.0);
        assert_close(vp.pan_y, 50.0);
        vp.pan_key(PanKey::Down);
        vp.pan_key(PanKey::Down);
        vp.pan_key(PanKey::Right);
        assert_close(vp.pan_x, 0.0);
        assert_close(vp.pan_y, -50.0);
    }

    #[test]
    fn test_pan_is_unbounded() {
        let mut vp = ViewportState::default();
        vp.pan_by(10_000.0, -10_000.0);
        let px = vp.to_image_pixel(ScreenPoint::new(0.0, 0.0));
        assert_close(px.x, -10_000.0);
        assert_close(px.y, 10_000.0);
    }

    #[test]
    fn test_reset() {
        let mut vp = ViewportState {
            zoom: 4.0,
            pan_x: 12.0,
            pan_y: -3.0,
        };
        vp.reset();
        assert_eq!(vp, ViewportState::default());
    }

    #[test]
    fn test_to_natural_pixel_scales_each_axis() {
        let image = ImageSize {
            width: 600.0,
            height: 900.0,
        };
        let px = to_natural_pixel(ImagePixel { x: 150.0, y: 75.0 }, WIDGET, image);
        assert_close(px.x, 300.0);
        assert_close(px.y, 300.0);
    }

    #[test]
    fn test_to_reference_pixel_bottom_right_corner() {
        let vp = ViewportState::default();
        let px = vp.to_reference_pixel(
            ScreenPoint::new(WIDGET.width, WIDGET.height),
            WIDGET,
            ImageSize::REFERENCE,
        );
        assert_close(px.x, ImageSize::REFERENCE.width);
        assert_close(px.y, ImageSize::REFERENCE.height);
    }
}
