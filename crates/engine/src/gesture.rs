//! Pointer gesture classification for the minimap.
//!
//! A press followed by a release with no movement in between is a click and
//! places the guess pin. Any movement turns the gesture into a drag, which
//! pans the viewport and suppresses the click. Two-finger pinches zoom around
//! the pinch midpoint and never produce a click.

use crate::models::ScreenPoint;
use crate::viewport::{zoom_pan_at_pivot, ViewportState, ZOOM_MAX, ZOOM_MIN};

/// Pinches that start with the fingers closer than this are ignored.
const MIN_PINCH_DISTANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Press and release without movement, at the press position.
    Click(ScreenPoint),
    /// The pointer moved while pressed; the viewport was panned.
    Drag,
    /// Release without a tracked press (or the end of a pinch).
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: ScreenPoint,
    start_pan_x: f64,
    start_pan_y: f64,
    moved: bool,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    start_distance: f64,
    start_zoom: f64,
    midpoint: ScreenPoint,
    start_pan_x: f64,
    start_pan_y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PointerGesture {
    press: Option<Press>,
    pinch: Option<Pinch>,
}

fn point_distance(a: ScreenPoint, b: ScreenPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

impl PointerGesture {
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn press(&mut self, point: ScreenPoint, viewport: &ViewportState) {
        if self.pinch.is_some() {
            return;
        }
        self.press = Some(Press {
            start: point,
            start_pan_x: viewport.pan_x,
            start_pan_y: viewport.pan_y,
            moved: false,
        });
    }

    /// Track pointer movement. Pans the viewport by the offset from the press
    /// position and returns whether a pan happened.
    pub fn move_to(&mut self, point: ScreenPoint, viewport: &mut ViewportState) -> bool {
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        let dx = point.x - press.start.x;
        let dy = point.y - press.start.y;
        if !press.moved && (dx != 0.0 || dy != 0.0) {
            press.moved = true;
        }
        if !press.moved {
            return false;
        }
        viewport.pan_x = press.start_pan_x + dx;
        viewport.pan_y = press.start_pan_y + dy;
        true
    }

    pub fn release(&mut self) -> GestureOutcome {
        if self.pinch.take().is_some() {
            self.press = None;
            return GestureOutcome::Ignored;
        }
        match self.press.take() {
            Some(press) if press.moved => GestureOutcome::Drag,
            Some(press) => GestureOutcome::Click(press.start),
            None => GestureOutcome::Ignored,
        }
    }

    /// Drop any in-progress gesture without producing a click.
    pub fn cancel(&mut self) {
        self.press = None;
        self.pinch = None;
    }

    pub fn pinch_start(&mut self, a: ScreenPoint, b: ScreenPoint, viewport: &ViewportState) {
        self.press = None;
        self.pinch = Some(Pinch {
            start_distance: point_distance(a, b),
            start_zoom: viewport.zoom,
            midpoint: ScreenPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            start_pan_x: viewport.pan_x,
            start_pan_y: viewport.pan_y,
        });
    }

    /// Zoom by the ratio of the current finger distance to the starting one,
    /// anchored at the starting midpoint.
    pub fn pinch_move(&mut self, a: ScreenPoint, b: ScreenPoint, viewport: &mut ViewportState) -> bool {
        let Some(pinch) = self.pinch else {
            return false;
        };
        if pinch.start_distance < MIN_PINCH_DISTANCE {
            return false;
        }
        let scale = point_distance(a, b) / pinch.start_distance;
        let new_zoom = (pinch.start_zoom * scale).clamp(ZOOM_MIN, ZOOM_MAX);
        let (pan_x, pan_y) = zoom_pan_at_pivot(
            pinch.midpoint,
            pinch.start_zoom,
            new_zoom,
            pinch.start_pan_x,
            pinch.start_pan_y,
        );
        let changed = new_zoom != viewport.zoom || pan_x != viewport.pan_x || pan_y != viewport.pan_y;
        viewport.zoom = new_zoom;
        viewport.pan_x = pan_x;
        viewport.pan_y = pan_y;
        changed
    }
}
