use std::fmt;

use crate::calc;
use crate::gesture::{GestureOutcome, PointerGesture};
use crate::models::{GeoCoordinate, ImagePixel, Location, PublicLocation, RoundResult, ScreenPoint, WidgetRect};
use crate::projection::Projector;
use crate::tiles;
use crate::viewport::{self, PanKey, ViewportState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// The ground truth has not arrived yet; nothing happens.
    NotLoaded,
    /// No pin has been placed on the map.
    NoPin,
    AlreadyGuessed,
}

impl fmt::Display for SubmitRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitRejection::NotLoaded => write!(f, "Location is still loading"),
            SubmitRejection::NoPin => write!(f, "Please place a marker on the map first"),
            SubmitRejection::AlreadyGuessed => write!(f, "This location has already been guessed"),
        }
    }
}

/// The guess pin, in image layout pixels, together with the widget size it
/// was placed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pin {
    pub pixel: ImagePixel,
    pub widget: WidgetRect,
}

/// One location's worth of play: satellite hints, the minimap and the guess.
#[derive(Debug, Clone)]
pub struct Round {
    location: Option<Location>,
    level: u8,
    viewport: ViewportState,
    gesture: PointerGesture,
    widget: WidgetRect,
    pin: Option<Pin>,
    result: Option<RoundResult>,
}

impl Round {
    /// A round waiting for its location.
    pub fn new(widget: WidgetRect) -> Self {
        Self {
            location: None,
            level: tiles::INITIAL_LEVEL,
            viewport: ViewportState::default(),
            gesture: PointerGesture::default(),
            widget,
            pin: None,
            result: None,
        }
    }

    pub fn with_location(location: Location, widget: WidgetRect) -> Self {
        let mut round = Self::new(widget);
        round.load(location);
        round
    }

    /// Start over with `location` as the ground truth.
    pub fn load(&mut self, location: Location) {
        self.reset();
        self.location = Some(location);
    }

    pub fn reset(&mut self) {
        self.level = tiles::INITIAL_LEVEL;
        self.viewport.reset();
        self.gesture.cancel();
        self.pin = None;
        self.result = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.location.is_some()
    }

    pub fn location(&self) -> Option<PublicLocation> {
        self.location.as_ref().map(Location::public)
    }

    /// Ground-truth coordinates, only once a guess has been scored.
    pub fn actual(&self) -> Option<GeoCoordinate> {
        self.result.map(|r| r.actual)
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Turn the guess would be scored on if submitted now.
    pub fn turn(&self) -> u8 {
        tiles::turn_for_level(self.level)
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn widget(&self) -> WidgetRect {
        self.widget
    }

    pub fn pin(&self) -> Option<Pin> {
        self.pin
    }

    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub fn has_guessed(&self) -> bool {
        self.result.is_some()
    }

    pub fn can_reveal_hint(&self) -> bool {
        !self.has_guessed() && self.level > tiles::LAST_HINT_LEVEL
    }

    /// Zoom the satellite image out by one level. No-op once hints run out.
    pub fn reveal_next_hint(&mut self) -> bool {
        if !self.can_reveal_hint() {
            return false;
        }
        self.level -= 1;
        debug_assert!(tiles::is_valid_level(self.level));
        true
    }

    pub fn tile_url(&self, base: &str) -> Option<String> {
        let loc = self.location.as_ref()?;
        Some(tiles::tile_url(base, &loc.image_set_ref, self.level))
    }

    /// Tile to fetch in the background while the current level is shown.
    pub fn prefetch_url(&self, base: &str) -> Option<String> {
        if self.has_guessed() {
            return None;
        }
        let loc = self.location.as_ref()?;
        let level = tiles::prefetch_level(self.level)?;
        Some(tiles::tile_url(base, &loc.image_set_ref, level))
    }

    pub fn set_widget(&mut self, widget: WidgetRect) {
        self.widget = widget;
    }

    // --- Minimap input ---

    pub fn pointer_down(&mut self, point: ScreenPoint) {
        self.gesture.press(point, &self.viewport);
    }

    pub fn pointer_move(&mut self, point: ScreenPoint) -> bool {
        self.gesture.move_to(point, &mut self.viewport)
    }

    /// Finish a gesture; a click places the pin.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        let outcome = self.gesture.release();
        if let GestureOutcome::Click(point) = outcome {
            self.place_pin(point);
        }
        outcome
    }

    /// A press or pinch is currently being tracked.
    pub fn gesture_in_progress(&self) -> bool {
        self.gesture.is_pressed() || self.gesture.is_pinching()
    }

    pub fn pointer_leave(&mut self) {
        self.gesture.cancel();
    }

    pub fn pinch_start(&mut self, a: ScreenPoint, b: ScreenPoint) {
        self.gesture.pinch_start(a, b, &self.viewport);
    }

    pub fn pinch_move(&mut self, a: ScreenPoint, b: ScreenPoint) -> bool {
        self.gesture.pinch_move(a, b, &mut self.viewport)
    }

    pub fn wheel(&mut self, cursor: ScreenPoint, delta_y: f64) -> bool {
        self.viewport.wheel(cursor, delta_y)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in(self.widget)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out(self.widget)
    }

    pub fn pan_key(&mut self, key: PanKey) {
        self.viewport.pan_key(key);
    }

    pub fn recenter(&mut self) {
        self.viewport.reset();
    }

    /// Put the pin under `screen`. Ignored after the guess.
    pub fn place_pin(&mut self, screen: ScreenPoint) -> bool {
        if self.has_guessed() {
            return false;
        }
        self.pin = Some(Pin {
            pixel: self.viewport.to_image_pixel(screen),
            widget: self.widget,
        });
        true
    }

    /// Where to draw the pin with the current widget size and viewport.
    pub fn pin_screen_position(&self) -> Option<ScreenPoint> {
        let pin = self.pin?;
        let scaled = ImagePixel {
            x: pin.pixel.x * self.widget.width / pin.widget.width,
            y: pin.pixel.y * self.widget.height / pin.widget.height,
        };
        Some(self.viewport.to_screen(scaled))
    }

    /// Score the pin against the ground truth and reveal the answer.
    /// Rejections are checked as not loaded, then already guessed, then no pin.
    pub fn submit_guess(&mut self, projector: &Projector) -> Result<RoundResult, SubmitRejection> {
        let Some(location) = self.location.as_ref() else {
            return Err(SubmitRejection::NotLoaded);
        };
        if self.result.is_some() {
            return Err(SubmitRejection::AlreadyGuessed);
        }
        let pin = self.pin.ok_or(SubmitRejection::NoPin)?;

        let natural = viewport::to_natural_pixel(pin.pixel, pin.widget, projector.image);
        let guess = projector.project(natural);
        let actual = location.coordinate();
        let distance_miles = calc::distance_miles(guess, actual);
        let turn = self.turn();
        let breakdown = calc::score(turn, distance_miles);

        let result = RoundResult {
            turn,
            distance_miles,
            base_points: breakdown.base_points,
            penalty: breakdown.penalty,
            final_score: breakdown.final_score,
            distance_rings: breakdown.distance_rings,
            within_range: distance_miles <= calc::RING_WIDTH_MILES,
            guess,
            actual,
        };
        tracing::info!(
            id = %location.id,
            turn,
            distance_miles,
            score = result.final_score,
            "Guess scored"
        );

        self.level = tiles::REVEAL_LEVEL;
        self.result = Some(result);
        Ok(result)
    }
}
