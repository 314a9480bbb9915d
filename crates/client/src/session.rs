use coastle_engine::game::InfiniteGame;
use coastle_engine::gesture::GestureOutcome;
use coastle_engine::models::{Location, RoundResult, WidgetRect};
use coastle_engine::projection::Projector;
use coastle_engine::round::Round;
use coastle_engine::storage::KeyValueStore;
use rand::Rng;

use crate::commands::{Command, HELP};

pub enum Game<S: KeyValueStore, R: Rng> {
    Daily(Round),
    Infinite(InfiniteGame<S, R>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quiet,
    /// The caller should fetch locations again.
    Reload,
    Quit,
}

/// Terminal front end over one game mode. Renders engine state as text.
pub struct Session<S: KeyValueStore, R: Rng> {
    game: Game<S, R>,
    projector: Projector,
    tile_base_url: String,
}

impl<S: KeyValueStore, R: Rng> Session<S, R> {
    pub fn daily(widget: WidgetRect, projector: Projector, tile_base_url: String) -> Self {
        Self {
            game: Game::Daily(Round::new(widget)),
            projector,
            tile_base_url,
        }
    }

    pub fn infinite(
        store: S,
        rng: R,
        widget: WidgetRect,
        projector: Projector,
        tile_base_url: String,
    ) -> Self {
        Self {
            game: Game::Infinite(InfiniteGame::new(store, rng, widget)),
            projector,
            tile_base_url,
        }
    }

    /// Hand freshly fetched locations to the game. Daily mode takes the first
    /// record; infinite mode uses all of them as candidates.
    pub fn load_locations(&mut self, locations: Vec<Location>) -> Result<(), String> {
        match &mut self.game {
            Game::Daily(round) => {
                let location = locations
                    .into_iter()
                    .next()
                    .ok_or_else(|| "No location of the day".to_string())?;
                round.load(location);
            }
            Game::Infinite(game) => {
                if game.set_candidates(locations).is_none() {
                    return Err("No locations available".to_string());
                }
            }
        }
        Ok(())
    }

    pub fn round(&self) -> &Round {
        match &self.game {
            Game::Daily(round) => round,
            Game::Infinite(game) => game.round(),
        }
    }

    fn round_mut(&mut self) -> &mut Round {
        match &mut self.game {
            Game::Daily(round) => round,
            Game::Infinite(game) => game.round_mut(),
        }
    }

    pub fn tile_url(&self) -> Option<String> {
        self.round().tile_url(&self.tile_base_url)
    }

    pub fn prefetch_url(&self) -> Option<String> {
        self.round().prefetch_url(&self.tile_base_url)
    }

    pub fn apply(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Click(p) => {
                let round = self.round_mut();
                round.pointer_down(p);
                let outcome = round.pointer_up();
                self.describe_gesture(outcome)
            }
            Command::Down(p) => {
                self.round_mut().pointer_down(p);
                Reply::Quiet
            }
            Command::Move(p) => {
                if self.round_mut().pointer_move(p) {
                    Reply::Text(self.viewport_line())
                } else {
                    Reply::Quiet
                }
            }
            Command::Up => {
                let outcome = self.round_mut().pointer_up();
                self.describe_gesture(outcome)
            }
            Command::Leave => {
                self.round_mut().pointer_leave();
                Reply::Quiet
            }
            Command::Pinch(a, b) => {
                self.round_mut().pinch_start(a, b);
                Reply::Quiet
            }
            Command::PinchMove(a, b) => {
                self.round_mut().pinch_move(a, b);
                Reply::Text(self.viewport_line())
            }
            Command::Wheel(p, delta_y) => {
                self.round_mut().wheel(p, delta_y);
                Reply::Text(self.viewport_line())
            }
            Command::ZoomIn => {
                self.round_mut().zoom_in();
                Reply::Text(self.viewport_line())
            }
            Command::ZoomOut => {
                self.round_mut().zoom_out();
                Reply::Text(self.viewport_line())
            }
            Command::Pan(key) => {
                self.round_mut().pan_key(key);
                Reply::Text(self.viewport_line())
            }
            Command::Recenter => {
                self.round_mut().recenter();
                Reply::Text(self.viewport_line())
            }
            Command::Resize(width, height) => {
                if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
                    return Reply::Text("Widget size must be positive".to_string());
                }
                self.round_mut().set_widget(WidgetRect { width, height });
                Reply::Text(format!("Widget is now {width}x{height}"))
            }
            Command::Hint => self.hint(),
            Command::Guess => self.guess(),
            Command::Next => self.next(),
            Command::Reload => Reply::Reload,
            Command::Status => Reply::Text(self.status()),
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    fn describe_gesture(&self, outcome: GestureOutcome) -> Reply {
        match outcome {
            GestureOutcome::Click(_) if self.round().has_guessed() => {
                Reply::Text("Round is over; the pin stays put".to_string())
            }
            GestureOutcome::Click(_) => match self.round().pin() {
                Some(pin) => Reply::Text(format!(
                    "Pin at map pixel ({:.1}, {:.1})",
                    pin.pixel.x, pin.pixel.y
                )),
                None => Reply::Quiet,
            },
            GestureOutcome::Drag => Reply::Text(self.viewport_line()),
            GestureOutcome::Ignored => Reply::Quiet,
        }
    }

    fn hint(&mut self) -> Reply {
        if !self.round().is_loaded() {
            return Reply::Text("Location is still loading".to_string());
        }
        if !self.round_mut().reveal_next_hint() {
            return Reply::Text("No more hints this round".to_string());
        }
        Reply::Text(self.tile_line())
    }

    fn guess(&mut self) -> Reply {
        let outcome = match &mut self.game {
            Game::Daily(round) => round.submit_guess(&self.projector),
            Game::Infinite(game) => game.submit_guess(&self.projector),
        };
        match outcome {
            Ok(result) => Reply::Text(self.result_lines(&result)),
            Err(rejection) => Reply::Text(rejection.to_string()),
        }
    }

    fn next(&mut self) -> Reply {
        let picked = match &mut self.game {
            Game::Daily(_) => {
                return Reply::Text("Daily mode has one location; come back tomorrow".to_string())
            }
            Game::Infinite(game) => game.next_location(),
        };
        match picked {
            Some(_) => Reply::Text(self.tile_line()),
            None => Reply::Text("No locations available".to_string()),
        }
    }

    fn tile_line(&self) -> String {
        match self.tile_url() {
            Some(url) => format!("Turn {}: {}", self.round().turn(), url),
            None => "Location is still loading".to_string(),
        }
    }

    fn viewport_line(&self) -> String {
        let vp = self.round().viewport();
        format!("zoom {:.2} pan ({:.1}, {:.1})", vp.zoom, vp.pan_x, vp.pan_y)
    }

    fn result_lines(&self, result: &RoundResult) -> String {
        let mut lines = vec![
            format!(
                "You were {:.1} miles away ({} rings) on turn {}",
                result.distance_miles, result.distance_rings, result.turn
            ),
            format!(
                "Score: {} - {} = {}",
                result.base_points, result.penalty, result.final_score
            ),
            format!(
                "Your guess: {:.4}, {:.4}  Answer: {:.4}, {:.4}",
                result.guess.lat, result.guess.lon, result.actual.lat, result.actual.lon
            ),
        ];
        if result.within_range {
            lines.push("Within 200 miles!".to_string());
        }
        if let Some(url) = self.tile_url() {
            lines.push(format!("Reveal: {url}"));
        }
        if let Game::Infinite(game) = &self.game {
            let totals = game.totals();
            lines.push(format!(
                "Total: {} over {} locations",
                totals.total_score, totals.locations_played
            ));
        }
        lines.join("\n")
    }

    pub fn status(&self) -> String {
        let round = self.round();
        let mut lines = vec![self.tile_line(), self.viewport_line()];
        match round.pin_screen_position() {
            Some(p) => lines.push(format!("Pin on screen at ({:.1}, {:.1})", p.x, p.y)),
            None => lines.push("No pin placed".to_string()),
        }
        if round.gesture_in_progress() {
            lines.push("Pointer is down; `release` or `leave` to finish".to_string());
        }
        if let Some(result) = round.result() {
            lines.push(format!("Guessed: {} points", result.final_score));
        }
        if let Game::Infinite(game) = &self.game {
            let totals = game.totals();
            lines.push(format!(
                "{} candidates, total {} over {} locations",
                game.candidate_count(),
                totals.total_score,
                totals.locations_played
            ));
        }
        lines.join("\n")
    }
}
