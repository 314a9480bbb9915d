use rand::Rng;

use crate::models::{Location, PublicLocation, RoundResult, WidgetRect};
use crate::projection::Projector;
use crate::round::{Round, SubmitRejection};
use crate::selection::LocationSelector;
use crate::storage::{KeyValueStore, RunningTotals};

/// Infinite mode: an endless sequence of rounds over every known location,
/// with running totals and selection weights kept in `store`.
pub struct InfiniteGame<S: KeyValueStore, R: Rng> {
    candidates: Vec<Location>,
    selector: LocationSelector,
    totals: RunningTotals,
    store: S,
    rng: R,
    round: Round,
}

impl<S: KeyValueStore, R: Rng> InfiniteGame<S, R> {
    /// Restore persisted state. The first round stays unloaded until
    /// [`InfiniteGame::set_candidates`] delivers the locations.
    pub fn new(store: S, rng: R, widget: WidgetRect) -> Self {
        let selector = LocationSelector::load(&store);
        let totals = RunningTotals::load(&store);
        tracing::debug!(
            state = ?selector.state(),
            total_score = totals.total_score,
            locations_played = totals.locations_played,
            "Restored infinite-mode state"
        );
        Self {
            candidates: Vec::new(),
            selector,
            totals,
            store,
            rng,
            round: Round::new(widget),
        }
    }

    /// Replace the candidate pool and start a round on a fresh pick.
    pub fn set_candidates(&mut self, candidates: Vec<Location>) -> Option<PublicLocation> {
        self.candidates = candidates;
        self.next_location()
    }

    /// Pick the next location and reset the round. Returns `None` when there
    /// are no candidates.
    pub fn next_location(&mut self) -> Option<PublicLocation> {
        let chosen = self.selector.pick(&self.candidates, &mut self.rng)?.clone();
        if let Err(e) = self.selector.save(&mut self.store) {
            tracing::warn!(error = %e, "Failed to persist selection weights");
        }
        let public = chosen.public();
        self.round.load(chosen);
        Some(public)
    }

    /// Score the current round and add it to the running totals.
    pub fn submit_guess(&mut self, projector: &Projector) -> Result<RoundResult, SubmitRejection> {
        let result = self.round.submit_guess(projector)?;
        self.totals.record(&result);
        if let Err(e) = self.totals.save(&mut self.store) {
            tracing::warn!(error = %e, "Failed to persist running totals");
        }
        Ok(result)
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn round_mut(&mut self) -> &mut Round {
        &mut self.round
    }

    pub fn totals(&self) -> RunningTotals {
        self.totals
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
