//! Infinite-mode location selection.
//!
//! Every known location carries a staleness weight. A pick shortlists the
//! three stalest candidates and chooses one of them uniformly; the chosen
//! location drops to 0 and every other location ages by 1. With `N`
//! candidates a location therefore cannot come back for at least
//! `(N - 1) / 3` rounds, while the final random draw keeps the order from
//! becoming a fixed cycle.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Location;
use crate::storage::{load_json, save_json, KeyValueStore, WEIGHTS_KEY};

/// How many of the stalest candidates are eligible for a pick.
pub const SHORTLIST_LEN: usize = 3;

/// Weight given to a location the selector has not seen before.
const SEED_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionWeights(BTreeMap<String, u32>);

impl SelectionWeights {
    /// Weight 1 for every candidate.
    pub fn seeded(candidates: &[Location]) -> Self {
        Self(
            candidates
                .iter()
                .map(|loc| (loc.id.clone(), SEED_WEIGHT))
                .collect(),
        )
    }

    pub fn get(&self, id: &str) -> Option<u32> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Seed newly added candidates and forget ids that are no longer offered.
    pub fn reconcile(&mut self, candidates: &[Location]) {
        self.0
            .retain(|id, _| candidates.iter().any(|loc| &loc.id == id));
        for loc in candidates {
            self.0.entry(loc.id.clone()).or_insert(SEED_WEIGHT);
        }
    }
}

/// Ascending id order: numeric ids by value and ahead of any other id,
/// which compare as text.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// The stalest candidates, highest weight first, ties by ascending id.
/// Candidates without a recorded weight count as freshly seeded.
pub fn shortlist<'a>(candidates: &'a [Location], weights: &SelectionWeights) -> Vec<&'a Location> {
    let mut ranked: Vec<(&Location, u32)> = candidates
        .iter()
        .map(|loc| (loc, weights.get(&loc.id).unwrap_or(SEED_WEIGHT)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| compare_ids(&a.0.id, &b.0.id)));
    ranked
        .into_iter()
        .take(SHORTLIST_LEN)
        .map(|(loc, _)| loc)
        .collect()
}

/// Pick uniformly among the shortlist. `None` only when there are no candidates.
pub fn select_next<'a, R: Rng + ?Sized>(
    candidates: &'a [Location],
    weights: &SelectionWeights,
    rng: &mut R,
) -> Option<&'a Location> {
    let shortlist = shortlist(candidates, weights);
    if shortlist.is_empty() {
        return None;
    }
    Some(shortlist[rng.gen_range(0..shortlist.len())])
}

/// Reset the selected location to 0 and age every other location by 1.
pub fn update_weights(selected_id: &str, weights: &mut SelectionWeights) {
    for (id, weight) in weights.0.iter_mut() {
        if id != selected_id {
            *weight = weight.saturating_add(1);
        }
    }
    weights.0.insert(selected_id.to_string(), 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// No usable weights recorded yet.
    Uninitialized,
    Active,
}

/// Owns the selection weights and their persistence.
#[derive(Debug, Clone, Default)]
pub struct LocationSelector {
    weights: Option<SelectionWeights>,
}

impl LocationSelector {
    /// Restore weights from `store`. Missing, empty or corrupt weights leave
    /// the selector uninitialized.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let weights = load_json::<SelectionWeights, _>(store, WEIGHTS_KEY).filter(|w| !w.is_empty());
        Self { weights }
    }

    pub fn state(&self) -> SelectorState {
        match self.weights {
            Some(_) => SelectorState::Active,
            None => SelectorState::Uninitialized,
        }
    }

    /// Choose the next location and age the weights.
    pub fn pick<'a, R: Rng + ?Sized>(
        &mut self,
        candidates: &'a [Location],
        rng: &mut R,
    ) -> Option<&'a Location> {
        if candidates.is_empty() {
            return None;
        }
        let weights = self
            .weights
            .get_or_insert_with(|| SelectionWeights::seeded(candidates));
        weights.reconcile(candidates);

        let chosen = select_next(candidates, weights, rng)?;
        update_weights(&chosen.id, weights);
        tracing::debug!(id = %chosen.id, known = weights.len(), "Selected next location");
        Some(chosen)
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), String> {
        match &self.weights {
            Some(weights) => save_json(store, WEIGHTS_KEY, weights),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn locations(n: usize) -> Vec<Location> {
        (0..n)
            .map(|i| Location {
                id: format!("loc-{i:02}"),
                lat: i as f64,
                lon: -(i as f64),
                image_set_ref: format!("set-{i}"),
                date: None,
            })
            .collect()
    }

    #[test]
    fn test_seeded_weights_are_one() {
        let w = SelectionWeights::seeded(&locations(4));
        assert_eq!(w.len(), 4);
        assert_eq!(w.get("loc-02"), Some(1));
    }

    #[test]
    fn test_update_weights_resets_selected_and_ages_others() {
        let mut w = SelectionWeights::seeded(&locations(3));
        update_weights("loc-01", &mut w);
        assert_eq!(w.get("loc-00"), Some(2));
        assert_eq!(w.get("loc-01"), Some(0));
        assert_eq!(w.get("loc-02"), Some(2));
    }

    #[test]
    fn test_shortlist_prefers_stalest() {
        let locs = locations(5);
        let mut w = SelectionWeights::seeded(&locs);
        update_weights("loc-00", &mut w);
        update_weights("loc-01", &mut w);
        update_weights("loc-02", &mut w);
        let ids: Vec<&str> = shortlist(&locs, &w).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["loc-03", "loc-04", "loc-00"]);
    }

    #[test]
    fn test_shortlist_ties_ignore_response_order() {
        let locs: Vec<Location> = ["d", "c", "b", "a"]
            .iter()
            .map(|id| Location {
                id: id.to_string(),
                lat: 0.0,
                lon: 0.0,
                image_set_ref: id.to_string(),
                date: None,
            })
            .collect();
        let w = SelectionWeights::seeded(&locs);
        let ids: Vec<&str> = shortlist(&locs, &w).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_shortlist_ties_compare_numeric_ids_by_value() {
        let locs: Vec<Location> = ["12", "x", "9", "100", "10"]
            .iter()
            .map(|id| Location {
                id: id.to_string(),
                lat: 0.0,
                lon: 0.0,
                image_set_ref: id.to_string(),
                date: None,
            })
            .collect();
        let ids: Vec<&str> = shortlist(&locs, &SelectionWeights::default())
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["9", "10", "12"]);
    }

    #[test]
    fn test_shortlist_smaller_pool() {
        let locs = locations(2);
        let w = SelectionWeights::default();
        assert_eq!(shortlist(&locs, &w).len(), 2);
    }

    #[test]
    fn test_select_next_empty_candidates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(select_next(&[], &SelectionWeights::default(), &mut rng).is_none());
    }

    #[test]
    fn test_select_next_only_from_shortlist() {
        let locs = locations(6);
        let mut w = SelectionWeights::seeded(&locs);
        for id in ["loc-00", "loc-01", "loc-02"] {
            update_weights(id, &mut w);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let pick = select_next(&locs, &w, &mut rng).unwrap();
            assert!(["loc-03", "loc-04", "loc-05"].contains(&pick.id.as_str()));
        }
    }

    #[test]
    fn test_selector_starts_uninitialized_and_activates() {
        let store = MemoryStore::new();
        let mut sel = LocationSelector::load(&store);
        assert_eq!(sel.state(), SelectorState::Uninitialized);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let locs = locations(4);
        assert!(sel.pick(&locs, &mut rng).is_some());
        assert_eq!(sel.state(), SelectorState::Active);
    }

    #[test]
    fn test_selector_with_no_candidates_stays_uninitialized() {
        let mut sel = LocationSelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(sel.pick(&[], &mut rng).is_none());
        assert_eq!(sel.state(), SelectorState::Uninitialized);
    }

    #[test]
    fn test_selector_persists_weights() {
        let locs = locations(5);
        let mut store = MemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let mut sel = LocationSelector::load(&store);
        let first = sel.pick(&locs, &mut rng).unwrap().id.clone();
        sel.save(&mut store).unwrap();

        let raw = store.get(WEIGHTS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[first.as_str()], 0);

        let restored = LocationSelector::load(&store);
        assert_eq!(restored.state(), SelectorState::Active);
        assert_eq!(restored.weights, sel.weights);
    }

    #[test]
    fn test_corrupt_weights_are_uninitialized() {
        let mut store = MemoryStore::new();
        store.set(WEIGHTS_KEY, "[1, 2, oops").unwrap();
        assert_eq!(LocationSelector::load(&store).state(), SelectorState::Uninitialized);

        store.set(WEIGHTS_KEY, r#"{"loc-00": -4}"#).unwrap();
        assert_eq!(LocationSelector::load(&store).state(), SelectorState::Uninitialized);

        store.set(WEIGHTS_KEY, "{}").unwrap();
        assert_eq!(LocationSelector::load(&store).state(), SelectorState::Uninitialized);
    }

    #[test]
    fn test_reconcile_seeds_new_and_drops_stale() {
        let mut locs = locations(3);
        let mut sel = LocationSelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        sel.pick(&locs, &mut rng);

        locs.remove(0);
        locs.push(Location {
            id: "fresh".to_string(),
            lat: 0.0,
            lon: 0.0,
            image_set_ref: "fresh".to_string(),
            date: None,
        });
        let picked = sel.pick(&locs, &mut rng).unwrap().id.clone();
        let weights = sel.weights.as_ref().unwrap();
        assert!(weights.get("loc-00").is_none());
        assert!(weights.get("fresh").is_some());
        assert!(locs.iter().any(|l| l.id == picked));
    }

    #[test]
    fn test_single_candidate_repeats() {
        let locs = locations(1);
        let mut sel = LocationSelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..5 {
            assert_eq!(sel.pick(&locs, &mut rng).unwrap().id, "loc-00");
        }
    }

    #[test]
    fn test_no_early_repeat_simulation() {
        for n in 4..=12 {
            let locs = locations(n);
            let min_gap = (n - 1) / 3;
            for seed in 0..100u64 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut sel = LocationSelector::default();
                let mut last_seen: BTreeMap<String, usize> = BTreeMap::new();
                for round in 0..200 {
                    let id = sel.pick(&locs, &mut rng).unwrap().id.clone();
                    if let Some(prev) = last_seen.insert(id.clone(), round) {
                        let between = round - prev - 1;
                        assert!(
                            between >= min_gap,
                            "n={n} seed={seed}: {id} repeated after {between} rounds"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_location_gets_played() {
        let locs = locations(9);
        let mut sel = LocationSelector::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..60 {
            seen.insert(sel.pick(&locs, &mut rng).unwrap().id.clone());
        }
        assert_eq!(seen.len(), 9);
    }
}
