//! Satellite tile levels and the tile store's URL convention.
//!
//! Each location has one pre-rendered image per level. A round starts at the
//! closest level and every hint zooms out by one, down to the last hint
//! level. The reveal level is only shown after the guess.

/// Level shown on turn 1.
pub const INITIAL_LEVEL: u8 = 10;
/// Widest hint; no further zoom-out before the guess.
pub const LAST_HINT_LEVEL: u8 = 7;
pub const REVEAL_LEVEL: u8 = 3;

pub fn is_valid_level(level: u8) -> bool {
    (REVEAL_LEVEL..=INITIAL_LEVEL).contains(&level)
}

/// 1 for the first look, +1 per hint taken.
pub fn turn_for_level(level: u8) -> u8 {
    1 + INITIAL_LEVEL.saturating_sub(level)
}

/// `{base}/{image_set_ref}/zoom_{level}.png`
pub fn tile_url(base: &str, image_set_ref: &str, level: u8) -> String {
    format!(
        "{}/{}/zoom_{}.png",
        base.trim_end_matches('/'),
        image_set_ref.trim_matches('/'),
        level
    )
}

/// The level worth fetching ahead of time while `level` is on screen: the
/// next hint while hints remain, otherwise the reveal.
pub fn prefetch_level(level: u8) -> Option<u8> {
    if !is_valid_level(level) {
        return None;
    }
    if level > LAST_HINT_LEVEL {
        Some(level - 1)
    } else if level == LAST_HINT_LEVEL {
        Some(REVEAL_LEVEL)
    } else {
        None
    }
}
