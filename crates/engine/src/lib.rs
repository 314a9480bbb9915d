//! Guess resolution for the Coastle geography game.
//!
//! Everything here is synchronous and free of I/O: pointer input on the
//! minimap becomes a reference-image pixel, the pixel becomes a coordinate,
//! the coordinate is measured against the ground truth and scored. Persisted
//! state goes through the injected [`storage::KeyValueStore`].

pub mod calc;
pub mod game;
pub mod gesture;
pub mod models;
pub mod projection;
pub mod round;
pub mod selection;
pub mod storage;
pub mod tiles;
pub mod viewport;
