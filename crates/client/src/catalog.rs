use chrono::{NaiveDate, Utc};
use coastle_engine::models::Location;
use std::path::Path;

/// Locations read from a local JSON file instead of the API.
pub struct Catalog {
    pub locations: Vec<Location>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let locations = parse_locations(&data)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

        tracing::info!(locations = locations.len(), path = %path.display(), "Loaded locations");

        Ok(Catalog { locations })
    }

    /// The record scheduled for `key` (`YYYY-MM-DD`).
    pub fn find_daily(&self, key: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|l| l.date.as_deref() == Some(key))
    }
}

pub fn parse_locations(data: &str) -> Result<Vec<Location>, String> {
    serde_json::from_str(data).map_err(|e| e.to_string())
}

pub fn daily_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's key. Days roll over at UTC midnight.
pub fn today_key() -> String {
    daily_key(Utc::now().date_naive())
}
