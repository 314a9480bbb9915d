use std::path::PathBuf;

use coastle_engine::models::{ImageSize, WidgetRect};
use coastle_engine::projection::{Calibration, Projector};

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_TILE_BASE_URL: &str =
    "https://jddbikgujwntbkabchjw.supabase.co/storage/v1/object/public/map-images";
const DEFAULT_STATE_PATH: &str = "data/state.redb";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Daily,
    Infinite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Api(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: Mode,
    pub source: LocationSource,
    pub tile_base_url: String,
    pub state_path: PathBuf,
    pub calibration_file: Option<PathBuf>,
    pub image: ImageSize,
    pub widget: WidgetRect,
    pub prefetch: bool,
}

fn parse_f64(name: &str, raw: Option<String>, default: f64) -> Result<f64, String> {
    match raw {
        None => Ok(default),
        Some(s) => {
            let v: f64 = s
                .trim()
                .parse()
                .map_err(|e| format!("{name}={s:?} is not a number: {e}"))?;
            if v.is_finite() && v > 0.0 {
                Ok(v)
            } else {
                Err(format!("{name} must be positive, got {v}"))
            }
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("COASTLE_MODE").as_deref().map(str::trim) {
            None | Some("") | Some("infinite") => Mode::Infinite,
            Some("daily") => Mode::Daily,
            Some(other) => return Err(format!("Unknown COASTLE_MODE: {other}")),
        };

        let source = match lookup("LOCATIONS_FILE").filter(|s| !s.is_empty()) {
            Some(path) => LocationSource::File(PathBuf::from(path)),
            None => LocationSource::Api(
                lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ),
        };

        let image = ImageSize {
            width: parse_f64("MAP_WIDTH_PX", lookup("MAP_WIDTH_PX"), ImageSize::REFERENCE.width)?,
            height: parse_f64("MAP_HEIGHT_PX", lookup("MAP_HEIGHT_PX"), ImageSize::REFERENCE.height)?,
        };
        let widget = WidgetRect {
            width: parse_f64("WIDGET_WIDTH", lookup("WIDGET_WIDTH"), 300.0)?,
            height: parse_f64("WIDGET_HEIGHT", lookup("WIDGET_HEIGHT"), 225.0)?,
        };

        Ok(Config {
            mode,
            source,
            tile_base_url: lookup("TILE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TILE_BASE_URL.to_string()),
            state_path: PathBuf::from(
                lookup("STATE_PATH").unwrap_or_else(|| DEFAULT_STATE_PATH.to_string()),
            ),
            calibration_file: lookup("CALIBRATION_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            image,
            widget,
            prefetch: lookup("PREFETCH").as_deref() != Some("0"),
        })
    }

    /// Calibration from `CALIBRATION_FILE`, or the built-in fit.
    pub fn projector(&self) -> Result<Projector, String> {
        let calibration = match &self.calibration_file {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
                serde_json::from_str::<Calibration>(&data)
                    .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?
            }
            None => Calibration::REFERENCE,
        };
        Ok(Projector::new(calibration, self.image))
    }
}
