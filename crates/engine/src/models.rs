use serde::{Deserialize, Deserializer, Serialize};

/// Pointer position relative to the minimap widget's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Current on-screen size of the minimap widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetRect {
    pub width: f64,
    pub height: f64,
}

impl WidgetRect {
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A coordinate in the untransformed map image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePixel {
    pub x: f64,
    pub y: f64,
}

/// Natural (intrinsic) pixel size of a reference map image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    /// Dimensions the live calibration was fitted against.
    pub const REFERENCE: ImageSize = ImageSize {
        width: 5280.0,
        height: 417.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Clamp latitude to [-90, 90] and wrap longitude into [-180, 180].
    pub fn clamped(&self) -> Self {
        let lat = self.lat.clamp(-90.0, 90.0);
        let mut lon = (self.lon + 180.0).rem_euclid(360.0) - 180.0;
        if lon == -180.0 && self.lon > 0.0 {
            lon = 180.0;
        }
        Self { lat, lon }
    }
}

/// A ground-truth record from the location data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lon: f64,
    #[serde(rename = "storage_path")]
    pub image_set_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Location {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.lat, self.lon)
    }

    /// The fields that are safe to hand to the presentation layer before a guess.
    pub fn public(&self) -> PublicLocation {
        PublicLocation {
            id: self.id.clone(),
            image_set_ref: self.image_set_ref.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(d)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// A location with its coordinates withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicLocation {
    pub id: String,
    pub image_set_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base_points: i64,
    pub penalty: i64,
    pub final_score: u32,
    pub distance_rings: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub turn: u8,
    pub distance_miles: f64,
    pub base_points: i64,
    pub penalty: i64,
    pub final_score: u32,
    pub distance_rings: u32,
    pub within_range: bool,
    pub guess: GeoCoordinate,
    pub actual: GeoCoordinate,
}
