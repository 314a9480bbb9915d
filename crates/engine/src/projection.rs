//! Reference world map projection.
//!
//! The reference image is close to, but not exactly, Web Mercator. Longitude is
//! linear in x; latitude passes through an affine correction before the
//! inverse Mercator relation. The constants are curve fits against landmark
//! pixels and have to be refitted whenever the reference image changes.
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::models::{GeoCoordinate, ImagePixel, ImageSize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub lon_shift: f64,
    pub lat_scale: f64,
    pub lat_bias: f64,
}

impl Calibration {
    /// Fit used by the live game for the current reference image.
    pub const REFERENCE: Calibration = Calibration {
        offset_x: -12.0,
        offset_y: 5.0,
        scale_x: 0.93,
        lon_shift: 198.0,
        lat_scale: 0.715,
        lat_bias: 0.03,
    };
}

impl Default for Calibration {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Project a natural-resolution pixel to latitude/longitude.
///
/// Pixels outside the image still produce a value (possibly out of range);
/// use [`GeoCoordinate::clamped`] when a valid coordinate is required.
pub fn to_geo_coordinate(
    pixel: ImagePixel,
    image_width: f64,
    image_height: f64,
    cal: &Calibration,
) -> GeoCoordinate {
    let lon = (pixel.x - cal.offset_x) / (image_width * cal.scale_x) * 360.0 - cal.lon_shift;

    let y_norm = (pixel.y - cal.offset_y) / image_height;
    let y_norm = cal.lat_scale * y_norm + cal.lat_bias;
    let merc_n = PI * (1.0 - 2.0 * y_norm);
    let lat = (180.0 / PI) * merc_n.sinh().atan();

    GeoCoordinate { lat, lon }
}

/// A calibration bound to the natural size of the image it was fitted for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projector {
    pub calibration: Calibration,
    pub image: ImageSize,
}

impl Default for Projector {
    fn default() -> Self {
        Self {
            calibration: Calibration::REFERENCE,
            image: ImageSize::REFERENCE,
        }
    }
}

impl Projector {
    pub fn new(calibration: Calibration, image: ImageSize) -> Self {
        Self { calibration, image }
    }

    pub fn project(&self, pixel: ImagePixel) -> GeoCoordinate {
        to_geo_coordinate(pixel, self.image.width, self.image.height, &self.calibration)
    }
}
