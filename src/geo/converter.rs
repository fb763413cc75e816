//! Pixel <-> geodetic conversion for the CGMS normalized geostationary projection
//!
//! Forward: geodetic latitude is turned into geocentric latitude on the reference
//! ellipsoid, the point is expressed relative to the satellite, and the two scan
//! angles it subtends are mapped to pixels through COFF/CFAC and LOFF/LFAC.
//! Inverse: the scan angles define a line of sight whose nearest intersection with
//! the ellipsoid is converted back to latitude and longitude.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Equatorial radius of the reference ellipsoid in km
pub const EQUATORIAL_RADIUS_KM: f64 = 6378.1690;
/// Polar radius of the reference ellipsoid in km
pub const POLAR_RADIUS_KM: f64 = 6356.5838;
/// Distance from the Earth's center to the satellite in km
pub const SATELLITE_DISTANCE_KM: f64 = 42164.0;

/// Scale factors are expressed per 2^16 degrees of scan angle
const SCALE_NORMALIZATION: f64 = 65536.0;

/// rp² / req²
const POLAR_TO_EQUATORIAL_SQ: f64 =
    (POLAR_RADIUS_KM * POLAR_RADIUS_KM) / (EQUATORIAL_RADIUS_KM * EQUATORIAL_RADIUS_KM);
/// req² / rp²
const EQUATORIAL_TO_POLAR_SQ: f64 =
    (EQUATORIAL_RADIUS_KM * EQUATORIAL_RADIUS_KM) / (POLAR_RADIUS_KM * POLAR_RADIUS_KM);
/// First eccentricity squared
const ECCENTRICITY_SQ: f64 = 1.0 - POLAR_TO_EQUATORIAL_SQ;
/// h² - req²
const LINE_OF_SIGHT_CONSTANT: f64 = SATELLITE_DISTANCE_KM * SATELLITE_DISTANCE_KM
    - EQUATORIAL_RADIUS_KM * EQUATORIAL_RADIUS_KM;

/// Visible disk half-width in degrees, on both axes
const VISIBLE_BOUND_DEG: f64 = 79.0;
/// Edge margin trimmed on reprojection, in degrees
const TRIM_DEG: f64 = 16.0;

/// The scan angles do not intersect the Earth
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("pixel ({x}, {y}) is outside the visible earth disk")]
pub struct OutOfView {
    pub x: f64,
    pub y: f64,
}

/// Scan geometry of one satellite image, from its LRIT/HRIT navigation header.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoParams", into = "GeoParams")]
pub struct GeoReference {
    satellite_longitude: f64,
    coff: i32,
    loff: i32,
    cfac: f64,
    lfac: f64,
    fix_aspect: bool,
    image_width: i32,
    aspect_ratio: f64,
    crop_left: i32,
}

/// Serialized form of a `GeoReference`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoParams {
    pub satellite_longitude: f64,
    pub column_offset: i32,
    pub line_offset: i32,
    pub column_scale_factor: f64,
    pub line_scale_factor: f64,
    #[serde(default)]
    pub fix_aspect: bool,
    #[serde(default)]
    pub image_width: i32,
}

impl From<GeoParams> for GeoReference {
    fn from(p: GeoParams) -> Self {
        GeoReference::new(
            p.satellite_longitude,
            p.column_offset,
            p.line_offset,
            p.column_scale_factor,
            p.line_scale_factor,
            p.fix_aspect,
            p.image_width,
        )
    }
}

impl From<GeoReference> for GeoParams {
    fn from(geo: GeoReference) -> Self {
        Self {
            satellite_longitude: geo.satellite_longitude,
            column_offset: geo.coff,
            line_offset: geo.loff,
            column_scale_factor: geo.cfac,
            line_scale_factor: geo.lfac,
            fix_aspect: geo.fix_aspect,
            image_width: geo.image_width,
        }
    }
}

impl GeoReference {
    pub fn new(
        satellite_longitude: f64,
        coff: i32,
        loff: i32,
        cfac: f64,
        lfac: f64,
        fix_aspect: bool,
        image_width: i32,
    ) -> Self {
        Self {
            satellite_longitude,
            coff,
            loff,
            cfac,
            lfac,
            fix_aspect,
            image_width,
            aspect_ratio: cfac / lfac,
            crop_left: coff - (image_width - coff).min(coff),
        }
    }

    pub fn satellite_longitude(&self) -> f64 {
        self.satellite_longitude
    }

    pub fn column_offset(&self) -> i32 {
        self.coff
    }

    pub fn line_offset(&self) -> i32 {
        self.loff
    }

    pub fn column_scale_factor(&self) -> f64 {
        self.cfac
    }

    pub fn line_scale_factor(&self) -> f64 {
        self.lfac
    }

    pub fn fix_aspect(&self) -> bool {
        self.fix_aspect
    }

    pub fn image_width(&self) -> i32 {
        self.image_width
    }

    /// Columns to drop on the left so the sub-satellite column ends up centered
    pub fn crop_left(&self) -> i32 {
        self.crop_left
    }

    pub fn max_latitude(&self) -> f64 {
        VISIBLE_BOUND_DEG
    }

    pub fn min_latitude(&self) -> f64 {
        -VISIBLE_BOUND_DEG
    }

    pub fn max_longitude(&self) -> f64 {
        self.satellite_longitude + VISIBLE_BOUND_DEG
    }

    pub fn min_longitude(&self) -> f64 {
        self.satellite_longitude - VISIBLE_BOUND_DEG
    }

    pub fn latitude_coverage(&self) -> f64 {
        self.max_latitude() - self.min_latitude()
    }

    pub fn longitude_coverage(&self) -> f64 {
        self.max_longitude() - self.min_longitude()
    }

    pub fn trim_latitude(&self) -> f64 {
        TRIM_DEG
    }

    pub fn trim_longitude(&self) -> f64 {
        TRIM_DEG
    }

    pub fn is_within_visible_disk(&self, lat: f64, lon: f64) -> bool {
        lat.abs() < VISIBLE_BOUND_DEG && (lon - self.satellite_longitude).abs() < VISIBLE_BOUND_DEG
    }

    /// Scan angles in radians for a geodetic point in degrees
    fn scan_angles(&self, lat: f64, lon: f64) -> (f64, f64) {
        let lat = lat.to_radians();
        let dlon = (lon - self.satellite_longitude).to_radians();

        let c_lat = (POLAR_TO_EQUATORIAL_SQ * lat.tan()).atan();
        let cos_c_lat = c_lat.cos();
        let r_l = POLAR_RADIUS_KM / (1.0 - ECCENTRICITY_SQ * cos_c_lat * cos_c_lat).sqrt();

        let r1 = SATELLITE_DISTANCE_KM - r_l * cos_c_lat * dlon.cos();
        let r2 = -r_l * cos_c_lat * dlon.sin();
        let r3 = r_l * c_lat.sin();
        let rn = (r1 * r1 + r2 * r2 + r3 * r3).sqrt();

        ((-r2 / r1).atan(), (-r3 / rn).asin())
    }

    /// Geodetic degrees to fractional pixel coordinates. With `fix_aspect` the
    /// whole line coordinate is stretched by CFAC / LFAC.
    pub fn pixel_from_geodetic_f(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = self.scan_angles(lat, lon);
        let column = self.coff as f64 + x.to_degrees() * self.cfac / SCALE_NORMALIZATION;
        let line = self.loff as f64 + y.to_degrees() * self.lfac / SCALE_NORMALIZATION;
        if self.fix_aspect {
            (column, line * self.aspect_ratio)
        } else {
            (column, line)
        }
    }

    /// Geodetic degrees to the nearest pixel
    pub fn pixel_from_geodetic(&self, lat: f64, lon: f64) -> (i32, i32) {
        let (x, y) = self.pixel_from_geodetic_f(lat, lon);
        (x.round() as i32, y.round() as i32)
    }

    pub fn geodetic_from_pixel(&self, x: i32, y: i32) -> Result<(f64, f64), OutOfView> {
        self.geodetic_from_pixel_f(x as f64, y as f64)
    }

    /// Fractional pixel coordinates to geodetic (latitude, longitude) in degrees
    pub fn geodetic_from_pixel_f(&self, px: f64, py: f64) -> Result<(f64, f64), OutOfView> {
        let line = if self.fix_aspect {
            py / self.aspect_ratio
        } else {
            py
        };
        let line_shift = line - self.loff as f64;
        let x = ((px - self.coff as f64) * SCALE_NORMALIZATION / self.cfac).to_radians();
        let y = (line_shift * SCALE_NORMALIZATION / self.lfac).to_radians();

        let (sin_x, cos_x) = x.sin_cos();
        let (sin_y, cos_y) = y.sin_cos();

        let a = cos_y * cos_y + EQUATORIAL_TO_POLAR_SQ * sin_y * sin_y;
        let b = SATELLITE_DISTANCE_KM * cos_x * cos_y;
        let discriminant = b * b - a * LINE_OF_SIGHT_CONSTANT;
        // b <= 0 means the line of sight points away from the Earth
        if b <= 0.0 || discriminant.is_nan() || discriminant <= 0.0 {
            return Err(OutOfView { x: px, y: py });
        }

        let sn = (b - discriminant.sqrt()) / a;
        if sn <= 0.0 {
            return Err(OutOfView { x: px, y: py });
        }
        let s1 = SATELLITE_DISTANCE_KM - sn * cos_x * cos_y;
        let s2 = sn * sin_x * cos_y;
        let s3 = -sn * sin_y;
        let sxy = s1.hypot(s2);

        let lon = (s2 / s1).atan().to_degrees() + self.satellite_longitude;
        let lat = (EQUATORIAL_TO_POLAR_SQ * s3 / sxy).atan().to_degrees();
        Ok((lat, lon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_constants_match_cgms_values() {
        assert!((POLAR_TO_EQUATORIAL_SQ - 0.993243).abs() < 1e-6);
        assert!((EQUATORIAL_TO_POLAR_SQ - 1.006803).abs() < 1e-6);
        assert!((ECCENTRICITY_SQ - 0.00675701).abs() < 1e-6);
    }

    #[test]
    fn test_serde_roundtrip_recomputes_crop() {
        let json = serde_json::json!({
            "satellite_longitude": -75.0,
            "column_offset": 1924,
            "line_offset": 1200,
            "column_scale_factor": 781648343.0,
            "line_scale_factor": 781648343.0,
            "image_width": 3000
        });
        let geo: GeoReference = serde_json::from_value(json).unwrap();

        assert_eq!(geo.crop_left(), 848);
        assert!(!geo.fix_aspect());
    }
}
