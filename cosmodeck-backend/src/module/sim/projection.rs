///! Latitude/longitude to map pixel projection (equirectangular)
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub x: f64,
    pub y: f64,
}

/// Pixel position of (`latitude`, `longitude`) on a `width` x `height`
/// world map whose left edge is 180°W and top edge 90°N.
///
/// Latitude is clamped to ±90°, longitude wrapped into [-180°, 180°).
pub fn project(latitude: f64, longitude: f64, width: f64, height: f64) -> MapPoint {
    let lat = latitude.clamp(-90.0, 90.0);
    let lon = (longitude + 180.0).rem_euclid(360.0) - 180.0;

    MapPoint {
        x: (lon + 180.0) / 360.0 * width,
        y: (90.0 - lat) / 180.0 * height,
    }
}
