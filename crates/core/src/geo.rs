//! Map viewport fitting for located alerts.
//!
//! [`fit_bounds`] computes the Web Mercator viewport (center + zoom)
//! that shows every located alert, with a fixed degree margin around
//! the bounding box and a pixel padding inset between box edge and
//! viewport edge. Alerts without a location are simply excluded; if no
//! alert is located the caller's current viewport is returned
//! unchanged, never a degenerate box.

use serde::{Deserialize, Serialize};

use crate::alert::Alert;

/// World tile size in pixels at zoom 0 (Web Mercator, 512px tiles).
const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051129;

/// Fixed margin, in degrees, added around the bounding box before
/// projection.
pub const BOUNDS_MARGIN_DEG: f64 = 0.1;

/// Default pixel inset between the padded box and the viewport edge.
pub const DEFAULT_PADDING_PX: u32 = 40;

/// Upper bound on the computed zoom level.
const MAX_ZOOM: f64 = 20.0;

/// A map camera: center coordinate plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

/// Pixel dimensions of the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// Fit the viewport to every located alert.
///
/// The zoom is the largest level at which the margin-expanded bounding
/// box still fits inside `size` minus `padding_px` on each edge -- the
/// box is never clipped. Returns `current` unchanged when no alert has
/// a location or the padding leaves no drawable area.
pub fn fit_bounds(
    alerts: &[Alert],
    current: &Viewport,
    size: ViewportSize,
    padding_px: u32,
) -> Viewport {
    let located: Vec<_> = alerts.iter().filter_map(|a| a.location).collect();
    if located.is_empty() {
        return *current;
    }

    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    for loc in &located {
        min_lat = min_lat.min(loc.lat);
        max_lat = max_lat.max(loc.lat);
        min_lng = min_lng.min(loc.lng);
        max_lng = max_lng.max(loc.lng);
    }

    // Expand by the fixed margin, then clamp latitude to the projection
    // range.
    min_lat = (min_lat - BOUNDS_MARGIN_DEG).clamp(-MAX_LATITUDE, MAX_LATITUDE);
    max_lat = (max_lat + BOUNDS_MARGIN_DEG).clamp(-MAX_LATITUDE, MAX_LATITUDE);
    min_lng -= BOUNDS_MARGIN_DEG;
    max_lng += BOUNDS_MARGIN_DEG;

    let avail_w = size.width as f64 - 2.0 * padding_px as f64;
    let avail_h = size.height as f64 - 2.0 * padding_px as f64;
    if avail_w <= 0.0 || avail_h <= 0.0 {
        tracing::warn!(
            width = size.width,
            height = size.height,
            padding_px,
            "Padding leaves no drawable area, keeping current viewport"
        );
        return *current;
    }

    // Box size in world pixels at zoom 0.
    let span_x = (max_lng - min_lng) / 360.0 * TILE_SIZE;
    let span_y =
        (mercator_y(max_lat) - mercator_y(min_lat)) / (2.0 * std::f64::consts::PI) * TILE_SIZE;

    let zoom_x = if span_x > 0.0 {
        (avail_w / span_x).log2()
    } else {
        MAX_ZOOM
    };
    let zoom_y = if span_y > 0.0 {
        (avail_h / span_y).log2()
    } else {
        MAX_ZOOM
    };
    let zoom = zoom_x.min(zoom_y).clamp(0.0, MAX_ZOOM);

    // Center: longitude midpoint, latitude midpoint in mercator space so
    // the box stays vertically centered after projection.
    let longitude = (min_lng + max_lng) / 2.0;
    let mid_y = (mercator_y(min_lat) + mercator_y(max_lat)) / 2.0;
    let latitude = inverse_mercator_y(mid_y);

    Viewport {
        longitude,
        latitude,
        zoom,
    }
}

/// Web Mercator y for a latitude in degrees. Range `(-pi, pi)` over the
/// valid latitude span.
fn mercator_y(lat_deg: f64) -> f64 {
    let lat = lat_deg.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln()
}

/// Inverse of [`mercator_y`], back to degrees.
fn inverse_mercator_y(y: f64) -> f64 {
    (2.0 * y.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertStatus, Location, Severity};
    use chrono::{TimeZone, Utc};

    fn located_alert(id: &str, lat: f64, lng: f64) -> Alert {
        Alert {
            alert_id: id.into(),
            summary: format!("alert {id}"),
            description: None,
            severity: Severity::Intervention,
            status: AlertStatus::Created,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            acknowledged_at: None,
            resolved_at: None,
            categories: vec![],
            location: Some(Location { lat, lng }),
            incident_id: None,
            resolution_notes: None,
        }
    }

    fn unlocated_alert(id: &str) -> Alert {
        let mut alert = located_alert(id, 0.0, 0.0);
        alert.location = None;
        alert
    }

    fn default_viewport() -> Viewport {
        // Metropolitan France, the dashboard's home view.
        Viewport {
            longitude: 2.333333,
            latitude: 48.866667,
            zoom: 5.0,
        }
    }

    const SIZE: ViewportSize = ViewportSize {
        width: 1024,
        height: 600,
    };

    /// Pixel offset of a coordinate from the viewport center at a zoom.
    fn pixel_offset(view: &Viewport, lat: f64, lng: f64) -> (f64, f64) {
        let scale = 2f64.powf(view.zoom) * TILE_SIZE;
        let dx = (lng - view.longitude) / 360.0 * scale;
        let dy = (mercator_y(view.latitude) - mercator_y(lat)) / (2.0 * std::f64::consts::PI)
            * scale;
        (dx, dy)
    }

    #[test]
    fn no_located_alerts_keeps_current_viewport() {
        let current = default_viewport();
        let fitted = fit_bounds(&[unlocated_alert("a")], &current, SIZE, DEFAULT_PADDING_PX);
        assert_eq!(fitted, current);
        let fitted = fit_bounds(&[], &current, SIZE, DEFAULT_PADDING_PX);
        assert_eq!(fitted, current);
    }

    #[test]
    fn unlocated_alerts_are_excluded_not_errors() {
        let alerts = vec![
            located_alert("a", 48.85, 2.35),
            unlocated_alert("b"),
            located_alert("c", 45.76, 4.84),
        ];
        let fitted = fit_bounds(&alerts, &default_viewport(), SIZE, DEFAULT_PADDING_PX);
        // Center must land between Paris and Lyon.
        assert!(fitted.latitude > 45.0 && fitted.latitude < 49.0);
        assert!(fitted.longitude > 2.0 && fitted.longitude < 5.0);
    }

    #[test]
    fn every_coordinate_lands_inside_the_padded_viewport() {
        let alerts = vec![
            located_alert("paris", 48.8566, 2.3522),
            located_alert("lyon", 45.7640, 4.8357),
            located_alert("brest", 48.3904, -4.4861),
            located_alert("nice", 43.7102, 7.2620),
        ];
        let padding = DEFAULT_PADDING_PX;
        let fitted = fit_bounds(&alerts, &default_viewport(), SIZE, padding);

        let half_w = SIZE.width as f64 / 2.0 - padding as f64;
        let half_h = SIZE.height as f64 / 2.0 - padding as f64;
        for alert in &alerts {
            let loc = alert.location.expect("all located");
            let (dx, dy) = pixel_offset(&fitted, loc.lat, loc.lng);
            assert!(
                dx.abs() <= half_w + 1e-6 && dy.abs() <= half_h + 1e-6,
                "{} at ({dx:.1}, {dy:.1}) px escapes the padded viewport",
                alert.alert_id
            );
        }
    }

    #[test]
    fn single_point_gets_a_finite_zoom() {
        let alerts = vec![located_alert("only", 48.8566, 2.3522)];
        let fitted = fit_bounds(&alerts, &default_viewport(), SIZE, DEFAULT_PADDING_PX);
        // The margin turns a single point into a 0.2-degree box, so the
        // zoom is finite and well below the clamp.
        assert!(fitted.zoom.is_finite());
        assert!(fitted.zoom < MAX_ZOOM);
        assert!((fitted.longitude - 2.3522).abs() < 1e-9);
    }

    #[test]
    fn excessive_padding_keeps_current_viewport() {
        let current = default_viewport();
        let alerts = vec![located_alert("a", 48.85, 2.35)];
        let fitted = fit_bounds(&alerts, &current, SIZE, 512);
        assert_eq!(fitted, current);
    }

    #[test]
    fn zoom_never_goes_negative_for_world_spanning_bounds() {
        let alerts = vec![
            located_alert("west", 10.0, -179.0),
            located_alert("east", -10.0, 179.0),
        ];
        let fitted = fit_bounds(&alerts, &default_viewport(), SIZE, DEFAULT_PADDING_PX);
        assert!(fitted.zoom >= 0.0);
    }

    #[test]
    fn mercator_roundtrip() {
        for lat in [-80.0, -45.0, 0.0, 30.0, 48.8566, 85.0] {
            let back = inverse_mercator_y(mercator_y(lat));
            assert!((back - lat).abs() < 1e-9, "lat {lat} roundtripped to {back}");
        }
    }
}
