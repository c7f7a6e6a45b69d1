//! Spherical distance helpers for `$geoWithin: { $centerSphere }`.

use serde_json::Value;

/// Mean earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;
/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Central angle between two `(lng, lat)` points, in radians (haversine).
pub fn central_angle(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lng1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lng2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// `(lng, lat)` of a GeoJSON point or a bare `[lng, lat]` pair.
pub fn point_coordinates(v: &Value) -> Option<(f64, f64)> {
    let coords = match v {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) != Some("Point") {
                return None;
            }
            map.get("coordinates")?
        }
        Value::Array(_) => v,
        _ => return None,
    };
    match coords.as_array()?.as_slice() {
        [lng, lat] => Some((lng.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}

/// Parse `[[lng, lat], radius]` as given to `$centerSphere`.
pub fn parse_center_sphere(v: &Value) -> Option<((f64, f64), f64)> {
    match v.as_array()?.as_slice() {
        [center, radius] => {
            let center = point_coordinates(center)?;
            let radius = radius.as_f64()?;
            (radius >= 0.0).then_some((center, radius))
        }
        _ => None,
    }
}

/// Radius in radians for a distance in miles.
pub fn miles_to_radians(miles: f64) -> f64 {
    miles / EARTH_RADIUS_MILES
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boston_to_providence_is_about_41_miles() {
        let boston = (-71.0589, 42.3601);
        let providence = (-71.4128, 41.8240);
        let miles = central_angle(boston, providence) * EARTH_RADIUS_MILES;
        assert!((miles - 41.0).abs() < 1.5, "got {miles}");
    }

    #[test]
    fn parses_points_and_spheres() {
        let p = json!({"type": "Point", "coordinates": [-71.1, 42.3]});
        assert_eq!(point_coordinates(&p), Some((-71.1, 42.3)));
        assert_eq!(point_coordinates(&json!({"type": "Line", "coordinates": [1, 2]})), None);
        assert_eq!(point_coordinates(&json!([1.0, 2.0])), Some((1.0, 2.0)));

        let s = json!([[-71.1, 42.3], 0.01]);
        assert_eq!(parse_center_sphere(&s), Some(((-71.1, 42.3), 0.01)));
        assert_eq!(parse_center_sphere(&json!([[-71.1, 42.3], -1])), None);
        assert_eq!(parse_center_sphere(&json!("near")), None);
    }
}
