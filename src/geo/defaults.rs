use super::{GeoError, Point, Zone, ZoneSet};

// Built-in St. Petersburg service area, used when no zones file is configured.

const ALLOWED_ZONE: [(f64, f64); 4] = [
    (59.8337, 30.2997),
    (59.2356, 30.2681),
    (59.8868, 30.8263),
    (59.8943, 30.7933),
];

const DISALLOWED_ZONES: [[(f64, f64); 4]; 2] = [
    [
        (60.9027, 31.3575),
        (58.9001, 32.4158),
        (59.8424, 30.4953),
        (59.8896, 30.3736),
    ],
    [
        (61.2714, 31.2874),
        (59.9604, 30.3413),
        (61.0206, 31.3613),
        (60.0151, 30.3752),
    ],
];

pub const COURIER_START: Point = Point { lat: 59.9311, lng: 30.3609 };

fn ring(vertices: &[(f64, f64)]) -> Vec<Point> {
    vertices.iter().copied().map(Point::from).collect()
}

pub fn allowed_zone() -> Result<Zone, GeoError> {
    Zone::allowed(ring(&ALLOWED_ZONE))
}

pub fn disallowed_zones() -> Result<Vec<Zone>, GeoError> {
    DISALLOWED_ZONES.iter().map(|v| Zone::disallowed(ring(v))).collect()
}

pub fn zone_set() -> Result<ZoneSet, GeoError> {
    Ok(ZoneSet::new(allowed_zone()?, disallowed_zones()?))
}
