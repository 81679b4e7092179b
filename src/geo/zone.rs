use rand::Rng;

use super::errors::GeoError;
use super::point::Point;

// ============================================================================
// Zone - Polygon with admission polarity
// ============================================================================
//
// Containment uses the even-odd crossing rule with a half-open edge test
// (latitude is the ray axis): a vertex is counted for the edge above it but
// not the one below, so a point exactly on a shared boundary is classified
// the same way every time. Points on the south/west edges of an axis-aligned
// box come out inside, points on the north/east edges come out outside.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

#[derive(Debug, Clone)]
pub struct Zone {
    vertices: Vec<Point>,
    admits: bool,
    bounds: BoundingBox,
}

impl Zone {
    /// Build a zone from an ordered ring of vertices (not closed; the last
    /// vertex connects back to the first).
    pub fn new(vertices: Vec<Point>, admits: bool) -> Result<Self, GeoError> {
        if vertices.len() < 3 {
            return Err(GeoError::TooFewVertices { got: vertices.len() });
        }

        if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(GeoError::NonFiniteVertex { index });
        }

        let first = vertices[0];
        let bounds = vertices.iter().skip(1).fold(
            BoundingBox {
                min_lat: first.lat,
                max_lat: first.lat,
                min_lng: first.lng,
                max_lng: first.lng,
            },
            |b, p| BoundingBox {
                min_lat: b.min_lat.min(p.lat),
                max_lat: b.max_lat.max(p.lat),
                min_lng: b.min_lng.min(p.lng),
                max_lng: b.max_lng.max(p.lng),
            },
        );

        Ok(Self { vertices, admits, bounds })
    }

    /// An allowed zone (`admits = true`).
    pub fn allowed(vertices: Vec<Point>) -> Result<Self, GeoError> {
        Self::new(vertices, true)
    }

    /// A disallowed zone (`admits = false`).
    pub fn disallowed(vertices: Vec<Point>) -> Result<Self, GeoError> {
        Self::new(vertices, false)
    }

    pub fn contains(&self, point: Point) -> bool {
        let b = &self.bounds;
        if point.lat < b.min_lat || point.lat > b.max_lat || point.lng < b.min_lng || point.lng > b.max_lng {
            return false;
        }

        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;

        for i in 0..n {
            let vi = self.vertices[i];
            let vj = self.vertices[j];

            if (vi.lat > point.lat) != (vj.lat > point.lat) {
                let crossing_lng = (vj.lng - vi.lng) * (point.lat - vi.lat) / (vj.lat - vi.lat) + vi.lng;
                if point.lng < crossing_lng {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }

    pub fn admits(&self) -> bool {
        self.admits
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Uniform sample from the zone's bounding box. The result may fall
    /// outside the polygon itself; see `ZoneSet::sample_admissible_point`.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let b = &self.bounds;
        Point {
            lat: rng.gen::<f64>() * (b.max_lat - b.min_lat) + b.min_lat,
            lng: rng.gen::<f64>() * (b.max_lng - b.min_lng) + b.min_lng,
        }
    }
}
