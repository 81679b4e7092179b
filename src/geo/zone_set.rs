use rand::Rng;

use super::errors::GeoError;
use super::point::Point;
use super::zone::Zone;

// ============================================================================
// Zone Set - Admissibility policy
// ============================================================================
//
// A point is admissible when it lies inside the allowed zone and outside
// every disallowed zone. Polarity is checked on every query: an "allowed"
// zone that does not admit rejects everything, and a "disallowed" zone that
// admits disqualifies every point.
//
// ============================================================================

/// Upper bound on rejection-sampling draws before giving up.
pub const MAX_SAMPLING_ATTEMPTS: usize = 10_000;

pub fn is_admissible(point: Point, allowed: &Zone, disallowed: &[Zone]) -> bool {
    if !allowed.admits() || !allowed.contains(point) {
        return false;
    }

    !disallowed.iter().any(|zone| zone.contains(point) || zone.admits())
}

#[derive(Debug, Clone)]
pub struct ZoneSet {
    allowed: Zone,
    disallowed: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(allowed: Zone, disallowed: Vec<Zone>) -> Self {
        if !allowed.admits() {
            tracing::warn!("Allowed zone is flagged as not admitting; every point will be rejected");
        }
        if disallowed.iter().any(Zone::admits) {
            tracing::warn!("A disallowed zone is flagged as admitting; every point will be rejected");
        }

        Self { allowed, disallowed }
    }

    pub fn allowed(&self) -> &Zone {
        &self.allowed
    }

    pub fn disallowed(&self) -> &[Zone] {
        &self.disallowed
    }

    pub fn is_admissible(&self, point: Point) -> bool {
        is_admissible(point, &self.allowed, &self.disallowed)
    }

    /// Rejection-sample the allowed zone's bounding box until a candidate is
    /// admissible, giving up after `MAX_SAMPLING_ATTEMPTS` draws.
    pub fn sample_admissible_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Point, GeoError> {
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            let candidate = self.allowed.random_point(rng);
            if self.is_admissible(candidate) {
                return Ok(candidate);
            }
        }

        tracing::error!(
            attempts = MAX_SAMPLING_ATTEMPTS,
            "Zone configuration has no reachable admissible area"
        );
        Err(GeoError::NoAdmissibleArea { attempts: MAX_SAMPLING_ATTEMPTS })
    }
}
