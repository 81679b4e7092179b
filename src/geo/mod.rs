// ============================================================================
// Geofencing
// ============================================================================
//
// Polygonal service-area configuration:
// - Point    - (lat, lng) in degrees
// - Zone     - polygon with containment test and admission polarity
// - ZoneSet  - one allowed zone plus exclusion zones
// - defaults - built-in service area used when no zones file is configured
//
// Zones are loaded once at startup and shared read-only behind an Arc.
//
// ============================================================================

mod errors;
mod point;
mod zone;
mod zone_set;

pub mod defaults;

pub use errors::GeoError;
pub use point::Point;
pub use zone::Zone;
pub use zone_set::{is_admissible, ZoneSet, MAX_SAMPLING_ATTEMPTS};
