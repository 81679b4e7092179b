// ============================================================================
// Geofencing Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Zone needs at least 3 vertices, got {got}")]
    TooFewVertices { got: usize },

    #[error("Zone vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("No admissible point found after {attempts} attempts")]
    NoAdmissibleArea { attempts: usize },
}
