// Errors that cross the border of the crate. Expected data irregularities (odd heights,
// unparseable filter values, short rings) are handled by policy and never land here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    /// A ring without any point reached the shape builder.
    #[error("Way {id} has an empty ring")]
    EmptyRing { id: u64 },

    /// earcut could not triangulate the cap of a solid.
    #[error("Way {id} could not be triangulated: {reason}")]
    Triangulation { id: u64, reason: String },

    #[error("Road {id} needs at least two points")]
    ShortRoad { id: u64 },

    /// A batch without any usable way has no region center.
    #[error("The batch contains no usable way")]
    EmptyBatch,

    #[error("Overpass JSON could not be read: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "fetch")]
    #[error("Overpass request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Overpass answered with HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
