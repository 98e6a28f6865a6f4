//// OSM ways in, extruded solids out. The presentation layer (renderer, camera, UI) is not part of this crate.

// Input: Overpass JSON
mod input_osm_json;

// Interface from the input module to the solid builder
mod config;
mod error;
mod kernel_in;
mod tags;

// Shapes and solids
mod footprint;
mod jitter;
mod symbolic_3d;
mod tagticks;

// Placement of a batch
mod collision;
mod elevation;
mod osm2layers;
mod roads;

// Selection of solids
mod filter;

// Interface from the solid builder to a renderer
mod kernel_out;

pub use collision::{WorldBox, collides, nudge_on_collision};
pub use config::*;
pub use elevation::{ElevationSampler, ground_placement, snap_to_grid};
pub use error::SceneError;
pub use filter::*;
pub use footprint::{Footprint, PathSegment};
pub use input_osm_json::*;
pub use jitter::{FixedJitter, Jitter, SeededJitter};
pub use kernel_in::*;
pub use kernel_out::*;
pub use osm2layers::{Osm2Layer, Scene};
pub use roads::*;
pub use symbolic_3d::{UPRIGHT_ROTATION, build_solid, extrude};
pub use tags::*;
pub use tagticks::*;
