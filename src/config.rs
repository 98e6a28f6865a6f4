// Parameters of a batch. The defaults are the values the scene was tuned with;
// a JSON file may override any of them (missing keys keep the default).

use serde::Deserialize;
use std::path::Path;

use crate::error::SceneError;

pub static EARTH_RADIUS: f64 = 6_378_137.0; // WGS84 equator, meters
pub static SCALE_FACTOR: f64 = 3.0; // makes small buildings visible

pub static FEET_TO_METERS: f64 = 0.3048;
pub static HEIGHT_AMPLIFICATION: f64 = 1.5; // real heights read too flat otherwise
pub static METERS_PER_LEVEL: f64 = 4.5;
pub static DEFAULT_HEIGHT: f64 = 50.0;
pub static MIN_HEIGHT: f64 = 4.0;
pub static MAX_HEIGHT: f64 = 800.0;

pub static ELEVATION_AMPLITUDE: f64 = 0.5;
pub static ELEVATION_FREQUENCY: f64 = 0.005;
pub static GROUND_EPSILON: f64 = 0.01; // against z-fighting with the ground plane
pub static GRID_SIZE: f64 = 0.5;
pub static COLLISION_NUDGE: f64 = 0.1;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectionConfig {
    pub earth_radius: f64,
    pub scale_factor: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            earth_radius: EARTH_RADIUS,
            scale_factor: SCALE_FACTOR,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeightConfig {
    pub feet_to_meters: f64,
    pub height_amplification: f64,
    pub meters_per_level: f64,
    pub default_height: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            feet_to_meters: FEET_TO_METERS,
            height_amplification: HEIGHT_AMPLIFICATION,
            meters_per_level: METERS_PER_LEVEL,
            default_height: DEFAULT_HEIGHT,
            min_height: MIN_HEIGHT,
            max_height: MAX_HEIGHT,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    pub amplitude: f64,
    pub frequency: f64,
    pub ground_epsilon: f64,
    pub grid_size: f64,
    pub collision_nudge: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            amplitude: ELEVATION_AMPLITUDE,
            frequency: ELEVATION_FREQUENCY,
            ground_epsilon: GROUND_EPSILON,
            grid_size: GRID_SIZE,
            collision_nudge: COLLISION_NUDGE,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub projection: ProjectionConfig,
    pub height: HeightConfig,
    pub placement: PlacementConfig,
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
