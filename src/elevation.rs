// A gentle ripple of the ground, only for the looks. Not a real height map.

use crate::config::PlacementConfig;
use crate::kernel_out::Solid;

#[derive(Clone, Copy, Debug)]
pub struct ElevationSampler {
    pub amplitude: f64,
    pub frequency: f64,
}

impl ElevationSampler {
    pub fn new(config: &PlacementConfig) -> Self {
        Self {
            amplitude: config.amplitude,
            frequency: config.frequency,
        }
    }

    /// Stays within ±amplitude.
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        self.amplitude * f64::sin(x * self.frequency) * f64::cos(z * self.frequency)
    }
}

// Halves round up, also below zero (-2.5 becomes -2)
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn snap_to_grid(position: [f64; 3], grid_size: f64) -> [f64; 3] {
    position.map(|value| round_half_up(value / grid_size) * grid_size)
}

/// Sets the solid onto the rippled ground, snapped to the grid, and a hair above it.
pub fn ground_placement(solid: &mut Solid, sampler: &ElevationSampler, config: &PlacementConfig) {
    let [x, _, z] = solid.position();
    let y = sampler.elevation(x, z) + config.ground_epsilon;
    let [x, y, z] = snap_to_grid([x, y, z], config.grid_size);
    // rounding may have eaten the epsilon
    solid.set_position([x, y + config.ground_epsilon, z]);
}
