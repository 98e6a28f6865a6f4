// Bounding box overlap of placed solids

use tracing::debug;

use crate::kernel_out::Solid;

/// Axis aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for WorldBox {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldBox {
    pub fn new() -> Self {
        WorldBox {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    pub fn include(&mut self, point: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.max[axis] < self.min[axis])
    }

    /// Extent of all mesh vertices after rotation and position.
    pub fn of(solid: &Solid) -> Self {
        let mut world_box = WorldBox::new();
        for vertex in solid.world_vertices() {
            world_box.include(vertex);
        }
        world_box
    }

    /// Touching boxes count as intersecting.
    pub fn intersects(&self, other: &WorldBox) -> bool {
        // If any dimension doesn't overlap, they don't intersect
        !(0..3).any(|axis| other.max[axis] < self.min[axis] || other.min[axis] > self.max[axis])
    }
}

pub fn collides(a: &Solid, b: &Solid) -> bool {
    WorldBox::of(a).intersects(&WorldBox::of(b))
}

/// Lifts `solid` once by `nudge` if it overlaps any of the boxes of the already placed solids.
///
/// One pass only: the lifted solid is not checked again, so overlaps may remain.
pub fn nudge_on_collision(solid: &mut Solid, placed: &[WorldBox], nudge: f64) -> bool {
    let world_box = WorldBox::of(solid);
    let hit = placed.iter().position(|other| world_box.intersects(other));

    match hit {
        Some(index) => {
            debug!("Solid {} overlaps placed solid #{}, lifted by {}", solid.id(), index, nudge);
            solid.lift(nudge);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeightConfig;
    use crate::jitter::FixedJitter;
    use crate::kernel_in::GroundPosition;
    use crate::symbolic_3d::build_solid;
    use crate::tags::Tags;
    use approx::assert_relative_eq;

    fn square(id: u64, west: f64, south: f64, size: f64) -> Solid {
        let ring = vec![
            GroundPosition::new(west, south),
            GroundPosition::new(west + size, south),
            GroundPosition::new(west + size, south + size),
            GroundPosition::new(west, south + size),
            GroundPosition::new(west, south),
        ];
        build_solid(id, ring, &Tags::new(), &HeightConfig::default(), &mut FixedJitter(0.0))
            .unwrap()
    }

    #[test]
    fn box_of_upright_solid() {
        let world_box = WorldBox::of(&square(1, 0., 0., 10.));
        assert_relative_eq!(world_box.min[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(world_box.max[0], 10.0, epsilon = 1e-6);
        assert_relative_eq!(world_box.max[1], 50.0, epsilon = 1e-6);
        assert_relative_eq!(world_box.min[2], -10.0, epsilon = 1e-6);
        assert_relative_eq!(world_box.max[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn overlap_and_distance() {
        let a = square(1, 0., 0., 10.);
        let b = square(2, 5., 5., 10.);
        let c = square(3, 100., 100., 10.);
        assert!(collides(&a, &b));
        assert!(!collides(&a, &c));
    }

    #[test]
    fn collision_is_symmetric() {
        let solids = [
            square(1, 0., 0., 10.),
            square(2, 5., 5., 10.),
            square(3, 10., 0., 4.),
            square(4, 50., 0., 4.),
        ];
        for a in &solids {
            for b in &solids {
                assert_eq!(collides(a, b), collides(b, a));
            }
        }
    }

    #[test]
    fn touching_counts() {
        let a = WorldBox {
            min: [0.; 3],
            max: [1.; 3],
        };
        let b = WorldBox {
            min: [1., 0., 0.],
            max: [2., 1., 1.],
        };
        assert!(a.intersects(&b));
        assert!(WorldBox::new().is_empty());
    }

    #[test]
    fn nudge_lifts_once() {
        let placed = vec![
            WorldBox::of(&square(1, 0., 0., 10.)),
            WorldBox::of(&square(2, 2., 2., 10.)),
        ];
        let mut solid = square(3, 5., 5., 10.);
        let y = solid.position()[1];

        assert!(nudge_on_collision(&mut solid, &placed, 0.1));
        // two overlaps, still only one nudge
        assert_relative_eq!(solid.position()[1], y + 0.1);

        let mut far = square(4, 500., 500., 10.);
        assert!(!nudge_on_collision(&mut far, &placed, 0.1));
        assert_eq!(far.position()[1], 0.0);
    }

    #[test]
    fn lifted_box_moves_with_the_solid() {
        let placed = vec![WorldBox::of(&square(1, 0., 0., 10.))];
        let mut solid = square(2, 5., 5., 10.);
        let before = WorldBox::of(&solid);

        assert!(nudge_on_collision(&mut solid, &placed, 0.5));
        let after = WorldBox::of(&solid);
        assert_relative_eq!(after.min[1], before.min[1] + 0.5, epsilon = 1e-9);
        assert_relative_eq!(after.max[1], before.max[1] + 0.5, epsilon = 1e-9);
        assert!(!nudge_on_collision(&mut solid, &[], 0.5));
    }
}
