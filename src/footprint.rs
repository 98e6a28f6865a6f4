// outer SHAPE of the building

use crate::error::SceneError;
use crate::kernel_in::{BoundingBox, GroundPosition};

/// One step of drawing the outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(GroundPosition),
    LineTo(GroundPosition),
}

/// Closed planar shape ready for extrusion.
///
/// The ring is taken as it is: a self-intersecting ring is not detected
/// and extrudes to whatever the triangulation makes of it.
#[derive(Clone, Debug)]
pub struct Footprint {
    pub id: u64,
    positions: Vec<GroundPosition>,
    pub bounding_box: BoundingBox,
    pub center: GroundPosition,
}

impl Footprint {
    /// Move to the first point, then lines through all others in order.
    pub fn build(id: u64, ring: &[GroundPosition]) -> Result<Self, SceneError> {
        if ring.is_empty() {
            return Err(SceneError::EmptyRing { id });
        }

        let mut bounding_box = BoundingBox::new();
        for position in ring {
            bounding_box.include(position);
        }

        Ok(Self {
            id,
            positions: ring.to_vec(),
            center: bounding_box.center(),
            bounding_box,
        })
    }

    pub fn positions(&self) -> &[GroundPosition] {
        &self.positions
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.positions
            .iter()
            .enumerate()
            .map(|(index, position)| match index {
                0 => PathSegment::MoveTo(*position),
                _ => PathSegment::LineTo(*position),
            })
    }

    /// The corners without the repeated closing point.
    pub fn outline(&self) -> &[GroundPosition] {
        match (self.positions.first(), self.positions.last()) {
            (Some(first), Some(last)) if self.positions.len() > 1 && first == last => {
                &self.positions[..self.positions.len() - 1]
            }
            _ => &self.positions,
        }
    }

    // https://stackoverflow.com/questions/1165647/how-to-determine-if-a-list-of-polygon-points-are-in-clockwise-order
    pub fn is_clockwise(&self) -> bool {
        let outline = self.outline();
        let mut clockwise_sum = 0.;
        for (index, position) in outline.iter().enumerate() {
            let next_position = outline[(index + 1) % outline.len()];
            clockwise_sum +=
                (next_position.east - position.east) * (next_position.north + position.north);
        }
        clockwise_sum > 0.0
    }

    /// Triangles of the cap, as indices into `outline()`.
    pub fn triangulate(&self) -> Result<Vec<usize>, SceneError> {
        let mut vertices = Vec::<f64>::new();
        for position in self.outline() {
            vertices.push(position.east);
            vertices.push(position.north);
        }

        earcutr::earcut(&vertices, &[], 2).map_err(|error| SceneError::Triangulation {
            id: self.id,
            reason: format!("{error:?}"),
        })
    }
}
