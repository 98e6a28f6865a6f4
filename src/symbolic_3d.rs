use tracing::debug;

use crate::config::HeightConfig;
use crate::error::SceneError;
use crate::footprint::Footprint;
use crate::jitter::Jitter;
use crate::kernel_in::GroundPosition;
use crate::kernel_out::{GpuPosition, MeshAttributes, RenderColor, Solid};
use crate::tags::{KEY_ACTUAL_HEIGHT, KEY_ID, Tags};
use crate::tagticks::{derive_color, derive_material, resolve_height};

///////////////////////////////////////////////////////////////////////////////////////////////////
// Extrusion //////////////////////////////////////////////////////////////////////////////////////

// Turns the extrusion axis into world-up
pub static UPRIGHT_ROTATION: [f64; 3] = [-std::f64::consts::FRAC_PI_2, 0.0, 0.0];

// Local methode of GroundPosition, only to be used for the mesh!
impl GroundPosition {
    // The shape plane is x/y, the extrusion runs along z. All relative to the footprint center.
    fn to_shape_position(self, center: GroundPosition, depth: f64) -> GpuPosition {
        let relative = self - center;
        [relative.east as f32, relative.north as f32, depth as f32]
    }
}

/// Prism of the footprint with the given depth, no bevel.
///
/// The mesh is authored upright-less: rotate it by `UPRIGHT_ROTATION` and the depth points up.
pub fn extrude(
    footprint: &Footprint,
    depth: f64,
    color: RenderColor,
) -> Result<MeshAttributes, SceneError> {
    let mut outline = footprint.outline().to_vec();
    let cap_indices = footprint.triangulate()?;
    // the walls need a counter-clockwise ring to face outward
    let clockwise = footprint.is_clockwise();
    if clockwise {
        outline.reverse();
    }

    let mut osm_mesh = OsmMesh::new(color);
    let center = footprint.center;

    // ** bottom and top caps **
    let count = outline.len();
    let corner = |index: usize| if clockwise { count - 1 - index } else { index };
    let bottom_offset = osm_mesh.push_positions(&outline, center, 0.0);
    let top_offset = osm_mesh.push_positions(&outline, center, depth);
    for triangle in cap_indices.chunks_exact(3) {
        let [a, b, c] = [corner(triangle[0]), corner(triangle[1]), corner(triangle[2])];
        // earcut keeps the ring direction, so reversed rings flip the triangles too
        let (a, b, c) = if clockwise { (a, c, b) } else { (a, b, c) };
        osm_mesh.push_indices([bottom_offset + a, bottom_offset + c, bottom_offset + b]);
        osm_mesh.push_indices([top_offset + a, top_offset + b, top_offset + c]);
    }

    // ** walls **
    for index in 0..count {
        let this_position = outline[index];
        let next_position = outline[(index + 1) % count];
        osm_mesh.push_square(
            this_position.to_shape_position(center, 0.0),
            next_position.to_shape_position(center, 0.0),
            this_position.to_shape_position(center, depth),
            next_position.to_shape_position(center, depth),
        );
    }

    Ok(osm_mesh.attributes)
}

// Methode-Extenton of the "CLASS" OSM-Mesh, only needed internaly here ////////////////////////
struct OsmMesh {
    attributes: MeshAttributes,
    color: RenderColor,
}

impl OsmMesh {
    fn new(color: RenderColor) -> Self {
        OsmMesh {
            attributes: MeshAttributes::new(),
            color,
        }
    }

    fn push_position(&mut self, position: GpuPosition) -> usize {
        self.attributes.vertices_positions.push(position);
        self.attributes.vertices_colors.push(self.color);
        self.attributes.vertices_positions.len() - 1
    }

    fn push_positions(
        &mut self,
        outline: &[GroundPosition],
        center: GroundPosition,
        depth: f64,
    ) -> usize {
        let offset = self.attributes.vertices_positions.len();
        for position in outline {
            self.push_position(position.to_shape_position(center, depth));
        }
        offset
    }

    fn push_indices(&mut self, indices: [usize; 3]) {
        for index in indices {
            self.attributes.indices_to_vertices.push(index as u32);
        }
    }

    fn push_square(
        &mut self,
        down_left: GpuPosition,
        down_right: GpuPosition,
        up_left: GpuPosition,
        up_right: GpuPosition,
    ) {
        let down_left = self.push_position(down_left);
        let down_right = self.push_position(down_right);
        let up_left = self.push_position(up_left);
        let up_right = self.push_position(up_right);
        self.push_indices([down_left, down_right, up_right]);
        self.push_indices([down_left, up_right, up_left]);
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////
// Solid //////////////////////////////////////////////////////////////////////////////////////////

/// A solid from a projected ring: height, color, material and mesh.
/// Placement is left to the caller, the solid starts at the footprint center on the ground.
pub fn build_solid(
    id: u64,
    ring: Vec<GroundPosition>,
    tags: &Tags,
    config: &HeightConfig,
    jitter: &mut dyn Jitter,
) -> Result<Solid, SceneError> {
    let footprint = Footprint::build(id, &ring)?;
    let resolved = resolve_height(tags, config);
    let color = derive_color(tags, resolved.height, jitter);
    let material = derive_material(tags);
    let mesh = extrude(&footprint, resolved.height, color)?;

    // Display data travels with the tags, the filter sees it like any other tag
    let mut tags = tags.clone();
    tags.insert(KEY_ID, id as f64);
    tags.insert(KEY_ACTUAL_HEIGHT, resolved.actual_height);

    debug!(
        "Solid {} height {} triangles {}",
        id,
        resolved.height,
        mesh.triangle_count()
    );

    let center = footprint.center;
    Ok(Solid::new(
        id,
        ring,
        resolved.height,
        // world z runs against north after the upright rotation
        [center.east, 0.0, -center.north],
        UPRIGHT_ROTATION,
        tags,
        color,
        material,
        mesh,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::FixedJitter;
    use approx::assert_relative_eq;

    fn ring() -> Vec<GroundPosition> {
        vec![
            GroundPosition::new(10., 20.),
            GroundPosition::new(30., 20.),
            GroundPosition::new(30., 40.),
            GroundPosition::new(10., 40.),
            GroundPosition::new(10., 20.),
        ]
    }

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().map(|(key, value)| (*key, *value)).collect()
    }

    #[test]
    fn box_has_caps_and_walls() {
        let footprint = Footprint::build(1, &ring()).unwrap();
        let mesh = extrude(&footprint, 12.0, [1.0; 4]).unwrap();
        // 4 + 4 cap corners, 4 walls with own corners
        assert_eq!(mesh.vertices_positions.len(), 24);
        assert_eq!(mesh.vertices_colors.len(), 24);
        // 2 + 2 cap triangles, 2 per wall
        assert_eq!(mesh.triangle_count(), 12);
        assert!(
            mesh.indices_to_vertices
                .iter()
                .all(|index| (*index as usize) < mesh.vertices_positions.len())
        );
    }

    #[test]
    fn depth_spans_zero_to_height_around_center() {
        let footprint = Footprint::build(1, &ring()).unwrap();
        let mesh = extrude(&footprint, 12.0, [1.0; 4]).unwrap();
        let max_depth = mesh.vertices_positions.iter().map(|p| p[2]).fold(f32::MIN, f32::max);
        let min_depth = mesh.vertices_positions.iter().map(|p| p[2]).fold(f32::MAX, f32::min);
        assert_eq!(min_depth, 0.0);
        assert_eq!(max_depth, 12.0);
        let max_x = mesh.vertices_positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert_eq!(max_x, 10.0);
    }

    #[test]
    fn clockwise_ring_gives_the_same_amount() {
        let mut reversed = ring();
        reversed.reverse();
        let footprint = Footprint::build(1, &reversed).unwrap();
        let mesh = extrude(&footprint, 5.0, [1.0; 4]).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn solid_stands_upright_at_its_center() {
        let solid = build_solid(
            9,
            ring(),
            &tags(&[("building", "yes"), ("building:levels", "4")]),
            &HeightConfig::default(),
            &mut FixedJitter(0.5),
        )
        .unwrap();

        assert_relative_eq!(solid.height(), 18.0);
        assert_eq!(solid.position(), [20.0, 0.0, -30.0]);
        assert_eq!(solid.tags().get("actualHeight").unwrap().as_text(), "4 levels");
        assert_eq!(solid.tags().get("id").unwrap().as_text(), "9");

        let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
        let (mut min_z, mut max_z) = (f64::MAX, f64::MIN);
        for [_, y, z] in solid.world_vertices() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
            min_z = min_z.min(z);
            max_z = max_z.max(z);
        }
        assert_relative_eq!(min_y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(max_y, 18.0, epsilon = 1e-6);
        // north 20..40 lands on world z -40..-20
        assert_relative_eq!(min_z, -40.0, epsilon = 1e-6);
        assert_relative_eq!(max_z, -20.0, epsilon = 1e-6);
    }

    #[test]
    fn empty_ring_aborts_only_this_solid() {
        let result = build_solid(
            3,
            Vec::new(),
            &Tags::new(),
            &HeightConfig::default(),
            &mut FixedJitter(0.0),
        );
        assert!(matches!(result, Err(SceneError::EmptyRing { id: 3 })));
    }
}
