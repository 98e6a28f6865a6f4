// Internal Interface of the crate/lib between the solid builder and the presentation layer

use serde::Serialize;
use std::borrow::Cow;

use crate::kernel_in::GroundPosition;
use crate::tags::Tags;

// The usuall format, a GPU want's its vertex positon.
pub type GpuPosition = [f32; 3];

// Internal type of the renderer, red green blue alpha
pub type RenderColor = [f32; 4];

// Mesh render attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshAttributes {
    pub indices_to_vertices: Vec<u32>,
    pub vertices_colors: Vec<RenderColor>, // format: Float32x4
    pub vertices_positions: Vec<GpuPosition>, // The corners are NOT reused to get hard edges
}

impl MeshAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices_to_vertices.len() / 3
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MaterialParams {
    pub roughness: f64,
    pub metalness: f64,
    pub opacity: f64,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            roughness: 0.5,
            metalness: 0.1,
            opacity: 0.95,
        }
    }
}

/// One extruded building of a batch.
///
/// Height and tags are fixed once built. Only the placement may lift the
/// solid, and the scene registry that owns it drops it with the batch.
#[derive(Clone, Debug, Serialize)]
pub struct Solid {
    id: u64,
    ring: Vec<GroundPosition>,
    height: f64,
    position: [f64; 3],
    rotation: [f64; 3],
    tags: Tags,
    color: RenderColor,
    material: MaterialParams,
    #[serde(skip)]
    mesh: MeshAttributes,
}

impl Solid {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: u64,
        ring: Vec<GroundPosition>,
        height: f64,
        position: [f64; 3],
        rotation: [f64; 3],
        tags: Tags,
        color: RenderColor,
        material: MaterialParams,
        mesh: MeshAttributes,
    ) -> Self {
        Self {
            id,
            ring,
            height,
            position,
            rotation,
            tags,
            color,
            material,
            mesh,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn ring(&self) -> &[GroundPosition] {
        &self.ring
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    pub fn rotation(&self) -> [f64; 3] {
        self.rotation
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn color(&self) -> RenderColor {
        self.color
    }

    pub fn material(&self) -> MaterialParams {
        self.material
    }

    pub fn mesh(&self) -> &MeshAttributes {
        &self.mesh
    }

    pub(crate) fn set_position(&mut self, position: [f64; 3]) {
        self.position = position;
    }

    pub(crate) fn lift(&mut self, amount: f64) {
        self.position[1] += amount;
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        self.tags
            .name()
            .unwrap_or(Cow::Borrowed("Unknown Building"))
    }

    pub fn usage(&self) -> Cow<'_, str> {
        self.tags
            .amenity()
            .or_else(|| self.tags.shop())
            .or_else(|| self.tags.office())
            .unwrap_or(Cow::Borrowed("General"))
    }

    /// Mesh vertices in world space: rotated about x, then moved to the position.
    pub fn world_vertices(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        let (sin, cos) = self.rotation[0].sin_cos();
        self.mesh.vertices_positions.iter().map(move |vertex| {
            let [x, y, z] = vertex.map(f64::from);
            [
                x + self.position[0],
                y * cos - z * sin + self.position[1],
                y * sin + z * cos + self.position[2],
            ]
        })
    }
}
