// Flat road ribbons. Roads are not filtered and do not take part in the collision.

use serde::Serialize;

use crate::error::SceneError;
use crate::kernel_in::GroundPosition;
use crate::kernel_out::{MaterialParams, RenderColor};
use crate::tags::Tags;
use crate::tagticks::parse_color;

pub static CENTER_LINE_HEIGHT: f64 = 0.06; // above the ribbon
pub static CENTER_LINE_COLOR: &str = "#bdbdbd";
pub static CENTER_LINE_OPACITY: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    /// `primary` and `trunk`
    Primary,
    Secondary,
    Tertiary,
    /// `residential` and `service`
    Minor,
    Other,
}

impl RoadClass {
    pub fn of(tags: &Tags) -> Self {
        let highway = tags.highway().unwrap_or_default();
        match &*highway {
            "primary" | "trunk" => RoadClass::Primary,
            "secondary" => RoadClass::Secondary,
            "tertiary" => RoadClass::Tertiary,
            "residential" | "service" => RoadClass::Minor,
            _ => RoadClass::Other,
        }
    }

    pub fn width(self) -> f64 {
        match self {
            RoadClass::Primary => 4.0,
            RoadClass::Secondary => 3.0,
            RoadClass::Tertiary => 2.0,
            RoadClass::Minor => 1.5,
            RoadClass::Other => 1.0,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RoadClass::Primary => "#ffffff",
            RoadClass::Secondary => "#fafafa",
            RoadClass::Tertiary => "#f5f5f5",
            RoadClass::Minor => "#f0f0f0",
            RoadClass::Other => "#eeeeee",
        }
    }

    pub fn has_center_line(self) -> bool {
        matches!(self, RoadClass::Primary | RoadClass::Secondary)
    }
}

/// Thin line along the middle of the major roads.
#[derive(Clone, Debug, Serialize)]
pub struct CenterLine {
    /// World positions.
    pub points: Vec<[f64; 3]>,
    pub color: RenderColor,
    pub opacity: f64,
}

pub fn road_material() -> MaterialParams {
    MaterialParams {
        roughness: 0.7,
        metalness: 0.0,
        opacity: 0.9,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Road {
    pub id: u64,
    pub class: RoadClass,
    pub width: f64,
    pub color: RenderColor,
    pub material: MaterialParams,
    /// Closed ribbon on the ground plane, without a repeated first point.
    pub outline: Vec<GroundPosition>,
    /// Triangles as indices into `outline`.
    #[serde(skip)]
    pub triangles: Vec<usize>,
    /// World height of the ribbon.
    pub elevation: f64,
    /// Only for the major classes.
    pub center_line: Option<CenterLine>,
    pub tags: Tags,
}

// Half the width to the left of the way direction. No direction, no offset.
fn left_offset(from: GroundPosition, to: GroundPosition, half_width: f64) -> GroundPosition {
    let direction = to - from;
    let length = direction.length();
    if length == 0.0 {
        return GroundPosition::ZERO;
    }
    GroundPosition::new(
        -direction.north / length * half_width,
        direction.east / length * half_width,
    )
}

/// Outline of a ribbon of `width` along `line`.
///
/// The left side runs forward with the offset of each segment, the right side
/// runs back with the offset of the segment walked in reverse.
pub fn ribbon_outline(line: &[GroundPosition], width: f64) -> Vec<GroundPosition> {
    let half_width = width / 2.;
    let mut outline = Vec::with_capacity(line.len() * 2);
    if line.len() < 2 {
        return outline;
    }

    for (index, pair) in line.windows(2).enumerate() {
        let offset = left_offset(pair[0], pair[1], half_width);
        if index == 0 {
            outline.push(pair[0] + offset);
        }
        outline.push(pair[1] + offset);
    }

    for index in (1..line.len()).rev() {
        outline.push(line[index] + left_offset(line[index], line[index - 1], half_width));
    }
    // the start corner of the right side closes the ribbon
    outline.push(line[0] + left_offset(line[1], line[0], half_width));

    outline
}

pub fn build_road(
    id: u64,
    line: &[GroundPosition],
    tags: &Tags,
    ground_epsilon: f64,
) -> Result<Road, SceneError> {
    if line.len() < 2 {
        return Err(SceneError::ShortRoad { id });
    }

    let class = RoadClass::of(tags);
    let outline = ribbon_outline(line, class.width());

    let mut vertices = Vec::<f64>::with_capacity(outline.len() * 2);
    for position in &outline {
        vertices.push(position.east);
        vertices.push(position.north);
    }
    let triangles =
        earcutr::earcut(&vertices, &[], 2).map_err(|error| SceneError::Triangulation {
            id,
            reason: format!("{error:?}"),
        })?;

    let center_line = class.has_center_line().then(|| CenterLine {
        points: line
            .iter()
            .map(|position| [position.east, CENTER_LINE_HEIGHT, -position.north])
            .collect(),
        color: parse_color(CENTER_LINE_COLOR),
        opacity: CENTER_LINE_OPACITY,
    });

    Ok(Road {
        id,
        class,
        width: class.width(),
        color: parse_color(class.color()),
        material: road_material(),
        outline,
        triangles,
        elevation: ground_epsilon,
        center_line,
        tags: tags.clone(),
    })
}
