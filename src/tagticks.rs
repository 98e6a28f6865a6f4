///////////////////////////////////////
// The tactics to hanlde OSM tagging //
///////////////////////////////////////

use csscolorparser::parse;
use std::borrow::Cow;
use tracing::warn;

use crate::config::HeightConfig;
use crate::jitter::Jitter;
use crate::kernel_out::{MaterialParams, RenderColor};
use crate::tags::{TagValue, Tags};

// This constands may come from a (3D-)render shema
pub static COMMERCIAL_COLORS: (&str, &str) = ("#64b5f6", "#42a5f5"); // light blue accent
pub static RESIDENTIAL_COLORS: (&str, &str) = ("#ffffff", "#f5f5f5"); // white/light gray
pub static INDUSTRIAL_COLORS: (&str, &str) = ("#e0e0e0", "#eeeeee"); // light gray
pub static EDUCATIONAL_COLORS: (&str, &str) = ("#e3f2fd", "#bbdefb"); // very light blue
pub static HEALTHCARE_COLORS: (&str, &str) = ("#90caf9", "#64b5f6"); // light blue
pub static DEFAULT_COLORS: (&str, &str) = ("#ffffff", "#f5f5f5");
pub static DEFAULT_JITTER_RANGE: f64 = 0.3; // plain buildings vary less
pub static HEIGHT_SHADE_COLOR: &str = "#34495e";
pub static HEIGHT_SHADE_MAX: f64 = 0.3; // taller buildings are slightly darker
pub static HEIGHT_SHADE_FULL_AT: f64 = 100.0;
pub static FALLBACK_COLOR: RenderColor = [0.5, 0.5, 0.5, 1.0]; // "grey"

pub static UNKNOWN_HEIGHT: &str = "unknown";

/// Extrusion height and what it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedHeight {
    /// Meters, within the configured bounds.
    pub height: f64,
    /// For display only: the height tag as given, "<n> levels" or "unknown".
    pub actual_height: String,
}

// A tag counts if it is there and not an empty text
fn tag_text(value: Option<&TagValue>) -> Option<String> {
    value.map(|value| value.as_text().into_owned()).filter(|text| !text.is_empty())
}

/// `height` (feet or meters, amplified), else `building:levels`, else the default; then clamped.
/// A tag that does not read as a number is passed over like a missing one.
pub fn resolve_height(tags: &Tags, config: &HeightConfig) -> ResolvedHeight {
    let from_height_tag = tag_text(tags.height()).and_then(|text| {
        let value = TagValue::Text(text.clone()).leading_number()?;
        let meters = if text.to_lowercase().contains("ft") {
            value * config.feet_to_meters
        } else {
            value
        };
        Some((meters * config.height_amplification, text))
    });

    let from_levels = || {
        tag_text(tags.building_levels()).and_then(|text| {
            let levels = TagValue::Text(text).leading_number()?;
            Some((levels * config.meters_per_level, format!("{} levels", levels)))
        })
    };

    let (height, actual_height) = from_height_tag
        .or_else(from_levels)
        .unwrap_or((config.default_height, UNKNOWN_HEIGHT.to_string()));

    ResolvedHeight {
        height: clamp_height(height, config),
        actual_height,
    }
}

pub fn clamp_height(height: f64, config: &HeightConfig) -> f64 {
    if height > config.max_height {
        config.max_height
    } else if height < config.min_height {
        config.min_height
    } else {
        height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildingCategory {
    Commercial,
    Residential,
    Industrial,
    Educational,
    Healthcare,
    Default,
}

fn lower(text: Option<Cow<'_, str>>) -> String {
    text.map(|text| text.to_lowercase()).unwrap_or_default()
}

impl BuildingCategory {
    pub fn of(tags: &Tags) -> Self {
        let building = lower(tags.building());
        let amenity = lower(tags.amenity());
        let shop = lower(tags.shop());
        let office = lower(tags.office());

        match building.as_str() {
            "commercial" => return BuildingCategory::Commercial,
            _ if !shop.is_empty() || !office.is_empty() => return BuildingCategory::Commercial,
            "residential" | "apartments" | "house" => return BuildingCategory::Residential,
            "industrial" | "warehouse" => return BuildingCategory::Industrial,
            _ => (),
        }

        match amenity.as_str() {
            "school" | "university" | "college" => BuildingCategory::Educational,
            "hospital" | "clinic" => BuildingCategory::Healthcare,
            _ => BuildingCategory::Default,
        }
    }

    /// Base color, secondary color and how far the jitter may blend between them.
    fn palette(self) -> ((&'static str, &'static str), f64) {
        match self {
            BuildingCategory::Commercial => (COMMERCIAL_COLORS, 1.0),
            BuildingCategory::Residential => (RESIDENTIAL_COLORS, 1.0),
            BuildingCategory::Industrial => (INDUSTRIAL_COLORS, 1.0),
            BuildingCategory::Educational => (EDUCATIONAL_COLORS, 1.0),
            BuildingCategory::Healthcare => (HEALTHCARE_COLORS, 1.0),
            BuildingCategory::Default => (DEFAULT_COLORS, DEFAULT_JITTER_RANGE),
        }
    }
}

pub fn parse_color(color: &str) -> RenderColor {
    // https://docs.rs/csscolorparser/latest/csscolorparser/
    match parse(color) {
        Ok(color_scc) => [
            color_scc.r as f32,
            color_scc.g as f32,
            color_scc.b as f32,
            color_scc.a as f32,
        ],

        Err(error) => {
            warn!("parse_color: {} => {}", color, error);
            FALLBACK_COLOR
        }
    }
}

pub fn lerp_color(from: RenderColor, to: RenderColor, factor: f64) -> RenderColor {
    let factor = factor as f32;
    let mut color = from;
    for (channel, target) in color.iter_mut().zip(to) {
        *channel += (target - *channel) * factor;
    }
    color
}

/// Category color with a random blend, then shaded by the height.
pub fn derive_color(tags: &Tags, height: f64, jitter: &mut dyn Jitter) -> RenderColor {
    let ((base, secondary), range) = BuildingCategory::of(tags).palette();
    let color = lerp_color(
        parse_color(base),
        parse_color(secondary),
        jitter.next_factor() * range,
    );

    let height_factor = (height / HEIGHT_SHADE_FULL_AT).min(1.0);
    lerp_color(
        color,
        parse_color(HEIGHT_SHADE_COLOR),
        height_factor * HEIGHT_SHADE_MAX,
    )
}

/// Only a `building=commercial` gets the more reflective surface.
pub fn derive_material(tags: &Tags) -> MaterialParams {
    let commercial = tags
        .building()
        .is_some_and(|building| building.to_lowercase() == "commercial");
    MaterialParams {
        metalness: if commercial { 0.3 } else { 0.1 },
        ..MaterialParams::default()
    }
}
