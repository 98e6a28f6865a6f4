///////////////////////////////////////////////
// From OSM elements to the solids of a batch //
///////////////////////////////////////////////

// Overpass lists the ways before the nodes they use ("out body; >; out skel"),
// so the ways are only collected here and resolved by `scan`.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::collision::{WorldBox, nudge_on_collision};
use crate::config::SceneConfig;
use crate::elevation::{ElevationSampler, ground_placement};
use crate::error::SceneError;
use crate::filter::{FilterQuery, FilterResult, evaluate};
use crate::jitter::Jitter;
use crate::kernel_in::{GeoWay, GeographicCoordinates, Projector, RoadWay, region_center};
use crate::kernel_out::Solid;
use crate::roads::{Road, build_road};
use crate::symbolic_3d::build_solid;
use crate::tags::Tags;

struct PendingWay {
    id: u64,
    nodes: Vec<u64>,
    tags: Tags,
}

pub struct Osm2Layer {
    config: SceneConfig,
    nodes_map: HashMap<u64, GeographicCoordinates>,
    ways: Vec<PendingWay>,
}

impl Osm2Layer {
    pub fn create(config: SceneConfig) -> Self {
        Self {
            config,
            nodes_map: HashMap::new(),
            ways: Vec::new(),
        }
    }

    pub fn add_node(&mut self, id: u64, latitude: f64, longitude: f64) {
        self.nodes_map
            .insert(id, GeographicCoordinates::new(longitude, latitude));
    }

    /// Ways without tags are kept out, they can't be a building nor a road.
    pub fn add_way(&mut self, id: u64, nodes: Vec<u64>, tags: Option<Tags>) {
        let Some(tags) = tags else {
            return;
        };
        self.ways.push(PendingWay { id, nodes, tags });
    }

    fn resolve(&self, way: &PendingWay) -> Option<Vec<GeographicCoordinates>> {
        let coordinates: Option<Vec<_>> = way
            .nodes
            .iter()
            .map(|node_id| self.nodes_map.get(node_id).copied())
            .collect();
        if coordinates.is_none() {
            warn!("Way {} refers to a missing node, skipped", way.id);
        }
        coordinates
    }

    // ** split the ways into building rings and road lines **
    fn classify(&self) -> (Vec<GeoWay>, Vec<RoadWay>) {
        let mut buildings = Vec::new();
        let mut roads = Vec::new();

        for way in &self.ways {
            let is_building = way.tags.building().is_some_and(|value| !value.is_empty());
            let is_road = way.tags.highway().is_some_and(|value| !value.is_empty());
            if !is_building && !is_road {
                continue;
            }
            let Some(mut coordinates) = self.resolve(way) else {
                continue;
            };

            if is_building {
                if coordinates.len() <= 2 {
                    warn!("Building {} has only {} corners, skipped", way.id, coordinates.len());
                    continue;
                }
                if coordinates.first() != coordinates.last() {
                    coordinates.push(coordinates[0]);
                }
                buildings.push(GeoWay {
                    id: way.id,
                    ring: coordinates,
                    tags: way.tags.clone(),
                });
            } else if coordinates.len() >= 2 {
                roads.push(RoadWay {
                    id: way.id,
                    line: coordinates,
                    tags: way.tags.clone(),
                });
            } else {
                warn!("Road {} has less than two points, skipped", way.id);
            }
        }

        (buildings, roads)
    }

    /// Builds, places and de-overlaps all solids of the batch, in the order the ways came in.
    pub fn scan(&self, jitter: &mut dyn Jitter) -> Result<Scene, SceneError> {
        let (buildings, roads) = self.classify();
        if buildings.is_empty() && roads.is_empty() {
            return Err(SceneError::EmptyBatch);
        }

        // all conversions of one batch share one center
        let center = if buildings.is_empty() {
            region_center(roads.iter().map(|road| road.line.as_slice()))
        } else {
            region_center(buildings.iter().map(|building| building.ring.as_slice()))
        };
        let projector = Projector::new(center, self.config.projection);
        let sampler = ElevationSampler::new(&self.config.placement);

        let mut solids: Vec<Solid> = Vec::with_capacity(buildings.len());
        // boxes of the placed solids, in the same order
        let mut placed: Vec<WorldBox> = Vec::with_capacity(buildings.len());
        for building in &buildings {
            let ring = projector.project_ring(&building.ring);
            match build_solid(building.id, ring, &building.tags, &self.config.height, jitter) {
                Ok(mut solid) => {
                    ground_placement(&mut solid, &sampler, &self.config.placement);
                    nudge_on_collision(&mut solid, &placed, self.config.placement.collision_nudge);
                    placed.push(WorldBox::of(&solid));
                    solids.push(solid);
                }
                Err(error) => warn!("{error}, building skipped"),
            }
        }

        let mut scene_roads = Vec::with_capacity(roads.len());
        for road in &roads {
            let line = projector.project_ring(&road.line);
            match build_road(road.id, &line, &road.tags, self.config.placement.ground_epsilon) {
                Ok(road) => scene_roads.push(road),
                Err(error) => warn!("{error}, road skipped"),
            }
        }

        info!(
            "Scene around {}: {} solids, {} roads",
            center,
            solids.len(),
            scene_roads.len()
        );

        Ok(Scene {
            center,
            solids,
            roads: scene_roads,
        })
    }
}

/// The registry of one batch. A new batch makes a new scene, nothing is carried over.
#[derive(Debug, Serialize)]
pub struct Scene {
    center: GeographicCoordinates,
    solids: Vec<Solid>,
    roads: Vec<Road>,
}

impl Scene {
    pub fn center(&self) -> GeographicCoordinates {
        self.center
    }

    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// Indices into `solids()`.
    pub fn filter(&self, query: &FilterQuery) -> FilterResult {
        evaluate(&self.solids, query)
    }

    pub fn into_solids(self) -> Vec<Solid> {
        self.solids
    }
}
