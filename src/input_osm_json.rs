use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::jitter::Jitter;
use crate::kernel_in::GeoBoundingBox;
use crate::osm2layers::{Osm2Layer, Scene};
use crate::tags::Tags;

pub static OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub static OVERPASS_TIMEOUT: u32 = 30; // seconds, asked from the server, not enforced here

///////////////////////////////////////////////////////////////////////////////////////////////////
// Overpass ///////////////////////////////////////////////////////////////////////////////////////

// Rate limits, caching and retries are the business of the caller.
#[cfg(feature = "fetch")]
#[derive(Debug)]
pub struct InputOverpass {
    api_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "fetch")]
impl Default for InputOverpass {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "fetch")]
impl InputOverpass {
    pub fn new() -> Self {
        Self::with_url(OVERPASS_URL)
    }

    pub fn with_url(api_url: &str) -> Self {
        Self {
            api_url: api_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The raw Overpass JSON of all ways carrying one of the `keys`, with their nodes.
    pub async fn fetch(
        &self,
        bounding_box: &GeoBoundingBox,
        keys: &[&str],
    ) -> Result<Bytes, SceneError> {
        let query = query_for(bounding_box, keys);
        debug!("= Overpass query: {query}");

        let response = self.client.post(&self.api_url).body(query).send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(SceneError::HttpStatus { status });
        }
        let bytes = response.bytes().await?;
        info!("Overpass delivered {} bytes for {}", bytes.len(), bounding_box);
        Ok(bytes)
    }
}

/// Overpass QL: the ways of the keys, then their nodes (recurse down).
pub fn query_for(bounding_box: &GeoBoundingBox, keys: &[&str]) -> String {
    let mut query = format!("[out:json][timeout:{}];\n(\n", OVERPASS_TIMEOUT);
    for key in keys {
        query += &format!("  way[\"{}\"]({});\n", key, bounding_box);
    }
    query += ");\nout body;\n>;\nout skel qt;\n";
    query
}

///////////////////////////////////////////////////////////////////////////////////////////////////
// JSON ///////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug, Clone)]
pub struct JsonElement {
    pub id: u64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub nodes: Option<Vec<u64>>,
    pub tags: Option<Tags>,
}

#[derive(Deserialize, Debug)]
pub struct JsonData {
    pub elements: Vec<JsonElement>,
}

pub fn scan_json_bytes(
    bytes: &Bytes,
    config: &SceneConfig,
    jitter: &mut dyn Jitter,
) -> Result<Scene, SceneError> {
    scan_json_slice(bytes, config, jitter)
}

pub fn scan_json_slice(
    bytes: &[u8],
    config: &SceneConfig,
    jitter: &mut dyn Jitter,
) -> Result<Scene, SceneError> {
    let json_data: JsonData = serde_json::from_slice(bytes)?;
    scan_json(json_data, config, jitter)
}

pub fn scan_json(
    json_data: JsonData,
    config: &SceneConfig,
    jitter: &mut dyn Jitter,
) -> Result<Scene, SceneError> {
    info!("Overpass batch of {} elements", json_data.elements.len());
    let mut osm2layer = Osm2Layer::create(*config);
    for element in json_data.elements {
        match element.element_type.as_str() {
            "node" => match (element.lat, element.lon) {
                (Some(latitude), Some(longitude)) => {
                    osm2layer.add_node(element.id, latitude, longitude)
                }
                _ => warn!("Node {} without coordinates", element.id),
            },

            "way" => match element.nodes {
                Some(nodes) => osm2layer.add_way(element.id, nodes, element.tags),
                None => warn!("Way {} without nodes", element.id),
            },

            // multipolygons are not built (yet)
            "relation" => debug!("Relation {} ignored", element.id),

            _ => warn!(
                "Unknown element type: {}  id: {}",
                element.element_type, element.id
            ),
        }
    }

    osm2layer.scan(jitter)
}
