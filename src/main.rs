// other crates
use bytes::Bytes;
use clap::Parser;
use serde::Serialize;
use std::borrow::Cow;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
// this crate
use osm_solids::{
    FilterQuery, GeoBoundingBox, GeographicCoordinates, SceneConfig, SeededJitter, Solid, Tags,
    scan_json_bytes,
};

/**** Project patterns ****************************************************************************
 * Don't use apreviations, as Rust does
 * Logging goes to stderr, the JSON result to stdout
 */

#[derive(Parser, Debug)]
#[command(about = "OSM buildings and roads as extruded solids", version, long_about = None)]
pub struct ObiArgs {
    /// Overpass JSON file, instead of asking the Overpass server
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Area to fetch: south,west,north,east (downtown Calgary by default)
    #[arg(
        short,
        long,
        value_parser = parse_bbox,
        default_value = "51.040,-114.080,51.052,-114.055"
    )]
    pub bbox: GeoBoundingBox,
    /// Filter query as JSON: {"filters": [...], "sortBy": "...", "sortOrder": "asc"}
    #[arg(short, long)]
    pub filter: Option<String>,
    /// Seed for the color variation
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// JSON file overriding the scene parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn parse_bbox(text: &str) -> Result<GeoBoundingBox, String> {
    let edges: Vec<f64> = text
        .split(',')
        .map(|edge| edge.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|error| format!("{text}: {error}"))?;
    match edges.as_slice() {
        [south, west, north, east] => Ok(GeoBoundingBox::from_edges(*south, *west, *north, *east)),
        _ => Err(format!("{text}: expected south,west,north,east")),
    }
}

#[derive(Serialize)]
struct SolidSummary<'a> {
    id: u64,
    name: Cow<'a, str>,
    usage: Cow<'a, str>,
    height: f64,
    position: [f64; 3],
    color: [f32; 4],
    tags: &'a Tags,
}

impl<'a> From<&'a Solid> for SolidSummary<'a> {
    fn from(solid: &'a Solid) -> Self {
        Self {
            id: solid.id(),
            name: solid.display_name(),
            usage: solid.usage(),
            height: solid.height(),
            position: solid.position(),
            color: solid.color(),
            tags: solid.tags(),
        }
    }
}

#[derive(Serialize)]
struct SceneSummary<'a> {
    center: GeographicCoordinates,
    solids: Vec<SolidSummary<'a>>,
    roads: usize,
}

#[cfg(feature = "fetch")]
async fn load(args: &ObiArgs) -> Result<Bytes, Box<dyn Error>> {
    match &args.input {
        Some(path) => Ok(Bytes::from(std::fs::read(path)?)),
        None => {
            let input = osm_solids::InputOverpass::new();
            Ok(input.fetch(&args.bbox, &["building", "highway"]).await?)
        }
    }
}

#[cfg(not(feature = "fetch"))]
async fn load(args: &ObiArgs) -> Result<Bytes, Box<dyn Error>> {
    match &args.input {
        Some(path) => Ok(Bytes::from(std::fs::read(path)?)),
        None => Err("No --input given and fetching is not enabled".into()),
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////
// MAIN ///////////////////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("osm_solids=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = ObiArgs::parse();
    info!("*********  OSM solids of {}  *********", args.bbox);

    let config = match &args.config {
        Some(path) => SceneConfig::from_file(path)?,
        None => SceneConfig::default(),
    };
    let mut jitter = match args.seed {
        Some(seed) => SeededJitter::with_seed(seed),
        None => SeededJitter::new(),
    };

    let bytes = load(&args).await?;
    let scene = scan_json_bytes(&bytes, &config, &mut jitter)?;

    let output = match &args.filter {
        Some(text) => {
            let query: FilterQuery = serde_json::from_str(text)?;
            let result = scene.filter(&query);
            info!("Filter matched {} solids", result.count);
            serde_json::to_string_pretty(&result)?
        }
        None => serde_json::to_string_pretty(&SceneSummary {
            center: scene.center(),
            solids: scene.solids().iter().map(SolidSummary::from).collect(),
            roads: scene.roads().len(),
        })?,
    };
    println!("{output}");

    Ok(())
}
