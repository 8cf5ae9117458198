use anyhow::{bail, Context};
use meshmap::{
    core::config::InteractionProfile, nodes::registry::format_node_id, CanvasSize,
    JsonFileStore, MapViewBuilder, StaticNodeRegistry,
};
use std::{env, fs, sync::Arc};

const USAGE: &str = "usage: meshmap-app <nodes.json> [settings.json] [WIDTHxHEIGHT]";

/// Parses `800x600` style canvas sizes
fn parse_canvas(arg: &str) -> anyhow::Result<CanvasSize> {
    let (w, h) = arg
        .split_once('x')
        .with_context(|| format!("canvas size must look like 800x600, got {arg:?}"))?;
    Ok(CanvasSize::new(w.trim().parse()?, h.trim().parse()?))
}

/// Headless map viewer: centers on a node snapshot and prints where each node lands
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meshmap::init_logger();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(nodes_path) = args.first() else {
        bail!(USAGE);
    };
    let settings_path = args.get(1).cloned().unwrap_or_else(|| "meshmap-view.json".to_string());
    let canvas = match args.get(2) {
        Some(arg) => parse_canvas(arg)?,
        None => CanvasSize::new(1200, 800),
    };

    let json = fs::read_to_string(nodes_path)
        .with_context(|| format!("reading node snapshot {nodes_path}"))?;
    let registry = StaticNodeRegistry::from_json(&json)?;

    let view = MapViewBuilder::new()
        .with_profile(InteractionProfile::Desktop)
        .with_store(Arc::new(JsonFileStore::new(&settings_path)))
        .with_canvas(canvas)
        .on_persist(|state| log::info!("saved viewport {}", serde_json::json!(state)))
        .build(&registry);

    let viewport = view.viewport();
    println!(
        "viewport: zoom {} tile ({}, {}){}",
        viewport.zoom,
        viewport.tile_x,
        viewport.tile_y,
        if view.is_auto_centering() { " [auto-centered]" } else { " [restored]" }
    );
    if let Some(center) = viewport.center(canvas) {
        println!("center:   {:.5}, {:.5}", center.latitude, center.longitude);
    }

    for marker in view.project_nodes(&registry, canvas) {
        println!(
            "{} {:>9.1} {:>9.1}{}{}",
            marker.label(),
            marker.position.x,
            marker.position.y,
            if marker.is_local { " (local)" } else { "" },
            if marker.is_visible(canvas) { "" } else { " off-screen" },
        );
    }

    let missing = registry.len() - view.project_nodes(&registry, canvas).len();
    if missing > 0 {
        println!("{missing} node(s) without a usable position");
    }
    if let Some(local) = registry.local_node_id {
        log::debug!("local node {}", format_node_id(local));
    }

    view.flush();
    Ok(())
}
