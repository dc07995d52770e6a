//! Windowed demo for the Ember layered renderer.
//!
//! Two scenes are available through `EMBER_DEMO`:
//!
//! - `terrain` (default): skybox, lit heightmap with solid props, and
//!   particle shooters. Drag to orbit, scroll to zoom, press space or
//!   right-click for fireworks.
//! - `camera`: synthetic viewfinder backdrop with a streamed
//!   segmentation mask tint. Left-click toggles the overlay.

mod app;
mod scene;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let kind = scene::DemoScene::from_env();
    tracing::info!(?kind, "starting ember demo");

    if let Err(err) = app::run(kind) {
        tracing::error!("demo exited with error: {err}");
        std::process::exit(1);
    }
}
