use anyhow::{Context, Result};
use tracing::info;

use weathercast::web::{self, AppState};
use weathercast::{ArtifactStore, HttpArtifactSource, WeathercastConfig, load_bundle, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = WeathercastConfig::load()?;
    logging::init(&config.logging)?;
    info!("weathercast v{} starting", weathercast::VERSION);

    let store = ArtifactStore::new(config.artifact_dir());
    let source = HttpArtifactSource::new(&config.artifacts)?;
    let bundle = load_bundle(&store, &source, &config.artifacts.catalog)
        .await
        .with_context(|| {
            format!(
                "Cannot start without all model artifacts in {}",
                store.dir().display()
            )
        })?;

    web::run(&config.server, AppState::new(bundle)).await
}
