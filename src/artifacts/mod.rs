//! Local model artifacts
//!
//! Artifacts are downloaded once into a directory and never refreshed: a file
//! that exists is trusted by name alone. Removing a file forces a new
//! download on the next start.

pub mod source;

pub use source::{ArtifactSource, HttpArtifactSource};

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::config::{ArtifactCatalog, ArtifactEntry};
use crate::predictors::{
    Artifact, ClassifierArtifact, LabelEncoder, ModelBundle, RegressorArtifact, RegressorSet,
    ScalerArtifact,
};
use crate::{Result, WeathercastError};

/// What `ensure` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    AlreadyPresent,
    Downloaded { bytes: usize },
}

/// Directory holding the artifact files
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Download `entry` unless a file with its name already exists
    #[instrument(skip(self, source), fields(file = %entry.file_name))]
    pub async fn ensure(
        &self,
        source: &dyn ArtifactSource,
        entry: &ArtifactEntry,
    ) -> Result<EnsureOutcome> {
        let path = self.path(&entry.file_name);
        let present = tokio::fs::try_exists(&path).await.map_err(|e| {
            WeathercastError::download(&entry.file_name, format!("cannot check {}: {e}", path.display()))
        })?;
        if present {
            debug!("Artifact already present at {}", path.display());
            return Ok(EnsureOutcome::AlreadyPresent);
        }

        info!("Downloading artifact {} (id {})", entry.file_name, entry.remote_id);
        let bytes = source.fetch(&entry.remote_id).await.map_err(|e| match e {
            WeathercastError::Download { message, .. } => {
                WeathercastError::download(&entry.file_name, message)
            }
            other => WeathercastError::download(&entry.file_name, other.to_string()),
        })?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            WeathercastError::download(
                &entry.file_name,
                format!("cannot create {}: {e}", self.dir.display()),
            )
        })?;
        tokio::fs::write(&path, &bytes).await.map_err(|e| {
            WeathercastError::download(&entry.file_name, format!("cannot write {}: {e}", path.display()))
        })?;

        Ok(EnsureOutcome::Downloaded { bytes: bytes.len() })
    }

    /// Read and deserialize one artifact file
    pub async fn load<T: Artifact>(&self, file_name: &str) -> Result<T> {
        let path = self.path(file_name);
        let content = tokio::fs::read(&path).await.map_err(|e| {
            WeathercastError::deserialization(file_name, format!("cannot read {}: {e}", path.display()))
        })?;

        let artifact: T = serde_json::from_slice(&content)
            .map_err(|e| WeathercastError::deserialization(file_name, e.to_string()))?;
        artifact
            .validate()
            .map_err(|message| WeathercastError::deserialization(file_name, message))?;

        debug!("Loaded artifact {}", file_name);
        Ok(artifact)
    }
}

/// Make sure every catalogue entry is on disk, then load them into a bundle
#[instrument(skip_all, fields(dir = %store.dir().display()))]
pub async fn load_bundle(
    store: &ArtifactStore,
    source: &dyn ArtifactSource,
    catalog: &ArtifactCatalog,
) -> Result<ModelBundle> {
    let mut downloaded = 0;
    for entry in catalog.entries() {
        if let EnsureOutcome::Downloaded { .. } = store.ensure(source, entry).await? {
            downloaded += 1;
        }
    }
    info!("All artifacts present ({} downloaded)", downloaded);

    let scaler: ScalerArtifact = store.load(&catalog.scaler.file_name).await?;
    let regressors = RegressorSet {
        temp_min: Box::new(store.load::<RegressorArtifact>(&catalog.temp_min.file_name).await?),
        temp_max: Box::new(store.load::<RegressorArtifact>(&catalog.temp_max.file_name).await?),
        humidity: Box::new(store.load::<RegressorArtifact>(&catalog.humidity.file_name).await?),
        dew_point: Box::new(store.load::<RegressorArtifact>(&catalog.dew_point.file_name).await?),
    };
    let classifier: ClassifierArtifact = store.load(&catalog.classifier.file_name).await?;
    let label_encoder: LabelEncoder = store.load(&catalog.label_encoder.file_name).await?;

    info!(
        "Model bundle ready ({} weather labels)",
        label_encoder.classes.len()
    );
    Ok(ModelBundle::new(
        Box::new(scaler),
        regressors,
        Box::new(classifier),
        Box::new(label_encoder),
    ))
}
