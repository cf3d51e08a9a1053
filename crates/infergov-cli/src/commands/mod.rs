pub mod policy;
pub mod registry;
pub mod replay;
pub mod show;

use clap::Args;
use infergov_core::logging_facility;
use infergov_engine::PipelineConfig;
use infergov_store::ArtifactStore;
use std::path::PathBuf;

/// Where the store lives: a config file, or a bare store directory
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Pipeline config (TOML); its store_root wins over --store
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = ".infergov")]
    pub store: PathBuf,
}

impl StoreArgs {
    pub fn pipeline_config(&self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => PipelineConfig::from_path(path)?,
            None => PipelineConfig::with_store_root(self.store.clone()),
        };
        logging_facility::init(config.logging_profile);
        Ok(config)
    }

    pub fn open_store(&self) -> Result<ArtifactStore, Box<dyn std::error::Error>> {
        let config = self.pipeline_config()?;
        if !config.store_root.is_dir() {
            return Err(format!("store not found at {}", config.store_root.display()).into());
        }
        Ok(config.open_store()?)
    }
}
