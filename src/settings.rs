use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Settings layered as: defaults, optional `twison.toml`, then `TWISON_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// JSON indent width; 0 writes compact JSON.
    pub indent: usize,
    /// Output directory for `batch`.
    pub out_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset.
    pub log: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("twison").required(false))
                .add_source(Environment::with_prefix("TWISON")),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("indent", 2)?
            .set_default("out_dir", ".")?
            .set_default("log", "warn")?
            .build()
            .and_then(Config::try_deserialize)
            .context("Invalid twison configuration")
    }
}
