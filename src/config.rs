use crate::features::InputBounds;
use crate::model::ArtifactPaths;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, net::SocketAddr, path::PathBuf};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub artifact_dir: PathBuf,
    pub scaler_file: String,
    pub rf_model_file: String,
    pub gpr_model_file: String,
    pub bind_addr: String,
    pub port: u16,
    pub bounds: InputBounds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            scaler_file: "scaler.json".to_string(),
            rf_model_file: "rf_model.json".to_string(),
            gpr_model_file: "gpr_model.json".to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            bounds: InputBounds::default(),
        }
    }
}

impl AppConfig {
    /// JSON file (any subset of fields) if present, then environment on top.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::load(&path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|k| std::env::var(k).ok())?.validated()
    }

    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path))?;
        let cfg: Self = serde_json::from_str(&data)
            .with_context(|| format!("invalid config JSON in {}", path))?;
        cfg.validated()
            .with_context(|| format!("invalid config in {}", path))
    }

    fn validated(self) -> Result<Self> {
        if let Err(e) = self.bounds.check() {
            bail!("invalid input bounds: {}", e);
        }
        Ok(self)
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = var("ARTIFACT_DIR") {
            self.artifact_dir = PathBuf::from(v);
        }
        if let Some(v) = var("SCALER_FILE") {
            self.scaler_file = v;
        }
        if let Some(v) = var("RF_MODEL_FILE") {
            self.rf_model_file = v;
        }
        if let Some(v) = var("GPR_MODEL_FILE") {
            self.gpr_model_file = v;
        }
        if let Some(v) = var("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = var("PORT") {
            self.port = v
                .parse()
                .with_context(|| format!("PORT is not a valid port: {:?}", v))?;
        }
        Ok(self)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(
            &self.artifact_dir,
            &self.scaler_file,
            &self.rf_model_file,
            &self.gpr_model_file,
        )
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .with_context(|| format!("invalid listen address {}", addr))
    }
}
