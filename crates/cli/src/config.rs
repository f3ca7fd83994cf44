use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_ADMIN_PIN: &str = "2005";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub admin_pin: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var("MULTIGAME_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(std::env::VarError::NotPresent) => PathBuf::from(DEFAULT_DATA_DIR),
            Err(e) => return Err(e).context("MULTIGAME_DATA_DIR must be valid unicode"),
        };

        let admin_pin = std::env::var("ADMIN_PIN")
            .ok()
            .map(|pin| pin.trim().to_string())
            .filter(|pin| !pin.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PIN.to_string());

        Ok(Self {
            data_dir,
            admin_pin,
        })
    }

    /// Command line values take precedence over the environment.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}
