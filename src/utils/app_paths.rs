use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "dokumentu";

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join(APP_DIR);

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn logs_dir() -> Result<PathBuf> {
        let logs_dir = Self::data_dir()?.join("logs");
        fs::create_dir_all(&logs_dir)?;
        Ok(logs_dir)
    }

    /// Timestamped log file for one session
    pub fn session_log_file() -> Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Ok(Self::logs_dir()?.join(format!("dokumentu_{}.log", stamp)))
    }
}
