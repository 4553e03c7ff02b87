use std::path::PathBuf;
use std::time::Duration;

use crate::progress::ProgressTracker;
use crate::sources::{CatalogLoader, CatalogSource, EmbeddedSource, FileSource, HttpSource};
use crate::storage::SqliteStore;

pub const API_BASE_DEFAULT: &str = "https://isaac-fastapi.onrender.com";
pub const API_TIMEOUT_MS_DEFAULT: u64 = 5000;
pub const DATA_DIR_DEFAULT: &str = "data";
const APP_DIR_NAME: &str = "isaac-companion";
const DB_FILE_NAME: &str = "progress.db";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
  pub api_base: String,
  pub api_timeout: Duration,
  pub data_dir: PathBuf,
  pub db_path: PathBuf,
  /// Skip the network tier entirely.
  pub offline: bool,
}

pub fn default_db_path() -> PathBuf {
  dirs::data_dir()
    .map(|dir| dir.join(APP_DIR_NAME))
    .unwrap_or_else(|| PathBuf::from("."))
    .join(DB_FILE_NAME)
}

impl Default for AppConfig {
  fn default() -> Self {
    AppConfig {
      api_base: API_BASE_DEFAULT.to_string(),
      api_timeout: Duration::from_millis(API_TIMEOUT_MS_DEFAULT),
      data_dir: PathBuf::from(DATA_DIR_DEFAULT),
      db_path: default_db_path(),
      offline: false,
    }
  }
}

impl AppConfig {
  pub fn build_loader(&self) -> Result<CatalogLoader, String> {
    let primary: Option<Box<dyn CatalogSource>> = if self.offline {
      None
    } else {
      Some(Box::new(HttpSource::new(&self.api_base, self.api_timeout)?))
    };
    Ok(CatalogLoader::new(
      primary,
      Box::new(FileSource::new(self.data_dir.clone())),
      Box::new(EmbeddedSource::bundled()),
    ))
  }

  pub fn open_progress(&self) -> Result<ProgressTracker, String> {
    let store = SqliteStore::open(&self.db_path)?;
    Ok(ProgressTracker::new(Box::new(store)))
  }
}
