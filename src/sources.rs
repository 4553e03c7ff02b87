use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::Catalog;
use crate::normalize::{
  map_challenge, map_item, map_path, map_transformation, map_unlock, normalize_entries, wrapper_keys,
  API_WRAPPER_KEYS,
};
use crate::store::{DataStore, ItemSource};

const EMBEDDED_DATASET: &str = include_str!("../data/fallback.json");

/// One attempt at producing a raw catalog payload.
pub trait CatalogSource {
  fn label(&self) -> &str;
  fn fetch(&self, catalog: Catalog) -> Result<Value, String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceTier {
  Primary,
  StaticFile,
  Embedded,
}

impl SourceTier {
  pub fn item_source(self) -> ItemSource {
    match self {
      SourceTier::Primary => ItemSource::Api,
      SourceTier::StaticFile | SourceTier::Embedded => ItemSource::Fallback,
    }
  }

  pub fn wrapper_keys(self, catalog: Catalog) -> &'static [&'static str] {
    match self {
      SourceTier::Primary => API_WRAPPER_KEYS,
      SourceTier::StaticFile | SourceTier::Embedded => wrapper_keys(catalog),
    }
  }
}

/// Remote items endpoint. The client timeout bounds the whole request,
/// so a response that arrives after the deadline is never read.
pub struct HttpSource {
  client: Client,
  api_base: String,
}

impl HttpSource {
  pub fn new(api_base: &str, timeout: Duration) -> Result<Self, String> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| e.to_string())?;
    Ok(HttpSource {
      client,
      api_base: api_base.trim_end_matches('/').to_string(),
    })
  }
}

impl CatalogSource for HttpSource {
  fn label(&self) -> &str {
    "api"
  }

  fn fetch(&self, catalog: Catalog) -> Result<Value, String> {
    if catalog != Catalog::Items {
      return Err(format!("The API does not serve {}.", catalog.key()));
    }

    let response = self
      .client
      .get(format!("{}/{}", self.api_base, catalog.key()))
      .header(USER_AGENT, concat!("isaac-companion/", env!("CARGO_PKG_VERSION")))
      .header(ACCEPT, "application/json")
      .send()
      .map_err(|e| e.to_string())?;

    if !response.status().is_success() {
      return Err(format!("API request failed with status {}", response.status()));
    }

    response.json::<Value>().map_err(|e| e.to_string())
  }
}

/// Static JSON files shipped next to the application, one per catalog.
pub struct FileSource {
  data_dir: PathBuf,
}

impl FileSource {
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    FileSource {
      data_dir: data_dir.into(),
    }
  }
}

impl CatalogSource for FileSource {
  fn label(&self) -> &str {
    "static file"
  }

  fn fetch(&self, catalog: Catalog) -> Result<Value, String> {
    let path = self.data_dir.join(catalog.file_name());
    let body = fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&body).map_err(|e| format!("{}: {}", path.display(), e))
  }
}

/// Last-resort copy of every catalog, compiled into the binary.
pub struct EmbeddedSource {
  dataset: String,
}

impl EmbeddedSource {
  pub fn bundled() -> Self {
    Self::from_json(EMBEDDED_DATASET)
  }

  pub fn from_json(dataset: &str) -> Self {
    EmbeddedSource {
      dataset: dataset.to_string(),
    }
  }
}

impl CatalogSource for EmbeddedSource {
  fn label(&self) -> &str {
    "embedded dataset"
  }

  fn fetch(&self, catalog: Catalog) -> Result<Value, String> {
    let Value::Object(mut dataset) =
      serde_json::from_str::<Value>(&self.dataset).map_err(|e| e.to_string())?
    else {
      return Err("Embedded dataset is not an object.".to_string());
    };
    Ok(dataset.remove(catalog.key()).unwrap_or_else(|| Value::Array(Vec::new())))
  }
}

pub struct CatalogLoader {
  primary: Option<Box<dyn CatalogSource>>,
  static_files: Box<dyn CatalogSource>,
  embedded: Box<dyn CatalogSource>,
}

impl CatalogLoader {
  pub fn new(
    primary: Option<Box<dyn CatalogSource>>,
    static_files: Box<dyn CatalogSource>,
    embedded: Box<dyn CatalogSource>,
  ) -> Self {
    CatalogLoader {
      primary,
      static_files,
      embedded,
    }
  }

  /// Attempts in order. Only the items catalog has a network tier.
  fn chain(&self, catalog: Catalog) -> Vec<(SourceTier, &dyn CatalogSource)> {
    let mut chain: Vec<(SourceTier, &dyn CatalogSource)> = Vec::new();
    if catalog == Catalog::Items {
      if let Some(primary) = self.primary.as_deref() {
        chain.push((SourceTier::Primary, primary));
      }
    }
    chain.push((SourceTier::StaticFile, self.static_files.as_ref()));
    chain.push((SourceTier::Embedded, self.embedded.as_ref()));
    chain
  }

  /// Walks the chain until a tier yields a usable payload.
  pub fn resolve<T>(
    &self,
    catalog: Catalog,
    map_entry: fn(&Value) -> Option<T>,
  ) -> Result<(Vec<T>, SourceTier), String> {
    let mut last_error = String::from("No sources configured.");
    for (tier, source) in self.chain(catalog) {
      match source
        .fetch(catalog)
        .and_then(|payload| normalize_entries(catalog, payload, tier.wrapper_keys(catalog), map_entry))
      {
        Ok(entries) => {
          info!(
            "Loaded {} {} from {}",
            entries.len(),
            catalog.key(),
            source.label()
          );
          return Ok((entries, tier));
        }
        Err(error) => {
          warn!("{} unavailable from {}: {}", catalog.key(), source.label(), error);
          last_error = error;
        }
      }
    }
    Err(last_error)
  }

  /// Settles one catalog in the store. Only items can end in an error
  /// state; the other catalogs degrade to an empty list.
  pub fn load_into(&self, store: &mut DataStore, catalog: Catalog) {
    match catalog {
      Catalog::Items => match self.resolve(catalog, map_item) {
        Ok((items, tier)) => store.set_items(items, tier.item_source()),
        Err(error) => store.fail_items(format!("Could not load items. {}", error)),
      },
      Catalog::Paths => store.set_paths(self.entries_or_empty(catalog, map_path)),
      Catalog::Unlocks => store.set_unlocks(self.entries_or_empty(catalog, map_unlock)),
      Catalog::Challenges => store.set_challenges(self.entries_or_empty(catalog, map_challenge)),
      Catalog::Transformations => {
        store.set_transformations(self.entries_or_empty(catalog, map_transformation))
      }
    }
  }

  fn entries_or_empty<T>(&self, catalog: Catalog, map_entry: fn(&Value) -> Option<T>) -> Vec<T> {
    self
      .resolve(catalog, map_entry)
      .map(|(entries, _)| entries)
      .unwrap_or_default()
  }
}
