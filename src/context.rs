use crate::dashboard::{dashboard_stats, DashboardStats};
use crate::filter::{filter_items, parse_quality, ItemFilter};
use crate::model::{Catalog, Item, Namespace};
use crate::progress::{ProgressTracker, StepSet};
use crate::search::{search, SearchResults};
use crate::sources::CatalogLoader;
use crate::store::{DataStore, LoadState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
  LoadStarted(Catalog),
  LoadSettled(Catalog),
  Progress(Namespace, String),
  ItemFilter,
}

pub type RenderHook = Box<dyn FnMut(u64, &Change)>;

/// Everything the presentation layer reads and writes. Core operations
/// take their inputs from here rather than from ambient state.
pub struct Companion {
  store: DataStore,
  progress: ProgressTracker,
  item_filter: ItemFilter,
  revision: u64,
  render_hook: Option<RenderHook>,
}

impl Companion {
  pub fn new(progress: ProgressTracker) -> Self {
    Companion {
      store: DataStore::new(),
      progress,
      item_filter: ItemFilter::default(),
      revision: 0,
      render_hook: None,
    }
  }

  pub fn with_render_hook(mut self, hook: RenderHook) -> Self {
    self.render_hook = Some(hook);
    self
  }

  /// Bumped after every state-affecting completion.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  fn notify(&mut self, change: Change) {
    self.revision += 1;
    let revision = self.revision;
    if let Some(hook) = self.render_hook.as_mut() {
      hook(revision, &change);
    }
  }

  pub fn store(&self) -> &DataStore {
    &self.store
  }

  pub fn progress(&self) -> &ProgressTracker {
    &self.progress
  }

  pub fn load_state(&self, catalog: Catalog) -> &LoadState {
    self.store.load_state(catalog)
  }

  pub fn load_catalog(&mut self, loader: &CatalogLoader, catalog: Catalog) {
    self.store.begin_load(catalog);
    self.notify(Change::LoadStarted(catalog));
    loader.load_into(&mut self.store, catalog);
    self.notify(Change::LoadSettled(catalog));
  }

  /// Catalogs settle independently; a failing one never holds up the rest.
  pub fn load_all(&mut self, loader: &CatalogLoader) {
    for catalog in Catalog::ALL {
      self.load_catalog(loader, catalog);
    }
  }

  pub fn item_filter(&self) -> &ItemFilter {
    &self.item_filter
  }

  pub fn set_item_search(&mut self, search: &str) {
    self.item_filter.search = search.to_string();
    self.notify(Change::ItemFilter);
  }

  pub fn set_item_pool(&mut self, pool: &str) {
    self.item_filter.pool = pool.to_string();
    self.notify(Change::ItemFilter);
  }

  pub fn set_item_quality(&mut self, selection: &str) {
    self.item_filter.quality = parse_quality(selection);
    self.notify(Change::ItemFilter);
  }

  pub fn filtered_items(&self) -> Vec<&Item> {
    self.item_filter.apply(self.store.items())
  }

  pub fn filter_items(&self, query: &str, pool: &str, quality: Option<i64>) -> Vec<&Item> {
    filter_items(self.store.items(), query, pool, quality)
  }

  pub fn search(&self, query: &str) -> SearchResults<'_> {
    search(&self.store, query)
  }

  pub fn dashboard_stats(&self) -> DashboardStats {
    dashboard_stats(&self.store, &self.progress)
  }

  pub fn get_checked(&self, namespace: Namespace, entity_id: &str) -> StepSet {
    self.progress.get_checked(namespace, entity_id)
  }

  pub fn set_checked(&mut self, namespace: Namespace, entity_id: &str, step_ids: &StepSet) {
    self.progress.set_checked(namespace, entity_id, step_ids);
    self.notify(Change::Progress(namespace, entity_id.to_string()));
  }

  pub fn clear_checked(&mut self, namespace: Namespace, entity_id: &str) {
    self.progress.clear_checked(namespace, entity_id);
    self.notify(Change::Progress(namespace, entity_id.to_string()));
  }

  pub fn toggle_step(&mut self, namespace: Namespace, entity_id: &str, step_id: &str) -> StepSet {
    let checked = self.progress.toggle_step(namespace, entity_id, step_id);
    self.notify(Change::Progress(namespace, entity_id.to_string()));
    checked
  }

  pub fn toggle_challenge(&mut self, challenge_id: &str) -> bool {
    let done = self.progress.toggle_challenge(challenge_id);
    self.notify(Change::Progress(Namespace::Challenge, challenge_id.to_string()));
    done
  }

  /// First half of a reset: nothing is cleared until the returned
  /// request is confirmed.
  pub fn request_reset(&self, namespace: Namespace, entity_id: &str) -> PendingReset {
    PendingReset {
      namespace,
      entity_id: entity_id.to_string(),
    }
  }
}

#[must_use = "a reset does nothing until it is confirmed"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReset {
  namespace: Namespace,
  entity_id: String,
}

impl PendingReset {
  pub fn prompt(&self) -> String {
    let kind = match self.namespace {
      Namespace::Path => "path",
      Namespace::Unlock => "unlock",
      Namespace::Challenge => "challenge",
    };
    format!("Reset all progress for this {}?", kind)
  }

  pub fn confirm(self, companion: &mut Companion) {
    companion.clear_checked(self.namespace, &self.entity_id);
  }
}
