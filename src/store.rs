use serde::Serialize;

use crate::model::{Catalog, Challenge, Item, Path, Transformation, Unlock};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status", content = "message")]
pub enum LoadState {
  Loading,
  Loaded,
  Error(String),
}

/// Which tier satisfied the items catalog. The embedded dataset counts
/// as a fallback.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ItemSource {
  Api,
  Fallback,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSlot<T> {
  pub entries: Vec<T>,
  pub state: LoadState,
}

impl<T> Default for CatalogSlot<T> {
  fn default() -> Self {
    CatalogSlot {
      entries: Vec::new(),
      state: LoadState::Loading,
    }
  }
}

impl<T> CatalogSlot<T> {
  pub fn is_loading(&self) -> bool {
    self.state == LoadState::Loading
  }

  fn begin(&mut self) {
    self.state = LoadState::Loading;
  }

  fn settle(&mut self, entries: Vec<T>) {
    self.entries = entries;
    self.state = LoadState::Loaded;
  }
}

#[derive(Default, Debug)]
pub struct DataStore {
  items: CatalogSlot<Item>,
  items_source: Option<ItemSource>,
  paths: CatalogSlot<Path>,
  unlocks: CatalogSlot<Unlock>,
  challenges: CatalogSlot<Challenge>,
  transformations: CatalogSlot<Transformation>,
}

impl DataStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn items(&self) -> &[Item] {
    &self.items.entries
  }

  pub fn paths(&self) -> &[Path] {
    &self.paths.entries
  }

  pub fn unlocks(&self) -> &[Unlock] {
    &self.unlocks.entries
  }

  pub fn challenges(&self) -> &[Challenge] {
    &self.challenges.entries
  }

  pub fn transformations(&self) -> &[Transformation] {
    &self.transformations.entries
  }

  pub fn items_source(&self) -> Option<ItemSource> {
    self.items_source
  }

  pub fn load_state(&self, catalog: Catalog) -> &LoadState {
    match catalog {
      Catalog::Items => &self.items.state,
      Catalog::Paths => &self.paths.state,
      Catalog::Unlocks => &self.unlocks.state,
      Catalog::Challenges => &self.challenges.state,
      Catalog::Transformations => &self.transformations.state,
    }
  }

  /// True while any catalog feeding the dashboard is still in flight.
  pub fn progress_catalogs_loading(&self) -> bool {
    self.paths.is_loading() || self.unlocks.is_loading() || self.challenges.is_loading()
  }

  pub fn begin_load(&mut self, catalog: Catalog) {
    match catalog {
      Catalog::Items => self.items.begin(),
      Catalog::Paths => self.paths.begin(),
      Catalog::Unlocks => self.unlocks.begin(),
      Catalog::Challenges => self.challenges.begin(),
      Catalog::Transformations => self.transformations.begin(),
    }
  }

  pub fn set_items(&mut self, items: Vec<Item>, source: ItemSource) {
    self.items.settle(items);
    self.items_source = Some(source);
  }

  pub fn fail_items(&mut self, message: String) {
    self.items.entries.clear();
    self.items.state = LoadState::Error(message);
    self.items_source = None;
  }

  pub fn set_paths(&mut self, paths: Vec<Path>) {
    self.paths.settle(paths);
  }

  pub fn set_unlocks(&mut self, unlocks: Vec<Unlock>) {
    self.unlocks.settle(unlocks);
  }

  pub fn set_challenges(&mut self, challenges: Vec<Challenge>) {
    self.challenges.settle(challenges);
  }

  pub fn set_transformations(&mut self, transformations: Vec<Transformation>) {
    self.transformations.settle(transformations);
  }

  pub fn item_by_id(&self, id: &str) -> Option<&Item> {
    self.items().iter().find(|item| item.id == id)
  }

  pub fn path_by_id(&self, id: &str) -> Option<&Path> {
    self.paths().iter().find(|path| path.id == id)
  }

  pub fn unlock_by_id(&self, id: &str) -> Option<&Unlock> {
    self.unlocks().iter().find(|unlock| unlock.id == id)
  }

  pub fn challenge_by_id(&self, id: &str) -> Option<&Challenge> {
    self.challenges().iter().find(|challenge| challenge.id == id)
  }

  pub fn transformation_by_id(&self, id: &str) -> Option<&Transformation> {
    self.transformations().iter().find(|transformation| transformation.id == id)
  }

  pub fn item_by_name(&self, name: &str) -> Option<&Item> {
    let needle = name.to_lowercase();
    self.items().iter().find(|item| item.name.to_lowercase() == needle)
  }

  pub fn transformations_for_item(&self, item_name: &str) -> Vec<&Transformation> {
    if item_name.is_empty() {
      return Vec::new();
    }
    self
      .transformations()
      .iter()
      .filter(|transformation| transformation.includes_item(item_name))
      .collect()
  }

  /// Pairs every listed item name with the loaded Item of that name, if
  /// the items catalog has one.
  pub fn resolve_transformation_items<'a>(
    &'a self,
    transformation: &'a Transformation,
  ) -> Vec<(&'a str, Option<&'a Item>)> {
    transformation
      .items
      .iter()
      .map(|name| (name.as_str(), self.item_by_name(name)))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, name: &str) -> Item {
    Item {
      id: id.to_string(),
      name: name.to_string(),
      description: None,
      icon_url: None,
      quality: None,
      pool: None,
      quote: None,
      tags: None,
    }
  }

  fn guppy() -> Transformation {
    Transformation {
      id: "guppy".to_string(),
      name: "Guppy".to_string(),
      description: "Become Guppy".to_string(),
      requires: 3,
      items: vec!["Dr. Fetus".to_string(), "Dead Cat".to_string()],
    }
  }

  #[test]
  fn starts_loading_and_settles_per_catalog() {
    let mut store = DataStore::new();
    for catalog in Catalog::ALL {
      assert_eq!(store.load_state(catalog), &LoadState::Loading);
    }
    store.set_paths(Vec::new());
    assert_eq!(store.load_state(Catalog::Paths), &LoadState::Loaded);
    assert_eq!(store.load_state(Catalog::Items), &LoadState::Loading);
    assert!(store.progress_catalogs_loading());
  }

  #[test]
  fn items_track_source_and_error() {
    let mut store = DataStore::new();
    store.set_items(vec![item("1", "Sad Onion")], ItemSource::Fallback);
    assert_eq!(store.items_source(), Some(ItemSource::Fallback));

    store.fail_items("Could not load items.".to_string());
    assert!(store.items().is_empty());
    assert_eq!(
      store.load_state(Catalog::Items),
      &LoadState::Error("Could not load items.".to_string())
    );
  }

  #[test]
  fn transformation_items_resolve_by_name_ignoring_case() {
    let mut store = DataStore::new();
    store.set_items(vec![item("52", "dr. fetus")], ItemSource::Api);
    store.set_transformations(vec![guppy()]);

    let transformation = store.transformation_by_id("guppy").unwrap();
    let resolved = store.resolve_transformation_items(transformation);
    assert_eq!(resolved[0].0, "Dr. Fetus");
    assert_eq!(resolved[0].1.map(|item| item.id.as_str()), Some("52"));
    assert!(resolved[1].1.is_none());
  }

  #[test]
  fn transformations_for_item_tolerates_unloaded_items() {
    let mut store = DataStore::new();
    store.set_transformations(vec![guppy()]);
    assert_eq!(store.transformations_for_item("DEAD CAT").len(), 1);
    assert!(store.transformations_for_item("").is_empty());
  }
}
