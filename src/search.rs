use serde::Serialize;

use crate::model::{Challenge, Item, Path, Transformation, Unlock};
use crate::store::DataStore;

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_RESULTS_PER_CATALOG: usize = 5;

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults<'a> {
  pub items: Vec<&'a Item>,
  pub paths: Vec<&'a Path>,
  pub unlocks: Vec<&'a Unlock>,
  pub challenges: Vec<&'a Challenge>,
  pub transformations: Vec<&'a Transformation>,
}

impl SearchResults<'_> {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
      && self.paths.is_empty()
      && self.unlocks.is_empty()
      && self.challenges.is_empty()
      && self.transformations.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
      + self.paths.len()
      + self.unlocks.len()
      + self.challenges.len()
      + self.transformations.len()
  }
}

fn any_field_matches(fields: &[Option<&str>], needle: &str) -> bool {
  fields
    .iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn first_matches<'a, T>(
  entries: &'a [T],
  needle: &str,
  fields: impl Fn(&'a T) -> Vec<Option<&'a str>>,
) -> Vec<&'a T> {
  entries
    .iter()
    .filter(|entry| any_field_matches(&fields(*entry), needle))
    .take(MAX_RESULTS_PER_CATALOG)
    .collect()
}

/// Omnibox lookup across every catalog. Each catalog contributes at most
/// five hits, in catalog order.
pub fn search<'a>(store: &'a DataStore, query: &str) -> SearchResults<'a> {
  let needle = query.trim().to_lowercase();
  if needle.chars().count() < MIN_QUERY_CHARS {
    return SearchResults::default();
  }

  SearchResults {
    items: first_matches(store.items(), &needle, |item| {
      vec![Some(item.name.as_str()), item.description.as_deref()]
    }),
    paths: first_matches(store.paths(), &needle, |path| {
      vec![Some(path.name.as_str()), path.description.as_deref()]
    }),
    unlocks: first_matches(store.unlocks(), &needle, |unlock| {
      vec![Some(unlock.character_name.as_str()), Some(unlock.target_unlock.as_str())]
    }),
    challenges: first_matches(store.challenges(), &needle, |challenge| {
      vec![
        Some(challenge.name.as_str()),
        challenge.description.as_deref(),
        Some(challenge.unlock.as_str()),
        Some(challenge.character.as_str()),
      ]
    }),
    transformations: first_matches(store.transformations(), &needle, |transformation| {
      vec![
        Some(transformation.name.as_str()),
        Some(transformation.description.as_str()),
      ]
    }),
  }
}
