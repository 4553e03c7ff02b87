use log::debug;
use serde::Serialize;

use crate::model::Item;

/// Current item-list selections as the presentation layer holds them.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemFilter {
  pub search: String,
  pub pool: String,
  pub quality: Option<i64>,
}

impl ItemFilter {
  pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
    filter_items(items, &self.search, &self.pool, self.quality)
  }
}

/// Reads the quality selector. Blank means "any quality"; text that is
/// not a whole number is ignored.
pub fn parse_quality(selection: &str) -> Option<i64> {
  let trimmed = selection.trim();
  if trimmed.is_empty() {
    return None;
  }
  match trimmed.parse::<i64>() {
    Ok(quality) => Some(quality),
    Err(_) => {
      debug!("Ignoring quality selection '{}'", trimmed);
      None
    }
  }
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
  haystack
    .map(|text| text.to_lowercase().contains(needle))
    .unwrap_or(false)
}

pub fn filter_items<'a>(
  items: &'a [Item],
  query: &str,
  pool: &str,
  quality: Option<i64>,
) -> Vec<&'a Item> {
  let query = query.trim().to_lowercase();
  let pool = pool.to_lowercase();

  items
    .iter()
    .filter(|item| {
      query.is_empty()
        || contains_folded(Some(item.name.as_str()), &query)
        || contains_folded(item.description.as_deref(), &query)
    })
    .filter(|item| pool.is_empty() || item.pool.as_deref().unwrap_or_default().to_lowercase() == pool)
    .filter(|item| match quality {
      Some(quality) => i64::from(item.quality.unwrap_or(0)) == quality,
      None => true,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, name: &str, description: Option<&str>, pool: Option<&str>, quality: Option<u8>) -> Item {
    Item {
      id: id.to_string(),
      name: name.to_string(),
      description: description.map(str::to_string),
      icon_url: None,
      quality,
      pool: pool.map(str::to_string),
      quote: None,
      tags: None,
    }
  }

  fn catalog() -> Vec<Item> {
    vec![
      item("1", "The Sad Onion", Some("Tears up"), Some("treasure"), Some(1)),
      item("2", "Bob's Head", Some("Throwable head"), Some("Treasure"), Some(2)),
      item("3", "Brimstone", Some("Blood laser"), Some("devil"), Some(4)),
      item("4", "Breakfast", None, None, None),
    ]
  }

  fn ids(items: Vec<&Item>) -> Vec<&str> {
    items.into_iter().map(|item| item.id.as_str()).collect()
  }

  #[test]
  fn no_filters_returns_full_catalog_in_order() {
    let items = catalog();
    assert_eq!(ids(filter_items(&items, "", "", None)), vec!["1", "2", "3", "4"]);
    assert_eq!(ids(filter_items(&items, "   ", "", None)), vec!["1", "2", "3", "4"]);
  }

  #[test]
  fn query_matches_name_case_insensitively() {
    let items = catalog();
    assert_eq!(ids(filter_items(&items, "bob", "", None)), vec!["2"]);
  }

  #[test]
  fn query_matches_description_and_is_trimmed() {
    let items = catalog();
    assert_eq!(ids(filter_items(&items, "  LASER ", "", None)), vec!["3"]);
  }

  #[test]
  fn pool_is_exact_and_case_insensitive() {
    let items = catalog();
    assert_eq!(ids(filter_items(&items, "", "TREASURE", None)), vec!["1", "2"]);
    assert!(filter_items(&items, "", "treas", None).is_empty());
  }

  #[test]
  fn missing_quality_counts_as_zero() {
    let items = catalog();
    assert_eq!(ids(filter_items(&items, "", "", Some(0))), vec!["4"]);
    assert_eq!(ids(filter_items(&items, "", "", Some(4))), vec!["3"]);
  }

  #[test]
  fn filters_combine() {
    let items = catalog();
    assert_eq!(ids(filter_items(&items, "head", "treasure", Some(2))), vec!["2"]);
    assert!(filter_items(&items, "head", "treasure", Some(1)).is_empty());
  }

  #[test]
  fn quality_selection_parsing() {
    assert_eq!(parse_quality(""), None);
    assert_eq!(parse_quality(" 3 "), Some(3));
    assert_eq!(parse_quality("high"), None);
  }

  #[test]
  fn item_filter_applies_its_selections() {
    let items = catalog();
    let filter = ItemFilter {
      search: "b".to_string(),
      pool: "devil".to_string(),
      quality: None,
    };
    assert_eq!(ids(filter.apply(&items)), vec!["3"]);
  }
}
