use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{
  Catalog, Challenge, Item, Path, Reward, Step, Transformation, Unlock, DEFAULT_DIFFICULTY,
};

/// Raw catalog payloads arrive either as a bare list or wrapped in an
/// object keyed by catalog name.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawPayload {
  Bare(Vec<Value>),
  Wrapped(Map<String, Value>),
}

impl RawPayload {
  pub fn from_value(value: Value) -> Result<Self, String> {
    serde_json::from_value(value).map_err(|_| "Catalog payload is neither a list nor an object.".to_string())
  }

  /// Entries of the first wrapper key holding a list. A wrapped object
  /// with none of the keys yields an empty list.
  pub fn into_entries(self, wrapper_keys: &[&str]) -> Vec<Value> {
    match self {
      RawPayload::Bare(entries) => entries,
      RawPayload::Wrapped(mut object) => wrapper_keys
        .iter()
        .find_map(|key| match object.remove(*key) {
          Some(Value::Array(entries)) => Some(entries),
          _ => None,
        })
        .unwrap_or_default(),
    }
  }
}

/// The items API also wraps its list under `data`. Local files do not.
pub const API_WRAPPER_KEYS: &[&str] = &["items", "data"];

/// Wrapper key accepted from static files and the embedded dataset.
pub fn wrapper_keys(catalog: Catalog) -> &'static [&'static str] {
  match catalog {
    Catalog::Items => &["items"],
    Catalog::Paths => &["paths"],
    Catalog::Unlocks => &["unlocks"],
    Catalog::Challenges => &["challenges"],
    Catalog::Transformations => &["transformations"],
  }
}

pub fn normalize_entries<T>(
  catalog: Catalog,
  payload: Value,
  wrapper_keys: &[&str],
  map_entry: fn(&Value) -> Option<T>,
) -> Result<Vec<T>, String> {
  let entries = RawPayload::from_value(payload)?.into_entries(wrapper_keys);
  let total = entries.len();
  let mapped: Vec<T> = entries.iter().filter_map(map_entry).collect();
  if mapped.len() < total {
    debug!(
      "Skipped {} malformed {} entries",
      total - mapped.len(),
      catalog.key()
    );
  }
  Ok(mapped)
}

fn value_text(value: &Value) -> Option<String> {
  match value {
    Value::String(text) => Some(text.clone()),
    Value::Number(number) => Some(number.to_string()),
    Value::Bool(flag) => Some(flag.to_string()),
    _ => None,
  }
}

fn text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|key| object.get(*key).and_then(value_text))
}

fn integer(object: &Map<String, Value>, key: &str) -> Option<i64> {
  match object.get(key)? {
    Value::Number(number) => number
      .as_i64()
      .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64)),
    Value::String(text) => text.trim().parse::<i64>().ok(),
    _ => None,
  }
}

fn text_list(object: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
  let Some(Value::Array(values)) = object.get(key) else {
    return None;
  };
  Some(values.iter().filter_map(value_text).collect())
}

fn required_id(object: &Map<String, Value>) -> Option<String> {
  text(object, &["id"]).filter(|id| !id.trim().is_empty())
}

fn map_steps(object: &Map<String, Value>) -> Vec<Step> {
  let Some(Value::Array(values)) = object.get("steps") else {
    return Vec::new();
  };
  values
    .iter()
    .filter_map(|value| {
      let step = value.as_object()?;
      let id = required_id(step)?;
      let label = text(step, &["label", "name"]).unwrap_or_else(|| id.clone());
      Some(Step { id, label })
    })
    .collect()
}

pub fn map_item(value: &Value) -> Option<Item> {
  let object = value.as_object()?;
  let id = text(object, &["id"])
    .or_else(|| text(object, &["name"]))
    .unwrap_or_default();
  if id.trim().is_empty() {
    return None;
  }

  Some(Item {
    id,
    name: text(object, &["name"]).unwrap_or_default(),
    description: text(object, &["description"]),
    icon_url: text(object, &["icon_url", "iconUrl"]),
    quality: integer(object, "quality")
      .filter(|quality| (0..=4).contains(quality))
      .map(|quality| quality as u8),
    pool: text(object, &["pool"]),
    quote: text(object, &["quote"]),
    tags: text_list(object, "tags"),
  })
}

pub fn map_path(value: &Value) -> Option<Path> {
  let object = value.as_object()?;
  Some(Path {
    id: required_id(object)?,
    name: text(object, &["name"]).unwrap_or_default(),
    description: text(object, &["description"]),
    steps: map_steps(object),
  })
}

pub fn map_unlock(value: &Value) -> Option<Unlock> {
  let object = value.as_object()?;
  let rewards = match object.get("rewards") {
    Some(Value::Array(values)) => Some(
      values
        .iter()
        .filter_map(|value| {
          let reward = value.as_object()?;
          Some(Reward {
            boss: text(reward, &["boss"])?,
            unlock: text(reward, &["unlock"]).unwrap_or_default(),
          })
        })
        .collect(),
    ),
    _ => None,
  };

  Some(Unlock {
    id: required_id(object)?,
    character_name: text(object, &["characterName", "character_name"]).unwrap_or_default(),
    target_unlock: text(object, &["targetUnlock", "target_unlock"]).unwrap_or_default(),
    steps: map_steps(object),
    rewards,
  })
}

pub fn map_challenge(value: &Value) -> Option<Challenge> {
  let object = value.as_object()?;
  let number = integer(object, "number");
  let id = required_id(object).or_else(|| number.map(|number| number.to_string()))?;

  Some(Challenge {
    id,
    number: number.unwrap_or_default(),
    name: text(object, &["name"]).unwrap_or_default(),
    difficulty: text(object, &["difficulty"])
      .filter(|difficulty| !difficulty.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
    character: text(object, &["character"]).unwrap_or_default(),
    goal: text(object, &["goal"]).unwrap_or_default(),
    unlock: text(object, &["unlock"]).unwrap_or_default(),
    description: text(object, &["description"]),
    restrictions: text_list(object, "restrictions"),
  })
}

pub fn map_transformation(value: &Value) -> Option<Transformation> {
  let object = value.as_object()?;
  Some(Transformation {
    id: required_id(object)?,
    name: text(object, &["name"]).unwrap_or_default(),
    description: text(object, &["description"]).unwrap_or_default(),
    requires: integer(object, "requires").unwrap_or_default(),
    items: text_list(object, "items").unwrap_or_default(),
  })
}
