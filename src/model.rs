use serde::{Deserialize, Serialize};

pub const CHALLENGE_DONE: &str = "done";
pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const ITEM_POOLS: [&str; 8] = [
  "treasure",
  "devil",
  "angel",
  "shop",
  "boss",
  "secret",
  "golden",
  "planetarium",
];
pub const ITEM_QUALITIES: [u8; 5] = [0, 1, 2, 3, 4];
pub const PLACEHOLDER_ICON: &str = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%2248%22%20height%3D%2248%22%20viewBox%3D%220%200%2048%2048%22%3E%3Crect%20fill%3D%22%233d3228%22%20width%3D%2248%22%20height%3D%2248%22%20rx%3D%224%22%2F%3E%3Ctext%20x%3D%2224%22%20y%3D%2230%22%20font-size%3D%2220%22%20fill%3D%22%239a8f84%22%20text-anchor%3D%22middle%22%20font-family%3D%22sans-serif%22%3E%3F%3C%2Ftext%3E%3C%2Fsvg%3E";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub icon_url: Option<String>,
  pub quality: Option<u8>,
  pub pool: Option<String>,
  pub quote: Option<String>,
  pub tags: Option<Vec<String>>,
}

impl Item {
  /// Icon to display: the catalog's own url, then the conventional
  /// `icons/<id>.png` path, then the inline placeholder.
  pub fn image_url(&self) -> String {
    if let Some(url) = self.icon_url.as_deref().filter(|url| !url.is_empty()) {
      return url.to_string();
    }
    if self.id.is_empty() {
      return PLACEHOLDER_ICON.to_string();
    }
    format!("icons/{}.png", self.id)
  }

  pub fn quality_label(&self) -> Option<String> {
    self.quality.map(|quality| format!("Q{}", quality))
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Step {
  pub id: String,
  pub label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Path {
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub steps: Vec<Step>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
  pub boss: String,
  pub unlock: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Unlock {
  pub id: String,
  pub character_name: String,
  pub target_unlock: String,
  pub steps: Vec<Step>,
  pub rewards: Option<Vec<Reward>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
  pub id: String,
  pub number: i64,
  pub name: String,
  pub difficulty: String,
  pub character: String,
  pub goal: String,
  pub unlock: String,
  pub description: Option<String>,
  pub restrictions: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
  pub id: String,
  pub name: String,
  pub description: String,
  pub requires: i64,
  pub items: Vec<String>,
}

impl Transformation {
  pub fn includes_item(&self, item_name: &str) -> bool {
    let needle = item_name.to_lowercase();
    self.items.iter().any(|name| name.to_lowercase() == needle)
  }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Catalog {
  Items,
  Paths,
  Unlocks,
  Challenges,
  Transformations,
}

impl Catalog {
  pub const ALL: [Catalog; 5] = [
    Catalog::Items,
    Catalog::Paths,
    Catalog::Unlocks,
    Catalog::Challenges,
    Catalog::Transformations,
  ];

  /// Key used both in wrapped payloads and in the embedded dataset.
  pub fn key(self) -> &'static str {
    match self {
      Catalog::Items => "items",
      Catalog::Paths => "paths",
      Catalog::Unlocks => "unlocks",
      Catalog::Challenges => "challenges",
      Catalog::Transformations => "transformations",
    }
  }

  pub fn file_name(self) -> &'static str {
    match self {
      Catalog::Items => "items.fallback.json",
      Catalog::Paths => "paths.json",
      Catalog::Unlocks => "unlocks.json",
      Catalog::Challenges => "challenges.json",
      Catalog::Transformations => "transformations.json",
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Namespace {
  Path,
  Unlock,
  Challenge,
}

impl Namespace {
  pub fn prefix(self) -> &'static str {
    match self {
      Namespace::Path => "isaac-path-",
      Namespace::Unlock => "isaac-unlock-",
      Namespace::Challenge => "isaac-challenge-",
    }
  }

  pub fn storage_key(self, entity_id: &str) -> String {
    format!("{}{}", self.prefix(), entity_id)
  }
}
