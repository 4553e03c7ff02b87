use log::{debug, warn};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

use crate::model::{Namespace, Step, CHALLENGE_DONE};
use crate::storage::KeyValueStore;

pub type StepSet = BTreeSet<String>;

/// Completion sets keyed by (namespace, entity id). Reads never fail:
/// absent or unreadable records are the empty set. Write failures are
/// logged and dropped; the session keeps what was written either way.
pub struct ProgressTracker {
  store: Box<dyn KeyValueStore>,
  /// Every set or clear made this session, keyed like the store. `None`
  /// marks a cleared record.
  session: HashMap<String, Option<StepSet>>,
}

impl ProgressTracker {
  pub fn new(store: Box<dyn KeyValueStore>) -> Self {
    ProgressTracker {
      store,
      session: HashMap::new(),
    }
  }

  pub fn get_checked(&self, namespace: Namespace, entity_id: &str) -> StepSet {
    let key = namespace.storage_key(entity_id);
    if let Some(written) = self.session.get(&key) {
      return written.clone().unwrap_or_default();
    }
    self.read_stored(&key)
  }

  fn read_stored(&self, key: &str) -> StepSet {
    let raw = match self.store.get(key) {
      Ok(Some(raw)) if !raw.is_empty() => raw,
      Ok(_) => return StepSet::new(),
      Err(error) => {
        warn!("Could not read progress {}: {}", key, error);
        return StepSet::new();
      }
    };

    match serde_json::from_str::<Value>(&raw) {
      Ok(Value::Array(values)) => values
        .into_iter()
        .filter_map(|value| match value {
          Value::String(step_id) => Some(step_id),
          Value::Number(number) => Some(number.to_string()),
          _ => None,
        })
        .collect(),
      Ok(_) => StepSet::new(),
      Err(error) => {
        debug!("Ignoring corrupt progress {}: {}", key, error);
        StepSet::new()
      }
    }
  }

  pub fn set_checked(&mut self, namespace: Namespace, entity_id: &str, step_ids: &StepSet) {
    let key = namespace.storage_key(entity_id);
    let result = serde_json::to_string(step_ids)
      .map_err(|e| e.to_string())
      .and_then(|serialized| self.store.set(&key, &serialized));
    if let Err(error) = result {
      warn!("Could not persist progress {}: {}", key, error);
    }
    self.session.insert(key, Some(step_ids.clone()));
  }

  pub fn clear_checked(&mut self, namespace: Namespace, entity_id: &str) {
    let key = namespace.storage_key(entity_id);
    if let Err(error) = self.store.remove(&key) {
      warn!("Could not clear progress {}: {}", key, error);
    }
    self.session.insert(key, None);
  }

  /// Flips one step and writes the whole set back.
  pub fn toggle_step(&mut self, namespace: Namespace, entity_id: &str, step_id: &str) -> StepSet {
    let mut checked = self.get_checked(namespace, entity_id);
    if !checked.remove(step_id) {
      checked.insert(step_id.to_string());
    }
    self.set_checked(namespace, entity_id, &checked);
    checked
  }

  pub fn toggle_challenge(&mut self, challenge_id: &str) -> bool {
    self
      .toggle_step(Namespace::Challenge, challenge_id, CHALLENGE_DONE)
      .contains(CHALLENGE_DONE)
  }

  pub fn is_challenge_done(&self, challenge_id: &str) -> bool {
    self
      .get_checked(Namespace::Challenge, challenge_id)
      .contains(CHALLENGE_DONE)
  }

  pub fn step_counts(&self, namespace: Namespace, entity_id: &str, steps: &[Step]) -> (usize, usize) {
    let checked = self.get_checked(namespace, entity_id);
    (count_checked(steps, &checked), steps.len())
  }

  pub fn is_checklist_complete(&self, namespace: Namespace, entity_id: &str, steps: &[Step]) -> bool {
    is_complete(steps, &self.get_checked(namespace, entity_id))
  }
}

pub fn count_checked(steps: &[Step], checked: &StepSet) -> usize {
  steps.iter().filter(|step| checked.contains(&step.id)).count()
}

/// A checklist with no steps is never complete.
pub fn is_complete(steps: &[Step], checked: &StepSet) -> bool {
  !steps.is_empty() && steps.iter().all(|step| checked.contains(&step.id))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::SqliteStore;

  struct BrokenStore;

  impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, String> {
      Err("disk unavailable".to_string())
    }
    fn set(&mut self, _key: &str, _value: &str) -> Result<(), String> {
      Err("quota exceeded".to_string())
    }
    fn remove(&mut self, _key: &str) -> Result<(), String> {
      Err("disk unavailable".to_string())
    }
  }

  /// Reads work, writes are refused.
  struct QuotaStore {
    inner: SqliteStore,
  }

  impl KeyValueStore for QuotaStore {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
      self.inner.get(key)
    }
    fn set(&mut self, _key: &str, _value: &str) -> Result<(), String> {
      Err("quota exceeded".to_string())
    }
    fn remove(&mut self, _key: &str) -> Result<(), String> {
      Err("quota exceeded".to_string())
    }
  }

  fn tracker() -> ProgressTracker {
    ProgressTracker::new(Box::new(SqliteStore::in_memory().unwrap()))
  }

  fn set_of(ids: &[&str]) -> StepSet {
    ids.iter().map(|id| id.to_string()).collect()
  }

  fn steps(ids: &[&str]) -> Vec<Step> {
    ids
      .iter()
      .map(|id| Step {
        id: id.to_string(),
        label: id.to_uppercase(),
      })
      .collect()
  }

  #[test]
  fn set_then_get_round_trips_and_clear_empties() {
    let mut tracker = tracker();
    let checked = set_of(&["s1", "s3"]);
    tracker.set_checked(Namespace::Path, "mom", &checked);
    assert_eq!(tracker.get_checked(Namespace::Path, "mom"), checked);

    tracker.clear_checked(Namespace::Path, "mom");
    assert!(tracker.get_checked(Namespace::Path, "mom").is_empty());
  }

  #[test]
  fn namespaces_are_independent() {
    let mut tracker = tracker();
    tracker.set_checked(Namespace::Path, "1", &set_of(&["a"]));
    assert!(tracker.get_checked(Namespace::Unlock, "1").is_empty());
    assert!(tracker.get_checked(Namespace::Challenge, "1").is_empty());
  }

  #[test]
  fn toggling_twice_restores_the_original_set() {
    let mut tracker = tracker();
    let original = set_of(&["s1"]);
    tracker.set_checked(Namespace::Unlock, "cain", &original);

    let after_first = tracker.toggle_step(Namespace::Unlock, "cain", "s2");
    assert_eq!(after_first, set_of(&["s1", "s2"]));
    tracker.toggle_step(Namespace::Unlock, "cain", "s2");
    assert_eq!(tracker.get_checked(Namespace::Unlock, "cain"), original);
  }

  #[test]
  fn consecutive_toggles_of_different_steps_both_stick() {
    let mut tracker = tracker();
    tracker.toggle_step(Namespace::Path, "mom", "a");
    tracker.toggle_step(Namespace::Path, "mom", "b");
    assert_eq!(tracker.get_checked(Namespace::Path, "mom"), set_of(&["a", "b"]));
  }

  #[test]
  fn corrupt_records_read_as_empty() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.set("isaac-path-mom", "{not json").unwrap();
    store.set("isaac-path-dad", "{\"a\":1}").unwrap();
    let tracker = ProgressTracker::new(Box::new(store));
    assert!(tracker.get_checked(Namespace::Path, "mom").is_empty());
    assert!(tracker.get_checked(Namespace::Path, "dad").is_empty());
  }

  #[test]
  fn storage_failures_are_swallowed() {
    let mut tracker = ProgressTracker::new(Box::new(BrokenStore));
    let now = tracker.toggle_step(Namespace::Path, "mom", "a");
    assert_eq!(now, set_of(&["a"]));
    assert_eq!(tracker.get_checked(Namespace::Path, "mom"), set_of(&["a"]));
    tracker.toggle_step(Namespace::Path, "mom", "b");
    assert_eq!(tracker.get_checked(Namespace::Path, "mom"), set_of(&["a", "b"]));
    tracker.clear_checked(Namespace::Path, "mom");
    assert!(tracker.get_checked(Namespace::Path, "mom").is_empty());
  }

  #[test]
  fn refused_writes_still_show_for_the_session() {
    let mut inner = SqliteStore::in_memory().unwrap();
    inner.set("isaac-path-mom", "[\"basement\"]").unwrap();
    let mut tracker = ProgressTracker::new(Box::new(QuotaStore { inner }));

    assert!(tracker.toggle_challenge("9"));
    assert!(tracker.is_challenge_done("9"));
    assert_eq!(tracker.get_checked(Namespace::Challenge, "9"), set_of(&[CHALLENGE_DONE]));

    let mut store = crate::store::DataStore::new();
    store.set_challenges(vec![crate::model::Challenge {
      id: "9".to_string(),
      number: 9,
      name: "Demo Man".to_string(),
      difficulty: "medium".to_string(),
      character: "Isaac".to_string(),
      goal: "Mom's Heart".to_string(),
      unlock: "Unicorn Stump".to_string(),
      description: None,
      restrictions: None,
    }]);
    assert_eq!(crate::dashboard::dashboard_stats(&store, &tracker).challenges_done, 1);

    assert_eq!(tracker.get_checked(Namespace::Path, "mom"), set_of(&["basement"]));
    tracker.clear_checked(Namespace::Path, "mom");
    assert!(tracker.get_checked(Namespace::Path, "mom").is_empty());
  }

  #[test]
  fn challenge_uses_done_sentinel() {
    let mut tracker = tracker();
    assert!(tracker.toggle_challenge("7"));
    assert!(tracker.is_challenge_done("7"));
    assert_eq!(tracker.get_checked(Namespace::Challenge, "7"), set_of(&[CHALLENGE_DONE]));
    assert!(!tracker.toggle_challenge("7"));
    assert!(!tracker.is_challenge_done("7"));
  }

  #[test]
  fn empty_checklist_is_never_complete() {
    let mut tracker = tracker();
    tracker.set_checked(Namespace::Path, "empty", &set_of(&["anything"]));
    assert!(!tracker.is_checklist_complete(Namespace::Path, "empty", &[]));
    assert!(!is_complete(&[], &set_of(&["anything"])));
  }

  #[test]
  fn step_counts_ignore_unknown_step_ids() {
    let mut tracker = tracker();
    tracker.set_checked(Namespace::Path, "mom", &set_of(&["a", "stale"]));
    assert_eq!(tracker.step_counts(Namespace::Path, "mom", &steps(&["a", "b"])), (1, 2));
    assert!(!tracker.is_checklist_complete(Namespace::Path, "mom", &steps(&["a", "b"])));
    tracker.toggle_step(Namespace::Path, "mom", "b");
    assert!(tracker.is_checklist_complete(Namespace::Path, "mom", &steps(&["a", "b"])));
  }
}
