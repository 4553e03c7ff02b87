use serde::Serialize;

use crate::model::Namespace;
use crate::progress::ProgressTracker;
use crate::store::DataStore;

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  pub paths_done: usize,
  pub paths_total: usize,
  pub unlocks_done: usize,
  pub unlocks_total: usize,
  pub challenges_done: usize,
  pub challenges_total: usize,
  pub total_done: usize,
  pub total_all: usize,
  pub overall_pct: u32,
}

/// Whole-number percentage, rounding halves up. Zero when `total` is zero.
pub fn percent(done: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((200 * done + total) / (2 * total)) as u32
}

pub fn dashboard_stats(store: &DataStore, progress: &ProgressTracker) -> DashboardStats {
  let paths_done = store
    .paths()
    .iter()
    .filter(|path| progress.is_checklist_complete(Namespace::Path, &path.id, &path.steps))
    .count();
  let unlocks_done = store
    .unlocks()
    .iter()
    .filter(|unlock| progress.is_checklist_complete(Namespace::Unlock, &unlock.id, &unlock.steps))
    .count();
  let challenges_done = store
    .challenges()
    .iter()
    .filter(|challenge| progress.is_challenge_done(&challenge.id))
    .count();

  let paths_total = store.paths().len();
  let unlocks_total = store.unlocks().len();
  let challenges_total = store.challenges().len();
  let total_done = paths_done + unlocks_done + challenges_done;
  let total_all = paths_total + unlocks_total + challenges_total;

  DashboardStats {
    paths_done,
    paths_total,
    unlocks_done,
    unlocks_total,
    challenges_done,
    challenges_total,
    total_done,
    total_all,
    overall_pct: percent(total_done, total_all),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Challenge, Path, Step, Unlock};
  use crate::storage::SqliteStore;

  fn tracker() -> ProgressTracker {
    ProgressTracker::new(Box::new(SqliteStore::in_memory().unwrap()))
  }

  fn path(id: &str, step_ids: &[&str]) -> Path {
    Path {
      id: id.to_string(),
      name: id.to_string(),
      description: None,
      steps: step_ids
        .iter()
        .map(|step| Step {
          id: step.to_string(),
          label: step.to_string(),
        })
        .collect(),
    }
  }

  fn challenge(id: &str) -> Challenge {
    Challenge {
      id: id.to_string(),
      number: 1,
      name: "Pitch Black".to_string(),
      difficulty: "medium".to_string(),
      character: "Isaac".to_string(),
      goal: "Mom".to_string(),
      unlock: "Resurrection".to_string(),
      description: None,
      restrictions: None,
    }
  }

  #[test]
  fn percent_rounds_half_up() {
    assert_eq!(percent(1, 8), 13);
    assert_eq!(percent(1, 3), 33);
    assert_eq!(percent(2, 3), 67);
    assert_eq!(percent(1, 200), 1);
    assert_eq!(percent(3, 3), 100);
  }

  #[test]
  fn empty_catalogs_give_zero_percent() {
    let stats = dashboard_stats(&DataStore::new(), &tracker());
    assert_eq!(stats.total_all, 0);
    assert_eq!(stats.overall_pct, 0);
  }

  #[test]
  fn counts_only_fully_checked_entities() {
    let mut store = DataStore::new();
    store.set_paths(vec![path("mom", &["a", "b"]), path("empty", &[]), path("lamb", &["x"])]);
    store.set_unlocks(vec![Unlock {
      id: "cain".to_string(),
      character_name: "Cain".to_string(),
      target_unlock: "Abel".to_string(),
      steps: vec![Step {
        id: "s".to_string(),
        label: "Beat it".to_string(),
      }],
      rewards: None,
    }]);
    store.set_challenges(vec![challenge("1"), challenge("2")]);

    let mut progress = tracker();
    progress.toggle_step(Namespace::Path, "mom", "a");
    progress.toggle_step(Namespace::Path, "mom", "b");
    progress.toggle_step(Namespace::Path, "empty", "a");
    progress.toggle_step(Namespace::Path, "lamb", "other");
    progress.toggle_step(Namespace::Unlock, "cain", "s");
    progress.toggle_challenge("2");

    let stats = dashboard_stats(&store, &progress);
    assert_eq!((stats.paths_done, stats.paths_total), (1, 3));
    assert_eq!((stats.unlocks_done, stats.unlocks_total), (1, 1));
    assert_eq!((stats.challenges_done, stats.challenges_total), (1, 2));
    assert_eq!((stats.total_done, stats.total_all), (3, 6));
    assert_eq!(stats.overall_pct, 50);
  }
}
