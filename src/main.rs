use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use companion_lib::config::{AppConfig, API_BASE_DEFAULT, API_TIMEOUT_MS_DEFAULT, DATA_DIR_DEFAULT};
use companion_lib::context::Companion;
use companion_lib::dashboard::percent;
use companion_lib::filter::parse_quality;
use companion_lib::model::{Catalog, Item, Namespace, Step, ITEM_POOLS, ITEM_QUALITIES};
use companion_lib::store::{ItemSource, LoadState};

/// Binding of Isaac companion: catalogs, progress and search
#[derive(Parser)]
#[command(name = "isaac-companion", version, about, long_about = None)]
struct Cli {
  /// Base url of the remote item catalog
  #[arg(long, env = "ISAAC_API_BASE", default_value = API_BASE_DEFAULT, global = true)]
  api_base: String,

  /// Deadline for the remote item catalog, in milliseconds
  #[arg(long, env = "ISAAC_API_TIMEOUT_MS", default_value_t = API_TIMEOUT_MS_DEFAULT, global = true)]
  api_timeout_ms: u64,

  /// Directory holding the static catalog files
  #[arg(long, env = "ISAAC_DATA_DIR", default_value = DATA_DIR_DEFAULT, global = true)]
  data_dir: PathBuf,

  /// Progress database (defaults to the user data directory)
  #[arg(long, env = "ISAAC_DB_PATH", global = true)]
  db_path: Option<PathBuf>,

  /// Never contact the remote catalog
  #[arg(long, global = true)]
  offline: bool,

  /// Print JSON instead of text
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Completion overview for paths, unlocks and challenges
  Dashboard,
  /// List items, optionally filtered
  Items {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "")]
    pool: String,
    /// Quality 0-4; blank for any
    #[arg(long, default_value = "")]
    quality: String,
  },
  /// Show one entry of a catalog
  Show { kind: CatalogArg, id: String },
  /// List one catalog
  List { kind: CatalogArg },
  /// Search every catalog at once
  Search { query: String },
  /// Check or uncheck a path/unlock step
  Toggle { kind: ChecklistArg, id: String, step: String },
  /// Mark a challenge done, or not done
  Complete { id: String },
  /// Clear all progress for one entry
  Reset {
    kind: ChecklistArg,
    id: String,
    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogArg {
  Item,
  Path,
  Unlock,
  Challenge,
  Transformation,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChecklistArg {
  Path,
  Unlock,
  Challenge,
}

impl ChecklistArg {
  fn namespace(self) -> Namespace {
    match self {
      ChecklistArg::Path => Namespace::Path,
      ChecklistArg::Unlock => Namespace::Unlock,
      ChecklistArg::Challenge => Namespace::Challenge,
    }
  }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
  serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn progress_bar(done: usize, total: usize) -> String {
  let pct = percent(done, total);
  let filled = (pct / 5) as usize;
  format!("[{}{}] {}/{} ({}%)", "#".repeat(filled), "-".repeat(20 - filled), done, total, pct)
}

fn item_line(item: &Item) -> String {
  let mut meta = Vec::new();
  if let Some(label) = item.quality_label() {
    meta.push(label);
  }
  if let Some(pool) = item.pool.as_deref() {
    meta.push(pool.to_string());
  }
  if meta.is_empty() {
    format!("{:>5}  {}", item.id, item.name)
  } else {
    format!("{:>5}  {} ({})", item.id, item.name, meta.join(" · "))
  }
}

fn checklist_lines(steps: &[Step], companion: &Companion, namespace: Namespace, id: &str) -> Vec<String> {
  let checked = companion.get_checked(namespace, id);
  steps
    .iter()
    .map(|step| {
      let mark = if checked.contains(&step.id) { "x" } else { " " };
      format!("  [{}] {} ({})", mark, step.label, step.id)
    })
    .collect()
}

fn render_dashboard(companion: &Companion) -> Vec<String> {
  let stats = companion.dashboard_stats();
  if companion.store().progress_catalogs_loading() {
    return vec!["Loading progress...".to_string()];
  }
  vec![
    format!("Overall     {}% ({} of {})", stats.overall_pct, stats.total_done, stats.total_all),
    format!("Paths       {}", progress_bar(stats.paths_done, stats.paths_total)),
    format!("Unlocks     {}", progress_bar(stats.unlocks_done, stats.unlocks_total)),
    format!("Challenges  {}", progress_bar(stats.challenges_done, stats.challenges_total)),
  ]
}

fn render_items(companion: &Companion) -> Vec<String> {
  if let LoadState::Error(message) = companion.load_state(Catalog::Items) {
    return vec![message.clone()];
  }
  let mut lines: Vec<String> = companion.filtered_items().into_iter().map(item_line).collect();
  if lines.is_empty() {
    lines.push("No items match your filters.".to_string());
  }
  if companion.store().items_source() == Some(ItemSource::Fallback) {
    lines.push("Showing offline data.".to_string());
  }
  lines
}

fn render_detail(companion: &Companion, kind: CatalogArg, id: &str) -> Result<Vec<String>, String> {
  let store = companion.store();
  let not_found = || format!("Nothing found with id '{}'.", id);
  let mut lines = Vec::new();
  match kind {
    CatalogArg::Item => {
      let item = store.item_by_id(id).ok_or_else(not_found)?;
      lines.push(item_line(item));
      lines.push(format!("  icon: {}", item.image_url()));
      if let Some(quote) = item.quote.as_deref() {
        lines.push(format!("  \u{201c}{}\u{201d}", quote));
      }
      if let Some(description) = item.description.as_deref() {
        lines.push(format!("  {}", description));
      }
      for transformation in store.transformations_for_item(&item.name) {
        lines.push(format!("  part of {} ({} needed)", transformation.name, transformation.requires));
      }
    }
    CatalogArg::Path => {
      let path = store.path_by_id(id).ok_or_else(not_found)?;
      let (done, total) = companion.progress().step_counts(Namespace::Path, &path.id, &path.steps);
      lines.push(format!("{}  {}", path.name, progress_bar(done, total)));
      if let Some(description) = path.description.as_deref() {
        lines.push(format!("  {}", description));
      }
      lines.extend(checklist_lines(&path.steps, companion, Namespace::Path, &path.id));
    }
    CatalogArg::Unlock => {
      let unlock = store.unlock_by_id(id).ok_or_else(not_found)?;
      let (done, total) = companion.progress().step_counts(Namespace::Unlock, &unlock.id, &unlock.steps);
      lines.push(format!(
        "{} -> {}  {}",
        unlock.character_name,
        unlock.target_unlock,
        progress_bar(done, total)
      ));
      lines.extend(checklist_lines(&unlock.steps, companion, Namespace::Unlock, &unlock.id));
      for reward in unlock.rewards.iter().flatten() {
        lines.push(format!("  {}: {}", reward.boss, reward.unlock));
      }
    }
    CatalogArg::Challenge => {
      let challenge = store.challenge_by_id(id).ok_or_else(not_found)?;
      let status = if companion.progress().is_challenge_done(&challenge.id) { "done" } else { "open" };
      lines.push(format!(
        "#{} {} [{}] ({})",
        challenge.number, challenge.name, challenge.difficulty, status
      ));
      lines.push(format!("  {} vs {}, unlocks {}", challenge.character, challenge.goal, challenge.unlock));
      if let Some(description) = challenge.description.as_deref() {
        lines.push(format!("  {}", description));
      }
      for restriction in challenge.restrictions.iter().flatten() {
        lines.push(format!("  - {}", restriction));
      }
    }
    CatalogArg::Transformation => {
      let transformation = store.transformation_by_id(id).ok_or_else(not_found)?;
      lines.push(format!("{} ({} items needed)", transformation.name, transformation.requires));
      lines.push(format!("  {}", transformation.description));
      for (name, item) in store.resolve_transformation_items(transformation) {
        match item {
          Some(item) => lines.push(format!("  {} [{}]", name, item.id)),
          None => lines.push(format!("  {}", name)),
        }
      }
    }
  }
  Ok(lines)
}

fn render_list(companion: &Companion, kind: CatalogArg) -> Vec<String> {
  let store = companion.store();
  match kind {
    CatalogArg::Item => render_items(companion),
    CatalogArg::Path => store
      .paths()
      .iter()
      .map(|path| {
        let (done, total) = companion.progress().step_counts(Namespace::Path, &path.id, &path.steps);
        format!("{:<12} {} {}", path.id, path.name, progress_bar(done, total))
      })
      .collect(),
    CatalogArg::Unlock => store
      .unlocks()
      .iter()
      .map(|unlock| {
        let (done, total) = companion.progress().step_counts(Namespace::Unlock, &unlock.id, &unlock.steps);
        format!("{:<12} {} {}", unlock.id, unlock.character_name, progress_bar(done, total))
      })
      .collect(),
    CatalogArg::Challenge => store
      .challenges()
      .iter()
      .map(|challenge| {
        let mark = if companion.progress().is_challenge_done(&challenge.id) { "x" } else { " " };
        format!("[{}] #{:<3} {} ({})", mark, challenge.number, challenge.name, challenge.difficulty)
      })
      .collect(),
    CatalogArg::Transformation => store
      .transformations()
      .iter()
      .map(|transformation| format!("{:<12} {}", transformation.id, transformation.name))
      .collect(),
  }
}

fn render_search(companion: &Companion, query: &str) -> Vec<String> {
  let results = companion.search(query);
  let mut lines = Vec::new();
  lines.extend(results.items.iter().map(|item| format!("item           {}", item.name)));
  lines.extend(results.paths.iter().map(|path| format!("path           {}", path.name)));
  lines.extend(results.unlocks.iter().map(|unlock| format!("unlock         {}", unlock.character_name)));
  lines.extend(results.challenges.iter().map(|challenge| format!("challenge      {}", challenge.name)));
  lines.extend(
    results
      .transformations
      .iter()
      .map(|transformation| format!("transformation {}", transformation.name)),
  );
  if lines.is_empty() {
    lines.push("No results.".to_string());
  }
  lines
}

fn confirm(prompt: &str) -> Result<bool, String> {
  print!("{} [y/N] ", prompt);
  io::stdout().flush().map_err(|e| e.to_string())?;
  let mut answer = String::new();
  io::stdin()
    .lock()
    .read_line(&mut answer)
    .map_err(|e| e.to_string())?;
  Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn run(cli: Cli) -> Result<(), String> {
  let config = AppConfig {
    api_base: cli.api_base,
    api_timeout: Duration::from_millis(cli.api_timeout_ms),
    data_dir: cli.data_dir,
    db_path: cli.db_path.unwrap_or_else(companion_lib::config::default_db_path),
    offline: cli.offline,
  };
  info!("Progress database: {}", config.db_path.display());

  let loader = config.build_loader()?;
  let mut companion = Companion::new(config.open_progress()?);
  companion.load_all(&loader);

  let lines = match cli.command {
    Commands::Dashboard if cli.json => vec![to_json(&companion.dashboard_stats())?],
    Commands::Dashboard => render_dashboard(&companion),
    Commands::Items { search, pool, quality } => {
      if !pool.is_empty() && !ITEM_POOLS.contains(&pool.to_lowercase().as_str()) {
        info!("Pool '{}' is not one of {}", pool, ITEM_POOLS.join(", "));
      }
      if let Some(level) = parse_quality(&quality) {
        if !ITEM_QUALITIES.iter().any(|known| i64::from(*known) == level) {
          info!("Quality {} is outside 0-4; nothing will match", level);
        }
      }
      companion.set_item_search(&search);
      companion.set_item_pool(&pool);
      companion.set_item_quality(&quality);
      if cli.json {
        vec![to_json(&companion.filtered_items())?]
      } else {
        render_items(&companion)
      }
    }
    Commands::Show { kind, id } => render_detail(&companion, kind, &id)?,
    Commands::List { kind } => render_list(&companion, kind),
    Commands::Search { query } if cli.json => vec![to_json(&companion.search(&query))?],
    Commands::Search { query } => render_search(&companion, &query),
    Commands::Toggle { kind, id, step } => {
      let namespace = kind.namespace();
      let checked = companion.toggle_step(namespace, &id, &step);
      let state = if checked.contains(&step) { "checked" } else { "unchecked" };
      vec![format!("{} {}", step, state)]
    }
    Commands::Complete { id } => {
      let done = companion.toggle_challenge(&id);
      vec![format!("Challenge {} {}", id, if done { "done" } else { "not done" })]
    }
    Commands::Reset { kind, id, yes } => {
      let pending = companion.request_reset(kind.namespace(), &id);
      if yes || confirm(&pending.prompt())? {
        pending.confirm(&mut companion);
        vec![format!("Progress for {} cleared.", id)]
      } else {
        vec!["Nothing changed.".to_string()]
      }
    }
  };

  for line in lines {
    println!("{}", line);
  }
  Ok(())
}

fn main() -> Result<(), String> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with_writer(io::stderr)
    .init();

  run(Cli::parse())
}
