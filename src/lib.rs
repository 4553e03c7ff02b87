pub mod config;
pub mod context;
pub mod dashboard;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod progress;
pub mod search;
pub mod sources;
pub mod storage;
pub mod store;

pub use config::AppConfig;
pub use context::{Companion, PendingReset};
pub use dashboard::DashboardStats;
pub use model::{Catalog, Challenge, Item, Namespace, Path, Step, Transformation, Unlock};
pub use progress::{ProgressTracker, StepSet};
pub use search::SearchResults;
pub use sources::{CatalogLoader, CatalogSource};
pub use store::{DataStore, ItemSource, LoadState};
