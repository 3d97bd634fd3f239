//! Generic model repositories over SQLite.
//! One repository instance is bound to one `Record` type and exposes
//! get/index/save/delete with single-or-many target shapes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, LoggingConfig, RepositoryConfig, DEFAULT_PER_PAGE};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::capability::{
    parse_sort_direction, SortDirection, SortParams, SortParseError, Sortable,
};
pub use model::field::{FieldError, FieldMap};
pub use model::record::{Record, RecordKey};
pub use repo::error::{RepoError, RepoResult};
pub use repo::model_repo::{ModelRepository, SqliteModelRepository};
pub use repo::page::{Page, PageRequest};
pub use repo::payload::{IntoFieldMap, Serialized};
pub use repo::target::{DeleteTargets, Lookup, SaveTargets};

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
