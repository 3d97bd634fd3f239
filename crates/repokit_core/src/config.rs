//! Runtime configuration for repositories and logging.
//!
//! # Invariants
//! - `default_per_page` is never zero.
//! - `max_per_page`, when set, is never below `default_per_page`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Page size used by listings that do not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 15;

const DEFAULT_LOG_FILE_BASENAME: &str = "repokit";
const DEFAULT_MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_LOG_FILES: usize = 5;

/// Behaviour knobs shared by every repository built over one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Page size for `PageRequest::default()`-style listings.
    pub default_per_page: u32,
    /// Upper bound applied to requested page sizes. `None` means unbounded.
    pub max_per_page: Option<u32>,
    /// Reject non-fillable payload fields instead of discarding them.
    pub strict_fill: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: None,
            strict_fill: false,
        }
    }
}

impl RepositoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_per_page == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if let Some(max) = self.max_per_page {
            if max < self.default_per_page {
                return Err(ConfigError::MaxBelowDefault {
                    default_per_page: self.default_per_page,
                    max_per_page: max,
                });
            }
        }
        Ok(())
    }

    /// Applies `max_per_page` to a requested size.
    pub fn clamp_per_page(&self, requested: u32) -> u32 {
        match self.max_per_page {
            Some(max) => requested.min(max),
            None => requested,
        }
    }
}

/// File logging settings consumed by `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    pub file_basename: String,
    pub max_file_size_bytes: u64,
    pub max_files: usize,
}

impl LoggingConfig {
    /// Settings with the build-mode default level and stock rotation.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: log_dir.into(),
            file_basename: DEFAULT_LOG_FILE_BASENAME.to_string(),
            max_file_size_bytes: DEFAULT_MAX_LOG_FILE_SIZE_BYTES,
            max_files: DEFAULT_MAX_LOG_FILES,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroPageSize,
    MaxBelowDefault {
        default_per_page: u32,
        max_per_page: u32,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroPageSize => write!(f, "default_per_page must be greater than zero"),
            Self::MaxBelowDefault {
                default_per_page,
                max_per_page,
            } => write!(
                f,
                "max_per_page {max_per_page} is below default_per_page {default_per_page}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RepositoryConfig, DEFAULT_PER_PAGE};

    #[test]
    fn default_config_is_valid() {
        let config = RepositoryConfig::default();
        assert_eq!(config.default_per_page, DEFAULT_PER_PAGE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_default_page_size() {
        let config = RepositoryConfig {
            default_per_page: 0,
            ..RepositoryConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPageSize));
    }

    #[test]
    fn rejects_max_below_default() {
        let config = RepositoryConfig {
            max_per_page: Some(10),
            ..RepositoryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaxBelowDefault { .. })
        ));
    }

    #[test]
    fn clamp_respects_optional_max() {
        let unbounded = RepositoryConfig::default();
        assert_eq!(unbounded.clamp_per_page(500), 500);

        let bounded = RepositoryConfig {
            max_per_page: Some(50),
            ..RepositoryConfig::default()
        };
        assert_eq!(bounded.clamp_per_page(500), 50);
        assert_eq!(bounded.clamp_per_page(20), 20);
    }
}
