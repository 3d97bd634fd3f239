//! Repository error taxonomy.

use crate::config::ConfigError;
use crate::db::DbError;
use crate::model::field::FieldError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by model repository operations.
///
/// Every variant is terminal for the current call; nothing is retried.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Config(ConfigError),
    /// Connection has no applied migrations.
    UninitializedConnection,
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A target cannot be handled as a record of the bound type.
    InvalidModel(String),
    /// Save payload does not convert into a flat field map.
    InvalidPayload(String),
    /// Strict fill received a field outside `Record::FILLABLE`.
    MassAssignment {
        table: &'static str,
        field: String,
    },
    Field(FieldError),
    InvalidPageSize(u32),
    /// Stored row cannot be decoded into the bound record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid repository config: {err}"),
            Self::UninitializedConnection => {
                write!(f, "connection has no applied migrations (user_version = 0)")
            }
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::InvalidModel(message) => write!(f, "invalid model: {message}"),
            Self::InvalidPayload(message) => write!(f, "invalid save payload: {message}"),
            Self::MassAssignment { table, field } => {
                write!(f, "field `{field}` is not fillable on {table}")
            }
            Self::Field(err) => write!(f, "{err}"),
            Self::InvalidPageSize(size) => {
                write!(f, "page size must be greater than zero, got {size}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Field(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

impl From<ConfigError> for RepoError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl RepoError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "db_error",
            Self::Config(_) => "invalid_config",
            Self::UninitializedConnection => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
            Self::InvalidModel(_) => "invalid_model",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::MassAssignment { .. } => "mass_assignment",
            Self::Field(_) => "field_error",
            Self::InvalidPageSize(_) => "invalid_page_size",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}
