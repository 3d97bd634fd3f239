//! Optional record capabilities.
//!
//! Record types opt in by overriding `Record::sortable` (or `Record::new_key`
//! for generated keys). Listings check the declaration statically; nothing is
//! discovered at runtime.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Query-string value for ascending order.
pub const SORT_DIRECTION_ASC: &str = "asc";
/// Query-string value for descending order.
pub const SORT_DIRECTION_DESC: &str = "desc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => SORT_DIRECTION_ASC,
            Self::Desc => SORT_DIRECTION_DESC,
        }
    }

    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Parses a sort direction, case-insensitively.
pub fn parse_sort_direction(value: &str) -> Result<SortDirection, SortParseError> {
    match value.trim().to_ascii_lowercase().as_str() {
        SORT_DIRECTION_ASC => Ok(SortDirection::Asc),
        SORT_DIRECTION_DESC => Ok(SortDirection::Desc),
        other => Err(SortParseError::UnsupportedDirection(other.to_string())),
    }
}

/// Caller-requested ordering for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParams {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortParams {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }

    /// Builds sort params from raw `sort` / `direction` request values.
    ///
    /// Returns `Ok(None)` when no sort column was requested. A missing
    /// direction means ascending.
    pub fn from_query(
        sort: Option<&str>,
        direction: Option<&str>,
    ) -> Result<Option<Self>, SortParseError> {
        let column = match sort.map(str::trim) {
            None | Some("") => return Ok(None),
            Some(column) => column,
        };

        let direction = match direction.map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(value) => parse_sort_direction(value)?,
        };

        Ok(Some(Self::new(column, direction)))
    }
}

/// Sort capability declared by a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sortable {
    /// Columns callers may sort by.
    pub columns: &'static [&'static str],
    /// Ordering used when the caller asks for none, or for an unlisted column.
    pub default: Option<(&'static str, SortDirection)>,
}

impl Sortable {
    pub const fn new(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            default: None,
        }
    }

    pub const fn with_default(self, column: &'static str, direction: SortDirection) -> Self {
        Self {
            columns: self.columns,
            default: Some((column, direction)),
        }
    }

    /// Resolves requested params against the declared columns.
    ///
    /// The returned column always comes from the declaration, never from the
    /// request, so it is safe to splice into SQL.
    pub fn resolve(&self, requested: Option<&SortParams>) -> Option<(&'static str, SortDirection)> {
        requested
            .and_then(|params| {
                self.columns
                    .iter()
                    .find(|column| **column == params.column)
                    .map(|column| (*column, params.direction))
            })
            .or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortParseError {
    UnsupportedDirection(String),
}

impl Display for SortParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDirection(value) => write!(
                f,
                "sort direction is unsupported: {value}; expected {SORT_DIRECTION_ASC}|{SORT_DIRECTION_DESC}"
            ),
        }
    }
}

impl Error for SortParseError {}

#[cfg(test)]
mod tests {
    use super::{parse_sort_direction, SortDirection, SortParams, SortParseError, Sortable};

    const CONTACT_SORT: Sortable =
        Sortable::new(&["name", "created_at"]).with_default("name", SortDirection::Asc);

    #[test]
    fn parses_directions_case_insensitively() {
        assert_eq!(parse_sort_direction("ASC").unwrap(), SortDirection::Asc);
        assert_eq!(parse_sort_direction(" desc ").unwrap(), SortDirection::Desc);
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = parse_sort_direction("sideways").unwrap_err();
        assert_eq!(
            err,
            SortParseError::UnsupportedDirection("sideways".to_string())
        );
    }

    #[test]
    fn from_query_without_column_is_none() {
        assert_eq!(SortParams::from_query(None, Some("desc")).unwrap(), None);
        assert_eq!(SortParams::from_query(Some("  "), None).unwrap(), None);
    }

    #[test]
    fn from_query_defaults_to_ascending() {
        let params = SortParams::from_query(Some("name"), None).unwrap().unwrap();
        assert_eq!(params, SortParams::asc("name"));
    }

    #[test]
    fn resolve_accepts_declared_columns_only() {
        assert_eq!(
            CONTACT_SORT.resolve(Some(&SortParams::desc("created_at"))),
            Some(("created_at", SortDirection::Desc))
        );
        assert_eq!(
            CONTACT_SORT.resolve(Some(&SortParams::desc("name; DROP TABLE contacts"))),
            Some(("name", SortDirection::Asc))
        );
        assert_eq!(CONTACT_SORT.resolve(None), Some(("name", SortDirection::Asc)));
    }

    #[test]
    fn resolve_without_default_yields_none_for_unknown_column() {
        let sortable = Sortable::new(&["name"]);
        assert_eq!(sortable.resolve(Some(&SortParams::asc("email"))), None);
    }
}
