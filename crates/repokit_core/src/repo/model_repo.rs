//! Generic model repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/index/save/delete over exactly one bound `Record` type.
//! - Normalize single-or-many targets and shape results to match the input.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Only `Record::FILLABLE` columns are ever written.
//! - Identifiers spliced into SQL come from `Record` constants or a
//!   `Sortable` declaration, never from caller strings. All of them are
//!   checked against the table when the repository is built.
//! - Key lists are bound in chunks of `MAX_KEYS_PER_STATEMENT`.
//! - `save` does not wrap its loop in a transaction: a failure on record k
//!   leaves records before k persisted.

use crate::config::RepositoryConfig;
use crate::model::field::FieldMap;
use crate::model::record::{Record, RecordKey};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::page::{Page, PageRequest};
use crate::repo::payload::IntoFieldMap;
use crate::repo::target::{DeleteTargets, Lookup, SaveTargets};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::marker::PhantomData;
use std::time::Instant;

/// Upper bound on keys bound into one `IN (...)` list. Stays well below
/// SQLite's bind-variable limit.
const MAX_KEYS_PER_STATEMENT: usize = 500;

/// Repository interface over one bound record type.
pub trait ModelRepository<M: Record> {
    /// Fetches records by key. A single key yields `Option<M>`, a sequence of
    /// keys yields the matched subset in store order.
    fn get<L: Lookup<M>>(&self, targets: L) -> RepoResult<L::Output>;

    /// Lists one page of records, sorted when `M` declares the capability.
    fn index(&self, request: &PageRequest) -> RepoResult<Page<M>>;

    /// Fills every target with `data` and persists it, in order.
    fn save<P: IntoFieldMap, T: SaveTargets<M>>(&self, data: P, targets: T)
        -> RepoResult<T::Output>;

    /// Deletes by key. Returns whether any row was removed.
    fn delete<T: DeleteTargets<M>>(&self, targets: T) -> RepoResult<bool>;

    /// Saves `data` onto a fresh blank record.
    fn create<P: IntoFieldMap>(&self, data: P) -> RepoResult<M> {
        self.save(data, M::blank())
    }
}

/// SQLite-backed repository bound to record type `M`.
pub struct SqliteModelRepository<'conn, M> {
    conn: &'conn Connection,
    config: RepositoryConfig,
    select_sql: String,
    _record: PhantomData<fn() -> M>,
}

impl<'conn, M: Record> SqliteModelRepository<'conn, M> {
    /// Constructs a repository with default config over a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_config(conn, RepositoryConfig::default())
    }

    /// Constructs a repository, validating config and the bound table schema.
    pub fn with_config(conn: &'conn Connection, config: RepositoryConfig) -> RepoResult<Self> {
        config.validate()?;
        ensure_connection_ready::<M>(conn)?;

        let columns = std::iter::once(M::KEY)
            .chain(M::FILLABLE.iter().copied())
            .map(quote_ident)
            .collect::<Vec<_>>()
            .join(", ");
        let select_sql = format!("SELECT {columns} FROM {}", quote_ident(M::TABLE));

        Ok(Self {
            conn,
            config,
            select_sql,
            _record: PhantomData,
        })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn find_by_keys(&self, keys: &[RecordKey]) -> RepoResult<Vec<M>> {
        let mut records = Vec::new();

        for chunk in keys.chunks(MAX_KEYS_PER_STATEMENT) {
            let sql = format!(
                "{} WHERE {} IN ({})",
                self.select_sql,
                quote_ident(M::KEY),
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;

            while let Some(row) = rows.next()? {
                records.push(parse_record_row::<M>(row)?);
            }
        }

        Ok(records)
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(M::TABLE)),
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    fn order_clause(&self, request: &PageRequest) -> String {
        let key = quote_ident(M::KEY);
        match M::sortable() {
            Some(sortable) => match sortable.resolve(request.sort.as_ref()) {
                Some((column, direction)) if column != M::KEY => {
                    format!("{} {}, {key} ASC", quote_ident(column), direction.as_sql())
                }
                Some((_, direction)) => format!("{key} {}", direction.as_sql()),
                None => format!("{key} ASC"),
            },
            None => {
                if let Some(sort) = &request.sort {
                    debug!(
                        "event=repo_index module=repo status=sort_ignored table={} column={}",
                        M::TABLE,
                        sort.column
                    );
                }
                format!("{key} ASC")
            }
        }
    }

    fn list_page(&self, request: &PageRequest) -> RepoResult<Page<M>> {
        let requested = request.per_page.unwrap_or(self.config.default_per_page);
        if requested == 0 {
            return Err(RepoError::InvalidPageSize(requested));
        }
        let per_page = self.config.clamp_per_page(requested);
        let current_page = request.current_page();
        let offset = u64::from(current_page - 1) * u64::from(per_page);

        let total = self.count()?;
        let sql = format!(
            "{} ORDER BY {} LIMIT ?1 OFFSET ?2",
            self.select_sql,
            self.order_clause(request)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params![
            i64::from(per_page),
            i64::try_from(offset).unwrap_or(i64::MAX)
        ])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_record_row::<M>(row)?);
        }

        Ok(Page::new(items, total, per_page, current_page))
    }

    fn prepare_fields(&self, data: impl IntoFieldMap) -> RepoResult<FieldMap> {
        let mut fields = data.into_field_map()?;
        let discarded = fields.retain_columns(M::FILLABLE);

        if let Some(field) = discarded.first() {
            if self.config.strict_fill {
                return Err(RepoError::MassAssignment {
                    table: M::TABLE,
                    field: field.clone(),
                });
            }
            debug!(
                "event=repo_fill module=repo status=discarded table={} fields={}",
                M::TABLE,
                discarded.join(",")
            );
        }

        Ok(fields)
    }

    fn save_all(&self, fields: &FieldMap, mut records: Vec<M>) -> RepoResult<Vec<M>> {
        for record in records.iter_mut() {
            record.fill(fields)?;
            self.persist(record)?;
        }
        Ok(records)
    }

    fn persist(&self, record: &mut M) -> RepoResult<()> {
        let mut values = record.to_fields();
        values.retain_columns(M::FILLABLE);

        match record.key() {
            Some(key) => {
                if self.update_row(&key, &values)? == 0 {
                    self.insert_row(Some(&key), &values)?;
                }
            }
            None => match M::new_key() {
                Some(key) => {
                    self.insert_row(Some(&key), &values)?;
                    record.set_key(key);
                }
                None => {
                    self.insert_row(None, &values)?;
                    record.set_key(RecordKey::Integer(self.conn.last_insert_rowid()));
                }
            },
        }

        Ok(())
    }

    fn update_row(&self, key: &RecordKey, values: &FieldMap) -> RepoResult<usize> {
        let key_column = quote_ident(M::KEY);
        let assignments = if values.is_empty() {
            format!("{key_column} = {key_column}")
        } else {
            values
                .names()
                .enumerate()
                .map(|(index, name)| format!("{} = ?{}", quote_ident(name), index + 1))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {key_column} = ?{}",
            quote_ident(M::TABLE),
            values.len() + 1
        );
        let bind_values = values
            .iter()
            .map(|(_, value)| value.clone())
            .chain(std::iter::once(Value::from(key.clone())));

        Ok(self.conn.execute(&sql, params_from_iter(bind_values))?)
    }

    fn insert_row(&self, key: Option<&RecordKey>, values: &FieldMap) -> RepoResult<()> {
        let mut columns: Vec<String> = Vec::with_capacity(values.len() + 1);
        let mut bind_values: Vec<Value> = Vec::with_capacity(values.len() + 1);

        if let Some(key) = key {
            columns.push(quote_ident(M::KEY));
            bind_values.push(Value::from(key.clone()));
        }
        for (name, value) in values.iter() {
            columns.push(quote_ident(name));
            bind_values.push(value.clone());
        }

        let table = quote_ident(M::TABLE);
        if columns.is_empty() {
            self.conn
                .execute(&format!("INSERT INTO {table} DEFAULT VALUES"), [])?;
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders(columns.len())
        );
        self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(())
    }

    fn delete_by_keys(&self, keys: &[RecordKey]) -> RepoResult<usize> {
        let mut removed = 0;

        for chunk in keys.chunks(MAX_KEYS_PER_STATEMENT) {
            let sql = format!(
                "DELETE FROM {} WHERE {} IN ({})",
                quote_ident(M::TABLE),
                quote_ident(M::KEY),
                placeholders(chunk.len())
            );
            removed += self
                .conn
                .prepare_cached(&sql)?
                .execute(params_from_iter(chunk.iter()))?;
        }

        Ok(removed)
    }
}

impl<M: Record> ModelRepository<M> for SqliteModelRepository<'_, M> {
    fn get<L: Lookup<M>>(&self, targets: L) -> RepoResult<L::Output> {
        let started_at = Instant::now();
        let keys = targets.into_keys();

        match self.find_by_keys(&keys) {
            Ok(found) => {
                debug!(
                    "event=repo_get module=repo status=ok table={} requested={} found={} duration_ms={}",
                    M::TABLE,
                    keys.len(),
                    found.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(L::shape(found))
            }
            Err(err) => Err(log_failure("repo_get", started_at, err)),
        }
    }

    fn index(&self, request: &PageRequest) -> RepoResult<Page<M>> {
        let started_at = Instant::now();

        match self.list_page(request) {
            Ok(page) => {
                debug!(
                    "event=repo_index module=repo status=ok table={} page={} per_page={} returned={} total={} duration_ms={}",
                    M::TABLE,
                    page.current_page,
                    page.per_page,
                    page.len(),
                    page.total,
                    started_at.elapsed().as_millis()
                );
                Ok(page)
            }
            Err(err) => Err(log_failure("repo_index", started_at, err)),
        }
    }

    fn save<P: IntoFieldMap, T: SaveTargets<M>>(
        &self,
        data: P,
        targets: T,
    ) -> RepoResult<T::Output> {
        let started_at = Instant::now();
        let records = targets.into_records();
        let count = records.len();

        let result = self
            .prepare_fields(data)
            .and_then(|fields| self.save_all(&fields, records));

        match result {
            Ok(saved) => {
                debug!(
                    "event=repo_save module=repo status=ok table={} records={} duration_ms={}",
                    M::TABLE,
                    count,
                    started_at.elapsed().as_millis()
                );
                T::shape(saved)
            }
            Err(err) => Err(log_failure("repo_save", started_at, err)),
        }
    }

    fn delete<T: DeleteTargets<M>>(&self, targets: T) -> RepoResult<bool> {
        let started_at = Instant::now();

        let result = targets
            .into_keys()
            .and_then(|keys| self.delete_by_keys(&keys));

        match result {
            Ok(removed) => {
                debug!(
                    "event=repo_delete module=repo status=ok table={} removed={} duration_ms={}",
                    M::TABLE,
                    removed,
                    started_at.elapsed().as_millis()
                );
                Ok(removed > 0)
            }
            Err(err) => Err(log_failure("repo_delete", started_at, err)),
        }
    }
}

fn log_failure(event: &str, started_at: Instant, err: RepoError) -> RepoError {
    warn!(
        "event={} module=repo status=error duration_ms={} error_code={} error={}",
        event,
        started_at.elapsed().as_millis(),
        err.code(),
        err
    );
    err
}

fn parse_record_row<M: Record>(row: &Row<'_>) -> RepoResult<M> {
    let key_value: Value = row.get(0)?;
    let key = RecordKey::from_value(key_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid key value in {}.{}",
            M::TABLE,
            M::KEY
        ))
    })?;

    let mut fields = FieldMap::new();
    for (index, column) in M::FILLABLE.iter().enumerate() {
        fields.insert(*column, row.get::<_, Value>(index + 1)?);
    }

    let key_text = key.to_string();
    M::from_fields(key, &fields)
        .map_err(|err| RepoError::InvalidData(format!("{} row {key_text}: {err}", M::TABLE)))
}

fn ensure_connection_ready<M: Record>(conn: &Connection) -> RepoResult<()> {
    let user_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if user_version == 0 {
        return Err(RepoError::UninitializedConnection);
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [M::TABLE],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(M::TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([M::TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let sort_columns = M::sortable().into_iter().flat_map(|sortable| {
        sortable
            .columns
            .iter()
            .copied()
            .chain(sortable.default.map(|(column, _)| column))
    });

    for column in std::iter::once(M::KEY)
        .chain(M::FILLABLE.iter().copied())
        .chain(sort_columns)
    {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: M::TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
