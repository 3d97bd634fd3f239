#![allow(dead_code)]

use repokit_core::db::{open_db_in_memory, Migration};
use repokit_core::{
    FieldError, FieldMap, Record, RecordKey, SortDirection, Sortable, SqliteModelRepository,
};
use rusqlite::Connection;
use serde::Serialize;

pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "CREATE TABLE contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            active INTEGER NOT NULL DEFAULT 1
        );
        CREATE TABLE tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL
        );",
    ),
    Migration::new(
        2,
        "CREATE TABLE documents (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL
        );",
    ),
];

/// Sortable record with an integer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
}

impl Record for Contact {
    const TABLE: &'static str = "contacts";
    const FILLABLE: &'static [&'static str] = &["name", "email", "phone", "active"];

    fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            email: String::new(),
            phone: None,
            active: true,
        }
    }

    fn key(&self) -> Option<RecordKey> {
        self.id.map(RecordKey::Integer)
    }

    fn set_key(&mut self, key: RecordKey) {
        self.id = key.as_integer();
    }

    fn fill(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        if let Some(name) = fields.text("name")? {
            self.name = name;
        }
        if let Some(email) = fields.text("email")? {
            self.email = email;
        }
        if let Some(phone) = fields.nullable_text("phone")? {
            self.phone = phone;
        }
        if let Some(active) = fields.boolean("active")? {
            self.active = active;
        }
        Ok(())
    }

    fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with("name", self.name.clone())
            .with("email", self.email.clone())
            .with("phone", self.phone.clone())
            .with("active", self.active)
    }

    fn sortable() -> Option<Sortable> {
        Some(Sortable::new(&["name", "email"]).with_default("name", SortDirection::Asc))
    }
}

/// Record without the sort capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Option<i64>,
    pub label: String,
}

impl Record for Tag {
    const TABLE: &'static str = "tags";
    const FILLABLE: &'static [&'static str] = &["label"];

    fn blank() -> Self {
        Self {
            id: None,
            label: String::new(),
        }
    }

    fn key(&self) -> Option<RecordKey> {
        self.id.map(RecordKey::Integer)
    }

    fn set_key(&mut self, key: RecordKey) {
        self.id = key.as_integer();
    }

    fn fill(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        if let Some(label) = fields.text("label")? {
            self.label = label;
        }
        Ok(())
    }

    fn to_fields(&self) -> FieldMap {
        FieldMap::new().with("label", self.label.clone())
    }
}

/// Record whose key is a generated UUID string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Option<String>,
    pub title: String,
}

impl Record for Document {
    const TABLE: &'static str = "documents";
    const FILLABLE: &'static [&'static str] = &["title"];

    fn blank() -> Self {
        Self {
            id: None,
            title: String::new(),
        }
    }

    fn key(&self) -> Option<RecordKey> {
        self.id.clone().map(RecordKey::Text)
    }

    fn set_key(&mut self, key: RecordKey) {
        self.id = key.as_text().map(str::to_string);
    }

    fn fill(&mut self, fields: &FieldMap) -> Result<(), FieldError> {
        if let Some(title) = fields.text("title")? {
            self.title = title;
        }
        Ok(())
    }

    fn to_fields(&self) -> FieldMap {
        FieldMap::new().with("title", self.title.clone())
    }

    fn new_key() -> Option<RecordKey> {
        Some(RecordKey::new_uuid())
    }
}

pub fn open() -> Connection {
    open_db_in_memory(MIGRATIONS).unwrap()
}

pub fn contacts(conn: &Connection) -> SqliteModelRepository<'_, Contact> {
    SqliteModelRepository::try_new(conn).unwrap()
}

pub fn contact_fields(name: &str, email: &str) -> FieldMap {
    FieldMap::new()
        .with("name", name.to_string())
        .with("email", email.to_string())
}

pub fn label(value: &str) -> FieldMap {
    FieldMap::new().with("label", value.to_string())
}

/// Inserts `count` contacts named `c1..=cN` directly, bypassing the repository.
pub fn seed_contacts(conn: &Connection, count: u32) {
    conn.execute(
        "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?1)
         INSERT INTO contacts (name, email) SELECT 'c' || n, 'c' || n || '@example.com' FROM seq;",
        [count],
    )
    .unwrap();
}
