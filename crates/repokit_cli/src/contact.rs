//! Demo record bound by the smoke CLI.

use repokit_core::db::Migration;
use repokit_core::{
    FieldError, FieldMap, ModelRepository, Record, RecordKey, RepoResult, SortDirection, Sortable,
    SqliteModelRepository,
};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

pub const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    include_str!("migrations/0001_contacts.sql"),
)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl Record for Contact {
    const TABLE: &'static str = "contacts";
    const FILLABLE: &'static [&'static str] = &["name", "email", "phone"];

    fn blank() -> Self {
        Self {
            id: None,
            name: String::new(),
            email: String::new(),
            phone: None,
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
        Ok(())
    }

    fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with("name", self.name.clone())
            .with("email", self.email.clone())
            .with("phone", self.phone.clone())
    }

    fn sortable() -> Option<Sortable> {
        Some(Sortable::new(&["name", "email"]).with_default("name", SortDirection::Asc))
    }
}

/// Form shape accepted from the command line.
#[derive(Debug, Serialize)]
pub struct ContactForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

/// Loads the contact with `email` through the unique email index.
pub fn find_by_email(conn: &Connection, email: &str) -> RepoResult<Option<Contact>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM contacts WHERE email = ?1;",
            [email],
            |row| row.get(0),
        )
        .optional()?;

    match id {
        Some(id) => SqliteModelRepository::<Contact>::try_new(conn)?.get(id),
        None => Ok(None),
    }
}
