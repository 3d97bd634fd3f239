//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `repokit_core` linkage and run every repository operation once.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `repokit_cli [DB_PATH] [--log-dir ABS_DIR] [--sort COLUMN] [--direction asc|desc]`

mod contact;

use contact::{find_by_email, Contact, ContactForm, MIGRATIONS};
use log::info;
use repokit_core::db::{open_db, open_db_in_memory};
use repokit_core::{
    init_logging, LoggingConfig, ModelRepository, PageRequest, Record, Serialized, SortParams,
    SqliteModelRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;

#[derive(Debug, Default)]
struct Args {
    db_path: Option<String>,
    log_dir: Option<String>,
    sort: Option<String>,
    direction: Option<String>,
}

fn main() -> ExitCode {
    println!("repokit_core ping={}", repokit_core::ping());
    println!("repokit_core version={}", repokit_core::core_version());

    match parse_args(std::env::args().skip(1)).and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, Box<dyn Error>> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--log-dir" => args.log_dir = Some(raw.next().ok_or("--log-dir needs a value")?),
            "--sort" => args.sort = Some(raw.next().ok_or("--sort needs a value")?),
            "--direction" => args.direction = Some(raw.next().ok_or("--direction needs a value")?),
            other if other.starts_with("--") => return Err(format!("unknown flag {other}").into()),
            other => args.db_path = Some(other.to_string()),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &args.log_dir {
        init_logging(&LoggingConfig::new(log_dir))?;
    }

    let conn: Connection = match &args.db_path {
        Some(path) => open_db(path, MIGRATIONS)?,
        None => open_db_in_memory(MIGRATIONS)?,
    };
    let repo = SqliteModelRepository::<Contact>::try_new(&conn)?;

    let ada = repo.save(
        Serialized(&ContactForm {
            name: "Ada Lovelace",
            email: "ada@example.com",
            phone: None,
        }),
        find_by_email(&conn, "ada@example.com")?.unwrap_or_else(Contact::blank),
    )?;
    let grace = repo.save(
        Serialized(&ContactForm {
            name: "Grace Hopper",
            email: "grace@example.com",
            phone: Some("555-0100"),
        }),
        find_by_email(&conn, "grace@example.com")?.unwrap_or_else(Contact::blank),
    )?;
    info!(
        "event=cli_seed module=cli status=ok ids={:?},{:?}",
        ada.id, grace.id
    );

    if let Some(id) = ada.id {
        println!("get {id} -> {:?}", repo.get(id)?);
    }

    let sort = SortParams::from_query(args.sort.as_deref(), args.direction.as_deref())?;
    let request = PageRequest {
        sort,
        ..PageRequest::default()
    };
    let page = repo.index(&request)?;
    println!(
        "index page={}/{} total={}",
        page.current_page, page.last_page, page.total
    );
    for contact in &page.items {
        println!("  {} <{}>", contact.name, contact.email);
    }

    if args.db_path.is_none() {
        println!("delete ada -> {}", repo.delete(&ada)?);
    }

    Ok(())
}
