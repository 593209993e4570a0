use entity_store::database::{
    DatabaseConn, EntityRegistry, FatalSchemaError, SchemaLifecycle, SchemaReport,
};
use entity_store::{format_size, EntityConfig};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tabled::settings::Style;
use tabled::Table;

#[derive(Debug, Serialize)]
struct StatusOutput<'a> {
    database: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_bytes: Option<u64>,
    current: bool,
    #[serde(flatten)]
    report: &'a SchemaReport,
}

fn open_database(config: &EntityConfig) -> DatabaseConn {
    if let Err(e) = config.ensure_database_dir() {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
    match DatabaseConn::open_dsn(&config.database) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Print a fatal schema error and terminate
fn abort(e: FatalSchemaError) -> ! {
    eprintln!("FATAL: {}", e);
    eprintln!("The database schema is unusable; fix the cause and re-run.");
    std::process::exit(1);
}

fn confirm(prompt: &str) -> bool {
    eprintln!("{}", prompt);
    eprint!("Are you sure? [y/N] ");

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_ok() {
        let input = input.trim().to_lowercase();
        if input == "y" || input == "yes" {
            return true;
        }
    }
    eprintln!("Aborted.");
    false
}

pub fn run_migrate(config: &EntityConfig) {
    let db = open_database(config);
    let registry = EntityRegistry::entities();
    let start = Instant::now();

    if let Err(e) = SchemaLifecycle::new(&db, registry)
        .with_policy(config.wait_policy())
        .migrate_database()
    {
        abort(e);
    }

    eprintln!(
        "Migrated {} tables in {:.2}s",
        registry.len(),
        start.elapsed().as_secs_f64()
    );
}

pub fn run_drop(config: &EntityConfig, skip_confirm: bool) {
    if !skip_confirm
        && !confirm(&format!(
            "This will drop all entity tables in {}",
            config.database
        ))
    {
        return;
    }

    let db = open_database(config);
    let registry = EntityRegistry::entities();
    if let Err(e) = SchemaLifecycle::new(&db, registry).drop_tables() {
        abort(e);
    }

    eprintln!("Dropped {} tables", registry.len());
}

pub fn run_reset(config: &EntityConfig, fixtures: bool, skip_confirm: bool) {
    if !skip_confirm
        && !confirm(&format!(
            "This will delete all data in {} and re-create the entity tables",
            config.database
        ))
    {
        return;
    }

    let db = open_database(config);
    let registry = EntityRegistry::entities();
    let start = Instant::now();

    if let Err(e) = SchemaLifecycle::new(&db, registry)
        .with_policy(config.wait_policy())
        .reset_database(fixtures)
    {
        abort(e);
    }

    eprintln!(
        "Reset {} tables{} in {:.2}s",
        registry.len(),
        if fixtures { " with test fixtures" } else { "" },
        start.elapsed().as_secs_f64()
    );
}

pub fn run_status(config: &EntityConfig, json: bool) {
    let db = open_database(config);
    let report = match SchemaLifecycle::new(&db, EntityRegistry::entities()).report() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to inspect database: {:#}", e);
            std::process::exit(1);
        }
    };

    let size_bytes = if config.is_in_memory() || !Path::new(&config.database).exists() {
        None
    } else {
        std::fs::metadata(&config.database).ok().map(|m| m.len())
    };

    if json {
        let output = StatusOutput {
            database: &config.database,
            size_bytes,
            current: report.is_current(),
            report: &report,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing status: {}", e),
        }
        return;
    }

    println!("Entity Store Status");
    println!("===================\n");
    println!("  Database:       {}", config.database);
    if let Some(size) = size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    println!(
        "  Schema:         {}",
        if report.is_current() {
            "current"
        } else {
            "needs migration"
        }
    );
    println!();
    println!("{}", Table::new(report.rows()).with(Style::rounded()));
}
