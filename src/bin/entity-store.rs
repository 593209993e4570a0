use clap::{Parser, Subcommand};
use entity_store::*;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.entity-store/entity-store.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Database file or `:memory:`, overrides the configured database
    #[clap(short, long)]
    database: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables and columns, then insert the default rows
    Migrate,

    /// Drop all entity tables
    Drop {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Drop and re-create all entity tables
    Reset {
        /// Load the test fixtures after the reset
        #[clap(long)]
        fixtures: bool,

        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Show the state of every entity table
    Status {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show the active configuration
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug || std::env::var_os("RUST_LOG").is_some() {
        let default_level = if cli.debug { Level::DEBUG } else { Level::INFO };
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level.as_str())),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = match EntityConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Some(database) = cli.database {
        config.database = database;
    }

    match cli.command {
        Commands::Migrate => commands::schema::run_migrate(&config),
        Commands::Drop { yes } => commands::schema::run_drop(&config, yes),
        Commands::Reset { fixtures, yes } => commands::schema::run_reset(&config, fixtures, yes),
        Commands::Status { json } => commands::schema::run_status(&config, json),
        Commands::Config => {
            println!("Config File:        {}", config_path(&cli.config));
            println!("{}", config.summary());
        }
    }
}

fn config_path(path: &Option<String>) -> String {
    path.clone().unwrap_or_else(EntityConfig::config_file_path)
}
