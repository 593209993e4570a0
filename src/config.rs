use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::database::{WaitPolicy, DEFAULT_MIGRATION_ATTEMPTS, DEFAULT_MIGRATION_BACKOFF, MEMORY_DSN};

pub struct EntityConfig {
    /// SQLite database file, or `:memory:`
    pub database: String,

    /// Probes per table while waiting for a migration (default: 100)
    pub migration_attempts: u32,

    /// Pause between two probes in milliseconds (default: 50)
    pub migration_backoff_ms: u64,
}

const EMPTY_CONFIG: &str = r#"### entity-store configuration file

### SQLite database file, or ":memory:"
# database = "~/.entity-store/entity-store.sqlite3"

### migration readiness polling
# migration_attempts = 100
# migration_backoff_ms = 50
"#;

fn home_dir() -> String {
    dirs::home_dir()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

fn default_database() -> String {
    format!("{}/.entity-store/entity-store.sqlite3", home_dir())
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            migration_attempts: DEFAULT_MIGRATION_ATTEMPTS,
            migration_backoff_ms: DEFAULT_MIGRATION_BACKOFF.as_millis() as u64,
        }
    }
}

impl EntityConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<EntityConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.entity-store/entity-store.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();
        let config_dir = format!("{}/.entity-store", home_dir);

        let p = match path {
            Some(p) => p.clone(),
            None => {
                std::fs::create_dir_all(config_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create entity-store directory: {}", e))?;
                format!("{}/entity-store.toml", config_dir)
            }
        };

        if Path::new(p.as_str()).exists() {
            builder = builder.add_source(config::File::with_name(p.as_str()));
        } else {
            std::fs::write(p.as_str(), EMPTY_CONFIG)
                .map_err(|e| anyhow!("Unable to create config file {}: {}", p, e))?;
        }

        // Add in settings from the environment (with a prefix of ENTITY_STORE)
        // E.g., `ENTITY_STORE_DATABASE=:memory: ./entity-store status`
        builder = builder.add_source(config::Environment::with_prefix("ENTITY_STORE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    fn from_map(config: &HashMap<String, String>) -> Result<EntityConfig> {
        let database = match config.get("database").map(|s| s.trim()) {
            Some(d) if !d.is_empty() => match d.strip_prefix("~/") {
                Some(rest) => format!("{}/{}", home_dir(), rest),
                None => d.to_string(),
            },
            _ => default_database(),
        };

        let migration_attempts = match config.get("migration_attempts") {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid migration_attempts '{}': {}", s, e))?,
            None => DEFAULT_MIGRATION_ATTEMPTS,
        };

        let migration_backoff_ms = match config.get("migration_backoff_ms") {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid migration_backoff_ms '{}': {}", s, e))?,
            None => DEFAULT_MIGRATION_BACKOFF.as_millis() as u64,
        };

        Ok(EntityConfig {
            database,
            migration_attempts,
            migration_backoff_ms,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.database.trim() == MEMORY_DSN
    }

    /// Polling bounds for migrations
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            self.migration_attempts,
            Duration::from_millis(self.migration_backoff_ms),
        )
    }

    /// Make sure the directory holding the database file exists
    pub fn ensure_database_dir(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }
        match Path::new(&self.database).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
                .map_err(|e| anyhow!("Failed to create directory '{}': {}", dir.display(), e)),
            _ => Ok(()),
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Database:           {}", self.database),
            format!("Migration Attempts: {}", self.migration_attempts),
            format!("Migration Backoff:  {} ms", self.migration_backoff_ms),
        ];

        if !self.is_in_memory() {
            if let Ok(meta) = std::fs::metadata(&self.database) {
                lines.push(format!("Database Size:      {}", format_size(meta.len())));
            }
        }

        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.entity-store/entity-store.toml", home_dir)
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EntityConfig::default();
        assert_eq!(config.migration_attempts, 100);
        assert_eq!(config.migration_backoff_ms, 50);
        assert!(config.database.ends_with("/.entity-store/entity-store.sqlite3"));
        assert_eq!(config.wait_policy(), WaitPolicy::default());
    }

    #[test]
    fn test_missing_file_gets_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entity-store.toml");
        let path_str = path.to_string_lossy().to_string();

        let config = EntityConfig::new(&Some(path_str)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), EMPTY_CONFIG);
        assert_eq!(config.migration_attempts, DEFAULT_MIGRATION_ATTEMPTS);
    }

    #[test]
    fn test_read_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entity-store.toml");
        std::fs::write(
            &path,
            "database = \":memory:\"\nmigration_attempts = 7\nmigration_backoff_ms = 5\n",
        )
        .unwrap();

        let config = EntityConfig::new(&Some(path.to_string_lossy().to_string())).unwrap();

        assert!(config.is_in_memory());
        assert_eq!(
            config.wait_policy(),
            WaitPolicy::new(7, Duration::from_millis(5))
        );
        assert!(config.ensure_database_dir().is_ok());
    }

    #[test]
    fn test_from_map() {
        let mut map = HashMap::new();
        map.insert("database".to_string(), "~/photos/index.db".to_string());
        let config = EntityConfig::from_map(&map).unwrap();
        assert!(config.database.ends_with("/photos/index.db"));
        assert!(!config.database.starts_with('~'));

        map.insert("migration_attempts".to_string(), "many".to_string());
        assert!(EntityConfig::from_map(&map).is_err());
    }

    #[test]
    fn test_ensure_database_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = EntityConfig {
            database: dir
                .path()
                .join("nested/library.sqlite3")
                .to_string_lossy()
                .to_string(),
            ..Default::default()
        };

        config.ensure_database_dir().unwrap();
        assert!(dir.path().join("nested").is_dir());
        assert!(config.summary().contains("library.sqlite3"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }
}
