// Configuration loading: built-in defaults, then config/deckhand.toml, then
// environment overrides.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("unsupported database url `{url}`: only sqlite databases are available in this build")]
    UnsupportedDatabase { url: String },
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_CARDS_PATH: &str = "cards.tsv";
pub const DEFAULT_FRONTEND_DIR: &str = "frontend";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///cards.db";

/// Name of the optional config file, relative to `<base_dir>/config/`.
pub const CONFIG_FILE_NAME: &str = "deckhand.toml";

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub cards_path: PathBuf,
    pub frontend_dir: PathBuf,
    pub database_url: String,
    pub database: DatabaseTarget,
}

/// Where the game store lives, resolved from the configured database URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// The path string handed to `rusqlite::Connection::open`.
    pub fn as_open_arg(&self) -> String {
        match self {
            DatabaseTarget::Memory => ":memory:".to_string(),
            DatabaseTarget::File(path) => path.display().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// deckhand.toml structs (every key optional)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    data: DataSection,
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DataSection {
    cards: Option<String>,
    frontend: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    url: Option<String>,
}

/// Raw string settings before validation. Each layer overwrites the fields it
/// sets.
#[derive(Debug, Clone)]
struct RawSettings {
    bind: String,
    cards: String,
    frontend: String,
    database_url: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            cards: DEFAULT_CARDS_PATH.to_string(),
            frontend: DEFAULT_FRONTEND_DIR.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration relative to `base_dir`, reading environment overrides
/// through `env`. Relative data paths are resolved against `base_dir`.
///
/// `config/deckhand.toml` is optional; a missing file means defaults.
pub fn load_config_with_env<F>(base_dir: &Path, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut raw = RawSettings::default();

    let file_path = base_dir.join("config").join(CONFIG_FILE_NAME);
    if file_path.exists() {
        let text = std::fs::read_to_string(&file_path).map_err(|e| ConfigError::ReadError {
            path: file_path.clone(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: file_path.clone(),
            source: e,
        })?;
        apply_file(&mut raw, file);
    }

    apply_env(&mut raw, env);
    build(base_dir, raw)
}

/// Convenience wrapper: loads config relative to the current working directory
/// with overrides from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::ReadError {
        path: PathBuf::from("."),
        source: e,
    })?;
    load_config_with_env(&cwd, |key| std::env::var(key).ok())
}

fn apply_file(raw: &mut RawSettings, file: ConfigFile) {
    if let Some(bind) = file.server.bind {
        raw.bind = bind;
    }
    if let Some(cards) = file.data.cards {
        raw.cards = cards;
    }
    if let Some(frontend) = file.data.frontend {
        raw.frontend = frontend;
    }
    if let Some(url) = file.database.url {
        raw.database_url = url;
    }
}

fn apply_env<F>(raw: &mut RawSettings, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("DATABASE_URL") {
        raw.database_url = url;
    }
    if let Some(bind) = non_empty("DECKHAND_BIND") {
        raw.bind = bind;
    }
    if let Some(cards) = non_empty("DECKHAND_CARDS") {
        raw.cards = cards;
    }
    if let Some(frontend) = non_empty("DECKHAND_FRONTEND") {
        raw.frontend = frontend;
    }
}

fn build(base_dir: &Path, raw: RawSettings) -> Result<Config, ConfigError> {
    let bind: SocketAddr =
        raw.bind
            .trim()
            .parse()
            .map_err(|e| ConfigError::ValidationError {
                field: "server.bind".into(),
                message: format!("`{}` is not a socket address: {e}", raw.bind),
            })?;

    if raw.cards.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.cards".into(),
            message: "must not be empty".into(),
        });
    }

    let database = parse_database_url(&raw.database_url)?;
    let database = match database {
        DatabaseTarget::File(path) if path.is_relative() => {
            DatabaseTarget::File(base_dir.join(path))
        }
        other => other,
    };

    Ok(Config {
        bind,
        cards_path: resolve(base_dir, raw.cards.trim()),
        frontend_dir: resolve(base_dir, raw.frontend.trim()),
        database_url: raw.database_url.trim().to_string(),
        database,
    })
}

fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

// ---------------------------------------------------------------------------
// Database URL normalization
// ---------------------------------------------------------------------------

/// Resolve a connection string into a [`DatabaseTarget`].
///
/// Accepts SQLAlchemy-style sqlite URLs (`sqlite:///relative.db`,
/// `sqlite:////absolute.db`, `sqlite://` for memory) and bare paths. Postgres
/// URLs are recognized and rejected.
pub fn parse_database_url(url: &str) -> Result<DatabaseTarget, ConfigError> {
    let url = url.trim();

    if url.starts_with("postgres://")
        || url.starts_with("postgresql://")
        || url.starts_with("postgresql+")
    {
        return Err(ConfigError::UnsupportedDatabase {
            url: url.to_string(),
        });
    }

    if url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.url".into(),
            message: "must not be empty".into(),
        });
    }

    if let Some(rest) = url.strip_prefix("sqlite://") {
        let path = rest.strip_prefix('/').unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return Ok(DatabaseTarget::Memory);
        }
        return Ok(DatabaseTarget::File(PathBuf::from(path)));
    }

    if url == ":memory:" {
        return Ok(DatabaseTarget::Memory);
    }

    if url.contains("://") {
        return Err(ConfigError::UnsupportedDatabase {
            url: url.to_string(),
        });
    }

    Ok(DatabaseTarget::File(PathBuf::from(url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &Path, body: &str) {
        let config_dir = dir.join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join(CONFIG_FILE_NAME), body).unwrap();
    }

    #[test]
    fn defaults_without_file_or_env() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config_with_env(tmp.path(), no_env).unwrap();

        assert_eq!(config.bind, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.cards_path, tmp.path().join("cards.tsv"));
        assert_eq!(config.frontend_dir, tmp.path().join("frontend"));
        assert_eq!(
            config.database,
            DatabaseTarget::File(tmp.path().join("cards.db"))
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(
            tmp.path(),
            r#"
[server]
bind = "0.0.0.0:9000"

[data]
cards = "data/deck.tsv"

[database]
url = "sqlite://"
"#,
        );

        let config = load_config_with_env(tmp.path(), no_env).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.cards_path, tmp.path().join("data/deck.tsv"));
        assert_eq!(config.frontend_dir, tmp.path().join("frontend"));
        assert_eq!(config.database, DatabaseTarget::Memory);
    }

    #[test]
    fn env_overrides_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[server]\nbind = \"0.0.0.0:9000\"\n");

        let env = env_from(&[
            ("DECKHAND_BIND", "127.0.0.1:7001"),
            ("DATABASE_URL", "sqlite:////var/lib/deckhand/games.db"),
            ("DECKHAND_CARDS", "/srv/cards.tsv"),
        ]);
        let config = load_config_with_env(tmp.path(), env).unwrap();

        assert_eq!(config.bind.port(), 7001);
        assert_eq!(config.cards_path, PathBuf::from("/srv/cards.tsv"));
        assert_eq!(
            config.database,
            DatabaseTarget::File(PathBuf::from("/var/lib/deckhand/games.db"))
        );
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let env = env_from(&[("DATABASE_URL", "   ")]);
        let config = load_config_with_env(tmp.path(), env).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn invalid_bind_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let env = env_from(&[("DECKHAND_BIND", "not-an-address")]);
        let err = load_config_with_env(tmp.path(), env).unwrap_err();
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "server.bind"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_config(tmp.path(), "[server\nbind = ");
        let err = load_config_with_env(tmp.path(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    // -- parse_database_url --

    #[test]
    fn sqlite_urls_resolve_to_paths() {
        assert_eq!(
            parse_database_url("sqlite:///cards.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("cards.db"))
        );
        assert_eq!(
            parse_database_url("sqlite:////tmp/cards.db").unwrap(),
            DatabaseTarget::File(PathBuf::from("/tmp/cards.db"))
        );
        assert_eq!(
            parse_database_url("games.sqlite").unwrap(),
            DatabaseTarget::File(PathBuf::from("games.sqlite"))
        );
    }

    #[test]
    fn memory_urls() {
        assert_eq!(parse_database_url("sqlite://").unwrap(), DatabaseTarget::Memory);
        assert_eq!(
            parse_database_url("sqlite:///:memory:").unwrap(),
            DatabaseTarget::Memory
        );
        assert_eq!(parse_database_url(":memory:").unwrap(), DatabaseTarget::Memory);
    }

    #[test]
    fn postgres_urls_are_unsupported() {
        for url in [
            "postgres://u:p@host/db",
            "postgresql://u:p@host/db",
            "postgresql+psycopg://u:p@host/db",
            "mysql://host/db",
        ] {
            assert!(
                matches!(
                    parse_database_url(url),
                    Err(ConfigError::UnsupportedDatabase { .. })
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn memory_target_open_arg() {
        assert_eq!(DatabaseTarget::Memory.as_open_arg(), ":memory:");
    }
}
