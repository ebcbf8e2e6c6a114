// Configuration loading and parsing (server.toml).

use chrono::Datelike;
use serde::Deserialize;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::table::PageSize;

const DEFAULTS_DIR: &str = "defaults";
const CONFIG_DIR: &str = "config";
const SERVER_FILE: &str = "server.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("no defaults/ or config/ directory under {}", base.display())]
    NoConfigDir { base: PathBuf },

    #[error("failed to seed {} from defaults: {source}", path.display())]
    DefaultsCopyError { path: PathBuf, source: io::Error },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub data_path: PathBuf,
    pub default_page_size: PageSize,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Error details are only shown to visitors in development.
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl ServerConfig {
    /// `host:port` for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Page chrome: document title, navbar brand, footer.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub copyright_year: i32,
}

// ---------------------------------------------------------------------------
// server.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire server.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ServerFile {
    server: ServerConfig,
    data: DataSection,
    table: TableSection,
    site: SiteSection,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TableSection {
    default_page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct SiteSection {
    title: String,
    brand: String,
    description: String,
    #[serde(default)]
    copyright_year: Option<i32>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/server.toml` relative to the
/// given `base_dir`. A relative data path is resolved against `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let server_path = base_dir.join(CONFIG_DIR).join(SERVER_FILE);
    let text = fs::read_to_string(&server_path).map_err(|_| ConfigError::FileNotFound {
        path: server_path.clone(),
    })?;
    let file: ServerFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: server_path.clone(),
        source: e,
    })?;

    validate(&file)?;

    let default_page_size =
        PageSize::new(file.table.default_page_size).ok_or_else(|| page_size_error(&file))?;

    let data_path = PathBuf::from(&file.data.path);
    let data_path = if data_path.is_absolute() {
        data_path
    } else {
        base_dir.join(data_path)
    };

    let site = SiteConfig {
        title: file.site.title,
        brand: file.site.brand,
        description: file.site.description,
        copyright_year: file
            .site
            .copyright_year
            .unwrap_or_else(|| chrono::Local::now().year()),
    };

    Ok(Config {
        server: file.server,
        data_path,
        default_page_size,
        site,
    })
}

/// Seed `config/` from `defaults/`. Every regular file except `*.example`
/// templates is copied unless `config/` already has a file by that name.
/// Returns the files written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join(DEFAULTS_DIR);
    let config_dir = base_dir.join(CONFIG_DIR);

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, true) => return Ok(Vec::new()),
        (false, false) => {
            return Err(ConfigError::NoConfigDir {
                base: base_dir.to_path_buf(),
            })
        }
        _ => {}
    }

    fs::create_dir_all(&config_dir).map_err(seed_error(&config_dir))?;

    let mut seeded = Vec::new();
    for entry in fs::read_dir(&defaults_dir).map_err(seed_error(&defaults_dir))? {
        let source = entry.map_err(seed_error(&defaults_dir))?.path();
        if !is_seedable(&source) {
            continue;
        }
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if seed_file(&source, &target).map_err(seed_error(&target))? {
            info!("created {} from {}", target.display(), source.display());
            seeded.push(target);
        }
    }

    Ok(seeded)
}

/// Load configuration from the working directory, seeding `config/` from
/// `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(seed_error(Path::new(".")))?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_seedable(path: &Path) -> bool {
    path.is_file() && !path.extension().is_some_and(|ext| ext == "example")
}

/// Copy `source` to `target` unless `target` exists. Returns whether a file
/// was written.
fn seed_file(source: &Path, target: &Path) -> io::Result<bool> {
    let mut dest = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    io::copy(&mut fs::File::open(source)?, &mut dest)?;
    Ok(true)
}

fn seed_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::DefaultsCopyError { path, source }
}

fn page_size_error(file: &ServerFile) -> ConfigError {
    ConfigError::ValidationError {
        field: "table.default_page_size".into(),
        message: format!(
            "must be one of {:?}, got {}",
            PageSize::OPTIONS,
            file.table.default_page_size
        ),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(file: &ServerFile) -> Result<(), ConfigError> {
    if file.server.host.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "server.host".into(),
            message: "must not be empty".into(),
        });
    }

    if file.server.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    if file.data.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.path".into(),
            message: "must not be empty".into(),
        });
    }

    if PageSize::new(file.table.default_page_size).is_none() {
        return Err(page_size_error(file));
    }

    let text_fields: &[(&str, &str)] = &[
        ("site.title", file.site.title.as_str()),
        ("site.brand", file.site.brand.as_str()),
    ];
    for (name, val) in text_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if let Some(year) = file.site.copyright_year {
        if !(1970..=9999).contains(&year) {
            return Err(ConfigError::ValidationError {
                field: "site.copyright_year".into(),
                message: format!("must be a four-digit year, got {year}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the path to the player-analytics crate root
    /// (works whether `cargo test` runs from the crate root or repo root).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/player-analytics/defaults").exists() {
            cwd.join("crates/player-analytics")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    const VALID_TOML: &str = r#"
[server]
host = "0.0.0.0"
port = 8080
environment = "production"

[data]
path = "players.csv"

[table]
default_page_size = 20

[site]
title = "Test Title"
brand = "Test Brand"
description = "Test description"
copyright_year = 2025
"#;

    /// Write `content` as config/server.toml under a fresh temp dir.
    fn write_config(name: &str, content: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/server.toml"), content).unwrap();
        tmp
    }

    fn expect_validation_field(err: ConfigError, expected: &str) {
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_valid_config_from_project_files() {
        let root = project_root();
        ensure_config_files(&root).expect("should copy default configs");
        let config = load_config_from(&root).expect("should load valid config");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config
            .data_path
            .ends_with("data/gomafia_player_rankings.csv"));
        assert_eq!(config.default_page_size, PageSize::DEFAULT);
        assert_eq!(config.site.title, "GoMafia Player Analytics");
        assert_eq!(config.site.brand, "GoMafia Analytics");
        assert!(config.site.copyright_year >= 2024);
    }

    #[test]
    fn explicit_values_are_used() {
        let tmp = write_config("config_test_explicit", VALID_TOML);
        let config = load_config_from(&tmp).unwrap();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert!(!config.server.environment.is_development());
        assert_eq!(config.data_path, tmp.join("players.csv"));
        assert_eq!(config.default_page_size.get(), 20);
        assert_eq!(config.site.copyright_year, 2025);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_copyright_year_defaults_to_current_year() {
        let toml = VALID_TOML.replace("copyright_year = 2025\n", "");
        let tmp = write_config("config_test_no_year", &toml);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.site.copyright_year, chrono::Local::now().year());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn absolute_data_path_is_kept() {
        let toml = VALID_TOML.replace("path = \"players.csv\"", "path = \"/srv/players.csv\"");
        let tmp = write_config("config_test_abs_path", &toml);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/players.csv"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_unsupported_page_size() {
        let toml = VALID_TOML.replace("default_page_size = 20", "default_page_size = 25");
        let tmp = write_config("config_test_page_size", &toml);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "table.default_page_size");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_port_zero() {
        let toml = VALID_TOML.replace("port = 8080", "port = 0");
        let tmp = write_config("config_test_port_zero", &toml);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "server.port");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_data_path() {
        let toml = VALID_TOML.replace("path = \"players.csv\"", "path = \"  \"");
        let tmp = write_config("config_test_empty_path", &toml);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "data.path");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_brand() {
        let toml = VALID_TOML.replace("brand = \"Test Brand\"", "brand = \"\"");
        let tmp = write_config("config_test_empty_brand", &toml);
        expect_validation_field(load_config_from(&tmp).unwrap_err(), "site.brand");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_environment_is_a_parse_error() {
        let toml = VALID_TOML.replace("\"production\"", "\"staging\"");
        let tmp = write_config("config_test_bad_env", &toml);
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got: {err}");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_server_toml() {
        let tmp = std::env::temp_dir().join("config_test_missing_server");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => {
                assert!(path.ends_with("server.toml"));
            }
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = write_config("config_test_invalid_toml", "this is not [valid toml");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got: {err}");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("config_test_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults = tmp.join("defaults");
        fs::create_dir_all(&defaults).unwrap();

        let root = project_root();
        fs::copy(root.join("defaults/server.toml"), defaults.join("server.toml")).unwrap();
        fs::write(defaults.join("server.toml.example"), "ignored").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied, vec![tmp.join("config/server.toml")]);
        assert!(!tmp.join("config/server.toml.example").exists());
        assert!(load_config_from(&tmp).is_ok());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("config_test_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("defaults/server.toml"), "from defaults").unwrap();
        fs::write(tmp.join("config/server.toml"), VALID_TOML).unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config/server.toml")).unwrap();
        assert_eq!(content, VALID_TOML);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_no_defaults_dir_is_ok() {
        let tmp = std::env::temp_dir().join("config_test_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert!(copied.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("config_test_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::NoConfigDir { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }
}
