use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{env_optional, parse_setting, trim_trailing_slash, Result};

pub(crate) const DEFAULT_BIND: &str = "127.0.0.1";
pub(crate) const DEFAULT_PORT: u16 = 3000;
pub(crate) const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub(crate) const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 5_000;
pub(crate) const DEFAULT_WORKERS: usize = 4;
pub(crate) const DEFAULT_DATABASE_PATH: &str = "catalog.sqlite";

/// On-disk JSON config. Every key is optional; absent keys fall through to
/// environment variables and then to the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    #[serde(default)]
    pub(crate) bind: Option<String>,
    #[serde(default)]
    pub(crate) port: Option<u16>,
    #[serde(default)]
    pub(crate) backend_url: Option<String>,
    #[serde(default)]
    pub(crate) backend_timeout_ms: Option<u64>,
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    #[serde(default)]
    pub(crate) database_path: Option<PathBuf>,
}

pub(crate) fn load_file_config(path: &Path) -> FileConfig {
    match std::fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "config file is not valid JSON, ignoring");
            FileConfig::default()
        }),
        Err(err) => {
            warn!(path = %path.display(), %err, "config file unreadable, using defaults");
            FileConfig::default()
        }
    }
}

/// Values given on the command line. These win over everything else.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConfigOverrides {
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) bind: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) backend_url: Option<String>,
    pub(crate) workers: Option<usize>,
    pub(crate) database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    pub(crate) bind: String,
    pub(crate) port: u16,
    pub(crate) backend_url: String,
    pub(crate) backend_timeout: Duration,
    pub(crate) workers: usize,
    pub(crate) database_path: PathBuf,
}

impl AppConfig {
    /// Resolve settings: CLI flag, then environment, then config file, then default.
    pub(crate) fn load(overrides: ConfigOverrides) -> Result<Self> {
        let config_path = overrides
            .config_path
            .clone()
            .or_else(|| env_optional("CATALOG_CONFIG").map(PathBuf::from));
        let file = config_path
            .as_deref()
            .map(load_file_config)
            .unwrap_or_default();
        Self::resolve(overrides, file, env_optional)
    }

    fn resolve(
        overrides: ConfigOverrides,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let bind = overrides
            .bind
            .or_else(|| var("CATALOG_BIND"))
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => parse_setting::<u16>("CATALOG_PORT", var("CATALOG_PORT"))?
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let backend_url = overrides
            .backend_url
            .or_else(|| var("BACKEND_URL"))
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let backend_timeout_ms =
            parse_setting::<u64>("BACKEND_TIMEOUT_MS", var("BACKEND_TIMEOUT_MS"))?
                .or(file.backend_timeout_ms)
                .unwrap_or(DEFAULT_BACKEND_TIMEOUT_MS);

        let workers = match overrides.workers {
            Some(workers) => workers,
            None => parse_setting::<usize>("CATALOG_WORKERS", var("CATALOG_WORKERS"))?
                .or(file.workers)
                .unwrap_or(DEFAULT_WORKERS),
        };

        let database_path = overrides
            .database_path
            .or_else(|| var("DATABASE_PATH").map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        Ok(Self {
            bind,
            port,
            backend_url: trim_trailing_slash(&backend_url),
            backend_timeout: Duration::from_millis(backend_timeout_ms.max(1)),
            workers: workers.max(1),
            database_path,
        })
    }

    pub(crate) fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn overrides_beat_file_values() {
        let file = FileConfig {
            bind: Some("0.0.0.0".to_string()),
            port: Some(9000),
            backend_url: Some("http://file-backend".to_string()),
            backend_timeout_ms: Some(250),
            workers: Some(2),
            database_path: Some(PathBuf::from("/var/file.sqlite")),
        };
        let overrides = ConfigOverrides {
            port: Some(4100),
            backend_url: Some("http://cli-backend/".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(overrides, file, no_env).unwrap();
        assert_eq!(config.port, 4100);
        assert_eq!(config.backend_url, "http://cli-backend");
        assert_eq!(config.workers, 2);
        assert_eq!(config.backend_timeout, Duration::from_millis(250));
        assert_eq!(config.database_path, PathBuf::from("/var/file.sqlite"));
    }

    #[test]
    fn env_beats_file_but_not_overrides() {
        let file = FileConfig {
            bind: Some("0.0.0.0".to_string()),
            port: Some(9000),
            backend_url: Some("http://file-backend".to_string()),
            workers: Some(2),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            workers: Some(6),
            ..Default::default()
        };
        let env = env_from(&[
            ("CATALOG_PORT", "7000"),
            ("BACKEND_URL", "http://env-backend/"),
            ("BACKEND_TIMEOUT_MS", "1500"),
            ("CATALOG_WORKERS", "3"),
            ("CATALOG_BIND", "  "),
        ]);
        let config = AppConfig::resolve(overrides, file, env).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.backend_url, "http://env-backend");
        assert_eq!(config.backend_timeout, Duration::from_millis(1500));
        assert_eq!(config.workers, 6);
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }

    #[test]
    fn malformed_env_number_is_config_error() {
        let env = env_from(&[("CATALOG_PORT", "80a")]);
        let err = AppConfig::resolve(ConfigOverrides::default(), FileConfig::default(), env)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config(ref msg) if msg.contains("CATALOG_PORT")));

        let env = env_from(&[("BACKEND_TIMEOUT_MS", "-5")]);
        assert!(
            AppConfig::resolve(ConfigOverrides::default(), FileConfig::default(), env).is_err()
        );
    }

    #[test]
    fn zero_workers_is_clamped() {
        let overrides = ConfigOverrides {
            workers: Some(0),
            ..Default::default()
        };
        let config = AppConfig::resolve(overrides, FileConfig::default(), no_env).unwrap();
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn listen_addr_joins_bind_and_port() {
        let overrides = ConfigOverrides {
            bind: Some("0.0.0.0".to_string()),
            port: Some(8080),
            ..Default::default()
        };
        let config = AppConfig::resolve(overrides, FileConfig::default(), no_env).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn load_file_config_reads_snake_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"backend_url": "http://search:7700", "workers": 8}"#,
        )
        .unwrap();
        let file = load_file_config(&path);
        assert_eq!(file.backend_url.as_deref(), Some("http://search:7700"));
        assert_eq!(file.workers, Some(8));
        assert!(file.port.is_none());
    }

    #[test]
    fn load_file_config_falls_back_on_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_file_config(&path), FileConfig::default());
        assert_eq!(
            load_file_config(&dir.path().join("missing.json")),
            FileConfig::default()
        );
    }
}
