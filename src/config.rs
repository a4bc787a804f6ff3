//! Runtime configuration for the binaries.
//!
//! Read from `semester-grid.toml` (or the file named by
//! `SEMESTER_GRID_CONFIG`), then overridden by `SEMESTER_GRID_*` variables.
//! Every section is optional.

use crate::calendar::{Semester, SemesterHalf};
use crate::persistence::{JsonPlanStore, MemoryPlanStore, PersistenceResult, SharedPlanStore};
use crate::plan::SemesterPlan;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CONFIG_FILE: &str = "semester-grid.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub plan: PlanSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_addr")]
    pub addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidValue(format!(
                "unknown storage backend '{value}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_filter")]
    pub filter: String,
}

/// Semester used when the store holds no plan yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSettings {
    #[serde(default = "default_half")]
    pub half: u8,
    #[serde(default = "default_year")]
    pub year: String,
}

fn default_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_backend() -> StorageBackend {
    StorageBackend::Json
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("semester-plan.json")
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_half() -> u8 {
    1
}

fn default_year() -> String {
    "2025/2026".to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            half: default_half(),
            year: default_year(),
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// File named by `SEMESTER_GRID_CONFIG`, else `semester-grid.toml` when
    /// present, else defaults; environment overrides applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("SEMESTER_GRID_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SEMESTER_GRID_HTTP_ADDR") {
            self.http.addr = addr;
        }
        if let Some(path) = lookup("SEMESTER_GRID_STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(backend) = lookup("SEMESTER_GRID_STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        Ok(())
    }

    pub fn semester(&self) -> Result<Semester, ConfigError> {
        let half = SemesterHalf::try_from(self.plan.half).map_err(ConfigError::InvalidValue)?;
        Ok(Semester::new(half, self.plan.year.clone()))
    }

    pub fn new_plan(&self) -> Result<SemesterPlan, ConfigError> {
        Ok(SemesterPlan::new(self.semester()?))
    }

    pub fn open_store(&self) -> PersistenceResult<SharedPlanStore> {
        match self.storage.backend {
            StorageBackend::Json => Ok(Box::new(JsonPlanStore::new(self.storage.path.clone()))),
            StorageBackend::Memory => Ok(Box::new(MemoryPlanStore::new())),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => Ok(Box::new(
                crate::persistence::sqlite::SqlitePlanStore::new(&self.storage.path)?,
            )),
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => Err(crate::persistence::PersistenceError::InvalidData(
                "sqlite storage requires the `sqlite` feature".into(),
            )),
        }
    }

    /// Installs the global tracing subscriber, writing to stderr. `RUST_LOG`
    /// wins over `logging.filter`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
