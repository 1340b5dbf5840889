use crate::paths;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_PASSWORD: &str = "change-me";
pub const DEFAULT_SESSION_SECRET: &str = "please-change-this-secret";
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 8;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Runtime settings for the service. Built from flags and environment by the
/// CLI; constructed directly in tests.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub admin_password: String,
    pub session_secret: String,
    /// Explicit data directory. Wins over every other storage setting except
    /// `memory_only`.
    pub data_dir: Option<PathBuf>,
    /// Host only mounts temp paths writable; try [`paths::RESTRICTED_DATA_DIRS`].
    pub restricted_host: bool,
    /// Skip the disk backend entirely.
    pub memory_only: bool,
    pub public_dir: PathBuf,
    pub session_ttl: Duration,
    /// Persist sessions in a redb file instead of process memory.
    pub session_db: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            data_dir: None,
            restricted_host: false,
            memory_only: false,
            public_dir: PathBuf::from(paths::DEFAULT_PUBLIC_DIR),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_HOURS * 60 * 60),
            session_db: None,
        }
    }
}

impl Config {
    /// Data directories to try, most preferred first.
    pub fn data_dir_candidates(&self) -> Vec<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return vec![dir.clone()];
        }
        let mut candidates = Vec::new();
        if self.restricted_host {
            candidates.extend(paths::RESTRICTED_DATA_DIRS.iter().map(PathBuf::from));
        }
        candidates.push(PathBuf::from(paths::DEFAULT_DATA_DIR));
        candidates
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.admin_password.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "admin password is empty; nobody can log in".to_string(),
            });
        } else if self.admin_password == DEFAULT_ADMIN_PASSWORD {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "admin password is the built-in default; set ADMIN_PASSWORD".to_string(),
            });
        }

        if self.session_secret == DEFAULT_SESSION_SECRET {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "session secret is the built-in default; set SESSION_SECRET".to_string(),
            });
        }

        if self.session_ttl.is_zero() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "session TTL is zero; every login expires immediately".to_string(),
            });
        }

        warnings
    }
}
