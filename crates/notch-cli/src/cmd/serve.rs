use anyhow::{anyhow, Result};
use clap::Args;
use notch_core::config::{
    Config, WarnLevel, DEFAULT_ADMIN_PASSWORD, DEFAULT_PORT, DEFAULT_SESSION_SECRET,
    DEFAULT_SESSION_TTL_HOURS,
};
use notch_core::paths::DEFAULT_PUBLIC_DIR;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (0 = OS-assigned)
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Shared admin password
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true, default_value = DEFAULT_ADMIN_PASSWORD)]
    pub admin_password: String,

    /// Secret used to sign session cookies
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true, default_value = DEFAULT_SESSION_SECRET)]
    pub session_secret: String,

    /// Host only allows writes under temp paths; try /var/tmp/data then /tmp/data
    #[arg(long, env = "RENDER")]
    pub render: bool,

    /// Keep orders in memory only
    #[arg(long, env = "NOTCH_MEMORY_ONLY")]
    pub memory: bool,

    /// Directory with index.html, order.html, admin.html and other assets
    #[arg(long, env = "PUBLIC_DIR", default_value = DEFAULT_PUBLIC_DIR)]
    pub public_dir: PathBuf,

    /// Admin session lifetime in hours
    #[arg(long, env = "SESSION_TTL_HOURS", default_value_t = DEFAULT_SESSION_TTL_HOURS)]
    pub session_ttl_hours: u64,

    /// Persist admin sessions in this redb file (default: in memory)
    #[arg(long, env = "SESSION_DB")]
    pub session_db: Option<PathBuf>,
}

impl ServeArgs {
    pub fn into_config(self, data_dir: Option<&Path>) -> Result<Config> {
        let ttl_secs = self.session_ttl_hours.checked_mul(60 * 60).ok_or_else(|| {
            anyhow!(
                "--session-ttl-hours {} is too large",
                self.session_ttl_hours
            )
        })?;
        Ok(Config {
            port: self.port,
            admin_password: self.admin_password,
            session_secret: self.session_secret,
            data_dir: data_dir.map(Path::to_path_buf),
            restricted_host: self.render,
            memory_only: self.memory,
            public_dir: self.public_dir,
            session_ttl: Duration::from_secs(ttl_secs),
            session_db: self.session_db,
        })
    }
}

pub fn run(args: ServeArgs, data_dir: Option<&Path>) -> Result<()> {
    let config = args.into_config(data_dir)?;

    for warning in config.validate() {
        match warning.level {
            WarnLevel::Warning => tracing::warn!("{}", warning.message),
            WarnLevel::Error => tracing::error!("{}", warning.message),
        }
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        tokio::select! {
            res = notch_server::serve(&config) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn flags_map_onto_config() {
        let harness = Harness::parse_from([
            "notch",
            "--port",
            "8080",
            "--admin-password",
            "pw",
            "--session-secret",
            "sec",
            "--render",
            "--session-ttl-hours",
            "2",
        ]);
        let config = harness
            .serve
            .into_config(Some(Path::new("/srv/orders")))
            .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_password, "pw");
        assert_eq!(config.session_secret, "sec");
        assert!(config.restricted_host);
        assert!(!config.memory_only);
        assert_eq!(config.session_ttl, Duration::from_secs(2 * 60 * 60));
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/orders")));
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        let hours = (u64::MAX / 2).to_string();
        let harness = Harness::parse_from(["notch", "--session-ttl-hours", hours.as_str()]);
        let err = harness.serve.into_config(None).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
