use crate::modules::cli::Args;
use anyhow::{bail, Context, Result};
use std::{net::IpAddr, path::PathBuf, time::Duration};
use tracing_subscriber::filter::LevelFilter;

/// Per-worker settings, copied into every worker when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub poll_timeout: Duration,
    pub camera_timeout: Duration,
    pub onvif_insecure: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(10),
            camera_timeout: Duration::from_millis(3000),
            onvif_insecure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub roster_path: PathBuf,
    pub refresh_interval: Duration,
    pub bind_host: IpAddr,
    pub log_level: LevelFilter,
    pub log_dir: PathBuf,
    pub worker: WorkerSettings,
}

impl GatewayConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let roster = args.roster.trim();
        if roster.is_empty() {
            bail!("roster path is required");
        }
        if args.refresh_interval_secs == 0 {
            bail!("refresh interval must be positive");
        }
        if args.poll_timeout_ms == 0 {
            bail!("poll timeout must be positive");
        }
        let refresh_interval = Duration::from_secs(args.refresh_interval_secs);
        let poll_timeout = Duration::from_millis(args.poll_timeout_ms);
        if refresh_interval <= poll_timeout {
            bail!(
                "refresh interval ({}s) must be longer than the poll timeout ({}ms)",
                args.refresh_interval_secs,
                args.poll_timeout_ms
            );
        }
        let bind_host = args
            .bind_host
            .trim()
            .parse()
            .with_context(|| format!("invalid bind host `{}`", args.bind_host))?;
        let log_level = args
            .log_level
            .trim()
            .parse()
            .with_context(|| format!("invalid log level `{}`", args.log_level))?;

        Ok(Self {
            roster_path: PathBuf::from(roster),
            refresh_interval,
            bind_host,
            log_level,
            log_dir: PathBuf::from(args.log_dir.trim()),
            worker: WorkerSettings {
                poll_timeout,
                camera_timeout: Duration::from_millis(args.camera_timeout_ms),
                onvif_insecure: args.onvif_insecure,
            },
        })
    }
}


#[cfg(test)]
mod failure {
    use super::success::parse;

    #[test]
    fn refresh_must_be_coarser_than_poll() {
        assert!(parse(&["--refresh-interval-secs", "1", "--poll-timeout-ms", "1000"]).is_err());
        assert!(parse(&["--refresh-interval-secs", "0"]).is_err());
        assert!(parse(&["--poll-timeout-ms", "0"]).is_err());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--roster", " "]).is_err());
        assert!(parse(&["--bind-host", "camera-lan"]).is_err());
        assert!(parse(&["--log-level", "chatty"]).is_err());
    }
}
