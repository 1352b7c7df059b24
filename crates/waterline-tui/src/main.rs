//! `waterline-tui`: live terminal dashboard for a water-level sensor feed.
//!
//! Built on [ratatui](https://ratatui.rs). A background data bridge forwards
//! dataset snapshots and feed status from `waterline-core`'s
//! [`Monitor`](waterline_core::Monitor) into the action loop. Two screens:
//! Dashboard (gauge, connectivity, system health, session trends) and
//! History (range chart, paginated log, CSV export).
//!
//! Logs go to a file (default `/tmp/waterline-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod export;
mod screen;
mod screens;
#[cfg(test)]
mod test_support;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use waterline_config::Profile;
use waterline_core::config::DEFAULT_REFRESH_INTERVAL;
use waterline_core::{Monitor, MonitorConfig};

use crate::app::App;

/// Live terminal dashboard for a remote water-level sensor feed.
#[derive(Parser, Debug)]
#[command(name = "waterline-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "WATERLINE_PROFILE")]
    profile: Option<String>,

    /// Feed URL (overrides the profile)
    #[arg(short, long, env = "WATERLINE_ENDPOINT")]
    endpoint: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, env = "WATERLINE_INSECURE")]
    insecure: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/waterline-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard flushes the writer on drop and
/// must live as long as the app.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("waterline_tui={level},waterline_core={level}"))
    });

    let dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let file_name = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("waterline-tui.log"));

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Flags > selected profile > `[defaults]`.
fn monitor_config(cli: &Cli) -> Result<MonitorConfig> {
    let cfg = waterline_config::load_config()?;
    let name = cli
        .profile
        .clone()
        .unwrap_or_else(|| cfg.active_profile_name().to_owned());

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if cli.profile.is_some() => bail!("profile '{name}' not found"),
        None if cli.endpoint.is_some() => Profile::default(),
        None => bail!(
            "no feed configured; run `waterline config init` or pass --endpoint <URL>"
        ),
    };
    if let Some(ref endpoint) = cli.endpoint {
        profile.endpoint.clone_from(endpoint);
    }
    if cli.insecure {
        profile.insecure = Some(true);
    }

    let mut config = waterline_config::profile_to_monitor_config(&profile, &cfg.defaults)?;
    // The dashboard always polls.
    if config.refresh_interval.is_zero() {
        config.refresh_interval = DEFAULT_REFRESH_INTERVAL;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so a panic during terminal setup still restores it.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = monitor_config(&cli)?;
    info!(endpoint = %config.endpoint, "starting waterline-tui");

    let monitor = Monitor::new(config)?;
    let mut app = App::new(monitor);
    app.run().await?;

    Ok(())
}
