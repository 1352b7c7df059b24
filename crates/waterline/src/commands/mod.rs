//! Command dispatch: bridges CLI args -> monitor -> output formatting.

pub mod config_cmd;
pub mod export;
pub mod latest;
pub mod readings;
pub mod stats;
pub mod trend;
pub mod util;
pub mod watch;

use waterline_core::MonitorConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a feed-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: MonitorConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Latest => latest::handle(config, global).await,
        Command::Readings(args) => readings::handle(config, &args, global).await,
        Command::Stats(args) => stats::handle(config, &args, global).await,
        Command::Trend(args) => trend::handle(config, &args, global).await,
        Command::Export(args) => export::handle(config, &args, global).await,
        Command::Watch(args) => watch::handle(config, &args, global).await,
        // Config and Completions never reach the feed.
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to feed dispatch".into(),
        )),
    }
}
