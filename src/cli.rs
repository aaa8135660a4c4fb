//! CLI argument parsing.
use clap::Parser;

/// Notify a Discord channel of changelog entries published since the last
/// successful publish run. All job configuration comes from the environment;
/// see the README for the expected variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}
