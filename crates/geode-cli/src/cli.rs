//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::browse::BrowseArgs;
use crate::commands::config::ConfigCommand;
use crate::commands::list::ListArgs;

/// Browse minerals, localities, photos and articles.
#[derive(Parser, Debug)]
#[command(name = "geode")]
#[command(author, version = env!("GEODE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where listings come from. Overrides the persisted settings.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Dataset API base URL (https://, http://localhost or file://)
    #[arg(long, global = true, env = "GEODE_API")]
    pub api: Option<String>,

    /// Proxy prefix the full request URL is appended to
    #[arg(long, global = true, env = "GEODE_PROXY")]
    pub proxy: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the results of one screen
    List(ListArgs),

    /// Browse a screen interactively, one command per line
    Browse(BrowseArgs),

    /// Show or change persisted settings
    Config(ConfigCommand),
}
