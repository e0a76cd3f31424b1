//! Config subcommand implementations.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use crate::cli::SourceArgs;
use crate::output;
use crate::settings::{self, SettingKey};

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show the effective settings
    Show(ShowArgs),

    /// Set a key, or clear it when no value is given
    Set(SetArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Setting to change
    #[arg(value_enum)]
    pub key: SettingKey,

    /// New value; omit to restore the default
    pub value: Option<String>,
}

/// Effective settings as shown to the user.
#[derive(Debug, Serialize)]
struct Effective {
    config_file: String,
    api: String,
    proxy: Option<String>,
    page_size: u32,
    debounce_ms: u64,
}

pub fn handle(cmd: ConfigCommand, source: &SourceArgs) -> Result<()> {
    match cmd.command {
        ConfigSubcommand::Show(args) => show(args, source),
        ConfigSubcommand::Set(args) => set(args),
    }
}

fn show(args: ShowArgs, source: &SourceArgs) -> Result<()> {
    let resolved = settings::load()?.resolve(source)?;
    let effective = Effective {
        config_file: settings::config_path()?.display().to_string(),
        api: resolved.api.to_string(),
        proxy: resolved.proxy.map(|p| p.prefix().to_string()),
        page_size: resolved.controller.page_size,
        debounce_ms: u64::try_from(resolved.controller.debounce.as_millis()).unwrap_or(u64::MAX),
    };

    if args.json {
        return output::json_pretty(&effective);
    }

    output::field("Config file", &effective.config_file);
    output::field("API", &effective.api);
    output::field("Proxy", effective.proxy.as_deref().unwrap_or("(none)"));
    output::field("Page size", &effective.page_size.to_string());
    output::field("Debounce", &format!("{} ms", effective.debounce_ms));
    Ok(())
}

fn set(args: SetArgs) -> Result<()> {
    let mut current = settings::load()?;
    current.set(args.key, args.value.as_deref())?;
    let path = settings::save(&current)?;

    let name = args
        .key
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default();
    match &args.value {
        Some(value) => output::success(&format!("{} set to {}", name, value)),
        None => output::success(&format!("{} cleared", name)),
    }
    tracing::info!(path = %path.display(), "settings saved");
    Ok(())
}
