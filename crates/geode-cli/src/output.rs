//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use geode_core::Entity;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a status line to stderr.
pub fn status(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one list row: position, label and detail.
pub fn item<T: Entity>(position: usize, item: &T) {
    let index = format!("{:>4}.", position + 1);
    match item.detail() {
        Some(detail) => println!("{} {}  {}", index.dimmed(), item.label().bold(), detail.dimmed()),
        None => println!("{} {}", index.dimmed(), item.label().bold()),
    }
}

/// The empty-list affordance. Failures and empty results look the same.
pub fn no_results(hint: &str) {
    eprintln!("{}", "No results.".yellow());
    eprintln!("{}", hint.dimmed());
}
