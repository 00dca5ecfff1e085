//! Shared CLI helpers — path expansion, response printing, banner.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use coder_core::config::{load_config, Config};

/// Load the config file (or defaults) with env overrides, failing loudly on
/// a file that exists but can't be used.
pub fn load_settings(path: Option<&Path>) -> Result<Config> {
    load_config(path).context("failed to load configuration")
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an assistant reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "coder".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(gateway: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}  {}", "coder".cyan().bold(), version.dimmed(), gateway.dimmed());
    println!(
        "{}",
        "Type a request, /tools, /reset, or \"exit\" to quit.".dimmed()
    );
    println!();
}

pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
