//! Config command handlers. These run without a loaded [`Context`] so a
//! broken settings file can still be inspected and replaced.
//!
//! [`Context`]: crate::config::Context

use std::io::IsTerminal;
use std::path::Path;

use dialoguer::Input;
use serde::Serialize;
use wallinfo_config::{Config, load_config_from, save_config_to};
use wallinfo_core::ConnectionRegistry;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{Context, settings_path};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct PathsView {
    config: String,
    config_exists: bool,
    connections: String,
    connections_exists: bool,
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let ctx = Context::load(global)?;
            let out = output::render_single(
                &global.output,
                &ctx.config,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unrenderable: {e}")),
                |_| ctx.config_path.display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let config_path = settings_path(global);
            let config = load_config_from(&config_path).unwrap_or_default();
            let connections_path = global
                .connections
                .clone()
                .unwrap_or_else(|| config.connections_path(&config_path));

            let view = PathsView {
                config: config_path.display().to_string(),
                config_exists: config_path.exists(),
                connections: connections_path.display().to_string(),
                connections_exists: connections_path.exists(),
            };
            let out = output::render_single(
                &global.output,
                &view,
                |v| format!("Settings:    {}\nConnections: {}", v.config, v.connections),
                |v| format!("{}\n{}", v.config, v.connections),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force, defaults } => {
            let config_path = settings_path(global);
            if config_path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: config_path.display().to_string(),
                });
            }

            let config = if defaults || !std::io::stdin().is_terminal() {
                Config::default()
            } else {
                prompt_config()?
            };
            save_config_to(&config, &config_path)?;

            let connections_path = global
                .connections
                .clone()
                .unwrap_or_else(|| config.connections_path(&config_path));
            ensure_connections_file(&connections_path)?;

            if !global.quiet {
                eprintln!("Settings written to {}", config_path.display());
                eprintln!("Connections file:   {}", connections_path.display());
            }
            Ok(())
        }
    }
}

fn prompt_config() -> Result<Config, CliError> {
    let mut config = Config::default();

    config.timeout_secs = Input::<u64>::new()
        .with_prompt("Fetch timeout (seconds)")
        .default(config.timeout_secs)
        .interact_text()
        .map_err(util::prompt_err)?;

    config.refresh_interval_minutes = Input::<u64>::new()
        .with_prompt("Refresh interval for watch (minutes)")
        .default(config.refresh_interval_minutes)
        .interact_text()
        .map_err(util::prompt_err)?;

    config.target.width = Input::<u32>::new()
        .with_prompt("Wallpaper width (px)")
        .default(config.target.width)
        .interact_text()
        .map_err(util::prompt_err)?;

    config.target.height = Input::<u32>::new()
        .with_prompt("Wallpaper height (px)")
        .default(config.target.height)
        .interact_text()
        .map_err(util::prompt_err)?;

    let note: String = Input::new()
        .with_prompt("Note (blank for none)")
        .allow_empty(true)
        .interact_text()
        .map_err(util::prompt_err)?;
    config.note = Some(note).filter(|n| !n.trim().is_empty());

    Ok(config)
}

fn ensure_connections_file(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Ok(());
    }
    wallinfo_config::save_connections(path, &ConnectionRegistry::new())?;
    tracing::debug!(path = %path.display(), "created empty connections file");
    Ok(())
}
