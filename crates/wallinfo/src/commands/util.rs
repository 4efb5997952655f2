//! Shared helpers for command handlers.

use std::io::IsTerminal;

use wallinfo_config::Config;
use wallinfo_core::{Connection, ConnectionRegistry, CoreError, Fetcher, TemplateRenderer};

use crate::cli::TemplateArgs;
use crate::config::Context;
use crate::error::CliError;

/// Look up a connection by name.
pub fn find<'a>(registry: &'a ConnectionRegistry, name: &str) -> Result<&'a Connection, CliError> {
    registry
        .get(name)
        .ok_or_else(|| CliError::ConnectionNotFound { name: name.into() })
}

/// Build a renderer with the effective timeout, HTTP settings and note.
pub fn renderer(ctx: &Context, note: Option<String>) -> Result<TemplateRenderer<Fetcher>, CliError> {
    let fetcher = Fetcher::new(&ctx.config.transport()).map_err(CoreError::from)?;
    Ok(TemplateRenderer::new(fetcher, ctx.timeout()).with_note(note))
}

/// Template text from `--template`, `--template-file`, or settings.
pub fn load_template(args: &TemplateArgs, config: &Config) -> Result<String, CliError> {
    if let Some(ref text) = args.template {
        return Ok(text.clone());
    }
    if let Some(ref path) = args.template_file {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::Validation {
            field: "template-file".into(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        return Ok(text.trim_start_matches('\u{feff}').to_owned());
    }
    Ok(config.template.clone())
}

/// `--note` if given, else the configured note.
pub fn note(args: &TemplateArgs, config: &Config) -> Option<String> {
    args.note
        .clone()
        .or_else(|| config.note().map(str::to_owned))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
