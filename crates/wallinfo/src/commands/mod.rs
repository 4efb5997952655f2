//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod connections;
pub mod place;
pub mod render;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a settings-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Render(args) => render::handle(args, ctx, global).await,
        Command::Connections(args) => connections::handle(args, ctx, global).await,
        Command::Place(args) => place::handle(&args, ctx, global),
        Command::Watch(args) => watch::handle(args, ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
