//! Watch command: periodic re-render until interrupted.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use wallinfo_config::{ConfigError, hydrate_secrets, load_connections};
use wallinfo_core::{RefreshLoop, RenderOutcome, SharedRegistry};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: WatchArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let template = util::load_template(&args.template, &ctx.config)?;
    let mut registry = ctx.registry()?;
    hydrate_secrets(&mut registry);

    let renderer = Arc::new(util::renderer(ctx, util::note(&args.template, &ctx.config))?);
    let interval = args
        .interval
        .as_ref()
        .map_or_else(|| ctx.config.refresh_interval(), |d| **d);

    let cancel = CancellationToken::new();
    let connections_path = ctx.connections_path.clone();
    let refresh = RefreshLoop::new(renderer, SharedRegistry::new(registry), template, interval)
        .with_reload(move || {
            let mut registry = load_connections(&connections_path)?;
            hydrate_secrets(&mut registry);
            Ok::<_, ConfigError>(registry)
        });
    tracing::info!(interval = ?refresh.interval(), "watching");
    let (mut rx, handle) = refresh.spawn(cancel.clone());

    let color = output::should_color(&global.color);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut rendered = 0_u64;
    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                break Ok(());
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let Some(outcome) = rx.borrow_and_update().clone() else {
                    continue;
                };
                if let Err(e) = emit(&outcome, &args, global, color).await {
                    break Err(e);
                }
                rendered += 1;
                if args.count.is_some_and(|n| rendered >= n) {
                    break Ok(());
                }
            }
        }
    };

    cancel.cancel();
    if let Err(e) = handle.await {
        tracing::warn!(error = %e, "refresh task ended abnormally");
    }
    result
}

async fn emit(
    outcome: &RenderOutcome,
    args: &WatchArgs,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    if let Some(ref path) = args.out {
        tokio::fs::write(path, &outcome.text).await?;
        tracing::info!(path = %path.display(), "wrote render");
        return Ok(());
    }

    let out = match global.output {
        OutputFormat::Table => {
            let stamp = format!("── {} ──", outcome.rendered_at.format("%Y-%m-%d %H:%M:%S UTC"));
            format!("{}\n{}", output::dim(&stamp, color), outcome.text)
        }
        OutputFormat::Plain => outcome.text.clone(),
        // One document per render so the stream stays line-parseable.
        OutputFormat::Json | OutputFormat::JsonCompact => {
            output::render_single(&OutputFormat::JsonCompact, outcome, |_| String::new(), |_| String::new())
        }
        OutputFormat::Yaml => format!(
            "---\n{}",
            output::render_single(&OutputFormat::Yaml, outcome, |_| String::new(), |_| String::new())
        ),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
