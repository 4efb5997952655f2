//! Render command: one-shot template rendering.

use serde::Serialize;
use tabled::Tabled;
use wallinfo_config::hydrate_secrets;
use wallinfo_core::{Builtins, TagResolution};

use crate::cli::{GlobalOpts, RenderArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RenderView<'a> {
    text: &'a str,
    connections: Vec<ResolutionView<'a>>,
}

#[derive(Serialize)]
struct ResolutionView<'a> {
    connection: &'a str,
    status: &'static str,
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl<'a> From<&'a TagResolution> for ResolutionView<'a> {
    fn from(t: &'a TagResolution) -> Self {
        Self {
            connection: &t.connection,
            status: t.resolution.status(),
            value: t.resolution.substitution(),
            detail: t.resolution.detail(),
        }
    }
}

#[derive(Tabled)]
struct ResolutionRow {
    #[tabled(rename = "Connection")]
    connection: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&ResolutionView<'_>> for ResolutionRow {
    fn from(v: &ResolutionView<'_>) -> Self {
        Self {
            connection: v.connection.to_owned(),
            status: v.status.to_owned(),
            value: v.value.to_owned(),
            detail: v.detail.clone().unwrap_or_default(),
        }
    }
}

fn explain(views: &[ResolutionView<'_>]) -> String {
    if views.is_empty() {
        return "No connections referenced.".into();
    }
    let rows: Vec<ResolutionRow> = views.iter().map(ResolutionRow::from).collect();
    output::render_table(&rows)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: RenderArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let template = util::load_template(&args.template, &ctx.config)?;
    let mut registry = ctx.registry()?;
    hydrate_secrets(&mut registry);

    let renderer = util::renderer(ctx, util::note(&args.template, &ctx.config))?;
    let builtins = Builtins::gather();
    let report = renderer.render_report(&template, &builtins, &registry).await;

    let views: Vec<ResolutionView<'_>> = report.tags.iter().map(ResolutionView::from).collect();
    if args.explain && !global.quiet {
        eprintln!("{}", explain(&views));
    }

    let view = RenderView {
        text: &report.text,
        connections: views,
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| v.text.to_owned(),
        |v| v.text.to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
