//! Place command: preview-to-wallpaper coordinate mapping.

use wallinfo_core::{PlacementRect, PlacementStatus, ScaleContext};

use crate::cli::{GlobalOpts, PlaceArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &PlaceArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let base = ctx.config.placement;
    let rect = PlacementRect::new(
        args.left.unwrap_or(base.left),
        args.top.unwrap_or(base.top),
        args.width.unwrap_or(base.width),
        args.height.unwrap_or(base.height),
    );

    let target = &ctx.config.target;
    let scale = ScaleContext::from_target(
        args.target_width.unwrap_or(target.width),
        args.target_height.unwrap_or(target.height),
        args.scale.unwrap_or(target.preview_scale),
    );

    let status = PlacementStatus::compute(rect, scale)?;
    tracing::debug!(?status, "placement computed");

    let out = output::render_single(&global.output, &status, ToString::to_string, |s| {
        format!("{} {}", s.target.x, s.target.y)
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
