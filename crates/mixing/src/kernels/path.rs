//! Path kernel - carves the heightfield toward a target height that follows
//! the stroke
//!
//! The target for each segment is the height the stroke started at, displaced
//! by the accumulated stroke height delta and the height profile. Width and
//! strength profiles scale the brush over the stroke's length, so a path can
//! taper or fade out toward its end.

use terrain::MIN_BRUSH_SIZE;

use crate::error::ApplyError;
use crate::module::{Module, PathParams};
use crate::types::StrokeSegment;

use super::{register_height_tiles, ApplyCtx};

pub(crate) fn apply(
    params: &PathParams,
    module: &Module,
    segment: &StrokeSegment,
    ctx: &mut ApplyCtx<'_>,
) -> Result<(), ApplyError> {
    let width_scale = params.width_profile.evaluate(segment.progress);
    let size = module.effective_size(ctx.settings) * width_scale;
    if size < MIN_BRUSH_SIZE {
        // The width profile has pinched the path shut; nothing to carve
        return Ok(());
    }

    let fp = ctx
        .surface
        .footprint(segment.curr_uv, size, ctx.settings.rotation_degrees)?;

    register_height_tiles(ctx, fp.rect);

    let target = (segment.start_height
        + segment.progress * segment.height_delta
        + params.height_profile.evaluate(segment.progress))
    .clamp(0.0, 1.0);

    let strength = (ctx.settings.strength
        * module.strength_factor()
        * params.strength_profile.evaluate(segment.progress))
    .clamp(0.0, 1.0);

    for y in fp.rect.y0..fp.rect.y1 {
        for x in fp.rect.x0..fp.rect.x1 {
            let w = fp.weight(x, y, &ctx.context.stamp);
            if w <= 0.0 {
                continue;
            }

            if let Some(current) = ctx.surface.heights().get(x, y) {
                let carved = current + (target - current) * (strength * w);
                ctx.surface.heights_mut().set(x, y, carved);
            }
        }
    }

    ctx.surface.mark_region_dirty(fp.rect);
    Ok(())
}
