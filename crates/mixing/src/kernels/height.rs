//! Height kernel - raises (or lowers) the heightfield under the brush

use crate::error::ApplyError;
use crate::module::{HeightParams, Module};
use crate::types::StrokeSegment;

use super::{register_height_tiles, ApplyCtx};

/// Height change per full-weight segment application
const RAISE_STEP: f32 = 0.001;

pub(crate) fn apply(
    params: &HeightParams,
    module: &Module,
    segment: &StrokeSegment,
    ctx: &mut ApplyCtx<'_>,
) -> Result<(), ApplyError> {
    let size = module.effective_size(ctx.settings);
    let fp = ctx
        .surface
        .footprint(segment.curr_uv, size, ctx.settings.rotation_degrees)?;

    register_height_tiles(ctx, fp.rect);

    let mut step = module.strength_factor() * RAISE_STEP;
    if params.invert {
        step = -step;
    }

    for y in fp.rect.y0..fp.rect.y1 {
        for x in fp.rect.x0..fp.rect.x1 {
            let w = fp.weight(x, y, &ctx.context.stamp);
            if w > 0.0 {
                ctx.surface.heights_mut().add(x, y, step * w);
            }
        }
    }

    ctx.surface.mark_region_dirty(fp.rect);
    Ok(())
}
