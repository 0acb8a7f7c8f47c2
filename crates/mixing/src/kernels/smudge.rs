//! Smudge kernel - drags heights along the stroke direction

use glam::Vec2;

use crate::error::ApplyError;
use crate::module::{Module, SmudgeParams};
use crate::types::StrokeSegment;

use super::{register_height_tiles, ApplyCtx, RegionSampler};

/// Movement below this many cells is not worth smudging
const MIN_DRAG_DISTANCE: f32 = 1e-3;

pub(crate) fn apply(
    _params: &SmudgeParams,
    module: &Module,
    segment: &StrokeSegment,
    ctx: &mut ApplyCtx<'_>,
) -> Result<(), ApplyError> {
    let size = module.effective_size(ctx.settings);
    let fp = ctx
        .surface
        .footprint(segment.curr_uv, size, ctx.settings.rotation_degrees)?;

    // Drag direction in cells, from the previous sample toward the current one
    let dims = Vec2::new(ctx.surface.width() as f32, ctx.surface.height() as f32);
    let drag = (segment.curr_uv - segment.prev_uv) * dims;
    if drag.length() < MIN_DRAG_DISTANCE {
        return Ok(());
    }

    register_height_tiles(ctx, fp.rect);

    let strength = module.strength_factor();
    let margin = drag.length().ceil() as u32 + 1;
    let source_rect = fp
        .rect
        .expanded(margin, ctx.surface.width(), ctx.surface.height());
    let sampler = RegionSampler::new(ctx.surface, source_rect);

    for y in fp.rect.y0..fp.rect.y1 {
        for x in fp.rect.x0..fp.rect.x1 {
            let w = fp.weight(x, y, &ctx.context.stamp);
            if w <= 0.0 {
                continue;
            }

            // Pull the height that sat upstream of this cell
            let upstream_x = ((x as f32 + 0.5) - drag.x).floor() as i64;
            let upstream_y = ((y as f32 + 0.5) - drag.y).floor() as i64;
            let upstream = sampler.get(upstream_x, upstream_y);

            let current = sampler.get(x as i64, y as i64);
            let blended = current + (upstream - current) * (strength * w);
            ctx.surface.heights_mut().set(x, y, blended);
        }
    }

    ctx.surface.mark_region_dirty(fp.rect);
    Ok(())
}
