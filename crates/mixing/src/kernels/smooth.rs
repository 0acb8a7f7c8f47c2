//! Smoothing kernel - blends cells toward their neighborhood
//!
//! The direction parameter biases the blend target: 0.0 blends toward the
//! neighborhood mean, -1.0 only pulls cells down (toward the minimum),
//! 1.0 only pushes them up (toward the maximum).

use crate::error::ApplyError;
use crate::module::{Module, SmoothParams};
use crate::types::StrokeSegment;

use super::{register_height_tiles, ApplyCtx, RegionSampler};

pub(crate) fn apply(
    params: &SmoothParams,
    module: &Module,
    segment: &StrokeSegment,
    ctx: &mut ApplyCtx<'_>,
) -> Result<(), ApplyError> {
    let size = module.effective_size(ctx.settings);
    let fp = ctx
        .surface
        .footprint(segment.curr_uv, size, ctx.settings.rotation_degrees)?;

    register_height_tiles(ctx, fp.rect);

    // Target weights: centered / down-only / up-only, summing to 1
    let direction = params.direction.clamp(-1.0, 1.0);
    let centered = 1.0 - direction.abs();
    let down = (-direction).max(0.0);
    let up = direction.max(0.0);

    let strength = module.strength_factor();
    let source_rect = fp.rect.expanded(1, ctx.surface.width(), ctx.surface.height());
    let sampler = RegionSampler::new(ctx.surface, source_rect);

    for y in fp.rect.y0..fp.rect.y1 {
        for x in fp.rect.x0..fp.rect.x1 {
            let w = fp.weight(x, y, &ctx.context.stamp);
            if w <= 0.0 {
                continue;
            }

            let (avg, min, max) = sampler.neighborhood(x as i64, y as i64);
            let target = centered * avg + down * min + up * max;
            let current = sampler.get(x as i64, y as i64);
            let blended = current + (target - current) * (strength * w);
            ctx.surface.heights_mut().set(x, y, blended);
        }
    }

    ctx.surface.mark_region_dirty(fp.rect);
    Ok(())
}
