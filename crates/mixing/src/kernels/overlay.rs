//! Overlay kernel - composites coverage onto an overlay layer
//!
//! Shared by the underlay and paint module kinds; only the target layer and
//! the point in the gesture where the kernel runs differ. Coverage always
//! moves toward full, there is no subtractive painting.

use crate::error::ApplyError;
use crate::module::{Module, OverlayParams};
use crate::types::StrokeSegment;

use super::{register_overlay_tiles, ApplyCtx};

/// Coverage target for every paint operation
const TARGET_COVERAGE: f32 = 1.0;

pub(crate) fn apply(
    params: &OverlayParams,
    module: &Module,
    segment: &StrokeSegment,
    ctx: &mut ApplyCtx<'_>,
) -> Result<(), ApplyError> {
    let Some(layer_name) = params.layer.as_deref() else {
        return Err(ApplyError::LayerNotSelected(module.name.clone()));
    };
    let layer_id = ctx
        .surface
        .overlay_id(layer_name)
        .ok_or_else(|| ApplyError::UnknownLayer(layer_name.to_string()))?;

    let size = module.effective_size(ctx.settings);
    let fp = ctx
        .surface
        .footprint(segment.curr_uv, size, ctx.settings.rotation_degrees)?;

    register_overlay_tiles(ctx, fp.rect);

    let strength = module.strength_factor();
    let layer = ctx.surface.overlay_mut(layer_id)?;

    for y in fp.rect.y0..fp.rect.y1 {
        for x in fp.rect.x0..fp.rect.x1 {
            let w = fp.weight(x, y, &ctx.context.stamp);
            if w > 0.0 {
                layer.blend_weight(x, y, TARGET_COVERAGE, strength * w);
            }
        }
    }

    ctx.surface.mark_region_dirty(fp.rect);
    Ok(())
}
