//! Ridge erosion kernel - steepens relief by pushing cells away from the
//! local mean

use crate::error::ApplyError;
use crate::module::{Module, RidgeErodeParams};
use crate::types::StrokeSegment;

use super::{register_height_tiles, ApplyCtx, RegionSampler};

/// Normalizes the 0..128 strength parameter
const STRENGTH_RANGE: f32 = 128.0;

pub(crate) fn apply(
    params: &RidgeErodeParams,
    module: &Module,
    segment: &StrokeSegment,
    ctx: &mut ApplyCtx<'_>,
) -> Result<(), ApplyError> {
    let size = module.effective_size(ctx.settings);
    let fp = ctx
        .surface
        .footprint(segment.curr_uv, size, ctx.settings.rotation_degrees)?;

    register_height_tiles(ctx, fp.rect);

    let strength =
        module.strength_factor() * (params.strength / STRENGTH_RANGE).clamp(0.0, 1.0);
    let sharpness = params.sharpness.clamp(0.0, 1.0);

    let source_rect = fp.rect.expanded(1, ctx.surface.width(), ctx.surface.height());
    let sampler = RegionSampler::new(ctx.surface, source_rect);

    for y in fp.rect.y0..fp.rect.y1 {
        for x in fp.rect.x0..fp.rect.x1 {
            let w = fp.weight(x, y, &ctx.context.stamp);
            if w <= 0.0 {
                continue;
            }

            // Cells above the local mean climb, cells below it sink
            let (avg, _, _) = sampler.neighborhood(x as i64, y as i64);
            let current = sampler.get(x as i64, y as i64);
            let pushed = current + (current - avg) * sharpness * strength * w;
            ctx.surface.heights_mut().set(x, y, pushed);
        }
    }

    ctx.surface.mark_region_dirty(fp.rect);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{segment_at, Fixture};
    use super::*;
    use crate::module::ModuleKind;

    fn erode_module(strength: f32, sharpness: f32) -> Module {
        Module::new(
            ModuleKind::RidgeErode(RidgeErodeParams {
                strength,
                sharpness,
            }),
            true,
            100.0,
            100.0,
            5,
            5,
        )
    }

    #[test]
    fn test_sharpens_a_ridge() {
        let mut fixture = Fixture::new();
        fixture.surface.heights_mut().clear(0.4);
        // A low ridge bump at the brush center
        fixture.surface.heights_mut().set(64, 64, 0.8);

        let module = erode_module(128.0, 1.0);
        apply(
            &RidgeErodeParams {
                strength: 128.0,
                sharpness: 1.0,
            },
            &module,
            &segment_at(0.5, 0.5),
            &mut fixture.ctx(),
        )
        .unwrap();

        // The crest climbs away from the mean, its flanks sink
        assert!(fixture.surface.heights().get(64, 64).unwrap() > 0.8);
        assert!(fixture.surface.heights().get(63, 64).unwrap() < 0.4);
    }

    #[test]
    fn test_flat_ground_is_stable() {
        let mut fixture = Fixture::new();
        fixture.surface.heights_mut().clear(0.5);

        let module = erode_module(128.0, 1.0);
        apply(
            &RidgeErodeParams {
                strength: 128.0,
                sharpness: 1.0,
            },
            &module,
            &segment_at(0.5, 0.5),
            &mut fixture.ctx(),
        )
        .unwrap();

        // No relief to amplify
        assert_eq!(fixture.surface.heights().get(64, 64), Some(0.5));
    }
}
