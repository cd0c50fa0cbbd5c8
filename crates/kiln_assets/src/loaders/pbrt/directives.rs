//! Scope and transform directive handlers.
//!
//! Scope handlers only push or pop [`ParseContext`] frames. Transform
//! handlers post-multiply the active transform; a malformed argument leaves
//! it untouched and reports [`KilnError::MalformedDirectiveArgument`].

use glam::Vec3;
use kiln_core::errors::malformed;
use kiln_core::transform::{from_column_major, rotated, scaled, translated};
use kiln_core::{KilnError, Result};

use super::context::ParseContext;
use super::lexer::Token;
use super::parameter::parse_floats;

// ============================================================================
// World block
// ============================================================================

pub fn world_begin(ctx: &mut ParseContext<'_>) {
    ctx.enter_world();
}

pub fn world_end(ctx: &mut ParseContext<'_>) -> Result<()> {
    ctx.exit_world()
}

// ============================================================================
// Attribute / transform scopes
// ============================================================================

/// Saves the active transform, plus the active material when
/// [`ImportSettings::scope_materials`](kiln_core::ImportSettings) is set.
pub fn attribute_begin(ctx: &mut ParseContext<'_>) {
    ctx.push_active_transform();
    if ctx.settings().scope_materials {
        ctx.push_active_material();
    }
}

pub fn attribute_end(ctx: &mut ParseContext<'_>) -> Result<()> {
    const DIRECTIVE: &str = "AttributeEnd";
    // Check both stacks up front so a failure leaves the context untouched.
    let scope_materials = ctx.settings().scope_materials;
    if ctx.transform_depth() <= 1 || (scope_materials && ctx.material_depth() <= 1) {
        return Err(KilnError::ScopeUnderflow { directive: DIRECTIVE });
    }
    ctx.pop_active_transform(DIRECTIVE)?;
    if scope_materials {
        ctx.pop_active_material(DIRECTIVE)?;
    }
    Ok(())
}

pub fn transform_begin(ctx: &mut ParseContext<'_>) {
    ctx.push_active_transform();
}

pub fn transform_end(ctx: &mut ParseContext<'_>) -> Result<()> {
    ctx.pop_active_transform("TransformEnd")
}

// ============================================================================
// Transforms
// ============================================================================

fn read_exact<const N: usize>(directive: &str, args: &[Token<'_>]) -> Result<[f32; N]> {
    let values = parse_floats(directive, args)?;
    <[f32; N]>::try_from(values.as_slice())
        .map_err(|_| malformed(directive, format!("expected {N} numbers, found {}", values.len())))
}

/// `Translate x y z`: moves the active frame by a vector given in its own
/// local coordinates. Rotation and scale are kept.
pub fn translate(ctx: &mut ParseContext<'_>, args: &[Token<'_>]) -> Result<()> {
    let [x, y, z] = read_exact::<3>("Translate", args)?;
    let next = translated(ctx.active_transform(), Vec3::new(x, y, z));
    ctx.set_active_transform(next);
    Ok(())
}

pub fn scale(ctx: &mut ParseContext<'_>, args: &[Token<'_>]) -> Result<()> {
    let [x, y, z] = read_exact::<3>("Scale", args)?;
    let next = scaled(ctx.active_transform(), Vec3::new(x, y, z));
    ctx.set_active_transform(next);
    Ok(())
}

/// `Rotate angle x y z`, angle in degrees.
pub fn rotate(ctx: &mut ParseContext<'_>, args: &[Token<'_>]) -> Result<()> {
    let [angle, x, y, z] = read_exact::<4>("Rotate", args)?;
    let next = rotated(ctx.active_transform(), angle, Vec3::new(x, y, z))
        .ok_or_else(|| malformed("Rotate", "rotation axis has zero length"))?;
    ctx.set_active_transform(next);
    Ok(())
}

pub fn identity(ctx: &mut ParseContext<'_>) {
    ctx.set_active_transform(glam::Affine3A::IDENTITY);
}

/// `Transform [m00 .. m33]`: replaces the active transform.
pub fn transform(ctx: &mut ParseContext<'_>, args: &[Token<'_>]) -> Result<()> {
    let m = read_exact::<16>("Transform", args)?;
    let next = from_column_major(&m).ok_or_else(|| malformed("Transform", "matrix is not affine"))?;
    ctx.set_active_transform(next);
    Ok(())
}

/// `ConcatTransform [m00 .. m33]`: post-multiplies the active transform.
pub fn concat_transform(ctx: &mut ParseContext<'_>, args: &[Token<'_>]) -> Result<()> {
    let m = read_exact::<16>("ConcatTransform", args)?;
    let local = from_column_major(&m).ok_or_else(|| malformed("ConcatTransform", "matrix is not affine"))?;
    let next = *ctx.active_transform() * local;
    ctx.set_active_transform(next);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::pbrt::lexer::tokenize;
    use glam::Affine3A;

    #[test]
    fn translate_rejects_wrong_arity_without_side_effects() {
        let mut ctx = ParseContext::new("scene.pbrt");
        let tokens = tokenize("1 2").unwrap();
        assert!(matches!(translate(&mut ctx, &tokens), Err(KilnError::MalformedDirectiveArgument { .. })));
        assert_eq!(*ctx.active_transform(), Affine3A::IDENTITY);
    }

    #[test]
    fn concat_with_identity_is_a_no_op() {
        let mut ctx = ParseContext::new("scene.pbrt");
        translate(&mut ctx, &tokenize("1 2 3").unwrap()).unwrap();
        let before = *ctx.active_transform();
        let tokens = tokenize("[1 0 0 0  0 1 0 0  0 0 1 0  0 0 0 1]").unwrap();
        concat_transform(&mut ctx, &tokens).unwrap();
        assert_eq!(*ctx.active_transform(), before);
    }

    #[test]
    fn attribute_end_checks_material_stack_first() {
        let settings = kiln_core::ImportSettings {
            scope_materials: true,
            ..Default::default()
        };
        let mut ctx = ParseContext::new("scene.pbrt").with_settings(settings);
        ctx.push_active_transform();
        // Transform stack has a frame to pop, the material stack does not.
        assert!(attribute_end(&mut ctx).is_err());
        assert_eq!(ctx.transform_depth(), 2);
    }
}
