//! PBRT scene description loader.
//!
//! Directives are applied strictly in document order against one
//! [`ParseContext`] and one output [`Scene`]. Recoverable failures drop the
//! offending directive's output and are collected as [`Diagnostic`]s;
//! fatal ones (scope underflow, syntax, nested depth overrun) end the load.

pub mod context;
pub mod directives;
pub mod lexer;
pub mod material;
pub mod parameter;
pub mod shape;

use kiln_core::Result;
use kiln_scene::Scene;

pub use context::ParseContext;
pub use lexer::{Directive, Directives};
pub use parameter::{ParamData, ParamType, Parameter};

use crate::importer::Diagnostic;
use parameter::{parse_parameter_list, split_leading_string};

/// Applies every directive in `text` to `scene`.
///
/// Returns the first fatal error. Everything added to `scene` before that
/// point stays valid.
pub fn load(text: &str, ctx: &mut ParseContext<'_>, scene: &mut Scene, diagnostics: &mut Vec<Diagnostic>) -> Result<()> {
    for directive in Directives::new(text) {
        let directive = directive?;
        log::trace!("line {}: {}", directive.line, directive.name);

        match apply(&directive, ctx, scene) {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                let diagnostic = Diagnostic {
                    directive: directive.name.to_string(),
                    line: directive.line,
                    error: err,
                };
                diagnostic.log();
                diagnostics.push(diagnostic);
            }
        }
    }
    Ok(())
}

/// Runs the handler for a single directive.
pub fn apply(directive: &Directive<'_>, ctx: &mut ParseContext<'_>, scene: &mut Scene) -> Result<()> {
    let args = directive.args.as_slice();

    match directive.name {
        "WorldBegin" => directives::world_begin(ctx),
        "WorldEnd" => directives::world_end(ctx)?,
        "AttributeBegin" => directives::attribute_begin(ctx),
        "AttributeEnd" => directives::attribute_end(ctx)?,
        "TransformBegin" => directives::transform_begin(ctx),
        "TransformEnd" => directives::transform_end(ctx)?,

        "Translate" => directives::translate(ctx, args)?,
        "Scale" => directives::scale(ctx, args)?,
        "Rotate" => directives::rotate(ctx, args)?,
        "Identity" => directives::identity(ctx),
        "Transform" => directives::transform(ctx, args)?,
        "ConcatTransform" => directives::concat_transform(ctx, args)?,

        "Shape" => {
            let (shape_type, rest) = split_leading_string("Shape", args)?;
            let params = parse_parameter_list("Shape", rest)?;
            shape::parse_shape(shape_type, &params, ctx, scene)?;
        }
        "Material" => {
            let (material_type, rest) = split_leading_string("Material", args)?;
            let params = parse_parameter_list("Material", rest)?;
            material::parse_material(material_type, &params, ctx, scene);
        }
        "MakeNamedMaterial" => {
            let (name, rest) = split_leading_string("MakeNamedMaterial", args)?;
            let params = parse_parameter_list("MakeNamedMaterial", rest)?;
            material::make_named_material(name, &params, ctx, scene)?;
        }
        "NamedMaterial" => {
            let (name, _) = split_leading_string("NamedMaterial", args)?;
            material::named_material(name, ctx)?;
        }

        other => {
            log::warn!("Skipping unsupported directive '{other}' at line {}", directive.line);
        }
    }
    Ok(())
}
