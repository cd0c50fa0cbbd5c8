//! Material directives.
//!
//! Every material type reads a fixed, ordered list of named parameters.
//! The lists live in [`MATERIAL_SCHEMAS`]; a missing parameter falls back to
//! the schema default when there is one. Parameters no schema entry claims
//! are copied onto the material afterwards.

use glam::Vec3;
use kiln_core::errors::malformed;
use kiln_core::{Result, Value};
use kiln_scene::{Material, MaterialHandle, MaterialProperty, Scene, SemanticHint};

use super::context::ParseContext;
use super::parameter::{ParamType, Parameter};

use SemanticHint::{Diffuse, Metallic, Opacity, Reflectivity, RefractionIndex, Roughness, Unknown};

/// Default recorded when a schema parameter is not supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaDefault {
    Float(f32),
    Vec3(Vec3),
}

impl From<SchemaDefault> for Value {
    fn from(value: SchemaDefault) -> Self {
        match value {
            SchemaDefault::Float(f) => Value::Float(f),
            SchemaDefault::Vec3(v) => Value::Vec3(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySchema {
    pub name: &'static str,
    pub semantic: SemanticHint,
    pub default: Option<SchemaDefault>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSchema {
    pub material_type: &'static str,
    pub properties: &'static [PropertySchema],
}

const fn float(name: &'static str, semantic: SemanticHint, default: f32) -> PropertySchema {
    PropertySchema {
        name,
        semantic,
        default: Some(SchemaDefault::Float(default)),
    }
}

const fn vec3(name: &'static str, semantic: SemanticHint, x: f32, y: f32, z: f32) -> PropertySchema {
    PropertySchema {
        name,
        semantic,
        default: Some(SchemaDefault::Vec3(Vec3::new(x, y, z))),
    }
}

const fn unset(name: &'static str) -> PropertySchema {
    PropertySchema {
        name,
        semantic: SemanticHint::Unknown,
        default: None,
    }
}

/// Per-type parameter lists, in the order properties are recorded.
pub static MATERIAL_SCHEMAS: &[MaterialSchema] = &[
    MaterialSchema {
        material_type: "glass",
        properties: &[
            float("Kr", Reflectivity, 1.0),
            float("Kt", Opacity, 1.0),
            float("index", RefractionIndex, 1.5),
        ],
    },
    MaterialSchema {
        material_type: "KdSubsurface",
        properties: &[
            float("Kd", Diffuse, 0.5),
            float("meanfreepath", Unknown, 1.0),
            float("index", RefractionIndex, 1.0),
            float("Kr", Reflectivity, 1.0),
        ],
    },
    MaterialSchema {
        material_type: "matte",
        properties: &[float("Kd", Diffuse, 0.5), float("sigma", Unknown, 0.0)],
    },
    MaterialSchema {
        material_type: "measured",
        properties: &[unset("filename")],
    },
    MaterialSchema {
        material_type: "metal",
        properties: &[
            float("eta", RefractionIndex, 0.5),
            float("k", Reflectivity, 0.5),
            float("roughness", Roughness, 0.01),
        ],
    },
    MaterialSchema {
        material_type: "mirror",
        properties: &[float("Kr", Reflectivity, 0.5)],
    },
    MaterialSchema {
        material_type: "mixture",
        properties: &[
            float("amount", Unknown, 0.5),
            unset("namedmaterial1"),
            unset("namedmaterial2"),
        ],
    },
    MaterialSchema {
        material_type: "plastic",
        properties: &[
            float("Kd", Diffuse, 0.25),
            float("Ks", Metallic, 0.25),
            float("roughness", Roughness, 0.1),
        ],
    },
    MaterialSchema {
        material_type: "shinymetal",
        properties: &[
            float("roughness", Roughness, 0.1),
            float("Ks", Roughness, 1.0),
            float("Kr", Metallic, 1.0),
        ],
    },
    MaterialSchema {
        material_type: "substrate",
        properties: &[
            float("Kd", Diffuse, 0.5),
            float("Ks", Metallic, 0.5),
            float("uroughness", Roughness, 0.1),
            float("vroughness", Roughness, 0.1),
        ],
    },
    MaterialSchema {
        material_type: "subsurface",
        properties: &[
            unset("name"),
            vec3("sigma_a", Unknown, 0.0011, 0.0024, 0.014),
            vec3("sigma_prime_s", Unknown, 2.55, 3.12, 3.77),
            float("scale", Unknown, 1.0),
            float("index", RefractionIndex, 1.3),
        ],
    },
    MaterialSchema {
        material_type: "translucent",
        properties: &[
            float("Kd", Diffuse, 0.25),
            float("Ks", Roughness, 0.25),
            float("reflect", Metallic, 0.5),
            float("transmit", Opacity, 0.5),
            float("roughness", Roughness, 0.1),
        ],
    },
    MaterialSchema {
        material_type: "uber",
        properties: &[
            float("Kd", Diffuse, 0.25),
            float("Ks", Roughness, 0.25),
            float("Kr", Metallic, 0.25),
            float("roughness", Roughness, 0.1),
            float("index", RefractionIndex, 0.1),
            float("opacity", Opacity, 1.0),
        ],
    },
];

/// Looks up the schema for a material type (ASCII case-insensitive).
#[must_use]
pub fn schema_for(material_type: &str) -> Option<&'static MaterialSchema> {
    MATERIAL_SCHEMAS
        .iter()
        .find(|schema| schema.material_type.eq_ignore_ascii_case(material_type))
}

/// Records one schema property on `material`.
///
/// The first non-empty parameter named `name` wins. Texture-typed matches
/// claim the slot without producing a property. With no match, `default`
/// is recorded if set.
pub fn read_material_parameter(
    semantic: SemanticHint,
    name: &str,
    material: &mut Material,
    params: &[Parameter],
    default: Option<SchemaDefault>,
) {
    if let Some(param) = params.iter().find(|p| !p.is_empty() && p.is_named(name)) {
        if param.param_type() == ParamType::Texture {
            log::debug!("Material parameter '{name}' is bound to a texture, texture binding is not supported");
        } else if let Some(value) = param.first_value() {
            material.add_property(MaterialProperty::new(semantic, name, value));
        }
        return;
    }

    if let Some(default) = default {
        material.add_property(MaterialProperty::new(semantic, name, default));
    }
}

/// Builds a material through its type schema. Does not touch the scene.
#[must_use]
pub fn build_material(material_type: &str, name: &str, params: &[Parameter]) -> Material {
    let mut material = Material::new(name);
    material.add_property(MaterialProperty::new(SemanticHint::Unknown, "type", material_type));

    let schema = schema_for(material_type);
    match schema {
        Some(schema) => {
            for property in schema.properties {
                read_material_parameter(property.semantic, property.name, &mut material, params, property.default);
            }
        }
        None => log::warn!("Unknown material type '{material_type}', keeping generic properties only"),
    }
    let in_schema = |name: &str| schema.is_some_and(|s| s.properties.iter().any(|p| p.name.eq_ignore_ascii_case(name)));

    // Unclaimed parameters.
    for param in params {
        if param.param_type() == ParamType::Texture {
            if !in_schema(&param.name) && !material.has_texture(&param.name) {
                log::debug!("Dropping texture parameter '{}' on '{material_type}' material", param.name);
            }
            continue;
        }
        if material.has_property(&param.name) {
            continue;
        }
        if let Some(value) = param.first_value() {
            material.add_property(MaterialProperty::new(SemanticHint::Unknown, param.name.as_str(), value));
        }
    }

    material
}

fn outside_world(ctx: &ParseContext<'_>, directive: &str) -> bool {
    if ctx.settings().require_world_block && !ctx.is_in_world() {
        log::warn!("Skipping {directive} outside WorldBegin/WorldEnd");
        return true;
    }
    false
}

/// `Material "type" ...`: adds the material and makes it active in the
/// current scope frame.
pub fn parse_material(
    material_type: &str,
    params: &[Parameter],
    ctx: &mut ParseContext<'_>,
    scene: &mut Scene,
) -> Option<MaterialHandle> {
    if outside_world(ctx, "Material") {
        return None;
    }
    let handle = scene.add_material(build_material(material_type, "", params));
    ctx.set_active_material(Some(handle));
    Some(handle)
}

/// `MakeNamedMaterial "name" "string type" "<type>" ...`: adds the material
/// and registers it without activating it.
pub fn make_named_material(
    name: &str,
    params: &[Parameter],
    ctx: &mut ParseContext<'_>,
    scene: &mut Scene,
) -> Result<Option<MaterialHandle>> {
    if outside_world(ctx, "MakeNamedMaterial") {
        return Ok(None);
    }
    let material_type = params
        .iter()
        .find(|p| p.is_named("type"))
        .and_then(Parameter::single_string)
        .ok_or_else(|| malformed("MakeNamedMaterial", format!("material '{name}' has no \"string type\"")))?;

    let handle = scene.add_material(build_material(material_type, name, params));
    ctx.register_named_material(name, handle);
    Ok(Some(handle))
}

/// `NamedMaterial "name"`: activates a registered material.
pub fn named_material(name: &str, ctx: &mut ParseContext<'_>) -> Result<()> {
    let handle = ctx
        .named_material(name)
        .ok_or_else(|| malformed("NamedMaterial", format!("no material named '{name}'")))?;
    ctx.set_active_material(Some(handle));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lookup_ignores_case() {
        assert_eq!(schema_for("MATTE").map(|s| s.material_type), Some("matte"));
        assert_eq!(schema_for("kdsubsurface").map(|s| s.material_type), Some("KdSubsurface"));
        assert!(schema_for("hair").is_none());
    }

    #[test]
    fn schema_names_are_unique_per_type() {
        for schema in MATERIAL_SCHEMAS {
            for (i, a) in schema.properties.iter().enumerate() {
                assert!(
                    schema.properties[i + 1..].iter().all(|b| !a.name.eq_ignore_ascii_case(b.name)),
                    "duplicate '{}' in {}",
                    a.name,
                    schema.material_type
                );
            }
        }
    }

    #[test]
    fn type_property_comes_first() {
        let material = build_material("mirror", "", &[]);
        assert_eq!(material.properties()[0].name, "type");
        assert_eq!(material.value("type"), Some(&Value::String("mirror".into())));
        assert_eq!(material.value("Kr"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn unset_defaults_are_not_recorded() {
        let material = build_material("measured", "", &[]);
        assert!(!material.has_property("filename"));
    }

    #[test]
    fn textured_schema_parameter_suppresses_default() {
        let params = [Parameter::texture("Kd", "checks")];
        let material = build_material("matte", "", &params);
        assert!(!material.has_property("Kd"));
        assert!(material.textures().is_empty());
        assert_eq!(material.value("sigma"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn empty_parameter_counts_as_absent() {
        let params = [Parameter::floats("roughness", Vec::new())];
        let material = build_material("plastic", "", &params);
        assert_eq!(material.value("roughness"), Some(&Value::Float(0.1)));
    }
}
