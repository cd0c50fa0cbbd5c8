//! `Shape` directive: converts a shape type plus its parameter list into a
//! [`Mesh`] wired to the active transform and material.

use kiln_core::errors::invalid_shape;
use kiln_core::transform::is_identity;
use kiln_core::{KilnError, Result};
use kiln_scene::{Mesh, MeshHandle, Node, Scene, SubMesh};

use super::context::ParseContext;
use super::parameter::{ParamType, Parameter};
use crate::loaders::triangle_mesh::TriangleMeshData;

/// Parses one shape and appends the resulting mesh to `scene`.
///
/// Returns `Ok(None)` when the shape is skipped by policy (outside the
/// world block with `require_world_block` set). Every `Err` leaves `scene`
/// untouched.
pub fn parse_shape(
    shape_type: &str,
    params: &[Parameter],
    ctx: &ParseContext<'_>,
    scene: &mut Scene,
) -> Result<Option<MeshHandle>> {
    if ctx.settings().require_world_block && !ctx.is_in_world() {
        log::warn!("Skipping '{shape_type}' shape outside WorldBegin/WorldEnd");
        return Ok(None);
    }

    let mut mesh = if shape_type.eq_ignore_ascii_case("plymesh") {
        load_ply_mesh(params, ctx)?
    } else if shape_type.eq_ignore_ascii_case("trianglemesh") {
        read_triangle_mesh(params)?
    } else {
        return Err(KilnError::UnsupportedShapeType(shape_type.to_string()));
    };

    // Only transformed shapes get a node.
    let active = *ctx.active_transform();
    let parent = (!is_identity(&active)).then(|| scene.add_node(Node::new(active)));
    mesh.set_parent(parent);

    // The active material always wins over whatever a merged sub-scene carried.
    match ctx.active_material() {
        Some(material) if mesh.sub_meshes().is_empty() => {
            let triangle_count = mesh.num_triangles();
            mesh.add_sub_mesh(SubMesh {
                material: Some(material),
                first_triangle: 0,
                triangle_count,
            });
        }
        active => {
            for sub_mesh in mesh.sub_meshes_mut() {
                sub_mesh.material = active;
            }
        }
    }

    log::debug!(
        "Shape '{shape_type}': {} triangles, {} sub-meshes, parent {parent:?}",
        mesh.num_triangles(),
        mesh.sub_meshes().len()
    );
    Ok(Some(scene.add_mesh(mesh)))
}

// ============================================================================
// plymesh
// ============================================================================

fn load_ply_mesh(params: &[Parameter], ctx: &ParseContext<'_>) -> Result<Mesh> {
    let [param] = params else {
        return Err(invalid_shape(
            "plymesh",
            format!("expected a single 'filename' parameter, found {} parameters", params.len()),
        ));
    };
    let filename = param
        .single_string()
        .filter(|_| param.is_named("filename"))
        .ok_or_else(|| invalid_shape("plymesh", format!("expected a 'filename' string, found \"{}\"", param.name)))?;

    let Some(loader) = ctx.sub_scene_loader() else {
        return Err(KilnError::SubImportFailed {
            path: filename.into(),
            source: Box::new(KilnError::ImportFailed("nested imports are disabled".into())),
        });
    };

    let path = loader.resolve(ctx.model_path(), filename);
    let sub_scene = loader.load_sub_scene(&path).map_err(|err| match err {
        // Depth overruns abort the whole job.
        KilnError::ImportFailed(_) => err,
        other => KilnError::SubImportFailed {
            path: path.clone(),
            source: Box::new(other),
        },
    })?;

    let mut mesh = sub_scene
        .merge_all_meshes()
        .ok_or_else(|| invalid_shape("plymesh", format!("{path:?} contains no meshes")))?;
    mesh.name = filename.to_string();
    Ok(mesh)
}

// ============================================================================
// trianglemesh
// ============================================================================

fn check_type(param: &Parameter, expected: ParamType, description: &str) {
    if param.param_type() != expected {
        log::warn!(
            "trianglemesh parameter '{}' is not {description} ({:?})",
            param.name,
            param.param_type()
        );
    }
}

fn convert<T>(param: &Parameter, converted: Option<Vec<T>>) -> Vec<T> {
    converted.unwrap_or_else(|| {
        log::warn!("trianglemesh parameter '{}' cannot be converted, ignoring it", param.name);
        Vec::new()
    })
}

fn read_triangle_mesh(params: &[Parameter]) -> Result<Mesh> {
    let mut data = TriangleMeshData::default();

    for param in params {
        if param.is_named("P") {
            check_type(param, ParamType::Vector3, "a vec3 array");
            data.positions = convert(param, param.to_vec3s());
        } else if param.is_named("N") {
            check_type(param, ParamType::Vector3, "a vec3 array");
            data.normals = convert(param, param.to_vec3s());
        } else if param.is_named("S") {
            check_type(param, ParamType::Vector3, "a vec3 array");
            data.tangents = convert(param, param.to_vec3s());
        } else if param.is_named("uv") {
            check_type(param, ParamType::Float, "a float array");
            data.texcoords = convert(param, param.to_floats());
        } else if param.is_named("indices") {
            check_type(param, ParamType::Int, "an int array");
            data.indices = convert(param, param.to_indices());
        } else {
            log::trace!("trianglemesh: ignoring parameter '{}'", param.name);
        }
    }

    data.build("trianglemesh")
}
