//! Importer End-to-End Tests
//!
//! Tests for:
//! - Whole PBRT files applied in document order
//! - Recoverable directive failures collected as diagnostics
//! - Fatal failures keeping the partial scene
//! - Nested plymesh imports and the include depth bound
//! - Import settings (material scoping, world block)

use kiln::{ImportReport, ImportSettings, Importer, KilnError, MemorySource, Scene, Value, VertexSemantic};

const QUAD_PLY: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";

const TRIANGLE: &str = r#"Shape "trianglemesh" "point P" [0 0 0 1 0 0 0 1 0] "integer indices" [0 1 2]"#;

fn import(text: &str) -> ImportReport {
    import_with(text, ImportSettings::default())
}

fn import_with(text: &str, settings: ImportSettings) -> ImportReport {
    let _ = env_logger::builder().is_test(true).try_init();
    let source = MemorySource::new()
        .with_file("scenes/main.pbrt", text)
        .with_file("scenes/meshes/quad.ply", QUAD_PLY);
    Importer::new(source).with_settings(settings).import("scenes/main.pbrt")
}

/// Material type of the only sub-mesh of the `index`-th mesh.
fn material_type(scene: &Scene, index: usize) -> Option<String> {
    let (_, mesh) = scene.meshes().nth(index)?;
    let material = scene.material(mesh.sub_meshes().first()?.material?)?;
    match material.value("type")? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

// ============================================================================
// Whole Files
// ============================================================================

#[test]
fn full_scene_imports_in_order() {
    let text = format!(
        r#"# A small scene.
LookAt 0 0 5  0 0 0  0 1 0
Camera "perspective" "float fov" [45]
WorldBegin
Material "matte" "rgb Kd" [0.2 0.3 0.4]
AttributeBegin
  Translate 0 0 2
  {TRIANGLE}
AttributeEnd
{TRIANGLE}
WorldEnd
"#
    );
    let report = import(&text);
    assert!(report.is_success(), "{:?}", report.failure);
    assert!(report.diagnostics.is_empty());

    let scene = &report.scene;
    assert_eq!(scene.num_meshes(), 2);
    assert_eq!(scene.num_materials(), 1);
    // Only the translated shape gets a node.
    assert_eq!(scene.num_nodes(), 1);

    let meshes: Vec<_> = scene.meshes().map(|(_, mesh)| mesh).collect();
    let node = meshes[0].parent().unwrap();
    let translation = scene.world_transform(node).translation;
    assert_eq!((translation.x, translation.y, translation.z), (0.0, 0.0, 2.0));
    assert!(meshes[1].parent().is_none());

    for mesh in &meshes {
        assert_eq!(mesh.num_triangles(), 1);
        assert!(mesh.validate().is_ok());
    }
    let (_, material) = scene.materials().next().unwrap();
    assert_eq!(material.value("Kd"), Some(&Value::Vec3(glam::Vec3::new(0.2, 0.3, 0.4))));
    assert_eq!(material_type(scene, 1).as_deref(), Some("matte"));
}

#[test]
fn unknown_directives_are_skipped_without_diagnostics() {
    let text = format!("Film \"image\" \"integer xresolution\" [64]\nLightSource \"point\"\n{TRIANGLE}\n");
    let report = import(&text);
    assert!(report.is_success());
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.scene.num_meshes(), 1);
}

#[test]
fn ply_file_imports_directly() {
    let source = MemorySource::new().with_file("quad.ply", QUAD_PLY);
    let scene = Importer::new(source).import("quad.ply").into_result().unwrap();

    let (_, mesh) = scene.meshes().next().unwrap();
    assert_eq!(mesh.name, "quad.ply");
    assert_eq!(mesh.num_triangles(), 2);
}

// ============================================================================
// Recoverable Failures
// ============================================================================

#[test]
fn malformed_translate_becomes_a_diagnostic() {
    let text = format!("Translate 1 2\n{TRIANGLE}\n");
    let report = import(&text);

    assert!(report.is_success());
    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.directive, "Translate");
    assert_eq!(diagnostic.line, 1);
    assert!(matches!(diagnostic.error, KilnError::MalformedDirectiveArgument { .. }));
    assert!(diagnostic.to_string().starts_with("Translate (line 1)"));

    // The shape still lands, untransformed.
    assert_eq!(report.scene.num_meshes(), 1);
    assert_eq!(report.scene.num_nodes(), 0);
}

#[test]
fn bad_shapes_are_dropped_and_import_continues() {
    let text = format!(
        "Shape \"sphere\" \"float radius\" [1]\n\
         Shape \"trianglemesh\" \"point P\" [0 0 0 1 0 0 0 1 0] \"integer indices\" [0 1]\n\
         {TRIANGLE}\n"
    );
    let report = import(&text);

    assert!(report.is_success());
    assert_eq!(report.diagnostics.len(), 2);
    assert!(matches!(report.diagnostics[0].error, KilnError::UnsupportedShapeType(ref t) if t == "sphere"));
    assert!(matches!(report.diagnostics[1].error, KilnError::InvalidShapeParameters { .. }));
    assert_eq!(report.diagnostics[1].line, 2);
    assert_eq!(report.scene.num_meshes(), 1);
}

#[test]
fn missing_ply_is_a_recoverable_sub_import_failure() {
    let text = format!("Shape \"plymesh\" \"string filename\" \"meshes/missing.ply\"\n{TRIANGLE}\n");
    let report = import(&text);

    assert!(report.is_success());
    assert_eq!(report.scene.num_meshes(), 1);
    match &report.diagnostics[..] {
        [diagnostic] => match &diagnostic.error {
            KilnError::SubImportFailed { path, source } => {
                assert_eq!(path, std::path::Path::new("scenes/meshes/missing.ply"));
                assert!(matches!(**source, KilnError::IoError(_)));
            }
            other => panic!("unexpected error {other:?}"),
        },
        other => panic!("expected one diagnostic, got {other:?}"),
    }
}

#[test]
fn leading_parent_dirs_do_not_collapse() {
    let source = MemorySource::new()
        .with_file("main.pbrt", "Shape \"plymesh\" \"string filename\" \"../../x.ply\"\n")
        .with_file("x.ply", QUAD_PLY);
    let report = Importer::new(source).import("main.pbrt");

    assert!(report.is_success());
    assert_eq!(report.scene.num_meshes(), 0);
    match &report.diagnostics[..] {
        [diagnostic] => match &diagnostic.error {
            KilnError::SubImportFailed { path, .. } => assert_eq!(path, std::path::Path::new("../../x.ply")),
            other => panic!("unexpected error {other:?}"),
        },
        other => panic!("expected one diagnostic, got {other:?}"),
    }
}

// ============================================================================
// Fatal Failures
// ============================================================================

#[test]
fn attribute_end_underflow_keeps_partial_scene() {
    let text = format!("{TRIANGLE}\nAttributeEnd\n{TRIANGLE}\n");
    let report = import(&text);

    assert!(matches!(report.failure, Some(KilnError::ScopeUnderflow { directive: "AttributeEnd" })));
    // Everything before the failing directive survives.
    assert_eq!(report.scene.num_meshes(), 1);
    assert!(report.into_result().is_err());
}

#[test]
fn unsupported_format_fails() {
    let report = Importer::new(MemorySource::new()).import("scene.obj");
    assert!(matches!(report.failure, Some(KilnError::UnsupportedFormat(_))));
    assert!(report.scene.is_empty());
}

#[test]
fn missing_top_level_file_fails() {
    let report = Importer::new(MemorySource::new()).import("nope.pbrt");
    assert!(matches!(report.failure, Some(KilnError::IoError(_))));
}

#[test]
fn invalid_utf8_is_a_syntax_error() {
    let source = MemorySource::new().with_file("bad.pbrt", b"WorldBegin\n\xff\n".to_vec());
    let report = Importer::new(source).import("bad.pbrt");
    assert!(matches!(report.failure, Some(KilnError::Syntax { line: 2, .. })));
}

#[test]
fn unterminated_string_is_fatal() {
    let report = import("WorldBegin\nMaterial \"matte\n");
    assert!(matches!(report.failure, Some(KilnError::Syntax { line: 2, .. })));
}

// ============================================================================
// Nested Imports
// ============================================================================

#[test]
fn plymesh_is_resolved_next_to_the_scene() {
    let text = r#"
Material "plastic"
Translate 1 0 0
Shape "plymesh" "string filename" "meshes/quad.ply"
"#;
    let report = import(text);
    assert!(report.is_success(), "{:?}", report.failure);
    assert!(report.diagnostics.is_empty());

    let scene = &report.scene;
    let (_, mesh) = scene.meshes().next().unwrap();
    assert_eq!(mesh.name, "meshes/quad.ply");
    assert_eq!(mesh.num_triangles(), 2);
    assert!(mesh.parent().is_some());
    assert_eq!(mesh.sub_meshes().len(), 1);
    assert_eq!(mesh.sub_meshes()[0].triangle_count, 2);
    assert_eq!(material_type(scene, 0).as_deref(), Some("plastic"));
    assert!(mesh.data_stream(VertexSemantic::Position).is_some());
}

#[test]
fn self_including_scene_hits_the_depth_bound() {
    let source = MemorySource::new().with_file(
        "loop.pbrt",
        "Shape \"plymesh\" \"string filename\" \"loop.pbrt\"\n",
    );
    let report = Importer::new(source).import("loop.pbrt");
    match report.failure {
        Some(KilnError::ImportFailed(message)) => assert!(message.contains("maximum include depth")),
        other => panic!("expected ImportFailed, got {other:?}"),
    }
}

#[test]
fn depth_bound_applies_to_the_first_nested_file() {
    let settings = ImportSettings {
        max_include_depth: 0,
        ..Default::default()
    };
    let report = import_with("Shape \"plymesh\" \"string filename\" \"meshes/quad.ply\"\n", settings);
    assert!(matches!(report.failure, Some(KilnError::ImportFailed(_))));
    assert_eq!(report.scene.num_meshes(), 0);
}

// ============================================================================
// Settings
// ============================================================================

const SCOPED_MATERIAL_SCENE: &str = r#"
Material "matte"
AttributeBegin
  Material "mirror"
AttributeEnd
Shape "trianglemesh" "point P" [0 0 0 1 0 0 0 1 0] "integer indices" [0 1 2]
"#;

#[test]
fn last_material_wins_by_default() {
    let report = import(SCOPED_MATERIAL_SCENE);
    assert_eq!(material_type(&report.scene, 0).as_deref(), Some("mirror"));
}

#[test]
fn scoped_materials_restore_outer_material() {
    let settings = ImportSettings {
        scope_materials: true,
        ..Default::default()
    };
    let report = import_with(SCOPED_MATERIAL_SCENE, settings);
    assert!(report.is_success());
    assert_eq!(material_type(&report.scene, 0).as_deref(), Some("matte"));
}

#[test]
fn world_block_can_be_required() {
    let settings = ImportSettings {
        require_world_block: true,
        ..Default::default()
    };
    let text = format!("Material \"matte\"\n{TRIANGLE}\nWorldBegin\n{TRIANGLE}\nWorldEnd\n");
    let report = import_with(&text, settings);

    assert!(report.is_success());
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.scene.num_meshes(), 1);
    assert_eq!(report.scene.num_materials(), 0);
}

#[test]
fn named_materials_activate_by_name() {
    let text = format!(
        r#"MakeNamedMaterial "gold" "string type" "metal" "float roughness" [0.2]
Material "matte"
NamedMaterial "gold"
{TRIANGLE}
NamedMaterial "silver"
"#
    );
    let report = import(&text);

    assert_eq!(report.scene.num_materials(), 2);
    assert_eq!(material_type(&report.scene, 0).as_deref(), Some("metal"));
    let (_, mesh) = report.scene.meshes().next().unwrap();
    let gold = report.scene.material(mesh.sub_meshes()[0].material.unwrap()).unwrap();
    assert_eq!(gold.name, "gold");
    assert_eq!(gold.value("roughness"), Some(&Value::Float(0.2)));

    // Unknown names are reported, not fatal.
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].directive, "NamedMaterial");
}
