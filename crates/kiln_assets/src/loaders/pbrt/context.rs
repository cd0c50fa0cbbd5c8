use std::path::{Path, PathBuf};

use glam::Affine3A;
use kiln_core::{ImportSettings, KilnError, Result};
use kiln_scene::MaterialHandle;
use rustc_hash::FxHashMap;

use crate::importer::SubSceneLoader;

/// Per-job parser state: transform and material scope stacks plus the
/// world-block flag.
///
/// Both stacks always hold at least their base frame (identity transform,
/// no material); popping the base frame is a [`KilnError::ScopeUnderflow`].
pub struct ParseContext<'a> {
    transform_stack: Vec<Affine3A>,
    material_stack: Vec<Option<MaterialHandle>>,
    world_entered: bool,
    named_materials: FxHashMap<String, MaterialHandle>,
    model_path: PathBuf,
    settings: ImportSettings,
    sub_scenes: Option<&'a dyn SubSceneLoader>,
}

impl<'a> ParseContext<'a> {
    /// Creates a context for the scene file at `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            transform_stack: vec![Affine3A::IDENTITY],
            material_stack: vec![None],
            world_entered: false,
            named_materials: FxHashMap::default(),
            model_path: model_path.into(),
            settings: ImportSettings::default(),
            sub_scenes: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Enables nested imports (`plymesh`).
    #[must_use]
    pub fn with_sub_scene_loader(mut self, loader: &'a dyn SubSceneLoader) -> Self {
        self.sub_scenes = Some(loader);
        self
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Path of the scene file being parsed; nested files resolve against it.
    #[inline]
    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    #[inline]
    #[must_use]
    pub fn sub_scene_loader(&self) -> Option<&'a dyn SubSceneLoader> {
        self.sub_scenes
    }

    // ========================================================================
    // World block
    // ========================================================================

    pub fn enter_world(&mut self) {
        if self.world_entered {
            log::warn!("WorldBegin inside an open world block");
        }
        self.world_entered = true;
    }

    pub fn exit_world(&mut self) -> Result<()> {
        if !self.world_entered {
            return Err(KilnError::ScopeUnderflow { directive: "WorldEnd" });
        }
        self.world_entered = false;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_in_world(&self) -> bool {
        self.world_entered
    }

    // ========================================================================
    // Transform stack
    // ========================================================================

    /// Duplicates the active transform.
    pub fn push_active_transform(&mut self) {
        let top = *self.active_transform();
        self.transform_stack.push(top);
    }

    pub fn pop_active_transform(&mut self, directive: &'static str) -> Result<()> {
        if self.transform_stack.len() <= 1 {
            return Err(KilnError::ScopeUnderflow { directive });
        }
        self.transform_stack.pop();
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn active_transform(&self) -> &Affine3A {
        // Never empty: the base frame cannot be popped.
        &self.transform_stack[self.transform_stack.len() - 1]
    }

    pub fn set_active_transform(&mut self, transform: Affine3A) {
        let last = self.transform_stack.len() - 1;
        self.transform_stack[last] = transform;
    }

    #[inline]
    #[must_use]
    pub fn transform_depth(&self) -> usize {
        self.transform_stack.len()
    }

    // ========================================================================
    // Material stack
    // ========================================================================

    /// Duplicates the active material reference.
    pub fn push_active_material(&mut self) {
        let top = self.active_material();
        self.material_stack.push(top);
    }

    pub fn pop_active_material(&mut self, directive: &'static str) -> Result<()> {
        if self.material_stack.len() <= 1 {
            return Err(KilnError::ScopeUnderflow { directive });
        }
        self.material_stack.pop();
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn active_material(&self) -> Option<MaterialHandle> {
        self.material_stack[self.material_stack.len() - 1]
    }

    /// Replaces the material reference of the current frame.
    pub fn set_active_material(&mut self, material: Option<MaterialHandle>) {
        let last = self.material_stack.len() - 1;
        self.material_stack[last] = material;
    }

    #[inline]
    #[must_use]
    pub fn material_depth(&self) -> usize {
        self.material_stack.len()
    }

    // ========================================================================
    // Named materials
    // ========================================================================

    /// Registers `handle` under `name`, replacing any earlier definition.
    pub fn register_named_material(&mut self, name: &str, handle: MaterialHandle) {
        if self.named_materials.insert(name.to_string(), handle).is_some() {
            log::warn!("Named material '{name}' redefined");
        }
    }

    #[must_use]
    pub fn named_material(&self, name: &str) -> Option<MaterialHandle> {
        self.named_materials.get(name).copied()
    }
}
