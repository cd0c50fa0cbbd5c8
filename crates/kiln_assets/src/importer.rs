//! Import front door.
//!
//! [`Importer`] reads a file through its [`SceneSource`], picks a loader by
//! extension and returns an [`ImportReport`]: the scene built so far, the
//! recoverable problems met on the way, and the fatal error if one stopped
//! the job.
//!
//! Nested files (`plymesh`) go through the same importer one level deeper.
//! Going past [`ImportSettings::max_include_depth`] fails the whole job
//! with [`KilnError::ImportFailed`].

use std::fmt;
use std::path::{Path, PathBuf};

use kiln_core::{ImportSettings, KilnError, Result};
use kiln_scene::Scene;

use crate::io::SceneSource;
use crate::loaders::pbrt::{self, ParseContext};
use crate::loaders::ply;

/// Loads a nested scene referenced from inside another one.
pub trait SubSceneLoader {
    /// Resolves `relative` against the file that references it.
    fn resolve(&self, including_file: &Path, relative: &str) -> PathBuf;

    /// Imports the file at `path` as a standalone scene.
    fn load_sub_scene(&self, path: &Path) -> Result<Scene>;
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Pbrt,
    Ply,
}

impl SceneFormat {
    /// Detects the format from the file extension (ASCII case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pbrt") {
            Some(Self::Pbrt)
        } else if ext.eq_ignore_ascii_case("ply") {
            Some(Self::Ply)
        } else {
            None
        }
    }
}

/// A recoverable problem: the directive was skipped, the import went on.
#[derive(Debug)]
pub struct Diagnostic {
    pub directive: String,
    /// 1-based source line of the directive.
    pub line: usize,
    pub error: KilnError,
}

impl Diagnostic {
    pub(crate) fn log(&self) {
        match &self.error {
            KilnError::InvalidShapeParameters { .. } | KilnError::SubImportFailed { .. } => {
                log::error!("{self}");
            }
            _ => log::warn!("{self}"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}): {}", self.directive, self.line, self.error)
    }
}

/// Outcome of one import job.
///
/// `scene` is usable even when `failure` is set; it holds everything added
/// before the fatal error.
#[derive(Debug)]
pub struct ImportReport {
    pub path: PathBuf,
    pub scene: Scene,
    pub diagnostics: Vec<Diagnostic>,
    pub failure: Option<KilnError>,
}

impl ImportReport {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Drops the diagnostics and turns a fatal failure into `Err`.
    pub fn into_result(self) -> Result<Scene> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.scene),
        }
    }
}

/// Imports scene files from a [`SceneSource`].
///
/// ```rust,ignore
/// use kiln_assets::{FileSource, Importer};
///
/// let report = Importer::new(FileSource).import("scenes/killeroo.pbrt");
/// for diagnostic in &report.diagnostics {
///     println!("{diagnostic}");
/// }
/// let scene = report.into_result()?;
/// ```
pub struct Importer<S> {
    source: S,
    settings: ImportSettings,
}

impl<S: SceneSource> Importer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            settings: ImportSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    #[inline]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Imports `path` as a top-level scene.
    pub fn import(&self, path: impl AsRef<Path>) -> ImportReport {
        let path = path.as_ref();
        log::info!("Importing {}", path.display());

        let report = self.import_at_depth(path, 0);
        match &report.failure {
            None => log::info!(
                "Imported {}: {} nodes, {} meshes, {} materials, {} diagnostics",
                path.display(),
                report.scene.num_nodes(),
                report.scene.num_meshes(),
                report.scene.num_materials(),
                report.diagnostics.len()
            ),
            Some(err) => log::error!("Import of {} failed: {err}", path.display()),
        }
        report
    }

    fn import_at_depth(&self, path: &Path, depth: u32) -> ImportReport {
        let mut scene = Scene::new();
        let mut diagnostics = Vec::new();
        let failure = self.run(path, depth, &mut scene, &mut diagnostics).err();
        ImportReport {
            path: path.to_path_buf(),
            scene,
            diagnostics,
            failure,
        }
    }

    fn run(&self, path: &Path, depth: u32, scene: &mut Scene, diagnostics: &mut Vec<Diagnostic>) -> Result<()> {
        if depth > self.settings.max_include_depth {
            return Err(KilnError::ImportFailed(format!(
                "{} exceeds the maximum include depth of {}",
                path.display(),
                self.settings.max_include_depth
            )));
        }

        let format = SceneFormat::from_path(path).ok_or_else(|| KilnError::UnsupportedFormat(path.to_path_buf()))?;
        let bytes = self.source.read(path)?;

        match format {
            SceneFormat::Pbrt => {
                let text = std::str::from_utf8(&bytes).map_err(|e| KilnError::Syntax {
                    line: bytes[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() + 1,
                    message: "file is not valid UTF-8".into(),
                })?;
                let nested = NestedImport { importer: self, depth };
                let mut ctx = ParseContext::new(path)
                    .with_settings(self.settings.clone())
                    .with_sub_scene_loader(&nested);
                pbrt::load(text, &mut ctx, scene, diagnostics)
            }
            SceneFormat::Ply => {
                let name = path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
                *scene = ply::load(&bytes, &name)?;
                Ok(())
            }
        }
    }
}

/// Sub-scene loader handed to the PBRT context of a file at `depth`.
struct NestedImport<'i, S> {
    importer: &'i Importer<S>,
    depth: u32,
}

impl<S: SceneSource> SubSceneLoader for NestedImport<'_, S> {
    fn resolve(&self, including_file: &Path, relative: &str) -> PathBuf {
        self.importer.source.resolve(including_file, relative)
    }

    fn load_sub_scene(&self, path: &Path) -> Result<Scene> {
        log::debug!("Nested import of {} at depth {}", path.display(), self.depth + 1);
        let report = self.importer.import_at_depth(path, self.depth + 1);
        if !report.diagnostics.is_empty() {
            log::debug!("{} reported {} diagnostics", path.display(), report.diagnostics.len());
        }
        report.into_result()
    }
}
