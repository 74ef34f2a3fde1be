//! Load entry points and the resulting scene handle.

use std::path::Path;
use std::thread::JoinHandle;

use dsx_core::{
    Animation, Diagnostics, Illumination, Light, LoadError, LoadOptions, SceneInfo, SymbolTable, Transformation,
    View,
};
use dsx_parser::parse_document;

use crate::builder::build_graph;
use crate::graph::SceneGraph;

/// A loaded scene.
///
/// Only the material counter and animation clocks change after a load, and
/// only through the graph.
#[derive(Debug, Clone)]
pub struct Scene {
    pub info: SceneInfo,
    pub views: SymbolTable<View>,
    pub default_view: Option<String>,
    pub illumination: Illumination,
    pub lights: SymbolTable<Light>,
    pub transformations: SymbolTable<Transformation>,
    pub animations: SymbolTable<Animation>,
    pub graph: SceneGraph,
    pub diagnostics: Diagnostics,
}

impl Scene {
    /// The view selected by `<views default=...>`, or the first declared view.
    pub fn default_view(&self) -> Option<&View> {
        self.default_view.as_deref().and_then(|id| self.views.get(id))
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.get(id)
    }

    pub fn light(&self, id: &str) -> Option<&Light> {
        self.lights.get(id)
    }

    /// Switch a light on or off. Returns `false` if no such light exists.
    pub fn set_light_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.lights.get_mut(id) {
            Some(light) => {
                light.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Lights that are currently on.
    pub fn enabled_lights(&self) -> impl Iterator<Item = (&str, &Light)> {
        self.lights.iter().filter(|(_, light)| light.enabled())
    }
}

/// Completion signal for [`load_with`] and [`load_in_background`].
#[derive(Debug)]
pub enum LoadEvent {
    Ready(Box<Scene>),
    Failed(LoadError),
}

impl From<Result<Scene, LoadError>> for LoadEvent {
    fn from(result: Result<Scene, LoadError>) -> Self {
        match result {
            Ok(scene) => LoadEvent::Ready(Box::new(scene)),
            Err(err) => LoadEvent::Failed(err),
        }
    }
}

/// Load a scene from DSX source text.
///
/// A failed load returns no partial scene. Element-level problems are kept
/// in [`Scene::diagnostics`] unless `options.strict` is set, in which case the
/// first one fails the load.
pub fn load(source: &str, options: &LoadOptions) -> Result<Scene, LoadError> {
    let mut doc = parse_document(source, options)?;
    let mut diagnostics = std::mem::take(&mut doc.diagnostics);
    let graph = build_graph(&doc, options, &mut diagnostics)?;

    if options.strict {
        if let Some(first) = diagnostics.first_error() {
            return Err(LoadError::Rejected {
                message: first.to_string(),
            });
        }
    }

    log::info!(
        "loaded scene '{}': {} nodes, {} warnings, {} errors",
        doc.scene.root,
        graph.len(),
        diagnostics.warnings().count(),
        diagnostics.errors().count()
    );

    Ok(Scene {
        info: doc.scene,
        views: doc.views,
        default_view: doc.default_view,
        illumination: doc.illumination,
        lights: doc.lights,
        transformations: doc.transformations,
        animations: doc.animations,
        graph,
        diagnostics,
    })
}

/// Read and load a `.dsx` file.
pub fn load_file(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Scene, LoadError> {
    let path = path.as_ref();
    log::debug!("reading {}", path.display());
    let source = std::fs::read_to_string(path)?;
    load(&source, options)
}

/// Load and report the outcome through `on_done`.
pub fn load_with(source: &str, options: &LoadOptions, on_done: impl FnOnce(LoadEvent)) {
    on_done(load(source, options).into());
}

/// Load on a worker thread; `on_done` runs on that thread when the load ends.
///
/// Callers should keep at most one load in flight per scene they intend to
/// replace, since completions are not ordered across threads.
pub fn load_in_background<F>(source: String, options: LoadOptions, on_done: F) -> JoinHandle<()>
where
    F: FnOnce(LoadEvent) + Send + 'static,
{
    std::thread::spawn(move || load_with(&source, &options, on_done))
}
