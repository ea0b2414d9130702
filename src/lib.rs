#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod components;
pub mod geom;
pub mod graph;

use std::fmt;

use geom::{
    HitRecord, MeshError, PolyMesh, ProjectionOptions, ProjectionRequest, ProjectionResult,
    RaySurface, Transform, project_batch, project_with_options,
};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten van de [`Projector`]-facade.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectorError {
    #[error("matrix `{name}` moet 16 waarden bevatten, kreeg {len}")]
    InvalidMatrix { name: &'static str, len: usize },
    #[error("vertexbuffer moet een veelvoud van 3 waarden bevatten, kreeg {0}")]
    InvalidVertexBuffer(usize),
    #[error("batch-invoer heeft ongelijke lengtes")]
    BatchLengthMismatch,
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error("ongeldige opties: {0}")]
    Options(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitExport {
    pub point: [f64; 3],
    pub face_index: usize,
    pub ray_param: f64,
}

impl From<HitRecord> for HitExport {
    fn from(hit: HitRecord) -> Self {
        Self {
            point: hit.point.to_array(),
            face_index: hit.face_index,
            ray_param: hit.ray_param,
        }
    }
}

/// Projectieresultaat zoals het naar JavaScript gaat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionExport {
    pub position: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<f64>,
    pub delta: [f64; 3],
    pub hit: Option<HitExport>,
}

impl From<ProjectionResult> for ProjectionExport {
    fn from(result: ProjectionResult) -> Self {
        Self {
            position: result.position.to_array(),
            orientation: result.orientation.map(geom::Vec3::to_array),
            alignment: result.alignment,
            delta: result.delta.to_array(),
            hit: result.hit.map(HitExport::from),
        }
    }
}

/// Public entry point for consumers: houdt een voorbereide mesh en de
/// projectie-opties vast.
#[wasm_bindgen]
pub struct Projector {
    mesh: Option<PolyMesh>,
    options: ProjectionOptions,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Projector {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Projector {
        Projector {
            mesh: None,
            options: ProjectionOptions::default(),
        }
    }

    /// Laad een polygonen-mesh: `vertices` als platte `[x, y, z, ...]` buffer,
    /// `faces` als array van index-arrays.
    #[wasm_bindgen]
    pub fn set_mesh(&mut self, vertices: &[f64], faces: JsValue) -> Result<(), JsValue> {
        let faces: Vec<Vec<u32>> = serde_wasm_bindgen::from_value(faces).map_err(to_js_error)?;
        self.load_mesh(vertices, faces).map_err(to_js_error)
    }

    /// Laad een driehoeksmesh met een platte indexbuffer.
    #[wasm_bindgen]
    pub fn set_triangles(&mut self, vertices: &[f64], indices: &[u32]) -> Result<(), JsValue> {
        let vertices = vertex_buffer(vertices).map_err(to_js_error)?;
        let mesh = PolyMesh::from_triangles(vertices, indices).map_err(to_js_error)?;
        self.mesh = Some(mesh);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn clear_mesh(&mut self) {
        self.mesh = None;
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Stel opties in vanuit een JS-object, bv. `{ mode: "position_only" }`.
    #[wasm_bindgen]
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: ProjectionOptions = serde_wasm_bindgen::from_value(options)
            .map_err(|err| to_js_error(ProjectorError::Options(err.to_string())))?;
        self.configure(options);
        Ok(())
    }

    /// Projecteer één bron/doel-paar. Matrices zijn 16 waarden kolom-voor-kolom.
    #[wasm_bindgen]
    pub fn project(&self, source: &[f64], target: &[f64], blend: f64) -> Result<JsValue, JsValue> {
        let export = self.project_flat(source, target, blend).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Projecteer veel paren tegelijk: `sources` en `targets` bevatten elk
    /// 16 waarden per paar, `blends` één waarde per paar.
    #[wasm_bindgen]
    pub fn project_many(
        &self,
        sources: &[f64],
        targets: &[f64],
        blends: &[f64],
    ) -> Result<JsValue, JsValue> {
        let exports = self
            .project_flat_many(sources, targets, blends)
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&exports).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Projector {
    pub fn load_mesh(&mut self, vertices: &[f64], faces: Vec<Vec<u32>>) -> Result<(), ProjectorError> {
        let vertices = vertex_buffer(vertices)?;
        let mesh = PolyMesh::new(vertices, faces)?;
        debug_log!(
            "mesh geladen: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        self.mesh = Some(mesh);
        Ok(())
    }

    pub fn configure(&mut self, options: ProjectionOptions) {
        self.options = options;
    }

    #[must_use]
    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    fn surface(&self) -> Option<&dyn RaySurface> {
        self.mesh.as_ref().map(|mesh| mesh as &dyn RaySurface)
    }

    pub fn project_flat(
        &self,
        source: &[f64],
        target: &[f64],
        blend: f64,
    ) -> Result<ProjectionExport, ProjectorError> {
        let source = flat_transform("source", source)?;
        let target = flat_transform("target", target)?;
        let result = project_with_options(source, target, blend, self.surface(), &self.options);
        Ok(result.into())
    }

    pub fn project_flat_many(
        &self,
        sources: &[f64],
        targets: &[f64],
        blends: &[f64],
    ) -> Result<Vec<ProjectionExport>, ProjectorError> {
        if sources.len() != blends.len() * 16 || targets.len() != blends.len() * 16 {
            return Err(ProjectorError::BatchLengthMismatch);
        }

        let requests = sources
            .chunks_exact(16)
            .zip(targets.chunks_exact(16))
            .zip(blends)
            .map(|((source, target), blend)| {
                Ok(ProjectionRequest {
                    source: flat_transform("source", source)?,
                    target: flat_transform("target", target)?,
                    blend: *blend,
                })
            })
            .collect::<Result<Vec<_>, ProjectorError>>()?;

        Ok(project_batch(&requests, self.surface(), &self.options)
            .into_iter()
            .map(ProjectionExport::from)
            .collect())
    }
}

fn flat_transform(name: &'static str, values: &[f64]) -> Result<Transform, ProjectorError> {
    Transform::from_column_major(values).ok_or(ProjectorError::InvalidMatrix {
        name,
        len: values.len(),
    })
}

fn vertex_buffer(values: &[f64]) -> Result<Vec<[f64; 3]>, ProjectorError> {
    if values.len() % 3 != 0 {
        return Err(ProjectorError::InvalidVertexBuffer(values.len()));
    }
    Ok(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
