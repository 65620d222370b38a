//! Per-session display state.
//!
//! `DisplaySession` replaces the ambient global registry of the original
//! firmware: the transport owns exactly one session and threads every call
//! through it, so there is no shared mutable state and no locking. The five
//! tables are independent id namespaces; a buffer id and a program id with
//! the same value are unrelated.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::backend::{BufferHandle, GlApi, ProgramHandle, ShaderHandle, VertexArrayHandle};
use crate::error::CallError;
use crate::registry::ResourceTable;
use crate::types::TypeDesc;

/// Default render target dimensions, matching the original firmware's
/// offscreen canvas.
pub(crate) const DEFAULT_WIDTH: u32 = 600;
pub(crate) const DEFAULT_HEIGHT: u32 = 400;

/// Successful operations resolve to the reply's `data` object.
pub(crate) type CallResult = Result<Map<String, Value>, CallError>;

/// A compiled shader. The source text is retained for diagnostics; the
/// object itself is immutable after registration.
#[derive(Debug)]
pub struct ShaderObject {
    pub handle: ShaderHandle,
    pub source: String,
}

/// One named uniform slot of a linked program. The shape is frozen at link
/// time; only the value the slot is driven with changes afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct UniformSlot {
    pub type_info: TypeDesc,
    /// Declared array size (1 for non-arrays).
    pub size: i32,
    pub loc: i32,
}

/// One named attribute slot of a linked program. `buffer` is the id of the
/// data buffer most recently bound to this slot, if any.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSlot {
    pub type_info: TypeDesc,
    pub size: i32,
    pub loc: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<u32>,
}

impl AttributeSlot {
    /// Components consumed per vertex, from the type descriptor's layout.
    pub fn component_count(&self) -> i32 {
        i32::from(self.type_info.cols)
    }
}

#[derive(Debug)]
pub struct ProgramObject {
    pub handle: ProgramHandle,
    pub uniforms: HashMap<String, UniformSlot>,
    pub attributes: HashMap<String, AttributeSlot>,
    /// Legacy-generation programs own one vertex array object; introspected
    /// programs rely on explicitly created ones.
    pub vao: Option<VertexArrayHandle>,
}

#[derive(Debug)]
pub struct BufferObject {
    pub handle: BufferHandle,
    /// f32 element count of the most recent `buffer_update_data` upload.
    pub len: usize,
}

#[derive(Debug)]
pub struct VertexArrayObject {
    pub handle: VertexArrayHandle,
}

/// All process-side GPU state for one remote display session.
#[derive(Debug)]
pub struct DisplaySession<B> {
    pub(crate) backend: B,
    pub(crate) vertex_shaders: ResourceTable<ShaderObject>,
    pub(crate) fragment_shaders: ResourceTable<ShaderObject>,
    pub(crate) programs: ResourceTable<ProgramObject>,
    pub(crate) buffers: ResourceTable<BufferObject>,
    pub(crate) vertex_arrays: ResourceTable<VertexArrayObject>,
}

impl<B> DisplaySession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            vertex_shaders: ResourceTable::new(),
            fragment_shaders: ResourceTable::new(),
            programs: ResourceTable::new(),
            buffers: ResourceTable::new(),
            vertex_arrays: ResourceTable::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn programs(&self) -> &ResourceTable<ProgramObject> {
        &self.programs
    }

    pub fn buffers(&self) -> &ResourceTable<BufferObject> {
        &self.buffers
    }

    pub(crate) fn program(&self, id: u32) -> Result<&ProgramObject, CallError> {
        self.programs.get(id).ok_or(CallError::UnknownId {
            table: "program",
            id,
        })
    }

    pub(crate) fn buffer(&self, id: u32) -> Result<&BufferObject, CallError> {
        self.buffers.get(id).ok_or(CallError::UnknownId {
            table: "buffer",
            id,
        })
    }

    pub(crate) fn vertex_array(&self, id: u32) -> Result<&VertexArrayObject, CallError> {
        self.vertex_arrays.get(id).ok_or(CallError::UnknownId {
            table: "vertex array",
            id,
        })
    }
}

impl<B: GlApi> DisplaySession<B> {
    /// Resets every table and (re)creates the rendering context. The remote
    /// caller must issue this before anything else in a session.
    pub fn init_display(&mut self) -> CallResult {
        info!("initializing display");
        self.vertex_shaders = ResourceTable::new();
        self.fragment_shaders = ResourceTable::new();
        self.programs = ResourceTable::new();
        self.buffers = ResourceTable::new();
        self.vertex_arrays = ResourceTable::new();

        self.backend
            .init_context(DEFAULT_WIDTH, DEFAULT_HEIGHT)
            .map_err(|err| CallError::Context(err.to_string()))?;
        Ok(Map::new())
    }

    pub fn get_resolution(&mut self) -> CallResult {
        let (w, h) = self.backend.resolution().ok_or(CallError::NoContext)?;
        let mut data = Map::new();
        data.insert("w".to_owned(), Value::from(w));
        data.insert("h".to_owned(), Value::from(h));
        Ok(data)
    }

    pub fn set_gl_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> CallResult {
        self.backend.viewport(x, y, width, height);
        Ok(Map::new())
    }

    pub fn set_gl_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> CallResult {
        self.backend.clear_color(r, g, b, a);
        Ok(Map::new())
    }

    /// Clears color and depth in one call.
    pub fn clear(&mut self) -> CallResult {
        self.backend.clear();
        Ok(Map::new())
    }

    /// Copies the render target to the output surface.
    pub fn update_canvas(&mut self) -> CallResult {
        self.backend.present();
        Ok(Map::new())
    }
}
