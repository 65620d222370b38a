//! Shader compilation and program linking, both protocol generations.
//!
//! Failure discipline: a shader or program that fails its native
//! compile/link is deleted before the operation returns, so no id is ever
//! issued for it and the tables are left exactly as they were.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::backend::{GlApi, ProgramHandle, ShaderStage};
use crate::error::CallError;
use crate::session::{
    AttributeSlot, CallResult, DisplaySession, ProgramObject, ShaderObject, UniformSlot,
};
use crate::types::{describe, TypeDesc};

pub(crate) fn id_data(id: u32) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("id".to_owned(), Value::from(id));
    data
}

fn wire_object<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Component count from a legacy `{name: {"size": n}}` metadata entry.
/// Missing `size` defaults to 1; anything outside 1..=4 is rejected by
/// entry name.
fn legacy_size(name: &str, entry: &Value) -> Result<u8, CallError> {
    match entry.get("size") {
        None => Ok(1),
        Some(value) => match value.as_u64() {
            Some(n @ 1..=4) => Ok(n as u8),
            _ => Err(CallError::BadLegacySize(name.to_owned())),
        },
    }
}

/// Resolves every entry of a legacy uniform/attribute metadata map up
/// front, so nothing native is allocated for a call with a malformed entry.
fn legacy_sizes(specs: &Map<String, Value>) -> Result<Vec<(String, u8)>, CallError> {
    specs
        .iter()
        .map(|(name, entry)| Ok((name.clone(), legacy_size(name, entry)?)))
        .collect()
}

impl<B: GlApi> DisplaySession<B> {
    fn compile_stage(&mut self, stage: ShaderStage, source: &str) -> Result<u32, CallError> {
        let shader = self.backend.create_shader(stage);
        self.backend.shader_source(shader, source);
        self.backend.compile_shader(shader);
        if !self.backend.compile_ok(shader) {
            let log = self.backend.shader_info_log(shader);
            self.backend.delete_shader(shader);
            warn!(%stage, log = %log, "shader compile failed");
            return Err(CallError::Compile(log));
        }

        let object = ShaderObject {
            handle: shader,
            source: source.to_owned(),
        };
        let id = match stage {
            ShaderStage::Vertex => self.vertex_shaders.insert(object),
            ShaderStage::Fragment => self.fragment_shaders.insert(object),
        };
        debug!(%stage, id, "shader compiled");
        Ok(id)
    }

    pub fn compile_vertex_shader(&mut self, source: &str) -> CallResult {
        self.compile_stage(ShaderStage::Vertex, source).map(id_data)
    }

    pub fn compile_fragment_shader(&mut self, source: &str) -> CallResult {
        self.compile_stage(ShaderStage::Fragment, source)
            .map(id_data)
    }

    fn link_pair(
        &mut self,
        vertex_id: u32,
        fragment_id: u32,
    ) -> Result<ProgramHandle, CallError> {
        let vertex = self
            .vertex_shaders
            .get(vertex_id)
            .ok_or(CallError::UnknownId {
                table: "vertex shader",
                id: vertex_id,
            })?
            .handle;
        let fragment = self
            .fragment_shaders
            .get(fragment_id)
            .ok_or(CallError::UnknownId {
                table: "fragment shader",
                id: fragment_id,
            })?
            .handle;

        let program = self.backend.create_program();
        self.backend.attach_shader(program, vertex);
        self.backend.attach_shader(program, fragment);
        self.backend.link_program(program);
        if !self.backend.link_ok(program) {
            let log = self.backend.program_info_log(program);
            self.backend.delete_program(program);
            warn!(vertex_id, fragment_id, log = %log, "program link failed");
            return Err(CallError::Link(log));
        }
        Ok(program)
    }

    /// Introspected generation: the uniform/attribute maps come from the
    /// GL's own reflection lists and are returned to the caller as part of
    /// the reply, so it never has to re-query them.
    pub fn create_program(&mut self, vertex_id: u32, fragment_id: u32) -> CallResult {
        let handle = self.link_pair(vertex_id, fragment_id)?;

        let mut uniforms = HashMap::new();
        for index in 0..self.backend.active_uniform_count(handle) {
            let Some(var) = self.backend.active_uniform(handle, index) else {
                continue;
            };
            let loc = self.backend.uniform_location(handle, &var.name);
            uniforms.insert(
                var.name,
                UniformSlot {
                    type_info: describe(var.type_code),
                    size: var.size,
                    loc,
                },
            );
        }

        let mut attributes = HashMap::new();
        for index in 0..self.backend.active_attrib_count(handle) {
            let Some(var) = self.backend.active_attrib(handle, index) else {
                continue;
            };
            let loc = self.backend.attrib_location(handle, &var.name);
            attributes.insert(
                var.name,
                AttributeSlot {
                    type_info: describe(var.type_code),
                    size: var.size,
                    loc,
                    buffer: None,
                },
            );
        }

        debug!(
            uniforms = uniforms.len(),
            attributes = attributes.len(),
            "program linked"
        );

        let mut data = Map::new();
        data.insert("uniforms".to_owned(), wire_object(&uniforms));
        data.insert("attributes".to_owned(), wire_object(&attributes));
        let id = self.programs.insert(ProgramObject {
            handle,
            uniforms,
            attributes,
            vao: None,
        });
        data.insert("id".to_owned(), Value::from(id));
        Ok(data)
    }

    /// Legacy generation: the caller supplies `{name: {"size": n}}` maps (n
    /// is the component count), the builder only resolves locations. One
    /// vertex array object is allocated and owned by the program, and every
    /// supplied attribute's location is enabled under it immediately.
    pub fn create_program_old(
        &mut self,
        vertex_id: u32,
        fragment_id: u32,
        uniform_specs: &Map<String, Value>,
        attribute_specs: &Map<String, Value>,
    ) -> CallResult {
        // Both metadata maps are validated before the link so a bad entry
        // fails while there is still nothing to tear down.
        let uniform_sizes = legacy_sizes(uniform_specs)?;
        let attribute_sizes = legacy_sizes(attribute_specs)?;

        let handle = self.link_pair(vertex_id, fragment_id)?;
        let vao = self.backend.create_vertex_array();

        let mut uniforms = HashMap::new();
        for (name, size) in uniform_sizes {
            let loc = self.backend.uniform_location(handle, &name);
            uniforms.insert(
                name,
                UniformSlot {
                    type_info: TypeDesc::float_vec(size),
                    size: i32::from(size),
                    loc,
                },
            );
        }

        self.backend.bind_vertex_array(vao);
        let mut attributes = HashMap::new();
        for (name, size) in attribute_sizes {
            let loc = self.backend.attrib_location(handle, &name);
            self.backend.enable_vertex_attrib_array(loc);
            attributes.insert(
                name,
                AttributeSlot {
                    type_info: TypeDesc::float_vec(size),
                    size: i32::from(size),
                    loc,
                    buffer: None,
                },
            );
        }

        debug!(
            uniforms = uniforms.len(),
            attributes = attributes.len(),
            "legacy program linked"
        );
        let id = self.programs.insert(ProgramObject {
            handle,
            uniforms,
            attributes,
            vao: Some(vao),
        });
        Ok(id_data(id))
    }
}
