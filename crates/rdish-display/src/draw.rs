//! Buffer management, uniform upload dispatch, and draw sequencing.
//!
//! Draws always re-bind program and vertex layout immediately before the
//! native draw call, so call results do not depend on what the remote
//! caller bound previously.

use serde_json::{Map, Value};
use tracing::debug;

use crate::backend::{BufferTarget, BufferUsage, DrawMode, GlApi};
use crate::error::CallError;
use crate::program::id_data;
use crate::session::{BufferObject, CallResult, DisplaySession, VertexArrayObject};
use crate::types::{self, UniformUpload};

fn f32_values(name: &str, value: &Value) -> Result<Vec<f32>, CallError> {
    let items = value
        .as_array()
        .ok_or_else(|| CallError::BadUniformValue(name.to_owned()))?;
    items
        .iter()
        .map(|item| {
            item.as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| CallError::BadUniformValue(name.to_owned()))
        })
        .collect()
}

fn i32_values(name: &str, value: &Value) -> Result<Vec<i32>, CallError> {
    let items = value
        .as_array()
        .ok_or_else(|| CallError::BadUniformValue(name.to_owned()))?;
    items
        .iter()
        .map(|item| {
            item.as_i64()
                .map(|v| v as i32)
                .ok_or_else(|| CallError::BadUniformValue(name.to_owned()))
        })
        .collect()
}

fn buffer_target(name: &str) -> Result<BufferTarget, CallError> {
    BufferTarget::from_wire(name).ok_or_else(|| CallError::UnknownBufferTarget(name.to_owned()))
}

impl<B: GlApi> DisplaySession<B> {
    pub fn create_buffer(&mut self) -> CallResult {
        let handle = self.backend.create_buffer();
        let id = self.buffers.insert(BufferObject { handle, len: 0 });
        Ok(id_data(id))
    }

    pub fn create_vertex_array(&mut self) -> CallResult {
        let handle = self.backend.create_vertex_array();
        let id = self.vertex_arrays.insert(VertexArrayObject { handle });
        Ok(id_data(id))
    }

    /// Uploads to whatever buffer is currently bound at `target_name`. The
    /// registry is untouched: this legacy call addresses a binding point,
    /// not a buffer id, so no element count can be recorded.
    pub fn buffer_data(&mut self, target_name: &str, data: &[f32]) -> CallResult {
        let target = buffer_target(target_name)?;
        self.backend
            .buffer_data_f32(target, data, BufferUsage::Dynamic);
        Ok(Map::new())
    }

    /// Uploads to the identified buffer via the array binding point and
    /// records the new element count for implicit draws.
    pub fn buffer_update_data(&mut self, buffer_id: u32, data: &[f32]) -> CallResult {
        let buffer = self.buffers.get_mut(buffer_id).ok_or(CallError::UnknownId {
            table: "buffer",
            id: buffer_id,
        })?;
        self.backend.bind_buffer(BufferTarget::Array, buffer.handle);
        self.backend
            .buffer_data_f32(BufferTarget::Array, data, BufferUsage::Static);
        buffer.len = data.len();
        Ok(Map::new())
    }

    pub fn use_program(&mut self, program_id: u32) -> CallResult {
        let handle = self.program(program_id)?.handle;
        self.backend.use_program(handle);
        Ok(Map::new())
    }

    pub fn bind_vertex_array(&mut self, vao_id: u32) -> CallResult {
        let handle = self.vertex_array(vao_id)?.handle;
        self.backend.bind_vertex_array(handle);
        Ok(Map::new())
    }

    pub fn bind_buffer(&mut self, target_name: &str, buffer_id: u32) -> CallResult {
        let target = buffer_target(target_name)?;
        let handle = self.buffer(buffer_id)?.handle;
        self.backend.bind_buffer(target, handle);
        Ok(Map::new())
    }

    pub fn enable_vertex_attrib_array(&mut self, loc: i32) -> CallResult {
        self.backend.enable_vertex_attrib_array(loc);
        Ok(Map::new())
    }

    pub fn vertex_attrib_pointer(
        &mut self,
        loc: i32,
        size: i32,
        type_code: u32,
        stride: i32,
        offset: i32,
    ) -> CallResult {
        self.backend
            .vertex_attrib_pointer(loc, size, type_code, false, stride, offset);
        Ok(Map::new())
    }

    /// Binds named attributes to data buffers. Each attribute is pointed at
    /// its buffer with the slot's component count, 32-bit float components,
    /// and zero stride/offset; interleaved or strided layouts are not
    /// supported by this call.
    pub fn program_link_attributes(
        &mut self,
        program_id: u32,
        bindings: &Map<String, Value>,
    ) -> CallResult {
        let program = self.programs.get_mut(program_id).ok_or(CallError::UnknownId {
            table: "program",
            id: program_id,
        })?;
        self.backend.use_program(program.handle);
        // Legacy programs carry their own layout object; introspected ones
        // update whichever vertex array the caller bound.
        if let Some(vao) = program.vao {
            self.backend.bind_vertex_array(vao);
        }

        for (name, value) in bindings {
            let buffer_id = value.as_u64().ok_or(CallError::BadArg {
                func: "program_link_attributes",
                index: 1,
                expected: "map of {attribute: buffer id}",
            })? as u32;
            let handle = self
                .buffers
                .get(buffer_id)
                .ok_or(CallError::UnknownId {
                    table: "buffer",
                    id: buffer_id,
                })?
                .handle;
            let slot = program
                .attributes
                .get_mut(name)
                .ok_or_else(|| CallError::UnknownAttribute(name.clone()))?;
            slot.buffer = Some(buffer_id);
            self.backend.bind_buffer(BufferTarget::Array, handle);
            self.backend.vertex_attrib_pointer(
                slot.loc,
                slot.component_count(),
                types::FLOAT,
                false,
                0,
                0,
            );
        }
        Ok(Map::new())
    }

    /// Drives named uniforms through the upload family their stored type
    /// descriptor selects. Not atomic: entries processed before a failing
    /// one stay applied, the rest are skipped.
    pub fn program_update_uniforms(
        &mut self,
        program_id: u32,
        values: &Map<String, Value>,
    ) -> CallResult {
        let program = self.programs.get(program_id).ok_or(CallError::UnknownId {
            table: "program",
            id: program_id,
        })?;
        self.backend.use_program(program.handle);

        for (name, value) in values {
            let slot = program
                .uniforms
                .get(name)
                .ok_or_else(|| CallError::UnknownUniform(name.clone()))?;
            let upload = slot.type_info.upload().ok_or(CallError::BadUniformSize)?;
            match upload {
                UniformUpload::FloatVec(n) => {
                    let data = f32_values(name, value)?;
                    self.backend.uniform_fv(slot.loc, n, &data);
                }
                UniformUpload::IntVec(n) => {
                    let data = i32_values(name, value)?;
                    self.backend.uniform_iv(slot.loc, n, &data);
                }
                UniformUpload::Matrix(cols, rows) => {
                    let data = f32_values(name, value)?;
                    self.backend.uniform_matrix_fv(slot.loc, cols, rows, &data);
                }
            }
        }
        Ok(Map::new())
    }

    /// Explicit-generation draw over a caller-managed vertex array.
    pub fn draw_arrays(
        &mut self,
        program_id: u32,
        vao_id: u32,
        mode_name: &str,
        first: i32,
        count: i32,
    ) -> CallResult {
        let mode = DrawMode::from_wire(mode_name).ok_or(CallError::UnknownDrawMode)?;
        let handle = self.program(program_id)?.handle;
        let vao = self.vertex_array(vao_id)?.handle;

        self.backend.use_program(handle);
        self.backend.bind_vertex_array(vao);
        debug!(?mode, first, count, "draw");
        self.backend.draw_arrays(mode, first, count);
        Ok(Map::new())
    }

    /// Implicit-generation draw: the vertex count is the floor of the
    /// minimum, over all bound attributes, of buffer element count divided
    /// by attribute component count, clamping the draw to the shortest
    /// fully-populated attribute stream.
    pub fn execute_program(&mut self, program_id: u32, mode_name: &str) -> CallResult {
        let mode = DrawMode::from_wire(mode_name).ok_or(CallError::UnknownDrawMode)?;

        let (handle, vao, count) = {
            let program = self.program(program_id)?;
            if program.attributes.is_empty() {
                return Err(CallError::NoAttributes(program_id));
            }

            let mut count = usize::MAX;
            for (name, slot) in &program.attributes {
                let buffer_id = slot
                    .buffer
                    .ok_or_else(|| CallError::UnboundAttribute(name.clone()))?;
                let len = self.buffer(buffer_id)?.len;
                count = count.min(len / slot.component_count() as usize);
            }
            (program.handle, program.vao, count)
        };

        self.backend.use_program(handle);
        // Legacy programs bind their own layout; introspected ones draw
        // against whichever vertex array the caller currently has bound.
        if let Some(vao) = vao {
            self.backend.bind_vertex_array(vao);
        }
        debug!(?mode, count, "implicit draw");
        self.backend.draw_arrays(mode, 0, count as i32);
        Ok(Map::new())
    }
}
