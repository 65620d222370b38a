//! Deterministic software GL backend.
//!
//! `SoftGl` implements [`GlApi`] without any GPU: it keeps just enough
//! state to answer reflection queries and appends every call to a log that
//! tests assert sequencing against. Compilation and linking run a small
//! GLSL-subset scan over the submitted source:
//!
//! - a `#error` directive fails compilation, with the directive's line as
//!   the info log;
//! - linking requires every fragment-stage `in` to be written by a
//!   matching vertex-stage `out` (same name and type);
//! - active uniforms are the `uniform <type> <name>[N]?;` declarations
//!   across both stages (declaration order, first occurrence wins) and
//!   active attributes are the vertex-stage `in` declarations; locations
//!   are list indices.

use std::collections::HashMap;

use super::{
    ActiveVar, BufferHandle, BufferTarget, BufferUsage, ContextError, DrawMode, GlApi,
    ProgramHandle, ShaderHandle, ShaderStage, VertexArrayHandle,
};
use crate::types;

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    InitContext { width: u32, height: u32 },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear,
    Present,
    CreateShader(ShaderStage),
    CompileShader(ShaderHandle),
    DeleteShader(ShaderHandle),
    CreateProgram,
    AttachShader { program: ProgramHandle, shader: ShaderHandle },
    LinkProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    CreateVertexArray,
    BindVertexArray(VertexArrayHandle),
    EnableVertexAttribArray(i32),
    VertexAttribPointer { loc: i32, size: i32, type_code: u32, stride: i32, offset: i32 },
    CreateBuffer,
    BindBuffer { target: BufferTarget, buffer: BufferHandle },
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    UniformFv { loc: i32, components: u8, values: Vec<f32> },
    UniformIv { loc: i32, components: u8, values: Vec<i32> },
    UniformMatrixFv { loc: i32, cols: u8, rows: u8, values: Vec<f32> },
    DrawArrays { mode: DrawMode, first: i32, count: i32 },
}

#[derive(Debug)]
struct SoftShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct SoftProgram {
    shaders: Vec<ShaderHandle>,
    linked: bool,
    log: String,
    uniforms: Vec<ActiveVar>,
    attributes: Vec<ActiveVar>,
}

#[derive(Debug, Default)]
pub struct SoftGl {
    calls: Vec<GlCall>,
    resolution: Option<(u32, u32)>,
    next_handle: u32,
    shaders: HashMap<u32, SoftShader>,
    programs: HashMap<u32, SoftProgram>,
}

impl SoftGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, in issue order.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn mint(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn record(&mut self, call: GlCall) {
        self.calls.push(call);
    }

    fn source_for(&self, program: &SoftProgram, stage: ShaderStage) -> Option<&str> {
        program.shaders.iter().find_map(|handle| {
            let shader = self.shaders.get(&handle.0)?;
            (shader.stage == stage).then_some(shader.source.as_str())
        })
    }
}

/// `uniform`/`in`/`out` declarations in `source`, in declaration order.
/// Understands an optional precision qualifier and a trailing `[N]` array
/// suffix; anything else on the line disqualifies it.
fn scan_decls(source: &str, keyword: &str) -> Vec<ActiveVar> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim().strip_suffix(';')?;
            let mut parts = line.split_whitespace();
            if parts.next()? != keyword {
                return None;
            }
            let mut ty = parts.next()?;
            if matches!(ty, "lowp" | "mediump" | "highp") {
                ty = parts.next()?;
            }
            let name = parts.next()?;
            if parts.next().is_some() {
                return None;
            }
            let (name, size) = match name.split_once('[') {
                Some((base, rest)) => (base, rest.strip_suffix(']')?.parse().ok()?),
                None => (name, 1),
            };
            Some(ActiveVar {
                name: name.to_owned(),
                type_code: type_code_for(ty)?,
                size,
            })
        })
        .collect()
}

fn type_code_for(keyword: &str) -> Option<u32> {
    let code = match keyword {
        "float" => types::FLOAT,
        "vec2" => types::FLOAT_VEC2,
        "vec3" => types::FLOAT_VEC3,
        "vec4" => types::FLOAT_VEC4,
        "int" => types::INT,
        "ivec2" => types::INT_VEC2,
        "ivec3" => types::INT_VEC3,
        "ivec4" => types::INT_VEC4,
        "uint" => types::UNSIGNED_INT,
        "uvec2" => types::UNSIGNED_INT_VEC2,
        "uvec3" => types::UNSIGNED_INT_VEC3,
        "uvec4" => types::UNSIGNED_INT_VEC4,
        "bool" => types::BOOL,
        "bvec2" => types::BOOL_VEC2,
        "bvec3" => types::BOOL_VEC3,
        "bvec4" => types::BOOL_VEC4,
        "mat2" => types::FLOAT_MAT2,
        "mat3" => types::FLOAT_MAT3,
        "mat4" => types::FLOAT_MAT4,
        "mat2x3" => types::FLOAT_MAT2X3,
        "mat2x4" => types::FLOAT_MAT2X4,
        "mat3x2" => types::FLOAT_MAT3X2,
        "mat3x4" => types::FLOAT_MAT3X4,
        "mat4x2" => types::FLOAT_MAT4X2,
        "mat4x3" => types::FLOAT_MAT4X3,
        "sampler2D" => types::SAMPLER_2D,
        "sampler3D" => types::SAMPLER_3D,
        "samplerCube" => types::SAMPLER_CUBE,
        "sampler2DShadow" => types::SAMPLER_2D_SHADOW,
        "sampler2DArray" => types::SAMPLER_2D_ARRAY,
        _ => return None,
    };
    Some(code)
}

impl GlApi for SoftGl {
    fn init_context(&mut self, width: u32, height: u32) -> Result<(), ContextError> {
        self.record(GlCall::InitContext { width, height });
        self.resolution = Some((width, height));
        Ok(())
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport { x, y, width, height });
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&mut self) {
        self.record(GlCall::Clear);
    }

    fn present(&mut self) {
        self.record(GlCall::Present);
    }

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle {
        self.record(GlCall::CreateShader(stage));
        let handle = self.mint();
        self.shaders.insert(
            handle,
            SoftShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        ShaderHandle(handle)
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) {
        if let Some(entry) = self.shaders.get_mut(&shader.0) {
            entry.source = source.to_owned();
        }
    }

    fn compile_shader(&mut self, shader: ShaderHandle) {
        self.record(GlCall::CompileShader(shader));
        let Some(entry) = self.shaders.get_mut(&shader.0) else {
            return;
        };
        match entry.source.lines().find(|l| l.trim_start().starts_with("#error")) {
            Some(line) => {
                entry.compiled = false;
                entry.log = format!("ERROR: {}", line.trim());
            }
            None => {
                entry.compiled = true;
                entry.log = String::new();
            }
        }
    }

    fn compile_ok(&self, shader: ShaderHandle) -> bool {
        self.shaders.get(&shader.0).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders
            .get(&shader.0)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.record(GlCall::DeleteShader(shader));
        self.shaders.remove(&shader.0);
    }

    fn create_program(&mut self) -> ProgramHandle {
        self.record(GlCall::CreateProgram);
        let handle = self.mint();
        self.programs.insert(handle, SoftProgram::default());
        ProgramHandle(handle)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        self.record(GlCall::AttachShader { program, shader });
        if let Some(entry) = self.programs.get_mut(&program.0) {
            entry.shaders.push(shader);
        }
    }

    fn link_program(&mut self, program: ProgramHandle) {
        self.record(GlCall::LinkProgram(program));
        let (vertex, fragment) = {
            let Some(entry) = self.programs.get(&program.0) else {
                return;
            };
            (
                self.source_for(entry, ShaderStage::Vertex)
                    .unwrap_or_default()
                    .to_owned(),
                self.source_for(entry, ShaderStage::Fragment)
                    .unwrap_or_default()
                    .to_owned(),
            )
        };

        let vertex_outs = scan_decls(&vertex, "out");
        let mut failure = None;
        for varying in scan_decls(&fragment, "in") {
            let written = vertex_outs
                .iter()
                .any(|v| v.name == varying.name && v.type_code == varying.type_code);
            if !written {
                failure = Some(format!(
                    "varying {} not written by vertex shader",
                    varying.name
                ));
                break;
            }
        }

        let mut uniforms: Vec<ActiveVar> = Vec::new();
        for var in scan_decls(&vertex, "uniform")
            .into_iter()
            .chain(scan_decls(&fragment, "uniform"))
        {
            if !uniforms.iter().any(|u| u.name == var.name) {
                uniforms.push(var);
            }
        }
        let attributes = scan_decls(&vertex, "in");

        let Some(entry) = self.programs.get_mut(&program.0) else {
            return;
        };
        match failure {
            Some(log) => {
                entry.linked = false;
                entry.log = log;
            }
            None => {
                entry.linked = true;
                entry.log = String::new();
                entry.uniforms = uniforms;
                entry.attributes = attributes;
            }
        }
    }

    fn link_ok(&self, program: ProgramHandle) -> bool {
        self.programs.get(&program.0).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs
            .get(&program.0)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.record(GlCall::DeleteProgram(program));
        self.programs.remove(&program.0);
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.record(GlCall::UseProgram(program));
    }

    fn active_uniform_count(&self, program: ProgramHandle) -> u32 {
        self.programs
            .get(&program.0)
            .map_or(0, |p| p.uniforms.len() as u32)
    }

    fn active_uniform(&self, program: ProgramHandle, index: u32) -> Option<ActiveVar> {
        self.programs
            .get(&program.0)?
            .uniforms
            .get(index as usize)
            .cloned()
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> i32 {
        self.programs
            .get(&program.0)
            .and_then(|p| p.uniforms.iter().position(|u| u.name == name))
            .map_or(-1, |i| i as i32)
    }

    fn active_attrib_count(&self, program: ProgramHandle) -> u32 {
        self.programs
            .get(&program.0)
            .map_or(0, |p| p.attributes.len() as u32)
    }

    fn active_attrib(&self, program: ProgramHandle, index: u32) -> Option<ActiveVar> {
        self.programs
            .get(&program.0)?
            .attributes
            .get(index as usize)
            .cloned()
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> i32 {
        self.programs
            .get(&program.0)
            .and_then(|p| p.attributes.iter().position(|a| a.name == name))
            .map_or(-1, |i| i as i32)
    }

    fn create_vertex_array(&mut self) -> VertexArrayHandle {
        self.record(GlCall::CreateVertexArray);
        VertexArrayHandle(self.mint())
    }

    fn bind_vertex_array(&mut self, vao: VertexArrayHandle) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn enable_vertex_attrib_array(&mut self, loc: i32) {
        self.record(GlCall::EnableVertexAttribArray(loc));
    }

    fn vertex_attrib_pointer(
        &mut self,
        loc: i32,
        size: i32,
        type_code: u32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            loc,
            size,
            type_code,
            stride,
            offset,
        });
    }

    fn create_buffer(&mut self) -> BufferHandle {
        self.record(GlCall::CreateBuffer);
        BufferHandle(self.mint())
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle) {
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data_f32(&mut self, target: BufferTarget, data: &[f32], usage: BufferUsage) {
        self.record(GlCall::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn uniform_fv(&mut self, loc: i32, components: u8, data: &[f32]) {
        self.record(GlCall::UniformFv {
            loc,
            components,
            values: data.to_vec(),
        });
    }

    fn uniform_iv(&mut self, loc: i32, components: u8, data: &[i32]) {
        self.record(GlCall::UniformIv {
            loc,
            components,
            values: data.to_vec(),
        });
    }

    fn uniform_matrix_fv(&mut self, loc: i32, cols: u8, rows: u8, data: &[f32]) {
        self.record(GlCall::UniformMatrixFv {
            loc,
            cols,
            rows,
            values: data.to_vec(),
        });
    }

    fn draw_arrays(&mut self, mode: DrawMode, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }
}
