//! GL capability surface.
//!
//! The display core is backend-agnostic; in production the trait is
//! implemented over a real GL context owned by the presentation surface.
//! For tests we provide [`SoftGl`], a deterministic software backend that
//! records every call it receives.
//!
//! The surface is deliberately fine-grained around compile/link: the core
//! interprets status and info logs itself so that the delete-on-failure
//! discipline (a failed object never receives an id) lives in one place.

mod soft;

use core::fmt;

pub use soft::{GlCall, SoftGl};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ShaderHandle(pub u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ProgramHandle(pub u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct VertexArrayHandle(pub u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
    CopyRead,
    CopyWrite,
    TransformFeedback,
    Uniform,
    PixelPack,
    PixelUnpack,
}

impl BufferTarget {
    /// Parses the upper-case wire name used by `buffer_data`/`bind_buffer`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "ARRAY_BUFFER" => Some(Self::Array),
            "ELEMENT_ARRAY_BUFFER" => Some(Self::ElementArray),
            "COPY_READ_BUFFER" => Some(Self::CopyRead),
            "COPY_WRITE_BUFFER" => Some(Self::CopyWrite),
            "TRANSFORM_FEEDBACK_BUFFER" => Some(Self::TransformFeedback),
            "UNIFORM_BUFFER" => Some(Self::Uniform),
            "PIXEL_PACK_BUFFER" => Some(Self::PixelPack),
            "PIXEL_UNPACK_BUFFER" => Some(Self::PixelUnpack),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BufferUsage {
    Static,
    Dynamic,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawMode {
    Points,
    Lines,
    Triangles,
}

impl DrawMode {
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "points" => Some(Self::Points),
            "lines" => Some(Self::Lines),
            "triangles" => Some(Self::Triangles),
            _ => None,
        }
    }
}

/// One entry from a linked program's active-uniform or active-attribute
/// reflection list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveVar {
    pub name: String,
    /// Raw GL type code; decode via [`crate::describe`].
    pub type_code: u32,
    /// Declared array size (1 for non-arrays).
    pub size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("failed to create rendering context: {0}")]
    Init(String),
}

/// The native GPU call set the display core sequences. Mirrors the WebGL2
/// subset the protocol drives; all calls are synchronous.
pub trait GlApi {
    fn init_context(&mut self, width: u32, height: u32) -> Result<(), ContextError>;
    fn resolution(&self) -> Option<(u32, u32)>;
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear(&mut self);
    /// Blits the render target to the output surface.
    fn present(&mut self);

    fn create_shader(&mut self, stage: ShaderStage) -> ShaderHandle;
    fn shader_source(&mut self, shader: ShaderHandle, source: &str);
    fn compile_shader(&mut self, shader: ShaderHandle);
    fn compile_ok(&self, shader: ShaderHandle) -> bool;
    fn shader_info_log(&self, shader: ShaderHandle) -> String;
    fn delete_shader(&mut self, shader: ShaderHandle);

    fn create_program(&mut self) -> ProgramHandle;
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);
    fn link_program(&mut self, program: ProgramHandle);
    fn link_ok(&self, program: ProgramHandle) -> bool;
    fn program_info_log(&self, program: ProgramHandle) -> String;
    fn delete_program(&mut self, program: ProgramHandle);
    fn use_program(&mut self, program: ProgramHandle);

    fn active_uniform_count(&self, program: ProgramHandle) -> u32;
    fn active_uniform(&self, program: ProgramHandle, index: u32) -> Option<ActiveVar>;
    /// -1 when the name is not an active uniform.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> i32;
    fn active_attrib_count(&self, program: ProgramHandle) -> u32;
    fn active_attrib(&self, program: ProgramHandle, index: u32) -> Option<ActiveVar>;
    fn attrib_location(&self, program: ProgramHandle, name: &str) -> i32;

    fn create_vertex_array(&mut self) -> VertexArrayHandle;
    fn bind_vertex_array(&mut self, vao: VertexArrayHandle);
    fn enable_vertex_attrib_array(&mut self, loc: i32);
    fn vertex_attrib_pointer(
        &mut self,
        loc: i32,
        size: i32,
        type_code: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    fn create_buffer(&mut self) -> BufferHandle;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: BufferHandle);
    fn buffer_data_f32(&mut self, target: BufferTarget, data: &[f32], usage: BufferUsage);

    fn uniform_fv(&mut self, loc: i32, components: u8, data: &[f32]);
    fn uniform_iv(&mut self, loc: i32, components: u8, data: &[i32]);
    fn uniform_matrix_fv(&mut self, loc: i32, cols: u8, rows: u8, data: &[f32]);

    fn draw_arrays(&mut self, mode: DrawMode, first: i32, count: i32);
}
