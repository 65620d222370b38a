//! Command router: the single entry point of the display core.
//!
//! Function names resolve into the closed [`DisplayFunc`] set up front, so
//! dispatch is a total match; the only runtime default branch is the
//! status-99 reply for names outside the set. The router itself validates
//! nothing: every operation checks its own arguments and converts failures
//! into [`CallError`], which the router folds into the reply envelope. No
//! error escapes past this boundary.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use rdish_protocol::{CallEnvelope, CallMsg, Reply, ReplyEnvelope, API_DISPLAY};

use crate::backend::GlApi;
use crate::error::CallError;
use crate::session::{CallResult, DisplaySession};

/// The fixed, case-sensitive set of display operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFunc {
    InitDisplay,
    GetResolution,
    CompileVertexShader,
    CompileFragmentShader,
    CreateProgram,
    CreateVertexArray,
    EnableVertexAttribArray,
    CreateProgramOld,
    CreateBuffer,
    BufferData,
    BufferUpdateData,
    UseProgram,
    BindVertexArray,
    BindBuffer,
    VertexAttribPointer,
    ProgramLinkAttributes,
    ProgramUpdateUniforms,
    DrawArrays,
    ExecuteProgram,
    SetGlViewport,
    SetGlClearColor,
    Clear,
    UpdateCanvas,
}

impl DisplayFunc {
    pub fn from_wire(name: &str) -> Option<Self> {
        let func = match name {
            "init_display" => Self::InitDisplay,
            "get_resolution" => Self::GetResolution,
            "compile_vertex_shader" => Self::CompileVertexShader,
            "compile_fragment_shader" => Self::CompileFragmentShader,
            "create_program" => Self::CreateProgram,
            "create_vertex_array" => Self::CreateVertexArray,
            "enable_vertex_attrib_array" => Self::EnableVertexAttribArray,
            "create_program_old" => Self::CreateProgramOld,
            "create_buffer" => Self::CreateBuffer,
            "buffer_data" => Self::BufferData,
            "buffer_update_data" => Self::BufferUpdateData,
            "use_program" => Self::UseProgram,
            "bind_vertex_array" => Self::BindVertexArray,
            "bind_buffer" => Self::BindBuffer,
            "vertex_attrib_pointer" => Self::VertexAttribPointer,
            "program_link_attributes" => Self::ProgramLinkAttributes,
            "program_update_uniforms" => Self::ProgramUpdateUniforms,
            "draw_arrays" => Self::DrawArrays,
            "execute_program" => Self::ExecuteProgram,
            "set_gl_viewport" => Self::SetGlViewport,
            "set_gl_clear_color" => Self::SetGlClearColor,
            "clear" => Self::Clear,
            "update_canvas" => Self::UpdateCanvas,
            _ => return None,
        };
        Some(func)
    }
}

/// Positional argument extraction with uniform error shapes.
struct Args<'a> {
    func: &'static str,
    args: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(func: &'static str, args: &'a [Value]) -> Self {
        Self { func, args }
    }

    fn get(&self, index: usize) -> Result<&'a Value, CallError> {
        self.args.get(index).ok_or(CallError::MissingArg {
            func: self.func,
            index,
        })
    }

    fn bad(&self, index: usize, expected: &'static str) -> CallError {
        CallError::BadArg {
            func: self.func,
            index,
            expected,
        }
    }

    fn str(&self, index: usize) -> Result<&'a str, CallError> {
        self.get(index)?
            .as_str()
            .ok_or_else(|| self.bad(index, "string"))
    }

    fn u32(&self, index: usize) -> Result<u32, CallError> {
        self.get(index)?
            .as_u64()
            .map(|v| v as u32)
            .ok_or_else(|| self.bad(index, "non-negative integer"))
    }

    fn i32(&self, index: usize) -> Result<i32, CallError> {
        self.get(index)?
            .as_i64()
            .map(|v| v as i32)
            .ok_or_else(|| self.bad(index, "integer"))
    }

    fn f32(&self, index: usize) -> Result<f32, CallError> {
        self.get(index)?
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| self.bad(index, "number"))
    }

    fn f32_array(&self, index: usize) -> Result<Vec<f32>, CallError> {
        let items = self
            .get(index)?
            .as_array()
            .ok_or_else(|| self.bad(index, "array of numbers"))?;
        items
            .iter()
            .map(|item| {
                item.as_f64()
                    .map(|v| v as f32)
                    .ok_or_else(|| self.bad(index, "array of numbers"))
            })
            .collect()
    }

    fn object(&self, index: usize) -> Result<&'a Map<String, Value>, CallError> {
        self.get(index)?
            .as_object()
            .ok_or_else(|| self.bad(index, "object"))
    }
}

fn kwarg_object<'a>(
    func: &'static str,
    kwargs: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Map<String, Value>, CallError> {
    let value = kwargs
        .get(name)
        .ok_or(CallError::MissingKwarg { func, name })?;
    value.as_object().ok_or(CallError::BadKwarg {
        func,
        name,
        expected: "object",
    })
}

fn dispatch<B: GlApi>(
    session: &mut DisplaySession<B>,
    func: DisplayFunc,
    args: &[Value],
    kwargs: &Map<String, Value>,
) -> CallResult {
    match func {
        DisplayFunc::InitDisplay => session.init_display(),
        DisplayFunc::GetResolution => session.get_resolution(),
        DisplayFunc::CompileVertexShader => {
            let a = Args::new("compile_vertex_shader", args);
            session.compile_vertex_shader(a.str(0)?)
        }
        DisplayFunc::CompileFragmentShader => {
            let a = Args::new("compile_fragment_shader", args);
            session.compile_fragment_shader(a.str(0)?)
        }
        DisplayFunc::CreateProgram => {
            let a = Args::new("create_program", args);
            session.create_program(a.u32(0)?, a.u32(1)?)
        }
        DisplayFunc::CreateVertexArray => session.create_vertex_array(),
        DisplayFunc::EnableVertexAttribArray => {
            let a = Args::new("enable_vertex_attrib_array", args);
            session.enable_vertex_attrib_array(a.i32(0)?)
        }
        DisplayFunc::CreateProgramOld => {
            let a = Args::new("create_program_old", args);
            let uniforms = kwarg_object("create_program_old", kwargs, "uniforms")?;
            let attributes = kwarg_object("create_program_old", kwargs, "attributes")?;
            session.create_program_old(a.u32(0)?, a.u32(1)?, uniforms, attributes)
        }
        DisplayFunc::CreateBuffer => session.create_buffer(),
        DisplayFunc::BufferData => {
            let a = Args::new("buffer_data", args);
            session.buffer_data(a.str(0)?, &a.f32_array(1)?)
        }
        DisplayFunc::BufferUpdateData => {
            let a = Args::new("buffer_update_data", args);
            session.buffer_update_data(a.u32(0)?, &a.f32_array(1)?)
        }
        DisplayFunc::UseProgram => {
            let a = Args::new("use_program", args);
            session.use_program(a.u32(0)?)
        }
        DisplayFunc::BindVertexArray => {
            let a = Args::new("bind_vertex_array", args);
            session.bind_vertex_array(a.u32(0)?)
        }
        DisplayFunc::BindBuffer => {
            let a = Args::new("bind_buffer", args);
            session.bind_buffer(a.str(0)?, a.u32(1)?)
        }
        DisplayFunc::VertexAttribPointer => {
            let a = Args::new("vertex_attrib_pointer", args);
            session.vertex_attrib_pointer(a.i32(0)?, a.i32(1)?, a.u32(2)?, a.i32(3)?, a.i32(4)?)
        }
        DisplayFunc::ProgramLinkAttributes => {
            let a = Args::new("program_link_attributes", args);
            session.program_link_attributes(a.u32(0)?, a.object(1)?)
        }
        DisplayFunc::ProgramUpdateUniforms => {
            let a = Args::new("program_update_uniforms", args);
            session.program_update_uniforms(a.u32(0)?, a.object(1)?)
        }
        DisplayFunc::DrawArrays => {
            let a = Args::new("draw_arrays", args);
            session.draw_arrays(a.u32(0)?, a.u32(1)?, a.str(2)?, a.i32(3)?, a.i32(4)?)
        }
        DisplayFunc::ExecuteProgram => {
            let a = Args::new("execute_program", args);
            session.execute_program(a.u32(0)?, a.str(1)?)
        }
        DisplayFunc::SetGlViewport => {
            let a = Args::new("set_gl_viewport", args);
            session.set_gl_viewport(a.i32(0)?, a.i32(1)?, a.i32(2)?, a.i32(3)?)
        }
        DisplayFunc::SetGlClearColor => {
            let a = Args::new("set_gl_clear_color", args);
            session.set_gl_clear_color(a.f32(0)?, a.f32(1)?, a.f32(2)?, a.f32(3)?)
        }
        DisplayFunc::Clear => session.clear(),
        DisplayFunc::UpdateCanvas => session.update_canvas(),
    }
}

/// Routes one decoded call and folds the outcome into a [`Reply`].
pub fn handle_message<B: GlApi>(session: &mut DisplaySession<B>, msg: &CallMsg) -> Reply {
    let Some(func) = DisplayFunc::from_wire(&msg.func) else {
        warn!(func = %msg.func, "unknown display function");
        return Reply::unknown_function(&msg.func);
    };

    debug!(func = %msg.func, args = msg.args.len(), "dispatching");
    match dispatch(session, func, &msg.args, &msg.kwargs) {
        Ok(data) => Reply::ok(&msg.func, data),
        Err(err) => {
            warn!(func = %msg.func, %err, "display call failed");
            Reply::error(&msg.func, err.to_string())
        }
    }
}

/// Routes one inbound envelope, checking the api namespace first.
pub fn handle_envelope<B: GlApi>(
    session: &mut DisplaySession<B>,
    envelope: &CallEnvelope,
) -> ReplyEnvelope {
    if envelope.api != API_DISPLAY {
        warn!(api = %envelope.api, "unexpected api namespace");
        return Reply::unexpected_api(&envelope.msg.func, &envelope.api).into_envelope();
    }
    handle_message(session, &envelope.msg).into_envelope()
}
