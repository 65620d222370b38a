mod draw;
mod program;
mod registry;

use crate::backend::SoftGl;
use crate::DisplaySession;

/// Vertex stage with a vec3 + vec2 attribute pair and two uniforms.
pub(crate) const VERTEX_SRC: &str = "\
#version 300 es
uniform vec2 u_resolution;
uniform mat3 u_transform;
in vec3 a_position;
in vec2 a_uv;
out vec2 v_uv;
void main() {}
";

/// Fragment stage consuming the `v_uv` varying.
pub(crate) const FRAGMENT_SRC: &str = "\
#version 300 es
precision mediump float;
uniform vec4 u_color;
uniform bool u_flag;
in vec2 v_uv;
out vec4 frag_color;
void main() {}
";

pub(crate) fn session() -> DisplaySession<SoftGl> {
    let mut session = DisplaySession::new(SoftGl::new());
    session.init_display().expect("init_display");
    session
}

/// Compiles the fixture shaders and links them through the introspected
/// generation. Returns the session and the new program id.
pub(crate) fn linked_session() -> (DisplaySession<SoftGl>, u32) {
    let mut session = session();
    let vs = session
        .compile_vertex_shader(VERTEX_SRC)
        .expect("vertex shader")["id"]
        .as_u64()
        .expect("id") as u32;
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment shader")["id"]
        .as_u64()
        .expect("id") as u32;
    let data = session.create_program(vs, fs).expect("create_program");
    (session, data["id"].as_u64().expect("id") as u32)
}
