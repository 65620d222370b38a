use serde_json::json;

use crate::backend::GlCall;
use crate::error::CallError;
use crate::tests::{session, FRAGMENT_SRC, VERTEX_SRC};

#[test]
fn vertex_and_fragment_shader_ids_are_separate_namespaces() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex");
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment");
    assert_eq!(vs["id"], json!(0));
    assert_eq!(fs["id"], json!(0));
}

#[test]
fn failed_compile_surfaces_the_log_and_consumes_no_id() {
    let mut session = session();
    let err = session
        .compile_vertex_shader("#error bad token\nvoid main() {}")
        .expect_err("compile should fail");
    let CallError::Compile(log) = err else {
        panic!("expected a compile error, got {err:?}");
    };
    assert!(log.contains("#error bad token"), "log: {log}");

    // The native object was deleted and the next success still gets id 0.
    assert!(session
        .backend()
        .calls()
        .iter()
        .any(|c| matches!(c, GlCall::DeleteShader(_))));
    let ok = session.compile_vertex_shader(VERTEX_SRC).expect("vertex");
    assert_eq!(ok["id"], json!(0));
}

#[test]
fn failed_link_surfaces_the_log_and_registers_no_program() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let orphan_fragment = "\
#version 300 es
precision mediump float;
in vec3 v_missing;
out vec4 frag_color;
void main() {}
";
    let fs = session
        .compile_fragment_shader(orphan_fragment)
        .expect("fragment")["id"]
        .as_u64()
        .unwrap() as u32;

    let err = session.create_program(vs, fs).expect_err("link should fail");
    let CallError::Link(log) = err else {
        panic!("expected a link error, got {err:?}");
    };
    assert!(log.contains("v_missing"), "log: {log}");
    assert!(session.programs().is_empty());
    assert!(session
        .backend()
        .calls()
        .iter()
        .any(|c| matches!(c, GlCall::DeleteProgram(_))));
}

#[test]
fn create_program_rejects_never_issued_shader_ids() {
    let mut session = session();
    let err = session.create_program(5, 0).expect_err("unknown ids");
    assert_eq!(err.to_string(), "unknown vertex shader id 5");

    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let err = session.create_program(vs, 3).expect_err("unknown fragment");
    assert_eq!(err.to_string(), "unknown fragment shader id 3");
}

#[test]
fn create_program_returns_reflected_uniform_and_attribute_maps() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment")["id"]
        .as_u64()
        .unwrap() as u32;
    let data = session.create_program(vs, fs).expect("create_program");

    assert_eq!(data["id"], json!(0));

    let u_color = &data["uniforms"]["u_color"];
    assert_eq!(u_color["type_info"]["name"], json!("FLOAT_VEC4"));
    assert_eq!(u_color["type_info"]["base_layout"], json!([4, 1]));
    assert_eq!(u_color["size"], json!(1));
    assert!(u_color["loc"].as_i64().unwrap() >= 0);
    assert_eq!(
        data["uniforms"]["u_transform"]["type_info"]["name"],
        json!("FLOAT_MAT3")
    );

    let a_position = &data["attributes"]["a_position"];
    assert_eq!(a_position["type_info"]["name"], json!("FLOAT_VEC3"));
    assert_eq!(a_position["type_info"]["base_layout"], json!([3, 1]));
    // No buffer is bound yet, so the slot serializes without one.
    assert!(a_position.get("buffer").is_none());

    // The registered program carries the same slots and no layout object.
    let program = session.programs().get(0).expect("program 0");
    assert!(program.vao.is_none());
    assert_eq!(program.uniforms.len(), 4);
    assert_eq!(program.attributes.len(), 2);
}

#[test]
fn create_program_old_allocates_a_layout_and_enables_each_attribute() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment")["id"]
        .as_u64()
        .unwrap() as u32;

    let uniforms = json!({ "u_color": { "size": 4 }, "u_resolution": { "size": 2 } });
    let attributes = json!({ "a_position": { "size": 3 }, "a_uv": {} });
    let data = session
        .create_program_old(
            vs,
            fs,
            uniforms.as_object().unwrap(),
            attributes.as_object().unwrap(),
        )
        .expect("create_program_old");
    assert_eq!(data["id"], json!(0));

    let program = session.programs().get(0).expect("program 0");
    assert!(program.vao.is_some());

    let u_color = &program.uniforms["u_color"];
    assert_eq!(u_color.type_info.name, "FLOAT_VEC4");
    assert_eq!(u_color.size, 4);

    // A missing "size" entry defaults to 1 component.
    assert_eq!(program.attributes["a_uv"].component_count(), 1);

    // The layout is bound and each supplied attribute location enabled.
    let calls = session.backend().calls();
    assert!(calls.iter().any(|c| matches!(c, GlCall::BindVertexArray(_))));
    let enabled = calls
        .iter()
        .filter(|c| matches!(c, GlCall::EnableVertexAttribArray(_)))
        .count();
    assert_eq!(enabled, 2);
}

#[test]
fn bad_legacy_metadata_fails_before_any_native_allocation() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment")["id"]
        .as_u64()
        .unwrap() as u32;

    session.backend.clear_calls();
    let uniforms = json!({});
    let attributes = json!({ "a_position": { "size": "three" } });
    let err = session
        .create_program_old(
            vs,
            fs,
            uniforms.as_object().unwrap(),
            attributes.as_object().unwrap(),
        )
        .expect_err("non-integer size");
    assert_eq!(err.to_string(), "bad size for a_position, must be in (1,2,3,4)");

    // The bad entry was caught up front: no program was linked, no layout
    // object allocated, nothing registered and nothing left to tear down.
    let calls = session.backend().calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, GlCall::LinkProgram(_) | GlCall::CreateVertexArray)));
    assert!(session.programs().is_empty());
}

#[test]
fn legacy_sizes_outside_the_upload_range_are_rejected_by_name() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment")["id"]
        .as_u64()
        .unwrap() as u32;

    let uniforms = json!({ "u_big": { "size": 300 } });
    let attributes = json!({});
    let err = session
        .create_program_old(
            vs,
            fs,
            uniforms.as_object().unwrap(),
            attributes.as_object().unwrap(),
        )
        .expect_err("oversized component count");
    assert_eq!(err.to_string(), "bad size for u_big, must be in (1,2,3,4)");
    assert!(session.programs().is_empty());
}

#[test]
fn create_program_old_resolves_undeclared_names_to_negative_locations() {
    let mut session = session();
    let vs = session.compile_vertex_shader(VERTEX_SRC).expect("vertex")["id"]
        .as_u64()
        .unwrap() as u32;
    let fs = session
        .compile_fragment_shader(FRAGMENT_SRC)
        .expect("fragment")["id"]
        .as_u64()
        .unwrap() as u32;

    let uniforms = json!({ "u_ghost": { "size": 1 } });
    let attributes = json!({ "a_ghost": { "size": 2 } });
    session
        .create_program_old(
            vs,
            fs,
            uniforms.as_object().unwrap(),
            attributes.as_object().unwrap(),
        )
        .expect("create_program_old");

    let program = session.programs().get(0).expect("program 0");
    assert_eq!(program.uniforms["u_ghost"].loc, -1);
    assert_eq!(program.attributes["a_ghost"].loc, -1);
}
