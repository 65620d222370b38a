use serde_json::{json, Map, Value};

use crate::backend::{BufferTarget, BufferUsage, DrawMode, GlCall};
use crate::error::CallError;
use crate::tests::{linked_session, session};
use crate::types;

fn object(value: Value) -> Map<String, Value> {
    value.as_object().expect("object").clone()
}

fn new_buffer(session: &mut crate::DisplaySession<crate::backend::SoftGl>) -> u32 {
    session.create_buffer().expect("create_buffer")["id"]
        .as_u64()
        .expect("id") as u32
}

#[test]
fn buffer_update_data_uploads_through_the_array_binding_and_records_length() {
    let (mut session, _) = linked_session();
    let buffer = new_buffer(&mut session);

    session.backend.clear_calls();
    session
        .buffer_update_data(buffer, &[0.0; 12])
        .expect("buffer_update_data");
    assert_eq!(session.buffers().get(buffer).expect("buffer").len, 12);
    assert!(matches!(
        session.backend().calls(),
        [
            GlCall::BindBuffer {
                target: BufferTarget::Array,
                ..
            },
            GlCall::BufferData {
                target: BufferTarget::Array,
                len: 12,
                usage: BufferUsage::Static,
            },
        ]
    ));
}

#[test]
fn buffer_data_addresses_a_binding_point_and_leaves_the_registry_alone() {
    let mut session = session();
    let buffer = new_buffer(&mut session);

    session
        .buffer_data("ARRAY_BUFFER", &[1.0, 2.0, 3.0])
        .expect("buffer_data");
    // Only `buffer_update_data` records an element count.
    assert_eq!(session.buffers().get(buffer).expect("buffer").len, 0);

    let err = session
        .buffer_data("BOGUS_BUFFER", &[])
        .expect_err("unknown target");
    assert_eq!(err.to_string(), "Unknown buffer type BOGUS_BUFFER");
}

#[test]
fn link_attributes_points_each_slot_at_its_buffer_with_packed_layout() {
    let (mut session, program) = linked_session();
    let positions = new_buffer(&mut session);
    let uvs = new_buffer(&mut session);
    session
        .buffer_update_data(positions, &[0.0; 12])
        .expect("positions");
    session.buffer_update_data(uvs, &[0.0; 8]).expect("uvs");

    session.backend.clear_calls();
    session
        .program_link_attributes(
            program,
            &object(json!({ "a_position": positions, "a_uv": uvs })),
        )
        .expect("program_link_attributes");

    let slots = &session.programs().get(program).expect("program").attributes;
    assert_eq!(slots["a_position"].buffer, Some(positions));
    assert_eq!(slots["a_uv"].buffer, Some(uvs));

    // Tightly packed float components, one pointer per binding.
    let pointers: Vec<_> = session
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            GlCall::VertexAttribPointer {
                loc,
                size,
                type_code,
                stride,
                offset,
            } => Some((*loc, *size, *type_code, *stride, *offset)),
            _ => None,
        })
        .collect();
    assert_eq!(pointers.len(), 2);
    assert!(pointers.contains(&(0, 3, types::FLOAT, 0, 0)));
    assert!(pointers.contains(&(1, 2, types::FLOAT, 0, 0)));
}

#[test]
fn link_attributes_rejects_names_outside_the_program() {
    let (mut session, program) = linked_session();
    let buffer = new_buffer(&mut session);

    let err = session
        .program_link_attributes(program, &object(json!({ "a_ghost": buffer })))
        .expect_err("unknown attribute");
    assert_eq!(err.to_string(), "unknown attribute a_ghost");
}

#[test]
fn update_uniforms_dispatches_on_the_stored_type_descriptor() {
    let (mut session, program) = linked_session();

    session.backend.clear_calls();
    session
        .program_update_uniforms(
            program,
            &object(json!({
                "u_color": [1.0, 0.5, 0.0, 1.0],
                "u_resolution": [600.0, 400.0],
                "u_transform": [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            })),
        )
        .expect("program_update_uniforms");

    let calls = session.backend().calls();
    assert!(calls.iter().any(|c| matches!(
        c,
        GlCall::UniformFv {
            components: 4,
            values,
            ..
        } if values == &[1.0, 0.5, 0.0, 1.0]
    )));
    assert!(calls.iter().any(|c| matches!(
        c,
        GlCall::UniformFv {
            components: 2,
            ..
        }
    )));
    assert!(calls.iter().any(|c| matches!(
        c,
        GlCall::UniformMatrixFv {
            cols: 3,
            rows: 3,
            ..
        }
    )));
}

#[test]
fn update_uniforms_stops_at_the_first_undrivable_slot() {
    let (mut session, program) = linked_session();

    // Entries apply in name order: "u_color" uploads before "u_flag" (a
    // bool, which has no upload path) fails the call.
    session.backend.clear_calls();
    let err = session
        .program_update_uniforms(
            program,
            &object(json!({ "u_color": [0.0, 0.0, 0.0, 1.0], "u_flag": [1] })),
        )
        .expect_err("bool uniform");
    assert_eq!(err.to_string(), "bad uniform size, must be in (1,2,3,4)");

    let uploads = session
        .backend()
        .calls()
        .iter()
        .filter(|c| matches!(c, GlCall::UniformFv { .. }))
        .count();
    assert_eq!(uploads, 1);
}

#[test]
fn update_uniforms_rejects_unknown_names_and_non_numeric_values() {
    let (mut session, program) = linked_session();

    let err = session
        .program_update_uniforms(program, &object(json!({ "u_nope": [1.0] })))
        .expect_err("unknown uniform");
    assert_eq!(err.to_string(), "unknown uniform u_nope");

    let err = session
        .program_update_uniforms(program, &object(json!({ "u_color": "red" })))
        .expect_err("bad value");
    assert!(matches!(err, CallError::BadUniformValue(name) if name == "u_color"));
}

#[test]
fn explicit_draw_rebinds_program_and_layout_before_drawing() {
    let (mut session, program) = linked_session();
    let vao = session.create_vertex_array().expect("create_vertex_array")["id"]
        .as_u64()
        .expect("id") as u32;

    session.backend.clear_calls();
    session
        .draw_arrays(program, vao, "lines", 1, 5)
        .expect("draw_arrays");
    assert!(matches!(
        session.backend().calls(),
        [
            GlCall::UseProgram(_),
            GlCall::BindVertexArray(_),
            GlCall::DrawArrays {
                mode: DrawMode::Lines,
                first: 1,
                count: 5,
            },
        ]
    ));
}

#[test]
fn implicit_draw_count_is_the_shortest_fully_populated_stream() {
    let (mut session, program) = linked_session();
    let positions = new_buffer(&mut session);
    let uvs = new_buffer(&mut session);
    // 12 floats / 3 components = 4 vertices; 7 floats / 2 = 3 (floored).
    session
        .buffer_update_data(positions, &[0.0; 12])
        .expect("positions");
    session.buffer_update_data(uvs, &[0.0; 7]).expect("uvs");
    session
        .program_link_attributes(
            program,
            &object(json!({ "a_position": positions, "a_uv": uvs })),
        )
        .expect("program_link_attributes");

    session.backend.clear_calls();
    session
        .execute_program(program, "triangles")
        .expect("execute_program");
    // Introspected programs own no layout object, so nothing is re-bound.
    assert!(matches!(
        session.backend().calls(),
        [
            GlCall::UseProgram(_),
            GlCall::DrawArrays {
                mode: DrawMode::Triangles,
                first: 0,
                count: 3,
            },
        ]
    ));
}

#[test]
fn implicit_draw_requires_every_attribute_to_have_a_buffer() {
    let (mut session, program) = linked_session();
    let err = session
        .execute_program(program, "points")
        .expect_err("unbound attributes");
    assert!(matches!(err, CallError::UnboundAttribute(_)));
}

#[test]
fn draw_mode_is_validated_before_anything_is_touched() {
    let (mut session, program) = linked_session();

    session.backend.clear_calls();
    let err = session
        .execute_program(program, "QUADS")
        .expect_err("unknown mode");
    assert_eq!(
        err.to_string(),
        "unknown draw type, must be in (POINTS, LINES, TRIANGLES)"
    );
    assert!(session.backend().calls().is_empty());

    let err = session
        .draw_arrays(program, 0, "quads", 0, 3)
        .expect_err("unknown mode");
    assert!(matches!(err, CallError::UnknownDrawMode));
    assert!(session.backend().calls().is_empty());
}

#[test]
fn draws_against_never_issued_ids_fail_structurally() {
    let mut session = session();
    let err = session
        .execute_program(7, "points")
        .expect_err("unknown program");
    assert_eq!(err.to_string(), "unknown program id 7");

    let err = session.bind_vertex_array(2).expect_err("unknown vao");
    assert_eq!(err.to_string(), "unknown vertex array id 2");

    let err = session
        .bind_buffer("ARRAY_BUFFER", 9)
        .expect_err("unknown buffer");
    assert_eq!(err.to_string(), "unknown buffer id 9");
}
