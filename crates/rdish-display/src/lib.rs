//! `rdish-display` is the core of the remote virtual-GPU display driver.
//!
//! The transport hands every decoded call envelope to [`handle_envelope`],
//! which routes it to one of a fixed set of display operations against a
//! [`DisplaySession`]. The session owns the id-indexed resource tables
//! (shaders, programs, buffers, vertex array objects) that give the
//! stateless protocol a stable handle on the stateful GL pipeline.
//!
//! The native GPU itself is abstracted behind [`backend::GlApi`]; the crate
//! ships a deterministic software implementation ([`backend::SoftGl`]) used
//! by the test suite.

pub mod backend;

mod draw;
mod error;
mod program;
mod registry;
mod router;
mod session;
mod types;

#[cfg(test)]
mod tests;

pub use error::CallError;
pub use registry::ResourceTable;
pub use router::{handle_envelope, handle_message, DisplayFunc};
pub use session::{
    AttributeSlot, BufferObject, DisplaySession, ProgramObject, ShaderObject, UniformSlot,
    VertexArrayObject,
};
pub use types::{describe, BaseType, TypeDesc, UniformUpload};
