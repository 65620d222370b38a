//! Per-call failures. Every variant maps to a status-1 reply whose
//! `status_msg` is the `Display` rendering below; routing failures (status
//! 99) never reach this type.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("missing argument {index} to {func}")]
    MissingArg { func: &'static str, index: usize },

    #[error("argument {index} to {func} must be a {expected}")]
    BadArg {
        func: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("missing keyword argument {name} to {func}")]
    MissingKwarg {
        func: &'static str,
        name: &'static str,
    },

    #[error("keyword argument {name} to {func} must be a {expected}")]
    BadKwarg {
        func: &'static str,
        name: &'static str,
        expected: &'static str,
    },

    /// A reference to an id this session never issued (or issued in a
    /// different table's namespace).
    #[error("unknown {table} id {id}")]
    UnknownId { table: &'static str, id: u32 },

    /// Native compiler diagnostic, surfaced verbatim.
    #[error("{0}")]
    Compile(String),

    /// Native linker diagnostic, surfaced verbatim.
    #[error("{0}")]
    Link(String),

    #[error("{0}")]
    Context(String),

    #[error("display context is not initialized")]
    NoContext,

    #[error("Unknown buffer type {0}")]
    UnknownBufferTarget(String),

    #[error("unknown draw type, must be in (POINTS, LINES, TRIANGLES)")]
    UnknownDrawMode,

    #[error("bad uniform size, must be in (1,2,3,4)")]
    BadUniformSize,

    /// A legacy `{name: {"size": n}}` metadata entry with a `size` that is
    /// not an integer in 1..=4.
    #[error("bad size for {0}, must be in (1,2,3,4)")]
    BadLegacySize(String),

    #[error("unknown uniform {0}")]
    UnknownUniform(String),

    #[error("uniform {0} value must be an array of numbers")]
    BadUniformValue(String),

    #[error("unknown attribute {0}")]
    UnknownAttribute(String),

    #[error("attribute {0} has no bound buffer")]
    UnboundAttribute(String),

    #[error("program {0} has no attributes to derive a vertex count from")]
    NoAttributes(u32),
}
