//! Type-introspection layer: maps raw GL type codes from program reflection
//! into semantic descriptors, and descriptors into uniform upload selectors.

use serde::ser::{Serialize, SerializeStruct, Serializer};

// OpenGL ES 3.0 type enums, as reported by active-uniform/attribute
// reflection.
pub const FLOAT: u32 = 0x1406;
pub const FLOAT_VEC2: u32 = 0x8B50;
pub const FLOAT_VEC3: u32 = 0x8B51;
pub const FLOAT_VEC4: u32 = 0x8B52;
pub const INT: u32 = 0x1404;
pub const INT_VEC2: u32 = 0x8B53;
pub const INT_VEC3: u32 = 0x8B54;
pub const INT_VEC4: u32 = 0x8B55;
pub const UNSIGNED_INT: u32 = 0x1405;
pub const UNSIGNED_INT_VEC2: u32 = 0x8DC6;
pub const UNSIGNED_INT_VEC3: u32 = 0x8DC7;
pub const UNSIGNED_INT_VEC4: u32 = 0x8DC8;
pub const BOOL: u32 = 0x8B56;
pub const BOOL_VEC2: u32 = 0x8B57;
pub const BOOL_VEC3: u32 = 0x8B58;
pub const BOOL_VEC4: u32 = 0x8B59;
pub const FLOAT_MAT2: u32 = 0x8B5A;
pub const FLOAT_MAT3: u32 = 0x8B5B;
pub const FLOAT_MAT4: u32 = 0x8B5C;
pub const FLOAT_MAT2X3: u32 = 0x8B65;
pub const FLOAT_MAT2X4: u32 = 0x8B66;
pub const FLOAT_MAT3X2: u32 = 0x8B67;
pub const FLOAT_MAT3X4: u32 = 0x8B68;
pub const FLOAT_MAT4X2: u32 = 0x8B69;
pub const FLOAT_MAT4X3: u32 = 0x8B6A;
pub const SAMPLER_2D: u32 = 0x8B5E;
pub const SAMPLER_3D: u32 = 0x8B5F;
pub const SAMPLER_CUBE: u32 = 0x8B60;
pub const SAMPLER_2D_SHADOW: u32 = 0x8B62;
pub const SAMPLER_2D_ARRAY: u32 = 0x8DC1;
pub const SAMPLER_2D_ARRAY_SHADOW: u32 = 0x8DC4;
pub const UNSIGNED_INT_SAMPLER_2D: u32 = 0x8DD2;
pub const UNSIGNED_INT_SAMPLER_3D: u32 = 0x8DD3;
pub const UNSIGNED_INT_SAMPLER_CUBE: u32 = 0x8DD4;
pub const UNSIGNED_INT_SAMPLER_2D_ARRAY: u32 = 0x8DD7;

/// Every type code [`describe`] resolves to a non-sentinel descriptor for.
pub const SUPPORTED_CODES: &[u32] = &[
    FLOAT,
    FLOAT_VEC2,
    FLOAT_VEC3,
    FLOAT_VEC4,
    INT,
    INT_VEC2,
    INT_VEC3,
    INT_VEC4,
    UNSIGNED_INT,
    UNSIGNED_INT_VEC2,
    UNSIGNED_INT_VEC3,
    UNSIGNED_INT_VEC4,
    BOOL,
    BOOL_VEC2,
    BOOL_VEC3,
    BOOL_VEC4,
    FLOAT_MAT2,
    FLOAT_MAT3,
    FLOAT_MAT4,
    FLOAT_MAT2X3,
    FLOAT_MAT2X4,
    FLOAT_MAT3X2,
    FLOAT_MAT3X4,
    FLOAT_MAT4X2,
    FLOAT_MAT4X3,
    SAMPLER_2D,
    SAMPLER_3D,
    SAMPLER_CUBE,
    SAMPLER_2D_SHADOW,
    SAMPLER_2D_ARRAY,
    SAMPLER_2D_ARRAY_SHADOW,
    UNSIGNED_INT_SAMPLER_2D,
    UNSIGNED_INT_SAMPLER_3D,
    UNSIGNED_INT_SAMPLER_CUBE,
    UNSIGNED_INT_SAMPLER_2D_ARRAY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Float,
    Int,
    UnsignedInt,
    Bool,
    Sampler,
    Undefined,
}

impl BaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::UnsignedInt => "uint",
            Self::Bool => "bool",
            Self::Sampler => "sampler",
            Self::Undefined => "undefined",
        }
    }
}

/// Semantic decoding of one GL type code: base scalar kind, component
/// layout (cols, rows), and bytes per component. `(1, 1)` for scalars,
/// `(n, 1)` for vectors, `(c, r)` for matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDesc {
    pub name: &'static str,
    pub code: u32,
    pub base: BaseType,
    pub base_size: u8,
    pub cols: u8,
    pub rows: u8,
}

/// Sentinel for codes outside [`SUPPORTED_CODES`]: non-fatal, but selects no
/// upload function.
pub const UNDEFINED: TypeDesc = TypeDesc {
    name: "undefined",
    code: 0,
    base: BaseType::Undefined,
    base_size: 0,
    cols: 1,
    rows: 1,
};

const fn desc(
    name: &'static str,
    code: u32,
    base: BaseType,
    base_size: u8,
    cols: u8,
    rows: u8,
) -> TypeDesc {
    TypeDesc {
        name,
        code,
        base,
        base_size,
        cols,
        rows,
    }
}

/// Pure total mapping from a GL type code to its descriptor. Unknown codes
/// resolve to [`UNDEFINED`] rather than failing; callers decide whether the
/// sentinel is usable in context.
pub fn describe(code: u32) -> TypeDesc {
    use BaseType::*;
    match code {
        FLOAT => desc("FLOAT", code, Float, 4, 1, 1),
        FLOAT_VEC2 => desc("FLOAT_VEC2", code, Float, 4, 2, 1),
        FLOAT_VEC3 => desc("FLOAT_VEC3", code, Float, 4, 3, 1),
        FLOAT_VEC4 => desc("FLOAT_VEC4", code, Float, 4, 4, 1),
        INT => desc("INT", code, Int, 4, 1, 1),
        INT_VEC2 => desc("INT_VEC2", code, Int, 4, 2, 1),
        INT_VEC3 => desc("INT_VEC3", code, Int, 4, 3, 1),
        INT_VEC4 => desc("INT_VEC4", code, Int, 4, 4, 1),
        UNSIGNED_INT => desc("UNSIGNED_INT", code, UnsignedInt, 4, 1, 1),
        UNSIGNED_INT_VEC2 => desc("UNSIGNED_INT_VEC2", code, UnsignedInt, 4, 2, 1),
        UNSIGNED_INT_VEC3 => desc("UNSIGNED_INT_VEC3", code, UnsignedInt, 4, 3, 1),
        UNSIGNED_INT_VEC4 => desc("UNSIGNED_INT_VEC4", code, UnsignedInt, 4, 4, 1),
        BOOL => desc("BOOL", code, Bool, 0, 1, 1),
        BOOL_VEC2 => desc("BOOL_VEC2", code, Bool, 0, 2, 1),
        BOOL_VEC3 => desc("BOOL_VEC3", code, Bool, 0, 3, 1),
        BOOL_VEC4 => desc("BOOL_VEC4", code, Bool, 0, 4, 1),
        FLOAT_MAT2 => desc("FLOAT_MAT2", code, Float, 4, 2, 2),
        FLOAT_MAT3 => desc("FLOAT_MAT3", code, Float, 4, 3, 3),
        FLOAT_MAT4 => desc("FLOAT_MAT4", code, Float, 4, 4, 4),
        FLOAT_MAT2X3 => desc("FLOAT_MAT2x3", code, Float, 4, 2, 3),
        FLOAT_MAT2X4 => desc("FLOAT_MAT2x4", code, Float, 4, 2, 4),
        FLOAT_MAT3X2 => desc("FLOAT_MAT3x2", code, Float, 4, 3, 2),
        FLOAT_MAT3X4 => desc("FLOAT_MAT3x4", code, Float, 4, 3, 4),
        FLOAT_MAT4X2 => desc("FLOAT_MAT4x2", code, Float, 4, 4, 2),
        FLOAT_MAT4X3 => desc("FLOAT_MAT4x3", code, Float, 4, 4, 3),
        SAMPLER_2D => desc("SAMPLER_2D", code, Sampler, 0, 1, 1),
        SAMPLER_3D => desc("SAMPLER_3D", code, Sampler, 0, 1, 1),
        SAMPLER_CUBE => desc("SAMPLER_CUBE", code, Sampler, 0, 1, 1),
        SAMPLER_2D_SHADOW => desc("SAMPLER_2D_SHADOW", code, Sampler, 0, 1, 1),
        SAMPLER_2D_ARRAY => desc("SAMPLER_2D_ARRAY", code, Sampler, 0, 1, 1),
        SAMPLER_2D_ARRAY_SHADOW => desc("SAMPLER_2D_ARRAY_SHADOW", code, Sampler, 0, 1, 1),
        UNSIGNED_INT_SAMPLER_2D => desc("UNSIGNED_INT_SAMPLER_2D", code, Sampler, 0, 1, 1),
        UNSIGNED_INT_SAMPLER_3D => desc("UNSIGNED_INT_SAMPLER_3D", code, Sampler, 0, 1, 1),
        UNSIGNED_INT_SAMPLER_CUBE => desc("UNSIGNED_INT_SAMPLER_CUBE", code, Sampler, 0, 1, 1),
        UNSIGNED_INT_SAMPLER_2D_ARRAY => {
            desc("UNSIGNED_INT_SAMPLER_2D_ARRAY", code, Sampler, 0, 1, 1)
        }
        _ => UNDEFINED,
    }
}

/// The upload function family a uniform value is driven through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformUpload {
    /// `glUniform{n}fv`, n in 1..=4.
    FloatVec(u8),
    /// `glUniform{n}iv`, n in 1..=4. Unsigned ints share this family.
    IntVec(u8),
    /// `glUniformMatrix{c}x{r}fv`, c and r in 2..=4.
    Matrix(u8, u8),
}

impl TypeDesc {
    /// Selects the upload family purely from base kind + component layout.
    /// Returns `None` for layouts with no upload path (bool, samplers, the
    /// undefined sentinel); a uniform update hitting `None` is a hard error
    /// for that call.
    pub fn upload(&self) -> Option<UniformUpload> {
        match (self.base, self.cols, self.rows) {
            (BaseType::Float, n @ 1..=4, 1) => Some(UniformUpload::FloatVec(n)),
            (BaseType::Int | BaseType::UnsignedInt, n @ 1..=4, 1) => {
                Some(UniformUpload::IntVec(n))
            }
            (BaseType::Float, c @ 2..=4, r @ 2..=4) => Some(UniformUpload::Matrix(c, r)),
            _ => None,
        }
    }

    /// The float vector descriptor of arity `n` (clamped to 1..=4), used for
    /// legacy-generation programs whose caller supplies component counts
    /// instead of reflected type codes.
    pub fn float_vec(n: u8) -> TypeDesc {
        match n {
            2 => describe(FLOAT_VEC2),
            3 => describe(FLOAT_VEC3),
            4 => describe(FLOAT_VEC4),
            _ => describe(FLOAT),
        }
    }
}

// Serialized to the wire shape the remote caller expects:
// `{name, type, base_type, base_size, base_layout: [cols, rows]}`.
impl Serialize for TypeDesc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TypeDesc", 5)?;
        s.serialize_field("name", self.name)?;
        s.serialize_field("type", &self.code)?;
        s.serialize_field("base_type", self.base.as_str())?;
        s.serialize_field("base_size", &self.base_size)?;
        s.serialize_field("base_layout", &[self.cols, self.rows])?;
        s.end()
    }
}
