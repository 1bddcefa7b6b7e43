//! Type tags for columns and fields.

use std::fmt;
use std::str::FromStr;

use crate::error::{SchemaError, SchemaResult};

/// Maximum nesting of `array<...>` wrappers in a single type.
pub const MAX_ARRAY_DEPTH: usize = 8;

/// The closed set of scalar tags a column can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
    /// UTF-8 string with a 4-byte length prefix.
    Str,
    /// Entity reference. Same width as `U32`, remapped on decode.
    Ref,
}

impl ScalarType {
    /// Every scalar tag, in wire-tag order.
    pub const ALL: [Self; 10] = [
        Self::U8,
        Self::I8,
        Self::U16,
        Self::I16,
        Self::U32,
        Self::I32,
        Self::F32,
        Self::F64,
        Self::Str,
        Self::Ref,
    ];

    /// Returns the fixed encoded width in bytes, or `None` for strings.
    #[must_use]
    pub const fn width(self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 | Self::Ref => Some(4),
            Self::F64 => Some(8),
            Self::Str => None,
        }
    }

    /// Returns `true` for floating-point tags, the only ones that honor epsilon.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns `true` for entity references.
    #[must_use]
    pub const fn is_ref(self) -> bool {
        matches!(self, Self::Ref)
    }

    /// Returns the textual name of the tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
            Self::Ref => "ref",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column or field type: a scalar tag, or an array of another type.
///
/// Arrays nest, so `array<array<f32>>` is a per-entity list of lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum TypeDesc {
    Scalar(ScalarType),
    ArrayOf(Box<TypeDesc>),
}

impl TypeDesc {
    #[must_use]
    pub const fn u8() -> Self {
        Self::Scalar(ScalarType::U8)
    }

    #[must_use]
    pub const fn i8() -> Self {
        Self::Scalar(ScalarType::I8)
    }

    #[must_use]
    pub const fn u16() -> Self {
        Self::Scalar(ScalarType::U16)
    }

    #[must_use]
    pub const fn i16() -> Self {
        Self::Scalar(ScalarType::I16)
    }

    #[must_use]
    pub const fn u32() -> Self {
        Self::Scalar(ScalarType::U32)
    }

    #[must_use]
    pub const fn i32() -> Self {
        Self::Scalar(ScalarType::I32)
    }

    #[must_use]
    pub const fn f32() -> Self {
        Self::Scalar(ScalarType::F32)
    }

    #[must_use]
    pub const fn f64() -> Self {
        Self::Scalar(ScalarType::F64)
    }

    #[must_use]
    pub const fn str() -> Self {
        Self::Scalar(ScalarType::Str)
    }

    /// Entity reference type.
    #[must_use]
    pub const fn reference() -> Self {
        Self::Scalar(ScalarType::Ref)
    }

    /// Wraps `element` in an array type.
    #[must_use]
    pub fn array(element: impl Into<Self>) -> Self {
        Self::ArrayOf(Box::new(element.into()))
    }

    /// Resolves to the canonical scalar tag, recursing through array wrappers.
    #[must_use]
    pub fn resolve(&self) -> ScalarType {
        match self {
            Self::Scalar(tag) => *tag,
            Self::ArrayOf(element) => element.resolve(),
        }
    }

    /// Returns the element type if this is an array type.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::Scalar(_) => None,
            Self::ArrayOf(element) => Some(element),
        }
    }

    /// Returns `true` for array types.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::ArrayOf(_))
    }

    /// Returns the number of array wrappers around the scalar tag.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Scalar(_) => 0,
            Self::ArrayOf(element) => 1 + element.depth(),
        }
    }

    /// Checks that the array nesting is within [`MAX_ARRAY_DEPTH`].
    pub fn validate(&self) -> SchemaResult<()> {
        let depth = self.depth();
        if depth > MAX_ARRAY_DEPTH {
            return Err(SchemaError::ArrayTooDeep {
                depth,
                max: MAX_ARRAY_DEPTH,
            });
        }
        Ok(())
    }
}

impl From<ScalarType> for TypeDesc {
    fn from(tag: ScalarType) -> Self {
        Self::Scalar(tag)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(tag) => write!(f, "{tag}"),
            Self::ArrayOf(element) => write!(f, "array<{element}>"),
        }
    }
}

impl FromStr for TypeDesc {
    type Err = SchemaError;

    /// Parses `u8`, `f32`, `str`, `ref`, ... and `array<T>`.
    ///
    /// Unrecognized names are rejected rather than defaulted.
    fn from_str(s: &str) -> SchemaResult<Self> {
        let mut depth = 0usize;
        let mut inner = s.trim();
        while let Some(rest) = inner
            .strip_prefix("array<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            depth += 1;
            if depth > MAX_ARRAY_DEPTH {
                return Err(SchemaError::ArrayTooDeep {
                    depth,
                    max: MAX_ARRAY_DEPTH,
                });
            }
            inner = rest.trim();
        }

        let tag = ScalarType::from_name(inner).ok_or_else(|| SchemaError::UnknownType {
            name: s.to_string(),
        })?;
        let mut ty = Self::Scalar(tag);
        for _ in 0..depth {
            ty = Self::array(ty);
        }
        Ok(ty)
    }
}

impl TryFrom<String> for TypeDesc {
    type Error = SchemaError;

    fn try_from(value: String) -> SchemaResult<Self> {
        value.parse()
    }
}

impl From<TypeDesc> for String {
    fn from(ty: TypeDesc) -> Self {
        ty.to_string()
    }
}
