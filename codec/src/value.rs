//! Dynamically typed cell values.

use schema::{ScalarType, TypeDesc};

/// A single cell value.
///
/// Scalar columns are stored as typed vectors; `Value` is how individual
/// cells cross the API boundary and how array elements are held.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
    F64(f64),
    Str(String),
    /// Entity reference.
    Ref(u32),
    Array(Vec<Value>),
}

impl Value {
    /// Returns the neutral value of a scalar tag.
    #[must_use]
    pub const fn neutral(tag: ScalarType) -> Self {
        match tag {
            ScalarType::U8 => Self::U8(0),
            ScalarType::I8 => Self::I8(0),
            ScalarType::U16 => Self::U16(0),
            ScalarType::I16 => Self::I16(0),
            ScalarType::U32 => Self::U32(0),
            ScalarType::I32 => Self::I32(0),
            ScalarType::F32 => Self::F32(0.0),
            ScalarType::F64 => Self::F64(0.0),
            ScalarType::Str => Self::Str(String::new()),
            ScalarType::Ref => Self::Ref(0),
        }
    }

    /// Returns the scalar tag of this value, or `None` for arrays.
    #[must_use]
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        Some(match self {
            Self::U8(_) => ScalarType::U8,
            Self::I8(_) => ScalarType::I8,
            Self::U16(_) => ScalarType::U16,
            Self::I16(_) => ScalarType::I16,
            Self::U32(_) => ScalarType::U32,
            Self::I32(_) => ScalarType::I32,
            Self::F32(_) => ScalarType::F32,
            Self::F64(_) => ScalarType::F64,
            Self::Str(_) => ScalarType::Str,
            Self::Ref(_) => ScalarType::Ref,
            Self::Array(_) => return None,
        })
    }

    /// Short name of the variant, used in type mismatch errors.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.scalar_type() {
            Some(tag) => tag.name(),
            None => "array",
        }
    }

    /// Returns `true` if this value can be stored in a cell of type `ty`.
    ///
    /// Array values are checked element by element.
    #[must_use]
    pub fn matches(&self, ty: &TypeDesc) -> bool {
        match (self, ty) {
            (Self::Array(elements), TypeDesc::ArrayOf(element)) => {
                elements.iter().all(|value| value.matches(element))
            }
            (Self::Array(_), TypeDesc::Scalar(_)) | (_, TypeDesc::ArrayOf(_)) => false,
            (value, TypeDesc::Scalar(tag)) => value.scalar_type() == Some(*tag),
        }
    }

    /// Returns the value as `f64` for numeric variants.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::U8(v) => Some(f64::from(v)),
            Self::I8(v) => Some(f64::from(v)),
            Self::U16(v) => Some(f64::from(v)),
            Self::I16(v) => Some(f64::from(v)),
            Self::U32(v) | Self::Ref(v) => Some(f64::from(v)),
            Self::I32(v) => Some(f64::from(v)),
            Self::F32(v) => Some(f64::from(v)),
            Self::F64(v) => Some(v),
            Self::Str(_) | Self::Array(_) => None,
        }
    }

    /// Returns the string contents of a `Str` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the elements of an `Array` value.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Str(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Str(text)
    }
}

impl From<Vec<Self>> for Value {
    fn from(elements: Vec<Self>) -> Self {
        Self::Array(elements)
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
}
