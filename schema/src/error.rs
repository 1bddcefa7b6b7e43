//! Schema validation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a schema.
///
/// These are construction-time failures: a schema that validates can always
/// be compiled into serializers and deserializers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A type name did not resolve to a known tag.
    UnknownType { name: String },

    /// Array nesting exceeds the supported depth.
    ArrayTooDeep { depth: usize, max: usize },

    /// A component or field has an empty name.
    EmptyName { component: Option<String> },

    /// Duplicate component name in a schema.
    DuplicateComponent { name: String },

    /// Duplicate field name within a record component.
    DuplicateField { component: String, field: String },

    /// A record component declares no fields.
    EmptyRecord { component: String },

    /// A record component declares more fields than the change mask can hold.
    TooManyFields {
        component: String,
        count: usize,
        max: usize,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "unknown type {name:?}"),
            Self::ArrayTooDeep { depth, max } => {
                write!(f, "array nesting depth {depth} exceeds maximum {max}")
            }
            Self::EmptyName {
                component: Some(component),
            } => write!(f, "empty field name in component {component:?}"),
            Self::EmptyName { component: None } => write!(f, "empty component name"),
            Self::DuplicateComponent { name } => write!(f, "duplicate component {name:?}"),
            Self::DuplicateField { component, field } => {
                write!(f, "duplicate field {field:?} in component {component:?}")
            }
            Self::EmptyRecord { component } => {
                write!(f, "record component {component:?} declares no fields")
            }
            Self::TooManyFields {
                component,
                count,
                max,
            } => {
                write!(
                    f,
                    "record component {component:?} declares {count} fields, maximum is {max}"
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}
