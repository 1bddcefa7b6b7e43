//! Component schema and type tags for the soa columnar codec.
//!
//! This crate defines how columnar component state is described:
//! - The closed set of scalar type tags plus the recursive `array<T>` wrapper
//! - Column components (one typed column) and record components (ordered,
//!   named columns)
//! - Construction-time validation
//! - Deterministic schema fingerprints
//!
//! # Design Principles
//!
//! - **Explicit schemas** - Field order is declared, never discovered by reflection.
//! - **Fail fast** - Unknown types and oversized records are rejected when the
//!   schema is built, never when a packet is encoded.
//! - **Deterministic hashing** - Schema hash is stable given the same definition.

mod error;
mod hash;
mod schema;
mod types;

pub use error::{SchemaError, SchemaResult};
pub use hash::schema_hash;
pub use schema::{ComponentDef, ComponentKind, FieldDef, Schema, SchemaBuilder, MAX_RECORD_FIELDS};
pub use types::{ScalarType, TypeDesc, MAX_ARRAY_DEPTH};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = TypeDesc::array(ScalarType::F32);
        let _ = ComponentDef::column("Health", TypeDesc::u8());
        let _ = Schema::builder();
        let _: SchemaResult<()> = Ok(());
        assert_eq!(MAX_RECORD_FIELDS, 32);
    }

    #[test]
    fn empty_schema_is_valid() {
        let schema = Schema::new(Vec::new()).unwrap();
        assert!(schema.components.is_empty());
        let _ = schema_hash(&schema);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn schema_json_roundtrip() {
        let schema = Schema::builder()
            .component(
                ComponentDef::record("Inventory")
                    .field("owner", TypeDesc::reference())
                    .field("items", TypeDesc::array(TypeDesc::str())),
            )
            .component(ComponentDef::column("Health", TypeDesc::u8()))
            .build()
            .unwrap();

        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("\"array<str>\""), "{json}");
        let parsed: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schema);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn schema_json_rejects_unknown_type() {
        let json = r#"{"components":[{"name":"Health","column":"float"}]}"#;
        assert!(serde_json::from_str::<Schema>(json).is_err());
    }
}
