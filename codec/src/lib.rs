//! Columnar entity/component replication codec.
//!
//! This is the main codec crate that ties together bytestream, wire, and
//! schema. Component state lives in typed columns indexed by entity; the
//! codec turns a list of entity indices into a compact packet and applies
//! such packets to another set of columns.
//!
//! # Features
//!
//! - Full packets: every component of every listed entity
//! - Diff packets: only changed components, with per-field change masks
//! - Float tolerance (epsilon) for change detection
//! - Nested per-entity arrays and UTF-8 strings
//! - Paged columns: any `u32` entity index, memory only for written pages
//! - Entity index and `ref` remapping on decode
//! - Storage-free packet inspection
//!
//! # Design Principles
//!
//! - **Schema first** - Field order and types are frozen when codecs are built.
//! - **No steady-state allocations on encode** - The output buffer is
//!   allocated once and reused.
//! - **Bounded decoding** - Every length is checked before allocation.
//!
//! # Example
//!
//! ```
//! use codec::{ColumnarDeserializer, ColumnarSerializer, DeserializerOptions, SerializerOptions, Storage, Value};
//! use schema::{ComponentDef, Schema, TypeDesc};
//!
//! let schema = Schema::builder()
//!     .component(ComponentDef::record("Position").field("x", TypeDesc::f32()).field("y", TypeDesc::f32()))
//!     .component(ComponentDef::column("Health", TypeDesc::u8()))
//!     .build()
//!     .unwrap();
//!
//! let mut local = Storage::new(&schema);
//! local.set("Position.x", 0, 10.0f32).unwrap();
//! local.set("Health", 0, 90u8).unwrap();
//!
//! let mut serializer = ColumnarSerializer::new(&schema, SerializerOptions::for_testing()).unwrap();
//! let packet = serializer.serialize(&local, &[0]).unwrap();
//!
//! let mut remote = Storage::new(&schema);
//! let deserializer = ColumnarDeserializer::new(&schema, DeserializerOptions::for_testing()).unwrap();
//! deserializer.deserialize(&mut remote, packet, None).unwrap();
//! assert_eq!(remote.get("Health", 0).unwrap(), Some(Value::U8(90)));
//! ```

mod array;
mod column;
mod component;
mod error;
mod inspect;
mod limits;
mod options;
mod paged;
mod pipeline;
mod remap;
mod scalar;
mod scratch;
mod shadow;
mod value;

pub use array::{read_array, write_array};
pub use column::{Column, ColumnData, Storage};
pub use component::{ComponentCodec, DiffState};
pub use error::{CodecError, CodecResult, LimitKind, ShapeMismatch};
pub use inspect::{inspect_packet, RecordView};
pub use limits::DecodeLimits;
pub use options::{DeserializerOptions, SerializerOptions, DEFAULT_EPSILON, DEFAULT_SCRATCH_CAPACITY};
pub use paged::{PagedVec, PAGE_BITS, PAGE_LEN};
pub use pipeline::{ColumnarDeserializer, ColumnarSerializer, DecodeStats};
pub use remap::IdentityMap;
pub use scalar::{read_scalar, read_str, write_scalar, write_str};
pub use scratch::ScratchBuffer;
pub use shadow::{has_changed, ShadowSet};
pub use value::Value;
pub use wire::Mode;

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{ComponentDef, Schema, TypeDesc};

    #[test]
    fn public_api_exports() {
        let _ = DecodeLimits::default();
        let _ = SerializerOptions::default();
        let _ = DeserializerOptions::default();
        let _ = IdentityMap::new();
        let _ = Mode::Full;
        let _: CodecResult<()> = Ok(());
        assert!((DEFAULT_EPSILON - 1e-4).abs() < f64::EPSILON);
    }

    #[test]
    fn deserializer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ColumnarDeserializer>();
        assert_send_sync::<ColumnarSerializer>();
    }

    #[test]
    fn fingerprints_match_across_ends() {
        let schema = Schema::builder()
            .component(ComponentDef::column("Health", TypeDesc::u8()))
            .build()
            .unwrap();
        let ser = ColumnarSerializer::new(&schema, SerializerOptions::for_testing()).unwrap();
        let de = ColumnarDeserializer::new(&schema, DeserializerOptions::for_testing()).unwrap();
        assert_eq!(ser.schema_fingerprint(), de.schema_fingerprint());
        assert_eq!(ser.schema_fingerprint(), schema::schema_hash(&schema));
    }
}
