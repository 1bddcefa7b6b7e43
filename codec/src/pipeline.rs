//! Columnar serializer and deserializer over a whole schema.
//!
//! A packet is the concatenation of component records. In full mode every
//! listed entity contributes one record per component, in declared order. In
//! diff mode only changed components contribute, each tagged with its
//! component id (its position in the schema).

use bytestream::{ByteReader, ByteWriter};
use schema::{schema_hash, Schema};
use tracing::{debug, trace, warn};
use wire::{peek_component_id, Mode};

use crate::column::Storage;
use crate::component::{ComponentCodec, DiffState};
use crate::error::{CodecError, CodecResult, LimitKind, ShapeMismatch};
use crate::limits::DecodeLimits;
use crate::options::{DeserializerOptions, SerializerOptions};
use crate::remap::IdentityMap;
use crate::scratch::ScratchBuffer;
use crate::shadow::ShadowSet;

/// Work done by one [`ColumnarDeserializer::deserialize`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeStats {
    /// Component records applied.
    pub records: usize,
    /// Bytes consumed.
    pub bytes: usize,
}

pub(crate) fn build_codecs(schema: &Schema) -> CodecResult<Vec<ComponentCodec>> {
    schema.validate()?;
    schema.components.iter().map(ComponentCodec::new).collect()
}

fn check_storage(codecs: &[ComponentCodec], storage: &Storage) -> CodecResult<()> {
    if storage.component_count() != codecs.len() {
        return Err(CodecError::StorageMismatch(ShapeMismatch::ComponentCount {
            expected: codecs.len(),
            actual: storage.component_count(),
        }));
    }
    for (position, codec) in codecs.iter().enumerate() {
        codec.check_columns(storage.columns(position).unwrap_or_default())?;
    }
    Ok(())
}

/// Encodes entity state from a [`Storage`] into packets.
///
/// The output buffer is allocated once and reused; each packet borrows it
/// until the next call. In diff mode the serializer owns one shadow per
/// declared column, so a given instance should serve a single peer.
#[derive(Debug)]
pub struct ColumnarSerializer {
    codecs: Vec<ComponentCodec>,
    epsilon: f64,
    shadows: Option<ShadowSet>,
    scratch: ScratchBuffer,
    fingerprint: u64,
}

impl ColumnarSerializer {
    /// Builds one component codec per schema component, plus shadows in diff mode.
    pub fn new(schema: &Schema, options: SerializerOptions) -> CodecResult<Self> {
        options.validate()?;
        let codecs = build_codecs(schema)?;
        let shadows = options.diff.then(|| ShadowSet::new(schema));
        debug!(
            components = codecs.len(),
            diff = options.diff,
            scratch_bytes = options.scratch_capacity_bytes,
            "built columnar serializer"
        );
        Ok(Self {
            codecs,
            epsilon: options.epsilon,
            shadows,
            scratch: ScratchBuffer::with_capacity(options.scratch_capacity_bytes),
            fingerprint: schema_hash(schema),
        })
    }

    /// Returns `true` when built for diff mode.
    #[must_use]
    pub const fn is_diff(&self) -> bool {
        self.shadows.is_some()
    }

    /// Record framing produced by this serializer.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        Mode::from_diff(self.is_diff())
    }

    /// Fingerprint of the schema this serializer was built from.
    #[must_use]
    pub const fn schema_fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Component codecs in declared order.
    #[must_use]
    pub fn components(&self) -> &[ComponentCodec] {
        &self.codecs
    }

    /// Size of the reusable output buffer.
    #[must_use]
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Forgets every observed value so the next diff re-sends all
    /// non-neutral cells. No effect in full mode.
    pub fn reset_shadows(&mut self) {
        if let Some(shadows) = &mut self.shadows {
            shadows.reset();
            debug!("reset serializer shadows");
        }
    }

    /// Encodes `indices` in caller order and returns the packet bytes.
    ///
    /// An empty slice is a valid result (nothing listed, or nothing changed
    /// in diff mode). A packet larger than the scratch buffer fails with
    /// [`CodecError::OutOfRange`]; shadows already advanced for earlier
    /// records stay advanced.
    pub fn serialize(&mut self, storage: &Storage, indices: &[u32]) -> CodecResult<&[u8]> {
        check_storage(&self.codecs, storage)?;
        let Self {
            codecs,
            epsilon,
            shadows,
            scratch,
            ..
        } = self;

        let mut writer = ByteWriter::new(scratch.as_mut_slice());
        let mut records = 0usize;
        for &index in indices {
            for (position, codec) in codecs.iter().enumerate() {
                let columns = storage.columns(position).unwrap_or_default();
                let diff = shadows.as_mut().map(|set| DiffState {
                    shadows: set.component_mut(position).unwrap_or_default(),
                    epsilon: *epsilon,
                });
                if codec.encode(columns, diff, &mut writer, index, position as u32)? > 0 {
                    records += 1;
                }
            }
        }
        let len = writer.finish();
        trace!(entities = indices.len(), records, bytes = len, "serialized packet");
        Ok(scratch.filled(len))
    }
}

/// Applies packets produced by a [`ColumnarSerializer`] to a [`Storage`].
///
/// Holds no per-packet state, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct ColumnarDeserializer {
    codecs: Vec<ComponentCodec>,
    mode: Mode,
    limits: DecodeLimits,
    fingerprint: u64,
}

impl ColumnarDeserializer {
    /// Builds one component codec per schema component.
    pub fn new(schema: &Schema, options: DeserializerOptions) -> CodecResult<Self> {
        let codecs = build_codecs(schema)?;
        debug!(
            components = codecs.len(),
            diff = options.diff,
            "built columnar deserializer"
        );
        Ok(Self {
            codecs,
            mode: Mode::from_diff(options.diff),
            limits: options.limits,
            fingerprint: schema_hash(schema),
        })
    }

    #[must_use]
    pub const fn is_diff(&self) -> bool {
        self.mode.is_diff()
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Fingerprint of the schema this deserializer was built from.
    #[must_use]
    pub const fn schema_fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Component codecs in declared order.
    #[must_use]
    pub fn components(&self) -> &[ComponentCodec] {
        &self.codecs
    }

    /// Decodes every record in `packet` into `storage`.
    ///
    /// Record indices and `ref` values are passed through `map`. Records are
    /// applied as they are read; on error, records before the fault remain
    /// applied.
    pub fn deserialize(
        &self,
        storage: &mut Storage,
        packet: &[u8],
        map: Option<&IdentityMap>,
    ) -> CodecResult<DecodeStats> {
        let result = self.decode(storage, packet, map);
        match &result {
            Ok(stats) => trace!(
                records = stats.records,
                bytes = stats.bytes,
                "deserialized packet"
            ),
            Err(err) => warn!(error = %err, bytes = packet.len(), "rejected packet"),
        }
        result
    }

    fn decode(
        &self,
        storage: &mut Storage,
        packet: &[u8],
        map: Option<&IdentityMap>,
    ) -> CodecResult<DecodeStats> {
        if packet.len() > self.limits.max_packet_bytes {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::PacketBytes,
                limit: self.limits.max_packet_bytes,
                actual: packet.len(),
            });
        }
        check_storage(&self.codecs, storage)?;

        let mut reader = ByteReader::new(packet);
        let records = walk_packet(&self.codecs, self.mode, &mut reader, |position, codec, reader| {
            let columns = storage.columns_mut(position).unwrap_or_default();
            codec.decode_into(columns, reader, self.mode, map, &self.limits)?;
            Ok(())
        })?;
        Ok(DecodeStats {
            records,
            bytes: reader.position(),
        })
    }
}

/// Dispatches every record in `reader` to `visit` and returns the record count.
///
/// `visit` receives the component position and codec and must consume
/// exactly one record.
pub(crate) fn walk_packet<F>(
    codecs: &[ComponentCodec],
    mode: Mode,
    reader: &mut ByteReader<'_>,
    mut visit: F,
) -> CodecResult<usize>
where
    F: FnMut(usize, &ComponentCodec, &mut ByteReader<'_>) -> CodecResult<()>,
{
    let mut records = 0usize;
    match mode {
        Mode::Full => {
            if codecs.is_empty() && !reader.is_empty() {
                return Err(CodecError::TrailingData {
                    offset: reader.position(),
                    remaining: reader.remaining(),
                });
            }
            while !reader.is_empty() {
                for (position, codec) in codecs.iter().enumerate() {
                    visit(position, codec, reader)?;
                    records += 1;
                }
            }
        }
        Mode::Diff => {
            while !reader.is_empty() {
                let id = peek_component_id(reader)?;
                let position = id as usize;
                let codec = codecs.get(position).ok_or(CodecError::UnknownComponent {
                    id,
                    components: codecs.len(),
                })?;
                visit(position, codec, reader)?;
                records += 1;
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use schema::{ComponentDef, TypeDesc};

    fn schema() -> Schema {
        Schema::builder()
            .component(
                ComponentDef::record("Position")
                    .field("x", TypeDesc::f32())
                    .field("y", TypeDesc::f32()),
            )
            .component(ComponentDef::column("Health", TypeDesc::u8()))
            .build()
            .unwrap()
    }

    fn serializer(diff: bool) -> ColumnarSerializer {
        ColumnarSerializer::new(&schema(), SerializerOptions::for_testing().with_diff(diff)).unwrap()
    }

    fn deserializer(diff: bool) -> ColumnarDeserializer {
        ColumnarDeserializer::new(&schema(), DeserializerOptions::for_testing().with_diff(diff))
            .unwrap()
    }

    #[test]
    fn builds_from_schema() {
        let ser = serializer(true);
        assert!(ser.is_diff());
        assert_eq!(ser.mode(), Mode::Diff);
        assert_eq!(ser.components().len(), 2);
        assert_eq!(ser.scratch_capacity(), 64 * 1024);

        let de = deserializer(false);
        assert!(!de.is_diff());
        assert_eq!(de.schema_fingerprint(), ser.schema_fingerprint());
        assert_eq!(de.limits(), &DecodeLimits::for_testing());
    }

    #[test]
    fn invalid_schema_rejected() {
        let bad = Schema {
            components: vec![ComponentDef::record("Empty")],
        };
        let err = ColumnarSerializer::new(&bad, SerializerOptions::for_testing()).unwrap_err();
        assert!(matches!(err, CodecError::Schema(_)));
        let err = ColumnarDeserializer::new(&bad, DeserializerOptions::for_testing()).unwrap_err();
        assert!(matches!(err, CodecError::Schema(_)));
    }

    #[test]
    fn invalid_epsilon_rejected() {
        let err = ColumnarSerializer::new(
            &schema(),
            SerializerOptions::for_testing().with_epsilon(-0.5),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::InvalidEpsilon { .. }));
    }

    #[test]
    fn full_packet_layout() {
        let mut storage = Storage::new(&schema());
        storage.set("Position.x", 0, 1.0f32).unwrap();
        storage.set("Health", 0, 7u8).unwrap();

        let mut ser = serializer(false);
        let packet = ser.serialize(&storage, &[0]).unwrap();
        let mut expected = vec![0, 0, 0, 0];
        expected.extend_from_slice(&1.0f32.to_be_bytes());
        expected.extend_from_slice(&0.0f32.to_be_bytes());
        expected.extend_from_slice(&[0, 0, 0, 0, 7]);
        assert_eq!(packet, expected.as_slice());
    }

    #[test]
    fn empty_index_list_is_empty_packet() {
        let storage = Storage::new(&schema());
        let mut ser = serializer(false);
        assert!(ser.serialize(&storage, &[]).unwrap().is_empty());

        let mut target = Storage::new(&schema());
        let stats = deserializer(false)
            .deserialize(&mut target, &[], None)
            .unwrap();
        assert_eq!(stats, DecodeStats::default());
    }

    #[test]
    fn diff_packet_counts_records() {
        let mut storage = Storage::new(&schema());
        storage.set("Position.y", 4, 2.0f32).unwrap();
        storage.set("Health", 5, 1u8).unwrap();

        let mut ser = serializer(true);
        let packet = ser.serialize(&storage, &[4, 5]).unwrap().to_vec();

        let mut target = Storage::new(&schema());
        let stats = deserializer(true)
            .deserialize(&mut target, &packet, None)
            .unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.bytes, packet.len());
        assert_eq!(target.get("Position.y", 4).unwrap(), Some(Value::F32(2.0)));
        assert_eq!(target.get("Health", 5).unwrap(), Some(Value::U8(1)));
    }

    #[test]
    fn reset_shadows_resends() {
        let mut storage = Storage::new(&schema());
        storage.set("Health", 0, 3u8).unwrap();
        let mut ser = serializer(true);
        let first = ser.serialize(&storage, &[0]).unwrap().len();
        assert!(first > 0);
        assert!(ser.serialize(&storage, &[0]).unwrap().is_empty());
        ser.reset_shadows();
        assert_eq!(ser.serialize(&storage, &[0]).unwrap().len(), first);
    }

    #[test]
    fn scratch_overflow_is_out_of_range() {
        let storage = Storage::new(&schema());
        let mut ser = ColumnarSerializer::new(
            &schema(),
            SerializerOptions::for_testing().with_scratch_capacity(16),
        )
        .unwrap();
        let err = ser.serialize(&storage, &[0, 1]).unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn storage_shape_checked() {
        let other = Schema::builder()
            .component(ComponentDef::column("Health", TypeDesc::u8()))
            .build()
            .unwrap();
        let storage = Storage::new(&other);
        let mut ser = serializer(false);
        let err = ser.serialize(&storage, &[0]).unwrap_err();
        assert_eq!(
            err,
            CodecError::StorageMismatch(ShapeMismatch::ComponentCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn oversized_packet_rejected() {
        let mut storage = Storage::new(&schema());
        let de = ColumnarDeserializer::new(
            &schema(),
            DeserializerOptions::for_testing().with_limits(DecodeLimits {
                max_packet_bytes: 4,
                ..DecodeLimits::for_testing()
            }),
        )
        .unwrap();
        let err = de.deserialize(&mut storage, &[0; 5], None).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::PacketBytes,
                ..
            }
        ));
    }

    #[test]
    fn diff_of_unset_high_index_allocates_no_shadow() {
        let schema = Schema::builder()
            .component(ComponentDef::column("Name", TypeDesc::str()))
            .component(
                ComponentDef::record("Position")
                    .field("x", TypeDesc::f32())
                    .field("y", TypeDesc::f32()),
            )
            .build()
            .unwrap();
        let storage = Storage::new(&schema);
        let mut ser =
            ColumnarSerializer::new(&schema, SerializerOptions::for_testing().with_diff(true))
                .unwrap();
        let packet = ser.serialize(&storage, &[1 << 31, u32::MAX]).unwrap();
        assert!(packet.is_empty());
        assert_eq!(ser.shadows.as_ref().map(ShadowSet::allocated_cells), Some(0));
    }

    #[test]
    fn full_decode_at_high_index_stays_sparse() {
        let de = ColumnarDeserializer::new(&schema(), DeserializerOptions::default()).unwrap();
        let mut storage = Storage::new(&schema());
        let mut packet = vec![0x80, 0, 0, 0];
        packet.extend_from_slice(&1.5f32.to_be_bytes());
        packet.extend_from_slice(&2.5f32.to_be_bytes());
        packet.extend_from_slice(&[0x80, 0, 0, 0, 7]);
        de.deserialize(&mut storage, &packet, None).unwrap();

        let far = 1u32 << 31;
        assert_eq!(storage.get("Health", far).unwrap(), Some(Value::U8(7)));
        assert_eq!(storage.get("Position.y", far).unwrap(), Some(Value::F32(2.5)));
        let health = storage.column("Health").unwrap();
        assert_eq!(health.len(), far as usize + 1);
        assert_eq!(health.data().allocated_cells(), crate::paged::PAGE_LEN);
    }

    #[test]
    fn empty_schema_rejects_bytes() {
        let empty = Schema::new(vec![]).unwrap();
        let de = ColumnarDeserializer::new(&empty, DeserializerOptions::for_testing()).unwrap();
        let mut storage = Storage::new(&empty);
        assert!(de.deserialize(&mut storage, &[], None).is_ok());
        assert!(matches!(
            de.deserialize(&mut storage, &[1], None),
            Err(CodecError::TrailingData { .. })
        ));
    }
}
