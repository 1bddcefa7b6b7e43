//! Storage-free packet inspection.

use bytestream::ByteReader;
use schema::Schema;
use wire::Mode;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::DecodeLimits;
use crate::pipeline::{build_codecs, walk_packet};
use crate::value::Value;

/// One decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    /// Byte offset of the record within the packet.
    pub offset: usize,
    /// Encoded length in bytes.
    pub len: usize,
    /// Entity index as transmitted.
    pub index: u32,
    /// Component position (the diff-mode component id).
    pub component: usize,
    pub component_name: String,
    /// Fields present in the record, in wire order. Absent arrays are omitted.
    pub fields: Vec<(String, Value)>,
}

/// Decodes `packet` against `schema` without applying it anywhere.
///
/// No identity map is applied, so indices and `ref` values are shown as sent.
pub fn inspect_packet(
    schema: &Schema,
    packet: &[u8],
    diff: bool,
    limits: &DecodeLimits,
) -> CodecResult<Vec<RecordView>> {
    if packet.len() > limits.max_packet_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::PacketBytes,
            limit: limits.max_packet_bytes,
            actual: packet.len(),
        });
    }
    let codecs = build_codecs(schema)?;
    let mode = Mode::from_diff(diff);

    let mut views = Vec::new();
    let mut reader = ByteReader::new(packet);
    walk_packet(&codecs, mode, &mut reader, |position, codec, reader| {
        let offset = reader.position();
        let mut fields = Vec::new();
        let header = codec.decode_record(reader, mode, None, limits, |_, field, value| {
            let name = codec.field_name(field).unwrap_or_default();
            fields.push((name.to_owned(), value));
            Ok(())
        })?;
        views.push(RecordView {
            offset,
            len: reader.position() - offset,
            index: header.index,
            component: position,
            component_name: codec.name().to_owned(),
            fields,
        });
        Ok(())
    })?;
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnarSerializer, SerializerOptions, Storage};
    use schema::{ComponentDef, TypeDesc};

    fn schema() -> Schema {
        Schema::builder()
            .component(
                ComponentDef::record("Position")
                    .field("x", TypeDesc::f32())
                    .field("y", TypeDesc::f32()),
            )
            .component(ComponentDef::column("Name", TypeDesc::str()))
            .build()
            .unwrap()
    }

    #[test]
    fn inspect_full_packet() {
        let schema = schema();
        let mut storage = Storage::new(&schema);
        storage.set("Position.x", 2, 1.0f32).unwrap();
        storage.set("Name", 2, "bob").unwrap();
        let mut ser = ColumnarSerializer::new(&schema, SerializerOptions::for_testing()).unwrap();
        let packet = ser.serialize(&storage, &[2]).unwrap();

        let views = inspect_packet(&schema, packet, false, &DecodeLimits::for_testing()).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].offset, 0);
        assert_eq!(views[0].len, 12);
        assert_eq!(views[0].component_name, "Position");
        assert_eq!(
            views[0].fields,
            vec![
                ("x".to_owned(), Value::F32(1.0)),
                ("y".to_owned(), Value::F32(0.0))
            ]
        );
        assert_eq!(views[1].offset, 12);
        assert_eq!(views[1].index, 2);
        assert_eq!(views[1].fields, vec![("Name".to_owned(), Value::from("bob"))]);
    }

    #[test]
    fn inspect_diff_packet() {
        let schema = schema();
        let mut storage = Storage::new(&schema);
        storage.set("Position.y", 7, 3.0f32).unwrap();
        let mut ser = ColumnarSerializer::new(
            &schema,
            SerializerOptions::for_testing().with_diff(true),
        )
        .unwrap();
        let packet = ser.serialize(&storage, &[7]).unwrap();

        let views = inspect_packet(&schema, packet, true, &DecodeLimits::for_testing()).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].component, 0);
        assert_eq!(views[0].fields, vec![("y".to_owned(), Value::F32(3.0))]);
    }

    #[test]
    fn inspect_rejects_unknown_component() {
        let packet = [0, 0, 0, 1, 0, 0, 0, 9];
        let err = inspect_packet(&schema(), &packet, true, &DecodeLimits::for_testing()).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnknownComponent {
                id: 9,
                components: 2
            }
        );
    }
}
