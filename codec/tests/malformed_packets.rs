use codec::{
    CodecError, ColumnarDeserializer, ColumnarSerializer, DecodeLimits, DeserializerOptions,
    LimitKind, SerializerOptions, Storage, Value,
};
use schema::{ComponentDef, ScalarType, Schema, TypeDesc};

fn schema() -> Schema {
    Schema::builder()
        .component(
            ComponentDef::record("Position")
                .field("x", TypeDesc::f32())
                .field("y", TypeDesc::f32()),
        )
        .component(ComponentDef::column("Tags", TypeDesc::array(ScalarType::Str)))
        .build()
        .unwrap()
}

fn deserializer(diff: bool) -> ColumnarDeserializer {
    ColumnarDeserializer::new(&schema(), DeserializerOptions::for_testing().with_diff(diff))
        .unwrap()
}

fn valid_packet(diff: bool) -> Vec<u8> {
    let schema = schema();
    let mut storage = Storage::new(&schema);
    storage.set("Position.x", 1, 1.0f32).unwrap();
    storage.set("Position.y", 1, 2.0f32).unwrap();
    storage
        .set("Tags", 1, vec![Value::from("a"), Value::from("b")])
        .unwrap();
    let mut ser =
        ColumnarSerializer::new(&schema, SerializerOptions::for_testing().with_diff(diff)).unwrap();
    ser.serialize(&storage, &[1]).unwrap().to_vec()
}

#[test]
fn every_truncation_is_an_error() {
    for diff in [false, true] {
        let packet = valid_packet(diff);
        for len in 1..packet.len() {
            // 17 bytes is exactly one complete Position diff record
            if diff && len == 17 {
                continue;
            }
            let mut storage = Storage::new(&schema());
            let result = deserializer(diff).deserialize(&mut storage, &packet[..len], None);
            assert!(result.is_err(), "diff={diff} len={len}");
        }
    }
}

#[test]
fn truncated_full_record_reports_out_of_range() {
    let packet = valid_packet(false);
    let mut storage = Storage::new(&schema());
    let err = deserializer(false)
        .deserialize(&mut storage, &packet[..6], None)
        .unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange(_)));
}

#[test]
fn unknown_component_id() {
    let packet = [0, 0, 0, 1, 0, 0, 0, 5, 0];
    let mut storage = Storage::new(&schema());
    let err = deserializer(true)
        .deserialize(&mut storage, &packet, None)
        .unwrap_err();
    assert_eq!(
        err,
        CodecError::UnknownComponent {
            id: 5,
            components: 2
        }
    );
    assert!(err.is_out_of_range());
}

#[test]
fn mask_with_undeclared_bits() {
    let packet = [0, 0, 0, 1, 0, 0, 0, 0, 0b1100];
    let mut storage = Storage::new(&schema());
    let err = deserializer(true)
        .deserialize(&mut storage, &packet, None)
        .unwrap_err();
    assert!(matches!(err, CodecError::InvalidMask { mask: 0b1100, .. }));
}

#[test]
fn huge_array_count_is_rejected_without_allocating() {
    // Tags record: index, id 1, presence, count u32::MAX
    let packet = [0, 0, 0, 1, 0, 0, 0, 1, 1, 0xFF, 0xFF, 0xFF, 0xFF];
    let mut storage = Storage::new(&schema());
    let de = ColumnarDeserializer::new(
        &schema(),
        DeserializerOptions::default()
            .with_diff(true)
            .with_limits(DecodeLimits::unlimited()),
    )
    .unwrap();
    let err = de.deserialize(&mut storage, &packet, None).unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange(_)));

    let err = deserializer(true)
        .deserialize(&mut storage, &packet, None)
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::LimitsExceeded {
            kind: LimitKind::ArrayLength,
            ..
        }
    ));
}

#[test]
fn huge_string_length_is_rejected() {
    // Tags record with one element whose length prefix is enormous
    let packet = [
        0, 0, 0, 1, 0, 0, 0, 1, 1, 0, 0, 0, 1, 0x7F, 0xFF, 0xFF, 0xFF, b'a',
    ];
    let mut storage = Storage::new(&schema());
    let err = deserializer(true)
        .deserialize(&mut storage, &packet, None)
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::LimitsExceeded {
            kind: LimitKind::StringBytes,
            ..
        }
    ));
}

#[test]
fn earlier_records_stay_applied_after_fault() {
    let mut packet = valid_packet(true);
    packet.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 9]);
    let mut storage = Storage::new(&schema());
    let err = deserializer(true)
        .deserialize(&mut storage, &packet, None)
        .unwrap_err();
    assert!(matches!(err, CodecError::UnknownComponent { id: 9, .. }));
    assert_eq!(storage.get("Position.x", 1).unwrap(), Some(Value::F32(1.0)));
}

#[test]
fn full_packet_decoded_as_diff_fails_cleanly() {
    let packet = valid_packet(false);
    let mut storage = Storage::new(&schema());
    assert!(deserializer(true)
        .deserialize(&mut storage, &packet, None)
        .is_err());
}

#[test]
fn arbitrary_garbage_never_panics() {
    let mut seed = 0x2545_F491u32;
    for round in 0..500 {
        let len = round % 40;
        let bytes: Vec<u8> = (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                seed.to_be_bytes()[0]
            })
            .collect();
        for diff in [false, true] {
            let de = ColumnarDeserializer::new(
                &schema(),
                DeserializerOptions::for_testing()
                    .with_diff(diff)
                    .with_limits(DecodeLimits {
                        max_index: u32::MAX,
                        ..DecodeLimits::for_testing()
                    }),
            )
            .unwrap();
            let mut storage = Storage::new(&schema());
            let _ = de.deserialize(&mut storage, &bytes, None);
        }
    }
}
