#![no_main]

use codec::{inspect_packet, ColumnarDeserializer, DecodeLimits, DeserializerOptions, IdentityMap, Storage};
use libfuzzer_sys::fuzz_target;
use schema::{ComponentDef, ScalarType, Schema, TypeDesc};

fn schema_mixed() -> Schema {
    Schema::builder()
        .component(
            ComponentDef::record("Body")
                .field("x", TypeDesc::f32())
                .field("hp", TypeDesc::u16())
                .field("name", TypeDesc::str())
                .field("owner", TypeDesc::reference()),
        )
        .component(ComponentDef::column("Path", TypeDesc::array(TypeDesc::array(ScalarType::I16))))
        .component(ComponentDef::column("Level", TypeDesc::i8()))
        .build()
        .unwrap()
}

fuzz_target!(|data: &[u8]| {
    let schema = schema_mixed();
    let limits = DecodeLimits {
        max_index: u32::MAX,
        ..DecodeLimits::for_testing()
    };
    let map: IdentityMap = [(1, 4000), (2, 1 << 31), (3, u32::MAX)].into_iter().collect();

    for diff in [false, true] {
        let options = DeserializerOptions::for_testing().with_diff(diff).with_limits(limits.clone());
        let deserializer = ColumnarDeserializer::new(&schema, options).unwrap();
        let mut storage = Storage::new(&schema);
        let _ = deserializer.deserialize(&mut storage, data, None);
        let _ = deserializer.deserialize(&mut storage, data, Some(&map));
        let _ = inspect_packet(&schema, data, diff, &limits);
    }
});
