#![no_main]

use bytestream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    while !reader.is_empty() {
        let op = match reader.read_u8() {
            Ok(op) => op,
            Err(_) => break,
        };
        let result = match op % 6 {
            0 => reader.read_u16().map(drop),
            1 => reader.read_i32().map(drop),
            2 => reader.read_f32().map(drop),
            3 => reader.read_f64().map(drop),
            4 => reader.peek_u32(usize::from(op & 3)).map(drop),
            _ => reader.read_bytes(usize::from(op)).map(drop),
        };
        if result.is_err() {
            break;
        }
    }
});
