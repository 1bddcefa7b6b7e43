//! Bounded byte cursor primitives for the soa columnar codec.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for fixed-width,
//! big-endian encoding and decoding over caller-owned byte buffers.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked; a failed
//!   access leaves the cursor where it was.
//! - **No domain knowledge** - This crate knows nothing about entities,
//!   components, or columns.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut buf = [0u8; 8];
//! let mut writer = ByteWriter::new(&mut buf);
//! writer.write_u32(42).unwrap();
//! writer.write_i16(-7).unwrap();
//! let len = writer.finish();
//!
//! let mut reader = ByteReader::new(&buf[..len]);
//! assert_eq!(reader.read_u32().unwrap(), 42);
//! assert_eq!(reader.read_i16().unwrap(), -7);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let mut buf = [0u8; 0];
        let writer = ByteWriter::new(&mut buf);
        assert_eq!(writer.finish(), 0);

        let reader = ByteReader::new(&buf);
        assert!(reader.is_empty());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut buf = [0u8; 64];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u8(1).unwrap();
        writer.write_u16(0xBEEF).unwrap();
        writer.write_i32(-123_456).unwrap();
        writer.write_f64(core::f64::consts::PI).unwrap();
        writer.write_bytes("盾".as_bytes()).unwrap();
        let len = writer.finish();

        let mut reader = ByteReader::new(&buf[..len]);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_i32().unwrap(), -123_456);
        assert_eq!(
            reader.read_f64().unwrap().to_bits(),
            core::f64::consts::PI.to_bits()
        );
        assert_eq!(reader.read_bytes(3).unwrap(), "盾".as_bytes());
        assert!(reader.is_empty());
    }

    #[test]
    fn doctest_example() {
        let mut buf = [0u8; 8];
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_u32(42).unwrap();
        writer.write_i16(-7).unwrap();
        let len = writer.finish();

        let mut reader = ByteReader::new(&buf[..len]);
        assert_eq!(reader.read_u32().unwrap(), 42);
        assert_eq!(reader.read_i16().unwrap(), -7);
    }
}
