//! Record framing for the soa columnar codec.
//!
//! A packet is a flat sequence of records with no outer header. This crate
//! owns the pieces of a record that do not depend on component types: the
//! entity index, the diff-mode component id, and the change mask.
//!
//! ```text
//! full record:  index:u32  value...
//! diff record:  index:u32  component_id:u32  [mask:u8|u16|u32]  value...
//! ```
//!
//! All integers are big-endian.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Widths and order never depend on runtime state.
//! - **Bounded decoding** - Every read is checked; masks are validated
//!   against the declared field count.
//! - **No domain knowledge** - This crate handles framing, not column values.

mod error;
mod mask;
mod record;

pub use error::{WireError, WireResult};
pub use mask::{MaskWidth, MAX_MASK_BITS};
pub use record::{
    peek_component_id, Mode, RecordHeader, COMPONENT_ID_SIZE, INDEX_SIZE, LENGTH_PREFIX_SIZE,
    PRESENCE_SIZE,
};
