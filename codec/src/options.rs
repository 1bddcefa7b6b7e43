//! Serializer and deserializer configuration.

use crate::error::{CodecError, CodecResult};
use crate::limits::DecodeLimits;

/// Default scratch buffer size: 100 MiB.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 100 * 1024 * 1024;

/// Default change tolerance for float columns in diff mode.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Options for [`ColumnarSerializer`](crate::ColumnarSerializer).
#[derive(Debug, Clone, PartialEq)]
pub struct SerializerOptions {
    /// Emit only changed components and fields.
    pub diff: bool,

    /// Size of the scratch buffer allocated once at construction. A packet
    /// that does not fit fails with an out-of-range error.
    pub scratch_capacity_bytes: usize,

    /// Changes to `f32`/`f64` cells no larger than this are not emitted.
    pub epsilon: f64,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            diff: false,
            scratch_capacity_bytes: DEFAULT_SCRATCH_CAPACITY,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl SerializerOptions {
    /// Creates options with a small scratch buffer for tests.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            diff: false,
            scratch_capacity_bytes: 64 * 1024,
            epsilon: DEFAULT_EPSILON,
        }
    }

    #[must_use]
    pub const fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    #[must_use]
    pub const fn with_scratch_capacity(mut self, bytes: usize) -> Self {
        self.scratch_capacity_bytes = bytes;
        self
    }

    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub(crate) fn validate(&self) -> CodecResult<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(CodecError::InvalidEpsilon {
                epsilon: self.epsilon,
            });
        }
        Ok(())
    }
}

/// Options for [`ColumnarDeserializer`](crate::ColumnarDeserializer).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeserializerOptions {
    /// Expect diff framing (component ids and change masks).
    pub diff: bool,

    /// Bounds applied to every packet.
    pub limits: DecodeLimits,
}

impl DeserializerOptions {
    /// Creates options with testing limits.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            diff: false,
            limits: DecodeLimits::for_testing(),
        }
    }

    #[must_use]
    pub const fn with_diff(mut self, diff: bool) -> Self {
        self.diff = diff;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }
}
