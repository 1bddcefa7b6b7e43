//! Configurable limits for bounded decoding.

/// Limits applied while decoding packets.
///
/// Every length read from the wire is checked against these values, and
/// against the bytes actually remaining, before anything is allocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum packet size in bytes.
    pub max_packet_bytes: usize,

    /// Maximum element count of a single array value.
    pub max_array_len: usize,

    /// Maximum encoded length of a single string in bytes.
    pub max_string_bytes: usize,

    /// Maximum entity index after identity remapping.
    pub max_index: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            // Matches the default serializer scratch capacity
            max_packet_bytes: 100 * 1024 * 1024,
            max_array_len: 1 << 20,
            max_string_bytes: 1 << 20,
            max_index: u32::MAX,
        }
    }
}

impl DecodeLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_bytes: 64 * 1024,
            max_array_len: 1024,
            max_string_bytes: 4096,
            max_index: 1 << 24,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_bytes: usize::MAX,
            max_array_len: usize::MAX,
            max_string_bytes: usize::MAX,
            max_index: u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_values() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_packet_bytes, 100 * 1024 * 1024);
        assert_eq!(limits.max_array_len, 1 << 20);
        assert_eq!(limits.max_index, u32::MAX);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = DecodeLimits::for_testing();
        let default_limits = DecodeLimits::default();

        assert!(test_limits.max_packet_bytes < default_limits.max_packet_bytes);
        assert!(test_limits.max_array_len < default_limits.max_array_len);
        assert!(test_limits.max_string_bytes < default_limits.max_string_bytes);
        assert!(test_limits.max_index < default_limits.max_index);
    }

    #[test]
    fn testing_limits_cover_large_indices() {
        assert!(DecodeLimits::for_testing().max_index > 1 << 20);
    }

    #[test]
    fn unlimited_limits() {
        let limits = DecodeLimits::unlimited();
        assert_eq!(limits.max_packet_bytes, usize::MAX);
        assert_eq!(limits.max_array_len, usize::MAX);
        assert_eq!(limits.max_string_bytes, usize::MAX);
    }

    #[test]
    fn limits_equality() {
        assert_eq!(DecodeLimits::default(), DecodeLimits::default());
        assert_ne!(DecodeLimits::default(), DecodeLimits::for_testing());
    }
}
