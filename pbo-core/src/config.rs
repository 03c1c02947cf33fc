//! String bound configuration for the header reader.

/// Bound on a null-terminated string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringLimit {
    /// At most this many bytes, excluding the terminator.
    Bounded(usize),
    /// Grow as needed.
    Unbounded,
}

impl StringLimit {
    /// Whether a string of `len` bytes is allowed.
    pub fn allows(&self, len: usize) -> bool {
        match self {
            Self::Bounded(max) => len <= *max,
            Self::Unbounded => true,
        }
    }

    /// The numeric bound, if any.
    pub fn max_len(&self) -> Option<usize> {
        match self {
            Self::Bounded(max) => Some(*max),
            Self::Unbounded => None,
        }
    }
}

/// Per-field string bounds applied while parsing a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Bound on entry paths.
    pub path: StringLimit,
    /// Bound on property keys.
    pub key: StringLimit,
    /// Bound on property values.
    pub value: StringLimit,
}

impl ReadLimits {
    /// Fixed-buffer limits.
    ///
    /// - paths: 4095 bytes
    /// - property keys: 31 bytes
    /// - property values: 255 bytes
    pub const BOUNDED: Self = Self {
        path: StringLimit::Bounded(4095),
        key: StringLimit::Bounded(31),
        value: StringLimit::Bounded(255),
    };

    /// No limits; strings grow until their terminator.
    pub const UNBOUNDED: Self = Self {
        path: StringLimit::Unbounded,
        key: StringLimit::Unbounded,
        value: StringLimit::Unbounded,
    };

    /// Same bound for every field.
    pub fn uniform(limit: StringLimit) -> Self {
        Self {
            path: limit,
            key: limit,
            value: limit,
        }
    }
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self::BOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_limits() {
        let limits = ReadLimits::default();
        assert_eq!(limits, ReadLimits::BOUNDED);
        assert!(limits.path.allows(4095));
        assert!(!limits.path.allows(4096));
        assert!(limits.key.allows(31));
        assert!(!limits.key.allows(32));
        assert_eq!(limits.value.max_len(), Some(255));
    }

    #[test]
    fn test_unbounded_limits() {
        let limits = ReadLimits::UNBOUNDED;
        assert!(limits.path.allows(usize::MAX));
        assert_eq!(limits.key.max_len(), None);

        let limits = ReadLimits::uniform(StringLimit::Bounded(8));
        assert!(!limits.value.allows(9));
    }
}
