use std::io;

use thiserror::Error;

/// Errors raised while building codecs, encoding values or driving accumulators
#[derive(Debug, Error)]
pub enum Error {
    /// The type description can't be turned into a codec
    #[error("unsupported type at `{path}`: {reason}")]
    UnsupportedType {
        /// Location of the offending description
        path: String,
        /// Why it was rejected
        reason: String,
    },
    /// A value failed its validity check
    #[error("invalid value at `{path}`: {reason}")]
    Validity {
        /// Location of the offending sub-value
        path: String,
        /// Why it was rejected
        reason: String,
    },
    /// A payload doesn't match the shape of its type description
    #[error("failed to decode `{path}`: {reason}")]
    Decode {
        /// Location of the offending payload
        path: String,
        /// Why it was rejected
        reason: String,
    },
    /// A dynamic value doesn't match the shape of its type description
    #[error("value at `{path}` doesn't match its type: expected {expected}")]
    Mismatch {
        /// Location of the offending value
        path: String,
        /// Expected shape
        expected: String,
    },
    /// `pop_exn` was called on an empty accumulator
    #[error("attempt to pop from an empty merkle list")]
    EmptyAccumulator,
    /// A witnessed hash-chain link doesn't hash to the committed value
    #[error("chain integrity violated ({label}): expected {expected}, got {actual}")]
    ChainIntegrity {
        /// Name of the failed assertion
        label: String,
        /// Committed value, in decimal
        expected: String,
        /// Recomputed value, in decimal
        actual: String,
    },
    /// A hash prefix doesn't fit a single field element
    #[error("hash prefix of {len} bytes is too long; the maximum is {max}")]
    PrefixTooLong {
        /// Length of the provided prefix
        len: usize,
        /// Maximum accepted length
        max: usize,
    },
    /// The configuration file couldn't be read or written
    #[error("configuration error: {0}")]
    Config(#[from] io::Error),
}

impl Error {
    pub(crate) fn unsupported<P, R>(path: P, reason: R) -> Self
    where
        P: ToString,
        R: ToString,
    {
        Self::UnsupportedType {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn validity<P, R>(path: P, reason: R) -> Self
    where
        P: ToString,
        R: ToString,
    {
        Self::Validity {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode<P, R>(path: P, reason: R) -> Self
    where
        P: ToString,
        R: ToString,
    {
        Self::Decode {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn mismatch<P, E>(path: P, expected: E) -> Self
    where
        P: ToString,
        E: ToString,
    {
        Self::Mismatch {
            path: path.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Prefix the location carried by a value-level error with `segment`.
    ///
    /// Composite codecs use it to report the full path of a nested failure.
    pub(crate) fn within(self, segment: &str) -> Self {
        let join = |path: String| match (segment.is_empty(), path.is_empty()) {
            (true, _) => path,
            (false, true) => segment.to_string(),
            (false, false) if path.starts_with('[') => format!("{}{}", segment, path),
            (false, false) => format!("{}.{}", segment, path),
        };

        match self {
            Self::UnsupportedType { path, reason } => Self::UnsupportedType {
                path: join(path),
                reason,
            },
            Self::Validity { path, reason } => Self::Validity {
                path: join(path),
                reason,
            },
            Self::Decode { path, reason } => Self::Decode {
                path: join(path),
                reason,
            },
            Self::Mismatch { path, expected } => Self::Mismatch {
                path: join(path),
                expected,
            },
            e => e,
        }
    }
}

/// Result type of the crate
pub type Result<T> = std::result::Result<T, Error>;

#[test]
fn nested_paths_are_joined() {
    let e = Error::validity("", "not a boolean")
        .within("b")
        .within("[2]")
        .within("items");

    match e {
        Error::Validity { path, .. } => assert_eq!(path, "items[2].b"),
        e => panic!("unexpected error {}", e),
    }
}
