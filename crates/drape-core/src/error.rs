use thiserror::Error;

/// Failure to parse a `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color `{0}` (expected #rrggbb)")]
    InvalidHex(String),
}

/// Rejected write or read through the key-based parameter interface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("unknown parameter key `{0}`")]
    UnknownKey(String),

    #[error("parameter `{key}` expects {expected}")]
    WrongKind { key: String, expected: &'static str },

    #[error("color zone index {0} out of range (0-6)")]
    ZoneIndex(usize),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error("invalid parameter snapshot: {0}")]
    Json(String),
}

/// Texture data handed over by an asset loader could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureError {
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },

    #[error("expected {expected} bytes for a {width}x{height} RGBA8 texture, got {actual}")]
    ByteLength {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}
