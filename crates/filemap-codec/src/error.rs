/// Errors produced while converting values to and from bytes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The bytes do not describe a value of the requested type.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
