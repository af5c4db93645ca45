use thiserror::Error;

/// Failure extracting one fixed-stride record block from a raw export.
///
/// These are recoverable: the parser logs the block's line offset and
/// advances a single line to resynchronize.
#[derive(Debug, Error)]
pub enum BlockParseError {
    #[error("invalid count {value:?} for {field}")]
    InvalidCount { field: &'static str, value: String },
}
