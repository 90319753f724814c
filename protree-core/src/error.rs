use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtreeError {
    #[error("an interval row needs exactly 2 fields (end and value), found {found}")]
    InvalidArity { found: usize },

    #[error("branch index {index} out of range for a tree with {len} branches")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no interval covers key {key}")]
    NotFound { key: String },

    #[error("invalid interval field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("invalid builder config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ProtreeError>;
