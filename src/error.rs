use thiserror::Error;

#[derive(Error, Debug)]
pub enum LossyError {
    #[error("grammar error on line {line}: {message}")]
    Grammar { line: usize, message: String },

    #[error("language record error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot compute processing difficulty of an empty sequence")]
    EmptySequence,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, LossyError>;
