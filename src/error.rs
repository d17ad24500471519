
use ndarray_npy::{ReadNpyError, WriteNpyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CbowError {

    #[error("vocabulary size must be positive")]
    InvalidSize,

    #[error("window radius must be at least 1")]
    InvalidWindowRadius,

    #[error("batch size must be positive")]
    InvalidBatchSize,

    #[error("only {len} tokens left after filtering, a window of radius {window_radius} needs at least {}", .window_radius.saturating_mul(2).saturating_add(1))]
    InsufficientData { len: usize, window_radius: usize },

    #[error("token: {0} is not in the vocabulary")]
    UnknownToken(String),

    #[error("id {id} is out of range for a vocabulary of {vocab_size} tokens")]
    IdOutOfRange { id: usize, vocab_size: usize },

    #[error("inconsistent number of entries in vectors ({vectors}) and tokens ({tokens})")]
    Mismatch { vectors: usize, tokens: usize },

    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    ReadNpy(#[from] ReadNpyError),

    #[error(transparent)]
    WriteNpy(#[from] WriteNpyError),

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, CbowError>;
