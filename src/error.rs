use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EqusendError>;

#[derive(Error, Debug)]
pub enum EqusendError {
    #[error("file name {name:?} encodes to {len} bytes, limit is {max}")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("frame header serialized to {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    #[error("transport error sending to {addr}: {source}")]
    Transport {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no equation files found in {0}")]
    NoInputFiles(PathBuf),

    #[error("discovery error: {0}")]
    Discovery(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file operation error: {0}")]
    FileOperation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
