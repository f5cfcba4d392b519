use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Code;

/// An error in the coded data itself.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwError {
    /// A code that is neither in the dictionary nor the next code about to be assigned.
    #[error("invalid code {code}, next free code is {next_code}")]
    InvalidCode { code: Code, next_code: u32 },

    /// The stream ended in the middle of a code word.
    #[error("code stream ends inside a code word")]
    TrailingByte,
}

/// Everything that can make a compression or decompression run fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Usage(String),

    #[error("{}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("short read: code stream ends inside a code word")]
    ShortRead,

    #[error("corrupt code stream: code {code} is undefined, next free code is {next_code}")]
    Corrupt { code: Code, next_code: u32 },
}

impl From<LzwError> for Error {
    fn from(err: LzwError) -> Self {
        match err {
            LzwError::InvalidCode { code, next_code } => Error::Corrupt { code, next_code },
            LzwError::TrailingByte => Error::ShortRead,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
