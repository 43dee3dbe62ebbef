use std::{io, string::FromUtf8Error};

use failure::Fail;

#[derive(Fail, Debug)]
pub enum KvError {
    #[fail(display = "Key not found")]
    KeyNotFound,

    /// Tree links or colors are inconsistent. Always a bug in the engine.
    #[fail(display = "tree invariant violated: {}", _0)]
    InvariantViolation(String),

    #[fail(display = "unknown backend {:?}, expected one of: binary, redblack", _0)]
    UnknownBackend(String),

    #[fail(display = "Failed to parse {}", _0)]
    Parser(String),

    #[fail(display = "{}", _0)]
    IO(String),

    #[fail(display = "failed to handle tcp request, err: {}", _0)]
    TCP(String),

    /// Key or value is invalid UTF-8 sequence
    #[fail(display = "UTF-8 error: {}", _0)]
    Utf8(#[cause] FromUtf8Error),

    #[fail(display = "engine lock poisoned by a panicked request")]
    Poisoned,

    /// Error message sent back by the server.
    #[fail(display = "{}", _0)]
    Server(String),

    #[fail(display = "failed to build thread pool: {}", _0)]
    Pooling(String),
}

impl From<serde_json::Error> for KvError {
    fn from(value: serde_json::Error) -> KvError {
        Self::Parser(value.to_string())
    }
}

impl From<io::Error> for KvError {
    fn from(value: io::Error) -> Self {
        Self::IO(value.to_string())
    }
}

impl From<FromUtf8Error> for KvError {
    fn from(err: FromUtf8Error) -> KvError {
        KvError::Utf8(err)
    }
}

pub type Result<T> = std::result::Result<T, KvError>;
