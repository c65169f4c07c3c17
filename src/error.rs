//! Error types for the codec and its streaming wrappers.

use std::io;

/// Everything that can go wrong while encrypting or decrypting.
///
/// A wrong key and a tampered ciphertext both show up as
/// `IntegrityCheckFailed`; the format cannot tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("ciphertext must be a multiple of 8 bytes and at least 16 bytes long, got {0}")]
    InvalidLength(usize),
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },
    #[error("integrity check failed: wrong key or corrupted ciphertext")]
    IntegrityCheckFailed,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match err {
            Error::InvalidInput(_) | Error::BufferTooSmall { .. } => io::ErrorKind::InvalidInput,
            Error::InvalidLength(_) | Error::IntegrityCheckFailed => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

#[test]
fn display_messages() {
    assert_eq!(Error::InvalidLength(12).to_string(),
               "ciphertext must be a multiple of 8 bytes and at least 16 bytes long, got 12");
    assert_eq!(Error::BufferTooSmall { need: 24, got: 16 }.to_string(),
               "buffer length not enough: need 24, got 16");
    assert_eq!(Error::InvalidInput("empty plaintext").to_string(),
               "invalid input: empty plaintext");
}

#[test]
fn converts_to_io_error() {
    let err: io::Error = Error::IntegrityCheckFailed.into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    let inner = err.into_inner().unwrap().downcast::<Error>().unwrap();
    assert_eq!(*inner, Error::IntegrityCheckFailed);

    let err: io::Error = Error::BufferTooSmall { need: 8, got: 0 }.into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}
