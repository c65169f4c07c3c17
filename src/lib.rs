//! Implements the 16-round TEA block cipher and the chained message
//! format built on top of it by QQ-style protocols.  This code is
//! public domain.
//!
//! A message is laid out as a random header byte (whose low three
//! bits count the fill bytes), up to seven identical fill bytes, two
//! random bytes, the plaintext, and seven zero bytes, then encrypted
//! 8 bytes at a time with a double feedback between blocks.  The fill
//! bytes and the zero run let `decrypt` notice a wrong key or a
//! corrupted ciphertext.  They are a heuristic, not a MAC: a
//! successful decrypt says nothing about authenticity.
//!
//! # Example:
//! ```
//! let key = b"123456789abcdef\0";
//! let crypted = tea_codec::encrypt(b"Hello, world!", key).unwrap();
//! assert_eq!(crypted.len() % 8, 0);
//! assert_eq!(tea_codec::decrypt(&crypted, key).unwrap(), b"Hello, world!");
//! assert!(tea_codec::decrypt(&crypted, b"fedcba987654321\0").is_err());
//! ```

/// A key is 128 bits, held as four words in wire (big-endian) order.
pub type Key = [u32; 4];

/// TEA uses 64-bit blocks; like the key, this is just an array of
/// words.
pub type Block = [u32; 2];

/// Length of a key in bytes.
pub const KEY_LEN: usize = 16;

/// Length of a block in bytes.
pub const BLOCK_LEN: usize = 8;

pub mod cipher;
pub mod codec;
pub mod error;
pub mod io;
mod chain;
mod mem;

pub use codec::{decrypt, encrypt, encrypted_len, padding_len, Codec};
pub use error::{Error, Result};
