//! Wraps the codec in the `std::io::Read` and `std::io::Write`
//! interfaces, so messages can be encrypted and decrypted as they
//! stream through.  The bytes on the wire are identical to what
//! `encrypt` and `decrypt` produce.
//!
//! # Example:
//! ```
//! use std::io::{Cursor, Read, Write};
//! use tea_codec::io::{Reader, Writer};
//!
//! let key = b"123456789abcdef\0";
//! let message = b"Hello, world!";
//!
//! let mut crypt_f = Writer::new(Vec::new(), key, message.len()).unwrap();
//! crypt_f.write_all(message).unwrap();
//! let crypted = crypt_f.close().unwrap();
//! assert_eq!(crypted.len(), tea_codec::encrypted_len(message.len()));
//!
//! let mut decrypt_f = Reader::new(Cursor::new(crypted), key).unwrap();
//! let mut s = String::new();
//! decrypt_f.read_to_string(&mut s).unwrap();
//! assert_eq!("Hello, world!", s);
//! ```

pub use self::reader::Reader;
pub use self::writer::Writer;

mod reader;
mod writer;
