use std::cmp;
use std::io;

use rand::RngCore;

use crate::chain::ChainState;
use crate::codec;
use crate::error::{Error, Result};
use crate::{mem, BLOCK_LEN};

/// Wraps an underlying `std::io::Write` so that bytes written get
/// encrypted and passed through.
///
/// The header depends on the plaintext length, so the length has to
/// be declared up front, and exactly that many bytes must be written
/// before `close()` appends the zero run and the last block.
///
/// # Example:
/// ```
/// use std::io::Write;
/// use tea_codec::io::Writer;
///
/// let key = b"123456789abcdef\0";
/// let mut crypt_f = Writer::new(Vec::new(), key, 13).unwrap();
/// crypt_f.write_all(b"Hello, ").unwrap();
/// crypt_f.write_all(b"world!").unwrap();
/// let crypted = crypt_f.close().unwrap();
/// assert_eq!(tea_codec::decrypt(&crypted, key).unwrap(), b"Hello, world!");
/// ```
pub struct Writer<W: io::Write> {
    sink: W,
    chain: ChainState,
    remaining: usize,
    buf: Vec<u8>,
    enc_buf: Vec<u8>,
}

impl<W: io::Write> Writer<W> {

    /// Wraps `sink` in a `Writer` that will encrypt `plain_len` bytes
    /// with the 16-byte `key`, padding with the thread-local random
    /// generator.
    pub fn new(sink: W, key: &[u8], plain_len: usize) -> Result<Writer<W>> {
        Writer::with_rng(sink, key, plain_len, &mut rand::thread_rng())
    }

    /// Like `new`, but draws the padding bytes from `rng`.
    pub fn with_rng<R: RngCore>(sink: W, key: &[u8], plain_len: usize, rng: &mut R) -> Result<Writer<W>> {
        if plain_len == 0 {
            return Err(Error::InvalidInput("plaintext must not be empty"));
        }
        let mut writer = Writer {
            sink,
            chain: ChainState::new(mem::read_key(key)?),
            remaining: plain_len,
            buf: Vec::with_capacity(BLOCK_LEN),
            enc_buf: Vec::with_capacity(2 * BLOCK_LEN),
        };
        let mut header = [0u8; 2 * BLOCK_LEN];
        let header_len = codec::write_header(rng, codec::padding_len(plain_len), &mut header);
        writer.push(&header[..header_len]);
        Ok(writer)
    }

    /// Number of plaintext bytes still owed before `close()`.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Writes the zero run and the final block, destroys the
    /// encrypting wrapper, and returns the underlying
    /// `std::io::Write` object.
    pub fn close(mut self) -> io::Result<W> {
        if self.remaining != 0 {
            return Err(Error::InvalidInput("closed before the declared length was written").into());
        }
        self.push(&[0; codec::ZERO_RUN]);
        debug_assert!(self.buf.is_empty());
        self.flush_enc_buf()?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    // Stages plaintext-side bytes, encrypting every block that fills up.
    fn push(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let take = cmp::min(BLOCK_LEN - self.buf.len(), bytes.len());
            self.buf.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];
            if self.buf.len() == BLOCK_LEN {
                self.chain.encrypt_chunk(&mut self.buf);
                self.enc_buf.extend_from_slice(&self.buf);
                self.buf.clear();
            }
        }
    }

    // Hands every encrypted byte to the sink, keeping whatever it
    // didn't take if it fails part way.
    fn flush_enc_buf(&mut self) -> io::Result<()> {
        while !self.enc_buf.is_empty() {
            match self.sink.write(&self.enc_buf) {
                Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero,
                                                   "sink stopped accepting encrypted bytes")),
                Ok(n) => {
                    let rest = self.enc_buf.split_off(n);
                    self.enc_buf = rest;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<W: io::Write> io::Write for Writer<W> {

    /// Encrypts the bytes in `buf`.  Complete blocks are passed on to
    /// the underlying `std::io::Write` at the start of the next call
    /// to `write`, `flush` or `close`; a partial block waits until
    /// more bytes arrive.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.flush_enc_buf()?;
        if buf.len() > self.remaining {
            return Err(Error::InvalidInput("more plaintext than the declared length").into());
        }
        self.push(buf);
        self.remaining -= buf.len();
        Ok(buf.len())
    }

    /// Passes every finished block through and flushes the underlying
    /// `std::io::Write`.  Bytes of an unfinished block stay behind.
    fn flush(&mut self) -> io::Result<()> {
        self.flush_enc_buf()?;
        self.sink.flush()
    }

}

#[test]
fn it_works() {
    use rand::rngs::mock::StepRng;
    use std::io::Write;

    let key = b"123456789abcdef\0";
    let input: Vec<u8> = (0u8..128).collect();
    let mut writer = Writer::with_rng(io::Cursor::new(Vec::with_capacity(128)),
                                      key, input.len(), &mut StepRng::new(0, 0)).unwrap();
    for chunk in input.chunks(16) {
        assert_eq!(writer.write(chunk).unwrap(), 16);
    }
    assert_eq!(writer.remaining(), 0);

    let result = writer.close().unwrap().into_inner();
    let expected = codec::Codec::with_rng(key, StepRng::new(0, 0)).unwrap().encrypt(&input).unwrap();
    assert_eq!(result, expected);
}

#[test]
fn declared_length_is_enforced() {
    use std::io::Write;

    let key = b"123456789abcdef\0";
    let mut writer = Writer::new(Vec::new(), key, 4).unwrap();
    assert_eq!(writer.write(b"tea").unwrap(), 3);
    let err = writer.write(b"ea").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(writer.remaining(), 1);
    assert!(writer.close().is_err());

    assert_eq!(Writer::new(Vec::new(), key, 0).err(),
               Some(Error::InvalidInput("plaintext must not be empty")));
    assert_eq!(Writer::new(Vec::new(), &key[..15], 4).err(),
               Some(Error::InvalidInput("key must be exactly 16 bytes")));
}
