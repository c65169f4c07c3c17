use std::cmp;
use std::io;

use log::debug;

use crate::chain::ChainState;
use crate::codec;
use crate::error::{Error, Result};
use crate::{mem, BLOCK_LEN};

/// Wraps an underlying `std::io::Read` so that bytes read get
/// decrypted on the way through.
///
/// The header is checked as soon as the first block arrives.  The
/// zero run can only be checked once the source runs dry, so one
/// decrypted block is always held back, but everything before it is
/// handed out as it comes.  Treat what you read as unverified until
/// `read` returns `Ok(0)`; a wrong key or corrupted ciphertext shows
/// up as an `InvalidData` error wrapping `Error::IntegrityCheckFailed`
/// instead.  Once a read has failed that way, every later read fails
/// the same way.
///
/// # Example:
/// ```
/// use std::io::{Cursor, Read};
/// use tea_codec::io::Reader;
///
/// let key = b"123456789abcdef\0";
/// let crypted = tea_codec::encrypt(b"tea\0", key).unwrap();
/// let mut decrypt_f = Reader::new(Cursor::new(crypted), key).unwrap();
/// let mut plain = Vec::new();
/// decrypt_f.read_to_end(&mut plain).unwrap();
/// assert_eq!(plain, b"tea\0");
/// ```
pub struct Reader<S: io::Read> {
    source: S,
    chain: ChainState,
    // Fill count, known once the header block is in.
    pad: Option<usize>,
    // Header bytes still to drop from the decrypted stream.
    skip: usize,
    crypted_len: usize,
    held: Option<[u8; BLOCK_LEN]>,
    buf: Vec<u8>,
    pos: usize,
    done: bool,
    failed: Option<Error>,
}

impl<S: io::Read> Reader<S> {

    /// Wraps `source` in a `Reader` that will decrypt with the
    /// 16-byte `key`.
    pub fn new(source: S, key: &[u8]) -> Result<Reader<S>> {
        Ok(Reader {
            source,
            chain: ChainState::new(mem::read_key(key)?),
            pad: None,
            skip: 0,
            crypted_len: 0,
            held: None,
            buf: Vec::with_capacity(BLOCK_LEN),
            pos: 0,
            done: false,
            failed: None,
        })
    }

    /// Destroys the decrypting wrapper and returns the underlying
    /// `std::io::Read` object.
    pub fn into_inner(self) -> S {
        self.source
    }

    // Reads exactly one block, or nothing at the end of the stream.
    fn next_chunk(&mut self) -> io::Result<Option<[u8; BLOCK_LEN]>> {
        let mut chunk = [0u8; BLOCK_LEN];
        let mut filled = 0;
        while filled < BLOCK_LEN {
            match self.source.read(&mut chunk[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        self.crypted_len += filled;
        match filled {
            0 => Ok(None),
            BLOCK_LEN => Ok(Some(chunk)),
            _ => Err(self.fail(Error::InvalidLength(self.crypted_len))),
        }
    }

    // Decrypts the next block and releases the one held before it,
    // or runs the final checks once the source is exhausted.
    fn advance(&mut self) -> io::Result<()> {
        match self.next_chunk()? {
            Some(chunk) => {
                let block = self.chain.decrypt_chunk(&chunk);
                if self.pad.is_none() {
                    let pad = codec::read_header(&block).map_err(|e| self.fail(e))?;
                    self.pad = Some(pad);
                    self.skip = pad + 3;
                }
                if let Some(prev) = self.held.replace(block) {
                    self.release(&prev);
                }
            }
            None => {
                self.done = true;
                codec::check_length(self.crypted_len).map_err(|e| self.fail(e))?;
                let (last, pad) = match (self.held.take(), self.pad) {
                    (Some(last), Some(pad)) => (last, pad),
                    _ => return Err(self.fail(Error::InvalidLength(self.crypted_len))),
                };
                codec::body_len(self.crypted_len, pad).map_err(|e| self.fail(e))?;
                if last[1..].iter().any(|&b| b != 0) {
                    debug!("rejecting ciphertext stream: trailing zero run is corrupt");
                    return Err(self.fail(Error::IntegrityCheckFailed));
                }
                self.release(&last[..1]);
            }
        }
        Ok(())
    }

    fn release(&mut self, bytes: &[u8]) {
        let n = cmp::min(self.skip, bytes.len());
        self.skip -= n;
        self.buf.extend_from_slice(&bytes[n..]);
    }

    fn fail(&mut self, err: Error) -> io::Error {
        self.done = true;
        self.failed = Some(err.clone());
        err.into()
    }

}

impl<S: io::Read> io::Read for Reader<S> {

    /// Reads from `source`, decrypts the data, and writes the result
    /// to `buf`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(ref err) = self.failed {
            return Err(err.clone().into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos == self.buf.len() {
            if self.done {
                return Ok(0);
            }
            self.buf.clear();
            self.pos = 0;
            self.advance()?;
        }
        let n = cmp::min(buf.len(), self.buf.len() - self.pos);
        buf[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

}

#[test]
fn it_works() {
    use std::io::{Read, Write};
    use super::Writer;

    let key = b"123456789abcdef\0";
    for chunk_size in 1..65 {
        let input: Vec<u8> = (0u8..128).collect();
        let mut writer = Writer::new(io::Cursor::new(Vec::with_capacity(160)),
                                     key, input.len()).unwrap();
        for chunk in input.chunks(chunk_size) {
            assert_eq!(writer.write(chunk).unwrap(), chunk.len());
        }

        let crypted = writer.close().unwrap().into_inner();
        assert_eq!(crypted.len(), codec::encrypted_len(input.len()));

        let mut reader = Reader::new(io::Cursor::new(crypted), key).unwrap();
        let mut decrypted = vec![0u8; input.len() + 8];
        let mut got = 0;
        loop {
            let end = cmp::min(got + chunk_size, decrypted.len());
            let n = reader.read(&mut decrypted[got..end]).unwrap();
            if n == 0 {
                break;
            }
            got += n;
        }
        decrypted.truncate(got);
        assert_eq!(decrypted, input);
    }
}

#[test]
fn failures_stick() {
    use std::io::Read;

    let key = b"123456789abcdef\0";
    let mut crypted = codec::encrypt(b"The quick brown fox jumps over the lazy dog", key).unwrap();
    let last = crypted.len() - 1;
    crypted[last] ^= 0x80;

    let mut reader = Reader::new(io::Cursor::new(crypted), key).unwrap();
    let mut plain = Vec::new();
    let err = reader.read_to_end(&mut plain).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    let mut more = [0u8; 8];
    let again = reader.read(&mut more).unwrap_err();
    let inner = again.into_inner().unwrap().downcast::<Error>().unwrap();
    assert_eq!(*inner, Error::IntegrityCheckFailed);
}

#[test]
fn truncated_stream() {
    use std::io::Read;

    let key = b"123456789abcdef\0";
    let crypted = codec::encrypt(b"tea\0", key).unwrap();

    let mut reader = Reader::new(&crypted[..12], key).unwrap();
    let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(*err.into_inner().unwrap().downcast::<Error>().unwrap(), Error::InvalidLength(12));

    let mut reader = Reader::new(&crypted[..8], key).unwrap();
    let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(*err.into_inner().unwrap().downcast::<Error>().unwrap(), Error::InvalidLength(8));

    let mut reader = Reader::new(io::empty(), key).unwrap();
    assert!(reader.read_to_end(&mut Vec::new()).is_err());
}
