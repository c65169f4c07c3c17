//! Bundles the `cipher` module and the block chain into a message
//! cipher with built-in padding.
//!
//! Before encryption a message is laid out as:
//!
//! ```text
//! offset 0         1 byte   random, low 3 bits = N (0..7)
//! offset 1..=N     N bytes  one random fill value, repeated
//! next 2 bytes              random, never checked
//! next L bytes              the plaintext
//! last 7 bytes              zero
//! ```
//!
//! `N` is picked so the whole layout is a multiple of 8 bytes, which
//! makes every ciphertext at least 16 bytes long.  On the way back
//! the repeated fill and the zero run are checked to catch a wrong
//! key or a corrupted ciphertext.  When `N` is 0 or 1 there is no
//! fill to compare and only the zero run is left to catch anything.

use log::{debug, trace};
use rand::rngs::ThreadRng;
use rand::{Rng, RngCore};
use zeroize::Zeroize;

use super::chain::ChainState;
use super::error::{Error, Result};
use super::{mem, Key, BLOCK_LEN};

/// Header byte, two random bytes and the zero run.
const OVERHEAD: usize = 10;
pub(crate) const ZERO_RUN: usize = 7;
const PAD_MASK: u8 = 0x07;

/// Number of fill bytes a plaintext of `plain_len` bytes gets.
pub fn padding_len(plain_len: usize) -> usize {
    (BLOCK_LEN - (plain_len + OVERHEAD) % BLOCK_LEN) % BLOCK_LEN
}

/// Length of the ciphertext for a plaintext of `plain_len` bytes.
///
/// # Example:
/// ```
/// assert_eq!(tea_codec::encrypted_len(4), 16);
/// assert_eq!(tea_codec::encrypted_len(7), 24);
/// ```
pub fn encrypted_len(plain_len: usize) -> usize {
    1 + padding_len(plain_len) + 2 + plain_len + ZERO_RUN
}

/// Lays out the header, fill and random bytes for a message with
/// `pad` fill bytes at the front of `buf`.  Returns how many bytes
/// were written.
pub(crate) fn write_header<R: RngCore>(rng: &mut R, pad: usize, buf: &mut [u8]) -> usize {
    buf[0] = (rng.gen::<u8>() & !PAD_MASK) | pad as u8;
    let fill: u8 = rng.gen();
    buf[1..=pad].fill(fill);
    buf[pad + 1] = rng.gen();
    buf[pad + 2] = rng.gen();
    pad + 3
}

/// Reads the fill count out of the first decrypted block and checks
/// that the fill bytes agree with each other.
pub(crate) fn read_header(first: &[u8; BLOCK_LEN]) -> Result<usize> {
    let pad = (first[0] & PAD_MASK) as usize;
    if pad > 1 && first[2..=pad].iter().any(|&b| b != first[1]) {
        debug!("rejecting ciphertext: {} fill bytes do not match", pad);
        return Err(Error::IntegrityCheckFailed);
    }
    Ok(pad)
}

pub(crate) fn check_length(crypted_len: usize) -> Result<()> {
    if crypted_len < 2 * BLOCK_LEN || crypted_len % BLOCK_LEN != 0 {
        debug!("rejecting ciphertext of {} bytes", crypted_len);
        return Err(Error::InvalidLength(crypted_len));
    }
    Ok(())
}

/// Plaintext length left once `pad` fill bytes and the fixed
/// overhead are taken off a ciphertext of `crypted_len` bytes.
pub(crate) fn body_len(crypted_len: usize, pad: usize) -> Result<usize> {
    match crypted_len.checked_sub(pad + OVERHEAD) {
        Some(len) => Ok(len),
        None => {
            debug!("rejecting ciphertext: {} fill bytes do not fit in {} bytes", pad, crypted_len);
            Err(Error::IntegrityCheckFailed)
        }
    }
}

/// A key together with the random source used for padding.
///
/// `Codec` keeps no chaining state between calls, so one value can
/// encrypt and decrypt any number of messages.  The default random
/// source is `rand`'s thread-local CSPRNG; `with_rng` swaps in
/// something else, e.g. a seeded generator for reproducible output.
///
/// # Example:
/// ```
/// use rand::rngs::mock::StepRng;
/// use tea_codec::Codec;
///
/// let mut codec = Codec::with_rng(b"123456789abcdef\0", StepRng::new(0, 0)).unwrap();
/// let crypted = codec.encrypt(b"tea\0").unwrap();
/// assert_eq!(crypted.len(), 16);
/// assert_eq!(codec.decrypt(&crypted).unwrap(), b"tea\0");
/// ```
pub struct Codec<R = ThreadRng> {
    key: Key,
    rng: R,
}

impl Codec<ThreadRng> {

    /// Creates a `Codec` for a 16-byte `key` that pads with the
    /// thread-local random generator.
    pub fn new(key: &[u8]) -> Result<Codec<ThreadRng>> {
        Codec::with_rng(key, rand::thread_rng())
    }

}

impl<R: RngCore> Codec<R> {

    /// Creates a `Codec` for a 16-byte `key` that pads with `rng`.
    pub fn with_rng(key: &[u8], rng: R) -> Result<Codec<R>> {
        Ok(Codec {
            key: mem::read_key(key)?,
            rng,
        })
    }

    /// Encrypts `plain` into a new buffer.
    pub fn encrypt(&mut self, plain: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0; encrypted_len(plain.len())];
        self.encrypt_into(plain, &mut out)?;
        Ok(out)
    }

    /// Encrypts `plain` into the front of `out` and returns the
    /// ciphertext length.  If `out` is too short nothing is written
    /// and the error carries the length needed.
    pub fn encrypt_into(&mut self, plain: &[u8], out: &mut [u8]) -> Result<usize> {
        if plain.is_empty() {
            return Err(Error::InvalidInput("plaintext must not be empty"));
        }
        let pad = padding_len(plain.len());
        let need = encrypted_len(plain.len());
        if out.len() < need {
            return Err(Error::BufferTooSmall { need, got: out.len() });
        }
        trace!("encrypting {} bytes with {} fill bytes", plain.len(), pad);

        let out = &mut out[..need];
        let start = write_header(&mut self.rng, pad, out);
        let (body, zeros) = out[start..].split_at_mut(plain.len());
        body.copy_from_slice(plain);
        zeros.fill(0);

        let mut chain = ChainState::new(self.key);
        for chunk in out.chunks_exact_mut(BLOCK_LEN) {
            chain.encrypt_chunk(chunk);
        }
        Ok(need)
    }

}

impl<R> Codec<R> {

    /// Decrypts `crypted` into a new buffer.
    pub fn decrypt(&self, crypted: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0; crypted.len().saturating_sub(OVERHEAD)];
        let len = self.decrypt_into(crypted, &mut out)?;
        out.truncate(len);
        Ok(out)
    }

    /// Decrypts `crypted` into the front of `out` and returns the
    /// plaintext length.  On any failure the part of `out` that was
    /// written is wiped again.
    pub fn decrypt_into(&self, crypted: &[u8], out: &mut [u8]) -> Result<usize> {
        check_length(crypted.len())?;

        let mut chain = ChainState::new(self.key);
        let (head, rest) = crypted.split_at(BLOCK_LEN);
        let first = chain.decrypt_chunk(head);
        let pad = read_header(&first)?;
        let len = body_len(crypted.len(), pad)?;
        if out.len() < len {
            return Err(Error::BufferTooSmall { need: len, got: out.len() });
        }
        trace!("decrypting {} bytes with {} fill bytes", len, pad);

        let out = &mut out[..len];
        let start = pad + 3;
        let end = start + len;
        let blocks = std::iter::once(first)
            .chain(rest.chunks_exact(BLOCK_LEN).map(|chunk| chain.decrypt_chunk(chunk)));
        for (i, block) in blocks.enumerate() {
            for (at, &byte) in (i * BLOCK_LEN..).zip(block.iter()) {
                if at < start {
                    continue;
                }
                if at < end {
                    out[at - start] = byte;
                } else if byte != 0 {
                    out.zeroize();
                    debug!("rejecting ciphertext: trailing zero run is corrupt");
                    return Err(Error::IntegrityCheckFailed);
                }
            }
        }
        Ok(len)
    }

}

impl<R> Drop for Codec<R> {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Encrypts `plain` under a 16-byte `key`, padding with the
/// thread-local random generator.
///
/// # Example:
/// ```
/// let crypted = tea_codec::encrypt(b"tea\0", b"123456789abcdef\0").unwrap();
/// assert_eq!(crypted.len(), 16);
/// assert!(tea_codec::encrypt(b"", b"123456789abcdef\0").is_err());
/// ```
pub fn encrypt(plain: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    Codec::new(key)?.encrypt(plain)
}

/// Decrypts `crypted` under a 16-byte `key`.
///
/// # Example:
/// ```
/// use tea_codec::Error;
///
/// let key = b"123456789abcdef\0";
/// let crypted = tea_codec::encrypt(b"tea\0", key).unwrap();
/// assert_eq!(tea_codec::decrypt(&crypted, key).unwrap(), b"tea\0");
/// assert_eq!(tea_codec::decrypt(&crypted[..8], key), Err(Error::InvalidLength(8)));
/// ```
pub fn decrypt(crypted: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    Codec::new(key)?.decrypt(crypted)
}

#[cfg(test)]
fn zero_codec() -> Codec<rand::rngs::mock::StepRng> {
    Codec::with_rng(b"123456789abcdef\0", rand::rngs::mock::StepRng::new(0, 0)).unwrap()
}

#[test]
fn padding_table() {
    let expected = [(1, 5), (4, 2), (5, 1), (6, 0), (7, 7), (13, 1), (14, 0), (22, 0)];
    for &(plain_len, pad) in expected.iter() {
        assert_eq!(padding_len(plain_len), pad, "plain_len {}", plain_len);
        assert_eq!(encrypted_len(plain_len) % BLOCK_LEN, 0);
        assert_eq!(encrypted_len(plain_len), plain_len + pad + OVERHEAD);
    }
}

#[test]
fn header_layout() {
    use rand::rngs::mock::StepRng;

    let mut buf = [0u8; 16];
    assert_eq!(write_header(&mut StepRng::new(0xff, 0), 3, &mut buf), 6);
    assert_eq!(&buf[..6], &[0xfb, 0xff, 0xff, 0xff, 0xff, 0xff]);

    let mut buf = [0u8; 16];
    assert_eq!(write_header(&mut StepRng::new(0, 1), 2, &mut buf), 5);
    assert_eq!(&buf[..5], &[0x02, 0x01, 0x01, 0x02, 0x03]);
}

#[test]
fn fill_check_is_vacuous_below_two() {
    assert_eq!(read_header(&[0x00, 1, 2, 3, 4, 5, 6, 7]), Ok(0));
    assert_eq!(read_header(&[0xf9, 1, 2, 3, 4, 5, 6, 7]), Ok(1));
    assert_eq!(read_header(&[0x02, 9, 9, 3, 4, 5, 6, 7]), Ok(2));
    assert_eq!(read_header(&[0x02, 9, 8, 3, 4, 5, 6, 7]), Err(Error::IntegrityCheckFailed));
    assert_eq!(read_header(&[0x07, 5, 5, 5, 5, 5, 5, 4]), Err(Error::IntegrityCheckFailed));
}

#[test]
fn pinned_vector() {
    let mut codec = zero_codec();
    let crypted = codec.encrypt(b"tea\0").unwrap();
    assert_eq!(crypted, [0xa3, 0x92, 0xfc, 0xd1, 0xfa, 0xc7, 0x4e, 0x92,
                         0x72, 0xc2, 0x11, 0xef, 0xe4, 0x2b, 0xfb, 0x7f]);
    assert_eq!(codec.decrypt(&crypted).unwrap(), b"tea\0");

    // The first block carries the header in the clear after one TEA call.
    let first = ChainState::new(codec.key).decrypt_chunk(&crypted[..BLOCK_LEN]);
    assert_eq!(first, [0x02, 0, 0, 0, 0, b't', b'e', b'a']);
}

#[test]
fn encrypt_into_reports_size() {
    let mut codec = zero_codec();
    let mut small = [0xaa; 15];
    assert_eq!(codec.encrypt_into(b"tea\0", &mut small),
               Err(Error::BufferTooSmall { need: 16, got: 15 }));
    assert_eq!(small, [0xaa; 15]);

    let mut big = [0xaa; 20];
    assert_eq!(codec.encrypt_into(b"tea\0", &mut big), Ok(16));
    assert_eq!(&big[16..], &[0xaa; 4]);
    assert_eq!(codec.encrypt_into(b"", &mut big),
               Err(Error::InvalidInput("plaintext must not be empty")));
}

#[test]
fn decrypt_into_reports_size() {
    let mut codec = zero_codec();
    let crypted = codec.encrypt(b"tea\0").unwrap();
    let mut small = [0u8; 3];
    assert_eq!(codec.decrypt_into(&crypted, &mut small),
               Err(Error::BufferTooSmall { need: 4, got: 3 }));
    let mut exact = [0u8; 4];
    assert_eq!(codec.decrypt_into(&crypted, &mut exact), Ok(4));
    assert_eq!(&exact, b"tea\0");
}

#[test]
fn failed_decrypt_leaves_no_plaintext() {
    let mut codec = zero_codec();
    let plain = b"The quick brown fox jumps over the lazy dog";
    let mut crypted = codec.encrypt(plain).unwrap();
    let last = crypted.len() - 1;
    crypted[last] ^= 0x80;

    let mut out = [0xaa; 64];
    assert_eq!(codec.decrypt_into(&crypted, &mut out), Err(Error::IntegrityCheckFailed));
    assert!(out[..plain.len()].iter().all(|&b| b == 0));
    assert!(out[plain.len()..].iter().all(|&b| b == 0xaa));
}

#[test]
fn bad_lengths() {
    let codec = zero_codec();
    for &len in [0, 1, 8, 15, 17, 23, 31].iter() {
        assert_eq!(codec.decrypt(&vec![0; len]), Err(Error::InvalidLength(len)));
    }
}

#[test]
fn header_longer_than_message() {
    // A 16-byte ciphertext whose header claims 7 fill bytes, all equal.
    let codec = zero_codec();
    let mut forged = [0x07, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut chain = ChainState::new(codec.key);
    for chunk in forged.chunks_exact_mut(BLOCK_LEN) {
        chain.encrypt_chunk(chunk);
    }
    assert_eq!(codec.decrypt(&forged), Err(Error::IntegrityCheckFailed));
}
