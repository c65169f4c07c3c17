//! Implements the basic TEA cipher routines as described in the
//! paper (http://en.wikipedia.org/wiki/Tiny_Encryption_Algorithm),
//! cut down to the 16 rounds QQ-style protocols use.  These functions
//! only deal with a single 64-bit block of data at a time.

use super::{Block, Key};

const NUM_ROUNDS: u32 = 16;
const DELTA: u32 = 0x9E3779B9;

// Both halves of a round mix one word with a pair of key words.
#[inline]
fn mix(v: u32, sum: u32, k0: u32, k1: u32) -> u32 {
    ((v << 4).wrapping_add(k0)) ^ v.wrapping_add(sum) ^ ((v >> 5).wrapping_add(k1))
}

/// Encrypts 64 bits of `input` using the `key`.
///
/// # Example:
/// ```
/// use tea_codec::cipher;
///
/// let key = [5, 6, 7, 8];
/// let plaintext = [128, 256];
/// assert!(cipher::encipher(&key, &plaintext) != plaintext);
/// ```
pub fn encipher(key: &Key, input: &Block) -> Block {
    let [mut y, mut z] = *input;
    let [a, b, c, d] = *key;
    let mut sum: u32 = 0;
    for _ in 0..NUM_ROUNDS {
        sum = sum.wrapping_add(DELTA);
        y = y.wrapping_add(mix(z, sum, a, b));
        z = z.wrapping_add(mix(y, sum, c, d));
    }
    [y, z]
}

/// Decrypts 64 bits of `input` using the `key`.
///
/// # Example:
/// ```
/// use tea_codec::cipher;
///
/// let key = [5, 6, 7, 8];
/// let plaintext = [128, 256];
/// let crypted = cipher::encipher(&key, &plaintext);
/// assert_eq!(cipher::decipher(&key, &crypted), plaintext);
/// ```
pub fn decipher(key: &Key, input: &Block) -> Block {
    let [mut y, mut z] = *input;
    let [a, b, c, d] = *key;
    let mut sum = DELTA.wrapping_mul(NUM_ROUNDS);
    for _ in 0..NUM_ROUNDS {
        z = z.wrapping_sub(mix(y, sum, c, d));
        y = y.wrapping_sub(mix(z, sum, a, b));
        sum = sum.wrapping_sub(DELTA);
    }
    [y, z]
}

#[test]
fn it_works() {
    let key: Key = [10, 20, 30, 42];
    let plaintext: Block = [300, 400];
    let ciphertext = encipher(&key, &plaintext);
    assert!(plaintext != ciphertext);
    assert_eq!(plaintext, decipher(&key, &ciphertext));
}

#[test]
fn known_answer() {
    let key: Key = [0x01020304, 0x05060708, 0x090a0b0c, 0x0d0e0f00];
    let plaintext: Block = [0x01020304, 0x05060708];
    let ciphertext: Block = [0x56276ba9, 0x80b9ec16];
    assert_eq!(encipher(&key, &plaintext), ciphertext);
    assert_eq!(decipher(&key, &ciphertext), plaintext);
}

#[test]
fn zero_key_zero_block() {
    assert_eq!(encipher(&[0; 4], &[0, 0]), [0xa889f798, 0x182d8083]);
}

#[test]
fn decipher_inverts_encipher() {
    use rand::{Rng, SeedableRng};

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0x7ea);
    for _ in 0..10_000 {
        let key: Key = rng.gen();
        let block: Block = rng.gen();
        assert_eq!(decipher(&key, &encipher(&key, &block)), block);
        assert_eq!(encipher(&key, &decipher(&key, &block)), block);
    }
}
