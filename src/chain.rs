//! The feedback chain that strings single-block TEA calls into a
//! message cipher.
//!
//! With `O_0 = M_0 = 0`, block `i` is encrypted as
//! `M_i = P_i ^ O_(i-1)`, `O_i = encipher(M_i) ^ M_(i-1)`, and
//! decrypted by running those two steps backwards.  Every block
//! depends on the finished state of the one before it, so a chain
//! only ever moves forward, one block at a time.

use zeroize::Zeroize;

use super::{cipher, mem};
use super::{Block, Key, BLOCK_LEN};

/// Per-message chaining state.  Make a new one for every message;
/// carrying one over from an earlier message breaks the feedback.
pub struct ChainState {
    key: Key,
    // O_(i-1): the last ciphertext block written or read.
    prev_output: Block,
    // M_(i-1): the last block fed to the raw cipher.
    prev_mixed: Block,
}

fn xor(a: &Block, b: &Block) -> Block {
    [a[0] ^ b[0], a[1] ^ b[1]]
}

impl ChainState {

    pub fn new(key: Key) -> ChainState {
        ChainState {
            key,
            prev_output: [0, 0],
            prev_mixed: [0, 0],
        }
    }

    /// Encrypts the next plaintext block and returns its ciphertext.
    pub fn encrypt_block(&mut self, plain: &Block) -> Block {
        let mixed = xor(plain, &self.prev_output);
        let output = xor(&cipher::encipher(&self.key, &mixed), &self.prev_mixed);
        self.prev_output = output;
        self.prev_mixed = mixed;
        output
    }

    /// Decrypts the next ciphertext block and returns its plaintext.
    pub fn decrypt_block(&mut self, output: &Block) -> Block {
        let mixed = cipher::decipher(&self.key, &xor(output, &self.prev_mixed));
        let plain = xor(&mixed, &self.prev_output);
        self.prev_output = *output;
        self.prev_mixed = mixed;
        plain
    }

    /// Encrypts an 8-byte chunk in place.
    pub fn encrypt_chunk(&mut self, chunk: &mut [u8]) {
        let output = self.encrypt_block(&mem::read_block(chunk));
        mem::write_block(&output, chunk);
    }

    /// Decrypts an 8-byte chunk.
    pub fn decrypt_chunk(&mut self, chunk: &[u8]) -> [u8; BLOCK_LEN] {
        mem::block_bytes(&self.decrypt_block(&mem::read_block(chunk)))
    }
}

impl Drop for ChainState {
    fn drop(&mut self) {
        self.key.zeroize();
        self.prev_output.zeroize();
        self.prev_mixed.zeroize();
    }
}

#[test]
fn first_block_is_plain_tea() {
    let key: Key = [1, 2, 3, 4];
    let plain: Block = [0xdead, 0xbeef];
    let mut chain = ChainState::new(key);
    assert_eq!(chain.encrypt_block(&plain), cipher::encipher(&key, &plain));
}

#[test]
fn feedback_links_blocks() {
    let key: Key = [1, 2, 3, 4];
    let plain: Block = [7, 7];

    let mut chain = ChainState::new(key);
    let o1 = chain.encrypt_block(&plain);
    let o2 = chain.encrypt_block(&plain);
    assert!(o1 != o2);

    // Second block by hand: M_2 = P_2 ^ O_1, O_2 = E(M_2) ^ M_1.
    let m1 = plain;
    let m2 = xor(&plain, &o1);
    assert_eq!(o2, xor(&cipher::encipher(&key, &m2), &m1));
}

#[test]
fn it_works() {
    let key: Key = [10, 20, 30, 42];
    let input: Vec<u8> = (0u8..128).collect();

    let mut crypted = input.clone();
    let mut encryptor = ChainState::new(key);
    for chunk in crypted.chunks_mut(BLOCK_LEN) {
        encryptor.encrypt_chunk(chunk);
    }
    assert!(crypted != input);

    let mut decryptor = ChainState::new(key);
    let decrypted: Vec<u8> = crypted.chunks(BLOCK_LEN)
        .flat_map(|chunk| decryptor.decrypt_chunk(chunk))
        .collect();
    assert_eq!(decrypted, input);
}

#[test]
fn corruption_propagates_forward() {
    let key: Key = [10, 20, 30, 42];
    let mut crypted = vec![0u8; 64];
    let mut encryptor = ChainState::new(key);
    for chunk in crypted.chunks_mut(BLOCK_LEN) {
        encryptor.encrypt_chunk(chunk);
    }
    crypted[17] ^= 0x01;

    let mut decryptor = ChainState::new(key);
    let blocks: Vec<[u8; BLOCK_LEN]> = crypted.chunks(BLOCK_LEN)
        .map(|chunk| decryptor.decrypt_chunk(chunk))
        .collect();
    assert_eq!(blocks[0], [0; BLOCK_LEN]);
    assert_eq!(blocks[1], [0; BLOCK_LEN]);
    for block in &blocks[2..] {
        assert!(*block != [0; BLOCK_LEN]);
    }
}
