//! Byte twiddling utilities: moving between `[u8]` and the word
//! views (`Block`, `Key`) the cipher works on.  Words always travel
//! in network byte order, so ciphertext is the same on every host.

use byteorder::{BigEndian, ByteOrder};

use super::error::{Error, Result};
use super::{Block, Key, BLOCK_LEN, KEY_LEN};

/// Reads an 8-byte chunk as a `Block`.
pub fn read_block(chunk: &[u8]) -> Block {
    debug_assert_eq!(chunk.len(), BLOCK_LEN);
    [BigEndian::read_u32(&chunk[..4]), BigEndian::read_u32(&chunk[4..])]
}

/// Writes `block` into an 8-byte chunk.
pub fn write_block(block: &Block, chunk: &mut [u8]) {
    debug_assert_eq!(chunk.len(), BLOCK_LEN);
    BigEndian::write_u32_into(block, chunk);
}

/// Returns `block` as 8 bytes.
pub fn block_bytes(block: &Block) -> [u8; BLOCK_LEN] {
    let mut bytes = [0; BLOCK_LEN];
    write_block(block, &mut bytes);
    bytes
}

/// Reads a 16-byte key.  Any 16 bytes are accepted.
pub fn read_key(bytes: &[u8]) -> Result<Key> {
    if bytes.len() != KEY_LEN {
        return Err(Error::InvalidInput("key must be exactly 16 bytes"));
    }
    let mut key: Key = [0; 4];
    BigEndian::read_u32_into(bytes, &mut key);
    Ok(key)
}

#[test]
fn words_are_big_endian() {
    let bytes = [1, 2, 3, 4, 5, 6, 7, 8];
    let block = read_block(&bytes);
    assert_eq!(block, [0x01020304, 0x05060708]);
    assert_eq!(block_bytes(&block), bytes);
}

#[test]
fn key_length_is_checked() {
    let key = read_key(b"123456789abcdef\0").unwrap();
    assert_eq!(key, [0x31323334, 0x35363738, 0x39616263, 0x64656600]);
    assert_eq!(read_key(b"123456789abcdef"),
               Err(Error::InvalidInput("key must be exactly 16 bytes")));
    assert!(read_key(&[0; 17]).is_err());
}
