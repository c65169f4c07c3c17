//! The streaming wrappers against the one-shot codec.

use std::io::{self, Cursor, Read, Write};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tea_codec::io::{Reader, Writer};
use tea_codec::{Codec, Error};

const KEY: &[u8; 16] = b"aabbccddeeffggh\0";

/// Hands out at most one byte per call.
struct Trickle<R>(R);

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(1);
        self.0.read(&mut buf[..n])
    }
}

fn error_of(err: io::Error) -> Error {
    *err.into_inner().unwrap().downcast::<Error>().unwrap()
}

#[test]
fn writer_matches_codec() {
    for len in 1..200 {
        let mut plain = vec![0u8; len];
        ChaCha8Rng::seed_from_u64(len as u64).fill_bytes(&mut plain);

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut writer = Writer::with_rng(Vec::new(), KEY, len, &mut rng).unwrap();
        for chunk in plain.chunks(7) {
            writer.write_all(chunk).unwrap();
        }
        let streamed = writer.close().unwrap();

        let mut codec = Codec::with_rng(KEY, ChaCha8Rng::seed_from_u64(99)).unwrap();
        assert_eq!(streamed, codec.encrypt(&plain).unwrap(), "length {}", len);
    }
}

#[test]
fn reader_matches_codec() {
    let mut codec = Codec::new(KEY).unwrap();
    for len in 1..200 {
        let plain: Vec<u8> = (0..len).map(|i| (i * 31) as u8).collect();
        let crypted = codec.encrypt(&plain).unwrap();

        let mut decrypted = Vec::new();
        Reader::new(Trickle(Cursor::new(&crypted)), KEY).unwrap()
            .read_to_end(&mut decrypted).unwrap();
        assert_eq!(decrypted, plain, "length {}", len);
    }
}

#[test]
fn reader_rejects_wrong_key() {
    let crypted = tea_codec::encrypt(b"The quick brown fox jumps over the lazy dog", KEY).unwrap();
    let mut reader = Reader::new(Cursor::new(crypted), b"123456789abcdef\0").unwrap();
    let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(error_of(err), Error::IntegrityCheckFailed);
}

#[test]
fn reader_rejects_tampering() {
    let crypted = tea_codec::encrypt(&[7u8; 40], KEY).unwrap();
    for at in 0..crypted.len() {
        let mut tampered = crypted.clone();
        tampered[at] ^= 0x10;
        let mut reader = Reader::new(Cursor::new(tampered), KEY).unwrap();
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(error_of(err), Error::IntegrityCheckFailed, "byte {}", at);
    }
}

#[test]
fn reader_rejects_ragged_length() {
    let mut crypted = tea_codec::encrypt(b"tea\0", KEY).unwrap();
    crypted.push(0);
    let mut reader = Reader::new(Cursor::new(crypted), KEY).unwrap();
    let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
    assert_eq!(error_of(err), Error::InvalidLength(17));
}

#[test]
fn writer_round_trips_through_reader() {
    let message = b"Hello World, from a stream that is longer than one block";
    let mut writer = Writer::new(Cursor::new(Vec::new()), KEY, message.len()).unwrap();
    for byte in message.iter() {
        writer.write_all(&[*byte]).unwrap();
        writer.flush().unwrap();
    }
    let crypted = writer.close().unwrap().into_inner();

    let mut reader = Reader::new(Cursor::new(crypted), KEY).unwrap();
    let mut s = String::new();
    reader.read_to_string(&mut s).unwrap();
    assert_eq!(s.as_bytes(), &message[..]);
    assert_eq!(reader.into_inner().position() as usize, tea_codec::encrypted_len(message.len()));
}
