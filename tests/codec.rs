//! End-to-end behaviour of the message codec.

use rand::rngs::mock::StepRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tea_codec::{decrypt, encrypt, encrypted_len, padding_len, Codec, Error};

const KEY: &[u8; 16] = b"123456789abcdef\0";
const OTHER_KEY: &[u8; 16] = b"fedcba987654321\0";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn seeded_codec(seed: u64) -> (Codec<ChaCha8Rng>, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let key: [u8; 16] = rng.gen();
    let codec = Codec::with_rng(&key, ChaCha8Rng::seed_from_u64(!seed)).unwrap();
    (codec, rng)
}

#[test]
fn round_trip_every_length() {
    init_logging();
    for len in 1..=4096 {
        let (mut codec, mut rng) = seeded_codec(len as u64);
        let mut plain = vec![0u8; len];
        rng.fill_bytes(&mut plain);

        let crypted = codec.encrypt(&plain).unwrap();
        assert_eq!(crypted.len(), encrypted_len(len));
        assert_eq!(codec.decrypt(&crypted).unwrap(), plain, "length {}", len);
    }
}

#[test]
fn length_invariants() {
    for len in 1..512 {
        let crypted = encrypt(&vec![0x5a; len], KEY).unwrap();
        assert_eq!(crypted.len() % 8, 0);
        assert!(crypted.len() >= len + 10);
        assert!(crypted.len() >= 16);
        assert_eq!(crypted.len(), len + padding_len(len) + 10);
    }
}

#[test]
fn reference_vectors() {
    init_logging();
    let vectors: [(u64, [u8; 16]); 2] = [
        (0, [0xa3, 0x92, 0xfc, 0xd1, 0xfa, 0xc7, 0x4e, 0x92,
             0x72, 0xc2, 0x11, 0xef, 0xe4, 0x2b, 0xfb, 0x7f]),
        (u64::MAX, [0x10, 0x62, 0x89, 0x4d, 0xdd, 0xb9, 0xeb, 0x30,
                    0x44, 0x6a, 0xc5, 0x19, 0x62, 0x41, 0xa1, 0x2a]),
    ];
    for (fill, expected) in vectors.iter() {
        // L = 4 gives N = 2 and a single 16-byte ciphertext.
        assert_eq!(padding_len(4), 2);
        let mut codec = Codec::with_rng(KEY, StepRng::new(*fill, 0)).unwrap();
        let crypted = codec.encrypt(b"tea\0").unwrap();
        assert_eq!(&crypted[..], &expected[..]);

        assert_eq!(decrypt(expected, KEY).unwrap(), b"tea\0");
        assert_eq!(decrypt(expected, OTHER_KEY), Err(Error::IntegrityCheckFailed));
    }
}

#[test]
fn wrong_key_is_detected() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..1000 {
        let key: [u8; 16] = rng.gen();
        let mut wrong: [u8; 16] = rng.gen();
        if wrong == key {
            wrong[0] ^= 1;
        }
        let len = rng.gen_range(1..64);
        let mut plain = vec![0u8; len];
        rng.fill_bytes(&mut plain);

        let crypted = Codec::with_rng(&key, &mut rng).unwrap().encrypt(&plain).unwrap();
        assert_eq!(decrypt(&crypted, &wrong), Err(Error::IntegrityCheckFailed));
    }
}

#[test]
fn every_bit_flip_is_detected() {
    init_logging();
    let mut codec = Codec::with_rng(KEY, ChaCha8Rng::seed_from_u64(7)).unwrap();
    let plain: Vec<u8> = (0u8..100).collect();
    let crypted = codec.encrypt(&plain).unwrap();

    for at in 0..crypted.len() {
        for bit in 0..8 {
            let mut tampered = crypted.clone();
            tampered[at] ^= 1 << bit;
            assert_eq!(codec.decrypt(&tampered), Err(Error::IntegrityCheckFailed),
                       "byte {} bit {}", at, bit);
        }
    }
}

#[test]
fn short_fill_relies_on_zero_run() {
    // Five and six byte messages get one and zero fill bytes, so
    // there is nothing in the header to compare; only the trailing
    // zero run catches damage further down the stream.
    for &(len, pad) in [(5usize, 1usize), (6, 0), (13, 1), (14, 0)].iter() {
        assert_eq!(padding_len(len), pad);
        let mut codec = Codec::with_rng(KEY, StepRng::new(0, 0)).unwrap();
        let plain = vec![0x42; len];
        let crypted = codec.encrypt(&plain).unwrap();
        assert_eq!(codec.decrypt(&crypted).unwrap(), plain);

        for at in 8..crypted.len() {
            let mut tampered = crypted.clone();
            tampered[at] ^= 0x01;
            assert_eq!(codec.decrypt(&tampered), Err(Error::IntegrityCheckFailed),
                       "length {} byte {}", len, at);
        }
    }
}

#[test]
fn invalid_input() {
    assert_eq!(encrypt(b"", KEY), Err(Error::InvalidInput("plaintext must not be empty")));
    assert_eq!(encrypt(b"tea", &KEY[..15]), Err(Error::InvalidInput("key must be exactly 16 bytes")));
    assert_eq!(decrypt(&[0; 16], b"short"), Err(Error::InvalidInput("key must be exactly 16 bytes")));
    for &len in [0usize, 7, 8, 12, 20, 33].iter() {
        assert_eq!(decrypt(&vec![0; len], KEY), Err(Error::InvalidLength(len)));
    }
}

#[test]
fn failures_repeat() {
    let crypted = encrypt(b"attack at dawn", KEY).unwrap();
    let first = decrypt(&crypted, OTHER_KEY);
    let second = decrypt(&crypted, OTHER_KEY);
    assert_eq!(first, Err(Error::IntegrityCheckFailed));
    assert_eq!(first, second);

    let short = &crypted[..crypted.len() - 4];
    assert_eq!(decrypt(short, KEY), decrypt(short, KEY));
    assert_eq!(decrypt(short, KEY), Err(Error::InvalidLength(crypted.len() - 4)));

    // A codec keeps no state between calls either.
    let codec = Codec::new(OTHER_KEY).unwrap();
    assert_eq!(codec.decrypt(&crypted), codec.decrypt(&crypted));
    assert_eq!(decrypt(&crypted, KEY).unwrap(), b"attack at dawn");
}

#[test]
fn padding_is_randomised() {
    let mut codec = Codec::new(KEY).unwrap();
    let a = codec.encrypt(b"same message").unwrap();
    let b = codec.encrypt(b"same message").unwrap();
    assert_eq!(a.len(), b.len());
    assert!(a != b);
    assert_eq!(codec.decrypt(&a).unwrap(), codec.decrypt(&b).unwrap());
}
