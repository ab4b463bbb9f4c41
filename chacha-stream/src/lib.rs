//! Streaming implementation of the [ChaCha] family of stream ciphers.
//!
//! The primary cipher is [`ChaCha20`], the original "djb" construction with a
//! 64-bit nonce and a 64-bit block counter. [`ChaCha20Ietf`] is the RFC 8439
//! layout (96-bit nonce, 32-bit counter) and [`XChaCha20`] extends the nonce
//! to 192 bits.
//!
//! A cipher context can be fed input in chunks of any size: the output of a
//! sequence of calls is identical to a single call over the concatenated
//! input, down to calls of one byte each.
//!
//! Cipher functionality is also accessible through the traits of the
//! re-exported [`cipher`] crate.
//!
//! # ⚠️ Security Warning: Hazmat!
//!
//! This crate does not ensure ciphertexts are authentic! Thus ciphertext
//! integrity is not verified, which can lead to serious vulnerabilities!
//!
//! A (key, nonce, counter) triple must never be used to encrypt two different
//! messages. Nothing in this crate detects such reuse.
//!
//! # Example
//! ```
//! use chacha_stream::ChaCha20;
//! use hex_literal::hex;
//!
//! let key = [0x42; 32];
//! let nonce = [0x24; 8];
//! let plaintext = *b"attack at dawn, bring snacks";
//!
//! let mut cipher = ChaCha20::new_with_counter(&key.into(), &nonce.into(), 0);
//! let mut buffer = plaintext;
//! cipher.process(&mut buffer);
//! assert_ne!(buffer, plaintext);
//!
//! // decrypt in arbitrary chunks with a fresh context
//! let mut cipher = ChaCha20::new_with_counter(&key.into(), &nonce.into(), 0);
//! for chunk in buffer.chunks_mut(5) {
//!     cipher.process(chunk);
//! }
//! assert_eq!(buffer, plaintext);
//!
//! // the first block of the all-zero key and nonce
//! let mut block = [0u8; 16];
//! chacha_stream::apply_keystream(&[0; 32].into(), &[0; 8].into(), 0, &mut block);
//! assert_eq!(block, hex!("76b8e0ada0f13d90405d6ae55386bd28"));
//! ```
//!
//! On x86 and x86_64 the block function runs on SSE2 when the CPU supports it.
//! Building with `--cfg chacha_stream_backend="soft"` forces the portable
//! implementation.
//!
//! [ChaCha]: https://cr.yp.to/chacha.html

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use cipher;

mod block;
mod core_state;
mod error;
mod oneshot;
mod stream;
mod variants;
mod xchacha;

pub use crate::{
    block::{generate_block, generate_block_ietf},
    core_state::ChaChaCore,
    error::Error,
    oneshot::{apply_keystream, encrypt, xchacha20},
    stream::ChaCha,
    variants::{Ietf, Legacy, Variant},
    xchacha::{XChaCha20, hchacha},
};

use cipher::{
    consts::{U8, U12, U24, U32},
    generic_array::GenericArray,
};

/// Size of a ChaCha keystream block in bytes
pub const BLOCK_SIZE: usize = 64;

/// Size of a ChaCha20 key in bytes
pub const KEY_SIZE: usize = 32;

/// Number of 32-bit words in the ChaCha state
const STATE_WORDS: usize = 16;

/// State initialization constant ("expand 32-byte k")
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Number of double rounds in ChaCha20
const DOUBLE_ROUNDS: usize = 10;

/// Key type used by all ChaCha variants.
pub type Key = GenericArray<u8, U32>;

/// Nonce type used by [`ChaCha20`] (64-bit).
pub type Nonce = GenericArray<u8, U8>;

/// Nonce type used by [`ChaCha20Ietf`] (96-bit).
pub type IetfNonce = GenericArray<u8, U12>;

/// Nonce type used by [`XChaCha20`] (192-bit).
pub type XNonce = GenericArray<u8, U24>;

/// ChaCha20 stream cipher ("djb" construction with 64-bit nonce and 64-bit counter)
pub type ChaCha20 = ChaCha<Legacy>;

/// ChaCha20 stream cipher (RFC 8439 version with 96-bit nonce and 32-bit counter)
pub type ChaCha20Ietf = ChaCha<Ietf>;

/// The ChaCha quarter round function
#[inline(always)]
pub(crate) fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// Reads little-endian words from `src` into `dst`.
#[inline]
pub(crate) fn read_le_words(dst: &mut [u32], src: &[u8]) {
    debug_assert_eq!(dst.len() * 4, src.len());
    for (word, chunk) in dst.iter_mut().zip(src.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}
