//! One-shot helpers: create a context, process one buffer, drop the context.

use crate::{ChaCha20, Error, Key, Nonce, XChaCha20, XNonce};

/// Encrypts or decrypts `buf` in place with ChaCha20, starting at block
/// `counter`.
pub fn apply_keystream(key: &Key, nonce: &Nonce, counter: u64, buf: &mut [u8]) {
    ChaCha20::new_with_counter(key, nonce, counter).process(buf);
}

/// Encrypts or decrypts `input` into `output` with ChaCha20, starting at
/// block `counter`.
///
/// # Errors
/// [`Error::BufferLengthMismatch`] if `input` and `output` differ in length.
pub fn encrypt(
    key: &Key,
    nonce: &Nonce,
    counter: u64,
    input: &[u8],
    output: &mut [u8],
) -> Result<(), Error> {
    ChaCha20::new_with_counter(key, nonce, counter).try_process_b2b(input, output)
}

/// Encrypts or decrypts `buf` in place with XChaCha20, starting at block
/// `counter`.
///
/// # Errors
/// [`Error::CounterExhausted`] if `buf` runs past the 32-bit counter.
pub fn xchacha20(key: &Key, nonce: &XNonce, counter: u32, buf: &mut [u8]) -> Result<(), Error> {
    XChaCha20::new_with_counter(key, nonce, counter).try_process(buf)
}
