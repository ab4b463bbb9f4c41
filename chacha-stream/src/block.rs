//! The ChaCha20 block function. Defined in RFC 8439 Section 2.3.
//!
//! <https://tools.ietf.org/html/rfc8439#section-2.3>
//!
//! The backend is picked per call: SSE2 on x86/x86_64 when the CPU has it,
//! the portable implementation everywhere else.

use crate::{BLOCK_SIZE, ChaChaCore, IetfNonce, Key, Nonce, STATE_WORDS};
use crate::variants::{Ietf, Legacy};
use cfg_if::cfg_if;

pub(crate) mod soft;

cfg_if! {
    if #[cfg(chacha_stream_backend = "soft")] {
        // portable implementation only
    } else if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        pub(crate) mod sse2;

        #[cfg(not(all(chacha_stream_backend = "sse2", target_feature = "sse2")))]
        cpufeatures::new!(sse2_cpuid, "sse2");
    }
}

/// Computes the keystream block for a fully populated `state` and writes it
/// to `out` as little-endian words.
#[inline]
pub(crate) fn keystream_block(state: &[u32; STATE_WORDS], out: &mut [u8; BLOCK_SIZE]) {
    cfg_if! {
        if #[cfg(chacha_stream_backend = "soft")] {
            soft::block(state, out);
        } else if #[cfg(all(chacha_stream_backend = "sse2", target_feature = "sse2"))] {
            // SAFETY: SSE2 is enabled for the whole compilation target
            unsafe { sse2::block(state, out) }
        } else if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
            if sse2_cpuid::get() {
                // SAFETY: the CPU reports SSE2 support
                unsafe { sse2::block(state, out) }
            } else {
                soft::block(state, out);
            }
        } else {
            soft::block(state, out);
        }
    }
}

/// Generates one 64-byte ChaCha20 keystream block for the "djb" layout.
///
/// Pure function of its inputs: the same key, nonce and counter always
/// produce the same block.
#[must_use]
pub fn generate_block(key: &Key, nonce: &Nonce, counter: u64) -> [u8; BLOCK_SIZE] {
    ChaChaCore::<Legacy>::new(key, nonce).block(counter)
}

/// Generates one 64-byte ChaCha20 keystream block for the RFC 8439 layout.
#[must_use]
pub fn generate_block_ietf(key: &Key, nonce: &IetfNonce, counter: u32) -> [u8; BLOCK_SIZE] {
    ChaChaCore::<Ietf>::new(key, nonce).block(counter.into())
}
