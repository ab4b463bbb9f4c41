//! Immutable half of a ChaCha context: the key and nonce laid out as a
//! state template.

use crate::{
    BLOCK_SIZE, CONSTANTS, Key, STATE_WORDS, block::keystream_block, read_le_words,
    variants::Variant,
};
use cipher::generic_array::GenericArray;
use core::{
    fmt::{self, Debug},
    marker::PhantomData,
};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The ChaCha block function bound to one key and nonce.
///
/// Holds no counter: any block of the keystream can be computed from a shared
/// reference, which makes the core safe to use from several threads at once.
#[derive(Clone)]
pub struct ChaChaCore<V: Variant> {
    /// State with the counter words left at zero
    state: [u32; STATE_WORDS],
    _variant: PhantomData<V>,
}

impl<V: Variant> ChaChaCore<V> {
    /// Lays out the key and nonce words.
    pub fn new(key: &Key, nonce: &GenericArray<u8, V::NonceSize>) -> Self {
        let mut state = [0u32; STATE_WORDS];
        state[..4].copy_from_slice(&CONSTANTS);
        read_le_words(&mut state[4..12], key);
        read_le_words(&mut state[V::NONCE_INDEX..], nonce);

        Self {
            state,
            _variant: PhantomData,
        }
    }

    /// Computes the keystream block for `counter`.
    #[must_use]
    pub fn block(&self, counter: u64) -> [u8; BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE];
        self.write_block(counter, &mut out);
        out
    }

    #[inline]
    pub(crate) fn write_block(&self, counter: u64, out: &mut [u8; BLOCK_SIZE]) {
        let mut state = self.state;
        V::set_counter(&mut state, counter);
        keystream_block(&state, out);

        #[cfg(feature = "zeroize")]
        state.zeroize();
    }
}

impl<V: Variant> Debug for ChaChaCore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChaChaCore { .. }")
    }
}

#[cfg(feature = "zeroize")]
impl<V: Variant> Drop for ChaChaCore<V> {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl<V: Variant> ZeroizeOnDrop for ChaChaCore<V> {}
