//! Distinguishing features of ChaCha variants.
//!
//! Both layouts share words 0..12 (constants and key). They differ in how
//! words 12..16 are split between the block counter and the nonce.

use crate::STATE_WORDS;
use cipher::{
    consts::{U8, U12},
    generic_array::ArrayLength,
};
use core::fmt::Debug;

/// A trait that distinguishes the ChaCha state layouts
pub trait Variant: Clone + Copy + Debug + Default + 'static {
    /// Nonce size in bytes
    type NonceSize: ArrayLength<u8> + 'static;

    /// Type of the initial block counter accepted at construction
    type Counter: Copy + Debug + Into<u64>;

    /// Index of the first nonce word in the state
    const NONCE_INDEX: usize;

    /// Number of block counter values, or `None` when the counter wraps
    /// around silently.
    const COUNTER_LIMIT: Option<u64>;

    /// Writes `counter` into `state[12..NONCE_INDEX]`.
    fn set_counter(state: &mut [u32; STATE_WORDS], counter: u64);
}

/// The original "djb" layout: 64-bit counter in words 12 and 13 (low word
/// first), 64-bit nonce in words 14 and 15.
#[derive(Clone, Copy, Debug, Default)]
pub struct Legacy;

impl Variant for Legacy {
    type NonceSize = U8;
    type Counter = u64;
    const NONCE_INDEX: usize = 14;
    // The low word carries into the high word; running past 2^70 bytes under
    // one nonce is the caller's responsibility.
    const COUNTER_LIMIT: Option<u64> = None;

    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)]
    fn set_counter(state: &mut [u32; STATE_WORDS], counter: u64) {
        state[12] = counter as u32;
        state[13] = (counter >> 32) as u32;
    }
}

/// The RFC 8439 layout: 32-bit counter in word 12, 96-bit nonce in words
/// 13 to 15.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ietf;

impl Variant for Ietf {
    type NonceSize = U12;
    type Counter = u32;
    const NONCE_INDEX: usize = 13;
    const COUNTER_LIMIT: Option<u64> = Some(1 << 32);

    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)]
    fn set_counter(state: &mut [u32; STATE_WORDS], counter: u64) {
        debug_assert!(counter < (1 << 32));
        state[12] = counter as u32;
    }
}
