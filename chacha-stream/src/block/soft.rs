//! Portable implementation which does not rely on architecture-specific
//! intrinsics.

use crate::{BLOCK_SIZE, DOUBLE_ROUNDS, STATE_WORDS, quarter_round};

/// Applies the 20 ChaCha rounds to `state` in place, without the final
/// feed-forward addition.
#[inline(always)]
pub(crate) fn permute(state: &mut [u32; STATE_WORDS]) {
    for _ in 0..DOUBLE_ROUNDS {
        // column rounds
        quarter_round(0, 4, 8, 12, state);
        quarter_round(1, 5, 9, 13, state);
        quarter_round(2, 6, 10, 14, state);
        quarter_round(3, 7, 11, 15, state);

        // diagonal rounds
        quarter_round(0, 5, 10, 15, state);
        quarter_round(1, 6, 11, 12, state);
        quarter_round(2, 7, 8, 13, state);
        quarter_round(3, 4, 9, 14, state);
    }
}

#[inline(always)]
fn run_rounds(state: &[u32; STATE_WORDS]) -> [u32; STATE_WORDS] {
    let mut res = *state;
    permute(&mut res);

    for (s1, s0) in res.iter_mut().zip(state.iter()) {
        *s1 = s1.wrapping_add(*s0);
    }
    res
}

#[inline]
pub(crate) fn block(state: &[u32; STATE_WORDS], out: &mut [u8; BLOCK_SIZE]) {
    let res = run_rounds(state);

    for (chunk, val) in out.chunks_exact_mut(4).zip(res.iter()) {
        chunk.copy_from_slice(&val.to_le_bytes());
    }
}
