//! SSE2 implementation of the block function for x86/x86_64.
//!
//! Each row of the 4x4 state lives in one 128-bit register, so a column
//! round is four lane-parallel quarter rounds. Diagonal rounds shuffle rows
//! 1-3 so that the diagonals line up as columns, then shuffle them back.

#![allow(unsafe_op_in_unsafe_fn)]

use crate::{BLOCK_SIZE, DOUBLE_ROUNDS, STATE_WORDS};

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn block(state: &[u32; STATE_WORDS], out: &mut [u8; BLOCK_SIZE]) {
    let init = load(state);
    let mut v = init;

    for _ in 0..DOUBLE_ROUNDS {
        double_quarter_round(&mut v);
    }

    for (row, orig) in v.iter_mut().zip(init.iter()) {
        *row = _mm_add_epi32(*row, *orig);
    }

    store(&v, out);
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn load(state: &[u32; STATE_WORDS]) -> [__m128i; 4] {
    let ptr = state.as_ptr().cast::<__m128i>();
    [
        _mm_loadu_si128(ptr),
        _mm_loadu_si128(ptr.add(1)),
        _mm_loadu_si128(ptr.add(2)),
        _mm_loadu_si128(ptr.add(3)),
    ]
}

/// x86 is little-endian, so storing the lanes serializes the words in the
/// byte order ChaCha requires.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn store(v: &[__m128i; 4], out: &mut [u8; BLOCK_SIZE]) {
    let ptr = out.as_mut_ptr().cast::<__m128i>();
    for (i, row) in v.iter().enumerate() {
        _mm_storeu_si128(ptr.add(i), *row);
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn double_quarter_round(v: &mut [__m128i; 4]) {
    add_xor_rot(v);
    rows_to_cols(v);
    add_xor_rot(v);
    cols_to_rows(v);
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rows_to_cols([_, b, c, d]: &mut [__m128i; 4]) {
    // b >>>= 32; c >>>= 64; d >>>= 96;
    *b = _mm_shuffle_epi32(*b, 0b_00_11_10_01); // _MM_SHUFFLE(0, 3, 2, 1)
    *c = _mm_shuffle_epi32(*c, 0b_01_00_11_10); // _MM_SHUFFLE(1, 0, 3, 2)
    *d = _mm_shuffle_epi32(*d, 0b_10_01_00_11); // _MM_SHUFFLE(2, 1, 0, 3)
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn cols_to_rows([_, b, c, d]: &mut [__m128i; 4]) {
    // b <<<= 32; c <<<= 64; d <<<= 96;
    *b = _mm_shuffle_epi32(*b, 0b_10_01_00_11); // _MM_SHUFFLE(2, 1, 0, 3)
    *c = _mm_shuffle_epi32(*c, 0b_01_00_11_10); // _MM_SHUFFLE(1, 0, 3, 2)
    *d = _mm_shuffle_epi32(*d, 0b_00_11_10_01); // _MM_SHUFFLE(0, 3, 2, 1)
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn add_xor_rot([a, b, c, d]: &mut [__m128i; 4]) {
    // a += b; d ^= a; d <<<= (16, 16, 16, 16);
    *a = _mm_add_epi32(*a, *b);
    *d = _mm_xor_si128(*d, *a);
    *d = _mm_xor_si128(_mm_slli_epi32(*d, 16), _mm_srli_epi32(*d, 16));

    // c += d; b ^= c; b <<<= (12, 12, 12, 12);
    *c = _mm_add_epi32(*c, *d);
    *b = _mm_xor_si128(*b, *c);
    *b = _mm_xor_si128(_mm_slli_epi32(*b, 12), _mm_srli_epi32(*b, 20));

    // a += b; d ^= a; d <<<= (8, 8, 8, 8);
    *a = _mm_add_epi32(*a, *b);
    *d = _mm_xor_si128(*d, *a);
    *d = _mm_xor_si128(_mm_slli_epi32(*d, 8), _mm_srli_epi32(*d, 24));

    // c += d; b ^= c; b <<<= (7, 7, 7, 7);
    *c = _mm_add_epi32(*c, *d);
    *b = _mm_xor_si128(*b, *c);
    *b = _mm_xor_si128(_mm_slli_epi32(*b, 7), _mm_srli_epi32(*b, 25));
}
