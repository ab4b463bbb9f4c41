//! XChaCha is an extended nonce variant of ChaCha

use crate::{
    CONSTANTS, ChaCha, Error, IetfNonce, Key, STATE_WORDS, XNonce, block::soft,
    read_le_words, variants::Ietf,
};
use cipher::{
    IvSizeUser, KeyIvInit, KeySizeUser, StreamCipher, StreamCipherError,
    consts::{U16, U24, U32},
    generic_array::GenericArray,
    inout::InOutBuf,
};
use core::fmt::{self, Debug};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

/// XChaCha20 stream cipher: ChaCha20 with an extended 192-bit (24-byte)
/// nonce.
///
/// The first 16 nonce bytes derive a subkey through [`hchacha`]; the
/// remaining 8 bytes, prefixed with four zero bytes, form the nonce of an RFC
/// 8439 context under that subkey.
///
/// <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-xchacha>
#[derive(Clone)]
pub struct XChaCha20(ChaCha<Ietf>);

impl XChaCha20 {
    /// Creates a context whose first keystream block uses `counter`.
    pub fn new_with_counter(key: &Key, nonce: &XNonce, counter: u32) -> Self {
        #[allow(unused_mut)]
        let mut subkey = hchacha(key, GenericArray::from_slice(&nonce[..16]));

        let mut ietf_nonce = IetfNonce::default();
        // first 4 bytes are 0, last 8 bytes are last 8 from the nonce
        ietf_nonce[4..].copy_from_slice(&nonce[16..]);

        let cipher = ChaCha::new_with_counter(&subkey, &ietf_nonce, counter);

        #[cfg(feature = "zeroize")]
        subkey.as_mut_slice().zeroize();

        Self(cipher)
    }

    /// XORs the keystream into `buf` in place.
    ///
    /// # Errors
    /// [`Error::CounterExhausted`] if the 32-bit counter cannot cover `buf`.
    pub fn try_process(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.0.try_process(buf)
    }

    /// Counter of the next keystream block.
    #[must_use]
    pub fn block_pos(&self) -> u64 {
        self.0.block_pos()
    }

    /// Number of keystream bytes consumed.
    #[must_use]
    pub fn current_pos(&self) -> u128 {
        self.0.current_pos()
    }

    /// Moves to byte `pos` of the keystream.
    ///
    /// # Errors
    /// [`Error::CounterExhausted`] if `pos` lies beyond the counter range.
    pub fn seek(&mut self, pos: u128) -> Result<(), Error> {
        self.0.seek(pos)
    }
}

impl KeySizeUser for XChaCha20 {
    type KeySize = U32;
}

impl IvSizeUser for XChaCha20 {
    type IvSize = U24;
}

impl KeyIvInit for XChaCha20 {
    fn new(key: &Key, iv: &XNonce) -> Self {
        Self::new_with_counter(key, iv, 0)
    }
}

impl StreamCipher for XChaCha20 {
    fn try_apply_keystream_inout(
        &mut self,
        buf: InOutBuf<'_, '_, u8>,
    ) -> Result<(), StreamCipherError> {
        self.0.try_apply_keystream_inout(buf)
    }
}

impl Debug for XChaCha20 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("XChaCha20 { .. }")
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for XChaCha20 {}

/// The HChaCha function: adapts the ChaCha core function in the same
/// manner that HSalsa adapts the Salsa function.
///
/// HChaCha takes 512-bits of input:
///
/// - Constants: `u32` x 4
/// - Key: `u32` x 8
/// - Nonce: `u32` x 4
///
/// It produces 256-bits of output suitable for use as a ChaCha key
///
/// For more information on HSalsa on which HChaCha is based, see:
///
/// <http://cr.yp.to/snuffle/xsalsa-20110204.pdf>
#[must_use]
pub fn hchacha(key: &Key, input: &GenericArray<u8, U16>) -> GenericArray<u8, U32> {
    let mut state = [0u32; STATE_WORDS];
    state[..4].copy_from_slice(&CONSTANTS);
    read_le_words(&mut state[4..12], key);
    read_le_words(&mut state[12..16], input);

    // no feed-forward: the output words are taken straight from the
    // permuted state
    soft::permute(&mut state);

    let mut output = GenericArray::default();

    for (chunk, val) in output[..16].chunks_exact_mut(4).zip(&state[..4]) {
        chunk.copy_from_slice(&val.to_le_bytes());
    }

    for (chunk, val) in output[16..].chunks_exact_mut(4).zip(&state[12..]) {
        chunk.copy_from_slice(&val.to_le_bytes());
    }

    #[cfg(feature = "zeroize")]
    state.zeroize();

    output
}
