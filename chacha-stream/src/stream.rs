//! Streaming ChaCha cipher context.
//!
//! Whole blocks are XORed straight into the data; only the trailing partial
//! block of a call is kept around for the next one.

use crate::{
    BLOCK_SIZE, ChaChaCore, Error, KEY_SIZE, Key,
    variants::{Legacy, Variant},
};
use cipher::{
    IvSizeUser, KeyIvInit, KeySizeUser, StreamCipher, StreamCipherError,
    consts::U32,
    generic_array::GenericArray,
    inout::InOutBuf,
    typenum::Unsigned,
};
use core::{
    cmp,
    fmt::{self, Debug},
};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Mutable half of a context: where in the keystream we are.
#[derive(Clone)]
struct Cursor {
    /// Counter of the next block to generate
    counter: u64,
    /// Counter the context was created with; positions are relative to it
    initial: u64,
    /// Most recently generated block
    buffer: [u8; BLOCK_SIZE],
    /// Number of leading `buffer` bytes already consumed. `BLOCK_SIZE` means
    /// the buffer holds nothing usable.
    offset: usize,
}

impl Cursor {
    fn new(counter: u64) -> Self {
        Self {
            counter,
            initial: counter,
            buffer: [0u8; BLOCK_SIZE],
            offset: BLOCK_SIZE,
        }
    }
}

#[cfg(feature = "zeroize")]
impl Drop for Cursor {
    fn drop(&mut self) {
        self.buffer.zeroize();
    }
}

/// ChaCha20 stream cipher context.
///
/// Owns a [`ChaChaCore`] (key and nonce, fixed at construction) and the
/// position in the keystream. Encryption and decryption are the same
/// operation. Splitting the data across any number of calls yields the same
/// bytes as one call over all of it.
///
/// The caller must never encrypt two different messages under the same key,
/// nonce and counter; the context has no way to detect this.
#[derive(Clone)]
pub struct ChaCha<V: Variant> {
    core: ChaChaCore<V>,
    cursor: Cursor,
}

impl<V: Variant> ChaCha<V> {
    /// Creates a context whose first keystream block uses `counter`.
    pub fn new_with_counter(
        key: &Key,
        nonce: &GenericArray<u8, V::NonceSize>,
        counter: V::Counter,
    ) -> Self {
        Self::from_core(ChaChaCore::new(key, nonce), counter.into())
    }

    /// Creates a context from byte slices, checking their lengths.
    ///
    /// # Errors
    /// [`Error::InvalidKeyLength`] unless the key is 32 bytes,
    /// [`Error::InvalidNonceLength`] unless the nonce matches the variant.
    pub fn from_slices(key: &[u8], nonce: &[u8], counter: V::Counter) -> Result<Self, Error> {
        if key.len() != KEY_SIZE {
            return Err(Error::InvalidKeyLength { len: key.len() });
        }

        let expected = V::NonceSize::USIZE;
        if nonce.len() != expected {
            return Err(Error::InvalidNonceLength {
                expected,
                len: nonce.len(),
            });
        }

        Ok(Self::new_with_counter(
            GenericArray::from_slice(key),
            GenericArray::from_slice(nonce),
            counter,
        ))
    }

    pub(crate) fn from_core(core: ChaChaCore<V>, counter: u64) -> Self {
        Self {
            core,
            cursor: Cursor::new(counter),
        }
    }

    /// XORs the keystream into `buf` in place.
    ///
    /// # Errors
    /// [`Error::CounterExhausted`] if the variant's counter cannot cover
    /// `buf`. Nothing is modified in that case.
    pub fn try_process(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.check_remaining(buf.len())?;
        self.xor_keystream(buf.into());
        Ok(())
    }

    /// XORs the keystream into `input`, writing the result to `output`.
    ///
    /// # Errors
    /// [`Error::BufferLengthMismatch`] if the slices differ in length,
    /// [`Error::CounterExhausted`] as for [`ChaCha::try_process`].
    pub fn try_process_b2b(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        let (input_len, output_len) = (input.len(), output.len());
        let buf = InOutBuf::new(input, output).map_err(|_| Error::BufferLengthMismatch {
            input: input_len,
            output: output_len,
        })?;

        self.check_remaining(buf.len())?;
        self.xor_keystream(buf);
        Ok(())
    }

    /// Counter of the next keystream block this context will generate.
    #[must_use]
    pub fn block_pos(&self) -> u64 {
        self.cursor.counter
    }

    /// Number of keystream bytes consumed since construction (or the
    /// position set by the last [`ChaCha::seek`]).
    #[must_use]
    pub fn current_pos(&self) -> u128 {
        let bs = BLOCK_SIZE as u128;
        let cursor = &self.cursor;

        if cursor.offset == BLOCK_SIZE {
            u128::from(cursor.counter.wrapping_sub(cursor.initial)) * bs
        } else {
            // the buffered block has already been counted
            let blocks = cursor.counter.wrapping_sub(1).wrapping_sub(cursor.initial);
            u128::from(blocks) * bs + cursor.offset as u128
        }
    }

    /// Moves to byte `pos` of the keystream, counted from the initial
    /// counter.
    ///
    /// # Errors
    /// [`Error::CounterExhausted`] if `pos` lies beyond the counter range.
    /// The position is left unchanged in that case.
    #[allow(clippy::cast_possible_truncation)]
    pub fn seek(&mut self, pos: u128) -> Result<(), Error> {
        let bs = BLOCK_SIZE as u128;
        let byte = (pos % bs) as usize;
        let blocks = u64::try_from(pos / bs).map_err(|_| Error::CounterExhausted)?;

        if let Some(limit) = V::COUNTER_LIMIT {
            let needed = u128::from(blocks) + u128::from(byte != 0);
            if u128::from(self.cursor.initial) + needed > u128::from(limit) {
                return Err(Error::CounterExhausted);
            }
        }

        let counter = self.cursor.initial.wrapping_add(blocks);
        if byte == 0 {
            self.cursor.counter = counter;
            self.cursor.offset = BLOCK_SIZE;
        } else {
            self.core.write_block(counter, &mut self.cursor.buffer);
            self.cursor.counter = counter.wrapping_add(1);
            self.cursor.offset = byte;
        }

        Ok(())
    }

    /// Checks that the counter can supply every fresh block a call of `len`
    /// bytes would generate.
    fn check_remaining(&self, len: usize) -> Result<(), Error> {
        let Some(limit) = V::COUNTER_LIMIT else {
            return Ok(());
        };

        let buffered = BLOCK_SIZE - self.cursor.offset;
        let fresh = len.saturating_sub(buffered) as u64;
        let needed = fresh.div_ceil(BLOCK_SIZE as u64);

        if needed > limit - self.cursor.counter {
            Err(Error::CounterExhausted)
        } else {
            Ok(())
        }
    }

    /// Applies the keystream to `buf`: buffered bytes first, then whole
    /// blocks, then one more block for the tail which is kept in the buffer.
    fn xor_keystream(&mut self, mut buf: InOutBuf<'_, '_, u8>) {
        let cursor = &mut self.cursor;

        if cursor.offset < BLOCK_SIZE {
            let n = cmp::min(buf.len(), BLOCK_SIZE - cursor.offset);
            let (mut head, tail) = buf.split_at(n);
            head.xor_in2out(&cursor.buffer[cursor.offset..cursor.offset + n]);
            cursor.offset += n;
            buf = tail;
        }

        let mut block = [0u8; BLOCK_SIZE];
        while buf.len() >= BLOCK_SIZE {
            let (mut head, tail) = buf.split_at(BLOCK_SIZE);
            self.core.write_block(cursor.counter, &mut block);
            head.xor_in2out(&block);
            cursor.counter = cursor.counter.wrapping_add(1);
            buf = tail;
        }

        #[cfg(feature = "zeroize")]
        block.zeroize();

        if !buf.is_empty() {
            let n = buf.len();
            self.core.write_block(cursor.counter, &mut cursor.buffer);
            cursor.counter = cursor.counter.wrapping_add(1);
            buf.xor_in2out(&cursor.buffer[..n]);
            cursor.offset = n;
        }
    }
}

impl ChaCha<Legacy> {
    /// XORs the keystream into `buf` in place.
    ///
    /// Never fails: the 64-bit counter wraps around after block
    /// `u64::MAX`.
    pub fn process(&mut self, buf: &mut [u8]) {
        self.xor_keystream(buf.into());
    }
}

impl<V: Variant> KeySizeUser for ChaCha<V> {
    type KeySize = U32;
}

impl<V: Variant> IvSizeUser for ChaCha<V> {
    type IvSize = V::NonceSize;
}

impl<V: Variant> KeyIvInit for ChaCha<V> {
    /// Starts at block counter 0.
    fn new(key: &Key, iv: &cipher::Iv<Self>) -> Self {
        Self::from_core(ChaChaCore::new(key, iv), 0)
    }
}

impl<V: Variant> StreamCipher for ChaCha<V> {
    fn try_apply_keystream_inout(
        &mut self,
        buf: InOutBuf<'_, '_, u8>,
    ) -> Result<(), StreamCipherError> {
        self.check_remaining(buf.len())
            .map_err(|_| StreamCipherError)?;
        self.xor_keystream(buf);
        Ok(())
    }
}

impl<V: Variant> Debug for ChaCha<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChaCha { .. }")
    }
}

#[cfg(feature = "zeroize")]
impl<V: Variant> ZeroizeOnDrop for ChaCha<V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChaCha20, ChaCha20Ietf, generate_block};

    const KEY: [u8; 32] = [0x11; 32];
    const NONCE: [u8; 8] = [0x22; 8];

    fn cipher(counter: u64) -> ChaCha20 {
        ChaCha20::new_with_counter(&KEY.into(), &NONCE.into(), counter)
    }

    #[test]
    fn fresh_context_has_empty_buffer() {
        let c = cipher(7);
        assert_eq!(c.cursor.offset, BLOCK_SIZE);
        assert_eq!(c.block_pos(), 7);
        assert_eq!(c.current_pos(), 0);
    }

    #[test]
    fn empty_input_changes_nothing() {
        let mut c = cipher(0);
        c.process(&mut []);
        assert_eq!(c.block_pos(), 0);
        assert_eq!(c.cursor.offset, BLOCK_SIZE);

        let mut buf = [0u8; 10];
        c.process(&mut buf);
        let before = (c.block_pos(), c.cursor.offset);
        c.process(&mut []);
        assert_eq!((c.block_pos(), c.cursor.offset), before);
    }

    #[test]
    fn partial_block_is_buffered() {
        let mut c = cipher(3);
        let mut buf = [0u8; 10];
        c.process(&mut buf);

        assert_eq!(c.block_pos(), 4);
        assert_eq!(c.cursor.offset, 10);
        assert_eq!(c.cursor.buffer, generate_block(&KEY.into(), &NONCE.into(), 3));
        assert_eq!(&buf[..], &c.cursor.buffer[..10]);
    }

    #[test]
    fn whole_blocks_bypass_buffer() {
        let mut c = cipher(0);
        let mut buf = [0u8; 2 * BLOCK_SIZE];
        c.process(&mut buf);

        assert_eq!(c.block_pos(), 2);
        assert_eq!(c.cursor.offset, BLOCK_SIZE);
        assert_eq!(c.cursor.buffer, [0u8; BLOCK_SIZE]);
    }

    #[test]
    fn buffer_drains_exactly() {
        let mut c = cipher(0);
        let mut buf = [0u8; 100];
        let (a, b) = buf.split_at_mut(40);
        c.process(a);
        assert_eq!(c.cursor.offset, 40);
        let (b, rest) = b.split_at_mut(24);
        c.process(b);
        assert_eq!(c.cursor.offset, BLOCK_SIZE);
        assert_eq!(c.block_pos(), 1);
        c.process(rest);
        assert_eq!(c.cursor.offset, 36);
        assert_eq!(c.block_pos(), 2);
    }

    #[test]
    fn legacy_counter_wraps() {
        let mut c = cipher(u64::MAX);
        let mut buf = [0u8; 2 * BLOCK_SIZE];
        c.process(&mut buf);
        assert_eq!(c.block_pos(), 1);
        assert_eq!(
            &buf[BLOCK_SIZE..],
            &generate_block(&KEY.into(), &NONCE.into(), 0)[..]
        );
    }

    #[test]
    fn ietf_counter_exhaustion() {
        let mut c = ChaCha20Ietf::new_with_counter(&KEY.into(), &[0; 12].into(), u32::MAX);

        let mut two_blocks = [0u8; 2 * BLOCK_SIZE];
        assert_eq!(c.try_process(&mut two_blocks), Err(Error::CounterExhausted));
        assert_eq!(two_blocks, [0u8; 2 * BLOCK_SIZE]);
        assert_eq!(c.block_pos(), u64::from(u32::MAX));

        let mut buf = [0u8; 40];
        c.try_process(&mut buf).unwrap();
        // the rest of the last block is still available
        let mut buf = [0u8; 24];
        c.try_process(&mut buf).unwrap();
        assert_eq!(c.block_pos(), 1 << 32);

        assert_eq!(c.try_process(&mut [0u8; 1]), Err(Error::CounterExhausted));
        c.try_process(&mut []).unwrap();
        assert!(c.apply_keystream_b2b(&[0u8; 1], &mut [0u8; 1]).is_err());
    }

    #[test]
    fn seek_round_trip() {
        let mut c = cipher(5);
        for pos in [0u128, 1, 63, 64, 65, 1000] {
            c.seek(pos).unwrap();
            assert_eq!(c.current_pos(), pos);
        }

        c.seek(130).unwrap();
        assert_eq!(c.block_pos(), 5 + 3);
        assert_eq!(c.cursor.offset, 2);
    }

    #[test]
    fn seek_to_end_of_legacy_range() {
        const END: u128 = 1 << 70;

        for initial in [0, 5, u64::MAX] {
            let mut c = cipher(initial);
            for pos in [END - 64, END - 63, END - 1] {
                c.seek(pos).unwrap();
                assert_eq!(c.current_pos(), pos);
            }

            // mid-block in the last block: the counter has wrapped to `initial`
            assert_eq!(c.block_pos(), initial);
            assert_eq!(c.cursor.offset, 63);

            let mut byte = [0u8; 1];
            c.process(&mut byte);
            // the position wraps along with the counter
            assert_eq!(c.current_pos(), 0);
            assert_eq!(c.block_pos(), initial);

            assert_eq!(c.seek(END), Err(Error::CounterExhausted));
            assert_eq!(c.seek(u128::MAX), Err(Error::CounterExhausted));
            assert_eq!(c.current_pos(), 0);
        }
    }

    #[test]
    fn seek_past_ietf_range() {
        let mut c = ChaCha20Ietf::new_with_counter(&KEY.into(), &[0; 12].into(), 0);
        let end = u128::from(u32::MAX) * BLOCK_SIZE as u128 + BLOCK_SIZE as u128;
        c.seek(end).unwrap();
        assert_eq!(c.seek(end + 1), Err(Error::CounterExhausted));
        assert_eq!(c.current_pos(), end);
    }

    #[test]
    fn b2b_length_mismatch() {
        let mut c = cipher(0);
        assert_eq!(
            c.try_process_b2b(&[0u8; 4], &mut [0u8; 5]),
            Err(Error::BufferLengthMismatch {
                input: 4,
                output: 5
            })
        );
        assert_eq!(c.block_pos(), 0);
    }

    #[test]
    fn slice_constructor_checks_lengths() {
        assert_eq!(
            ChaCha20::from_slices(&[0; 31], &[0; 8], 0).err(),
            Some(Error::InvalidKeyLength { len: 31 })
        );
        assert_eq!(
            ChaCha20::from_slices(&[0; 32], &[0; 12], 0).err(),
            Some(Error::InvalidNonceLength {
                expected: 8,
                len: 12
            })
        );
        assert_eq!(
            ChaCha20Ietf::from_slices(&[0; 32], &[0; 8], 0).err(),
            Some(Error::InvalidNonceLength {
                expected: 12,
                len: 8
            })
        );
        assert!(ChaCha20::from_slices(&[0; 32], &[0; 8], 0).is_ok());
    }
}
