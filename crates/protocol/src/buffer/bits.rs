//! Bit packing
//!
//! Bits are packed most-significant first into an accumulator byte. The byte
//! is appended as soon as all 8 bits are written, or zero-padded and appended
//! by [`ByteBuffer::flush_bits`]. Every byte-aligned append flushes first, so
//! bit fields and whole-byte fields never share a byte.
//!
//! ```text
//! write_bit(1) write_bit(0) write_bit(1) flush_bits()
//!   -> 0b1010_0000
//! ```
//!
//! The read side keeps its own partial byte, fetched lazily from the read
//! cursor. Byte-aligned reads discard whatever is left of it, matching the
//! padding the writer emitted.

use wirebuf_core::{Result, WireError};

use super::{ByteBuffer, NO_PENDING_BITS};

/// Widest value `write_bits` / `read_bits` accept
pub const MAX_BIT_WIDTH: u32 = 64;

impl ByteBuffer {
    /// Pack one bit, returning it
    pub fn write_bit(&mut self, bit: bool) -> Result<bool> {
        let pos = self.bit_pos - 1;
        let val = if bit { self.bit_val | (1 << pos) } else { self.bit_val };

        if pos == 0 {
            self.push_raw(&[val])?;
            self.bit_pos = NO_PENDING_BITS;
            self.bit_val = 0;
        } else {
            self.bit_pos = pos;
            self.bit_val = val;
        }
        Ok(bit)
    }

    /// Pack the low `bits` bits of `value`, most significant first
    pub fn write_bits(&mut self, value: u64, bits: u32) -> Result<()> {
        check_width(bits)?;
        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Append the pending partial byte, zero-padded. No-op when nothing is pending.
    pub fn flush_bits(&mut self) -> Result<()> {
        if self.bit_pos == NO_PENDING_BITS {
            return Ok(());
        }
        let val = self.bit_val;
        self.push_raw(&[val])?;
        self.bit_pos = NO_PENDING_BITS;
        self.bit_val = 0;
        Ok(())
    }

    /// Number of bits written but not yet flushed
    pub fn pending_bits(&self) -> u8 {
        NO_PENDING_BITS - self.bit_pos
    }

    /// Unpack one bit, fetching a new byte when the current one is exhausted
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.read_bit_pos >= NO_PENDING_BITS {
            self.check_readable(1)?;
            self.read_bit_val = self.storage[self.rpos];
            self.read_bit_pos = 0;
            self.rpos += 1;
        }
        let bit = (self.read_bit_val >> (7 - self.read_bit_pos)) & 1 == 1;
        self.read_bit_pos += 1;
        Ok(bit)
    }

    /// Unpack a `bits`-wide value, most significant bit first
    ///
    /// On underrun the read cursor and bit state are restored.
    pub fn read_bits(&mut self, bits: u32) -> Result<u64> {
        check_width(bits)?;
        let mark = self.mark();
        let mut value = 0u64;
        for i in (0..bits).rev() {
            match self.read_bit() {
                Ok(true) => value |= 1 << i,
                Ok(false) => {}
                Err(e) => {
                    self.rewind(mark);
                    return Err(e);
                }
            }
        }
        Ok(value)
    }

    /// Pack a flag byte as a single bit (nonzero is set)
    pub fn write_byte_mask(&mut self, b: u8) -> Result<bool> {
        self.write_bit(b != 0)
    }

    /// Unpack a single bit as a flag byte (`1` or `0`)
    pub fn read_byte_mask(&mut self) -> Result<u8> {
        Ok(self.read_bit()? as u8)
    }

    /// Append `b ^ 1` when `b` is nonzero; zero bytes are implicit and write nothing
    pub fn write_byte_seq(&mut self, b: u8) -> Result<()> {
        if b != 0 {
            self.append(b ^ 1)?;
        }
        Ok(())
    }

    /// Decode a sequence byte against its mask byte `b`
    ///
    /// When `b` is nonzero the next stream byte is consumed and `b ^ byte` is
    /// returned; otherwise nothing is read and the result is `0`.
    pub fn read_byte_seq(&mut self, b: u8) -> Result<u8> {
        if b == 0 {
            return Ok(0);
        }
        Ok(b ^ self.read::<u8>()?)
    }
}

fn check_width(bits: u32) -> Result<()> {
    if bits > MAX_BIT_WIDTH {
        return Err(WireError::InvalidBitWidth(bits));
    }
    Ok(())
}
