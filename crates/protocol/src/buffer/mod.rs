//! # Byte Buffer
//!
//! Growable wire buffer with independent read and write cursors.
//!
//! ## Layout
//!
//! ```text
//! 0            rpos              wpos             capacity
//! |-- consumed --|--- readable ----|--- zero-filled ---|
//! ```
//!
//! The storage is always zero-filled past `wpos`, so positional reads
//! ([`ByteBuffer::read_at`]) may look anywhere below the capacity while
//! sequential reads ([`ByteBuffer::read`]) stop at the write cursor.
//!
//! ## Wire Conventions
//! - Fixed-width values are little-endian ([`WireType`])
//! - Strings are raw bytes followed by a single `0` terminator
//! - Bit fields are packed MSB first, see [`bits`]
//! - Identifiers and positions have compact encodings, see [`packing`]
//!
//! ## Growth
//!
//! Storage is reallocated only when an append would pass the capacity, and then
//! to `wpos + size + headroom`. It never shrinks implicitly; [`ByteBuffer::trim`]
//! cuts it down to the written length.
//!
//! ## Example
//!
//! ```rust
//! use wirebuf_protocol::ByteBuffer;
//!
//! let mut buf = ByteBuffer::new();
//! buf.write(7u8)?.write(0x1234_5678u32)?;
//! buf.append_str("Thrall")?;
//!
//! assert_eq!(buf.read::<u8>()?, 7);
//! assert_eq!(buf.read::<u32>()?, 0x1234_5678);
//! assert_eq!(buf.read_string()?, "Thrall");
//! # Ok::<(), wirebuf_core::WireError>(())
//! ```

pub mod bits;
pub mod packing;

use bytes::Bytes;
use wirebuf_config::{WireConfig, DEFAULT_GROWTH_HEADROOM, DEFAULT_INITIAL_CAPACITY};
use wirebuf_core::{Result, WireError};

use crate::wire::WireType;

/// Bit position meaning "no partial byte pending"
pub(crate) const NO_PENDING_BITS: u8 = 8;

/// Binary wire buffer
///
/// Cloning produces an independent deep copy with both cursors and any
/// pending bit state preserved exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct ByteBuffer {
    storage: Vec<u8>,
    rpos: usize,
    wpos: usize,
    /// Free bits left in `bit_val`; 8 when nothing is pending
    bit_pos: u8,
    bit_val: u8,
    /// Bits already consumed from `read_bit_val`; 8 when exhausted
    read_bit_pos: u8,
    read_bit_val: u8,
    headroom: usize,
}

/// Saved read-side state, used to rewind a multi-step read that failed
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadMark {
    rpos: usize,
    read_bit_pos: u8,
    read_bit_val: u8,
}

impl ByteBuffer {
    /// Create an empty buffer with the default initial capacity (10 bytes)
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Create an empty, zero-filled buffer of `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            rpos: 0,
            wpos: 0,
            bit_pos: NO_PENDING_BITS,
            bit_val: 0,
            read_bit_pos: NO_PENDING_BITS,
            read_bit_val: 0,
            headroom: DEFAULT_GROWTH_HEADROOM,
        }
    }

    /// Create an empty buffer sized and tuned by the configuration
    pub fn from_config(config: &WireConfig) -> Self {
        Self::with_capacity(config.initial_capacity).with_headroom(config.growth_headroom)
    }

    /// Set the number of extra bytes allocated past the requested size on growth
    pub fn with_headroom(mut self, headroom: usize) -> Self {
        self.headroom = headroom;
        self
    }

    /// Discard all content and re-create a zero-filled store of `size` bytes
    ///
    /// Both cursors and all bit state are zeroed.
    pub fn reset(&mut self, size: usize) {
        self.storage.clear();
        self.storage.resize(size, 0);
        self.storage.shrink_to(size);
        self.rpos = 0;
        self.wpos = 0;
        self.bit_pos = NO_PENDING_BITS;
        self.bit_val = 0;
        self.reset_bit_reader();
    }

    /// Reset to the default initial capacity
    pub fn clear(&mut self) {
        self.reset(DEFAULT_INITIAL_CAPACITY);
    }

    /// Allocated capacity in bytes
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn write_pos(&self) -> usize {
        self.wpos
    }

    pub fn read_pos(&self) -> usize {
        self.rpos
    }

    /// Bytes left between the read and write cursors
    pub fn remaining(&self) -> usize {
        self.wpos - self.rpos
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.wpos == 0
    }

    /// Growth headroom in bytes
    pub fn headroom(&self) -> usize {
        self.headroom
    }

    /// Written bytes (`0..wpos`)
    pub fn contents(&self) -> &[u8] {
        &self.storage[..self.wpos]
    }

    /// The whole allocated store, including the zero-filled tail
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Snapshot of the written bytes for transmission
    ///
    /// Any pending bit sequence is flushed into the buffer first.
    pub fn to_bytes(&mut self) -> Result<Bytes> {
        self.finish()?;
        Ok(Bytes::copy_from_slice(self.contents()))
    }

    /// Terminate any pending bit sequence so the buffer is ready to send
    pub fn finish(&mut self) -> Result<()> {
        self.flush_bits()
    }

    /// Shrink the capacity to exactly the written length
    pub fn trim(&mut self) {
        self.storage.truncate(self.wpos);
        self.storage.shrink_to_fit();
    }

    //=== Growth ===//

    /// Make room for `additional` bytes at the write cursor
    fn ensure_writable(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .wpos
            .checked_add(additional)
            .ok_or(WireError::AllocationFailure { requested: usize::MAX })?;
        if needed <= self.storage.len() {
            return Ok(());
        }

        let new_len = needed.saturating_add(self.headroom);
        self.storage
            .try_reserve_exact(new_len - self.storage.len())
            .map_err(|_| {
                tracing::error!(requested = new_len, "ByteBuffer growth failed");
                WireError::AllocationFailure { requested: new_len }
            })?;
        tracing::trace!(from = self.storage.len(), to = new_len, "ByteBuffer grow");
        self.storage.resize(new_len, 0);
        Ok(())
    }

    /// Copy bytes at the write cursor without touching the bit state
    fn push_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_writable(bytes.len())?;
        self.storage[self.wpos..self.wpos + bytes.len()].copy_from_slice(bytes);
        self.wpos += bytes.len();
        Ok(())
    }

    //=== Byte-aligned writes ===//

    /// Append a fixed-width value in wire byte order
    ///
    /// Any pending bit sequence is flushed first.
    pub fn append<T: WireType>(&mut self, value: T) -> Result<()> {
        self.flush_bits()?;
        self.ensure_writable(T::SIZE)?;
        value.to_wire(&mut self.storage[self.wpos..self.wpos + T::SIZE]);
        self.wpos += T::SIZE;
        Ok(())
    }

    /// Chainable form of [`append`](Self::append)
    pub fn write<T: WireType>(&mut self, value: T) -> Result<&mut Self> {
        self.append(value)?;
        Ok(self)
    }

    /// Append raw bytes
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.flush_bits()?;
        self.push_raw(bytes)
    }

    /// Append the entire written content of another buffer
    ///
    /// `other` is finalized (pending bits flushed) and trimmed first.
    pub fn append_buffer(&mut self, other: &mut ByteBuffer) -> Result<()> {
        other.finish()?;
        other.trim();
        self.append_bytes(other.contents())
    }

    /// Append a string followed by a zero terminator
    ///
    /// A string with an interior NUL reads back truncated at that NUL.
    pub fn append_str(&mut self, value: &str) -> Result<()> {
        self.flush_bits()?;
        let len = value.len();
        self.ensure_writable(len + 1)?;
        self.storage[self.wpos..self.wpos + len].copy_from_slice(value.as_bytes());
        self.storage[self.wpos + len] = 0;
        self.wpos += len + 1;
        Ok(())
    }

    /// Overwrite an already written value in place
    ///
    /// Used to back-patch length fields once the payload is known. The target
    /// region must lie entirely below the write cursor.
    pub fn put<T: WireType>(&mut self, pos: usize, value: T) -> Result<()> {
        match pos.checked_add(T::SIZE) {
            Some(end) if end <= self.wpos => {
                value.to_wire(&mut self.storage[pos..end]);
                Ok(())
            }
            _ => {
                tracing::error!(
                    pos,
                    size = T::SIZE,
                    written = self.wpos,
                    "attempted to put value outside written region of ByteBuffer"
                );
                Err(WireError::InvalidPatch { pos, size: T::SIZE, total: self.wpos })
            }
        }
    }

    //=== Byte-aligned reads ===//

    /// Check that `size` bytes are readable at the read cursor
    fn check_readable(&self, size: usize) -> Result<()> {
        if size > self.remaining() {
            return Err(underrun(self.rpos, size, self.wpos));
        }
        Ok(())
    }

    /// Read a fixed-width value at the read cursor
    ///
    /// Fails with `BufferUnderrun` when fewer than `T::SIZE` written bytes
    /// remain; the cursor is left unchanged on failure.
    pub fn read<T: WireType>(&mut self) -> Result<T> {
        self.check_readable(T::SIZE)?;
        let value = T::from_wire(&self.storage[self.rpos..self.rpos + T::SIZE]);
        self.rpos += T::SIZE;
        self.reset_bit_reader();
        Ok(value)
    }

    /// Read a fixed-width value at `pos` without moving the cursor
    ///
    /// Bounded by the capacity rather than the write cursor.
    pub fn read_at<T: WireType>(&self, pos: usize) -> Result<T> {
        match pos.checked_add(T::SIZE) {
            Some(end) if end <= self.storage.len() => Ok(T::from_wire(&self.storage[pos..end])),
            _ => Err(underrun(pos, T::SIZE, self.storage.len())),
        }
    }

    /// Byte at `pos`, bounded by the capacity
    pub fn byte_at(&self, pos: usize) -> Result<u8> {
        self.storage
            .get(pos)
            .copied()
            .ok_or_else(|| underrun(pos, 1, self.storage.len()))
    }

    /// Fill `dest` from the read cursor
    pub fn read_into(&mut self, dest: &mut [u8]) -> Result<()> {
        self.check_readable(dest.len())?;
        dest.copy_from_slice(&self.storage[self.rpos..self.rpos + dest.len()]);
        self.rpos += dest.len();
        self.reset_bit_reader();
        Ok(())
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.check_readable(len)?;
        let bytes = self.storage[self.rpos..self.rpos + len].to_vec();
        self.rpos += len;
        self.reset_bit_reader();
        Ok(bytes)
    }

    /// Advance the read cursor by `skip` bytes
    pub fn read_skip(&mut self, skip: usize) -> Result<()> {
        self.check_readable(skip)?;
        self.rpos += skip;
        self.reset_bit_reader();
        Ok(())
    }

    /// Skip over one value of type `T`
    pub fn read_skip_of<T: WireType>(&mut self) -> Result<()> {
        self.read_skip(T::SIZE)
    }

    /// Mark everything written as consumed
    pub fn read_finish(&mut self) {
        self.rpos = self.wpos;
        self.reset_bit_reader();
    }

    /// Read a zero-terminated byte string
    ///
    /// Stops at the first zero byte (consumed, not returned) or at the write
    /// cursor, whichever comes first. An exhausted buffer yields an empty string.
    pub fn read_cstring(&mut self) -> Result<Vec<u8>> {
        let readable = &self.storage[self.rpos..self.wpos];
        let (bytes, consumed) = match readable.iter().position(|&b| b == 0) {
            Some(nul) => (readable[..nul].to_vec(), nul + 1),
            None => (readable.to_vec(), readable.len()),
        };
        self.rpos += consumed;
        self.reset_bit_reader();
        Ok(bytes)
    }

    /// Read a zero-terminated UTF-8 string
    ///
    /// Invalid UTF-8 fails with `InvalidData` and leaves the cursor unchanged.
    pub fn read_string(&mut self) -> Result<String> {
        let mark = self.mark();
        let bytes = self.read_cstring()?;
        String::from_utf8(bytes).map_err(|e| {
            self.rewind(mark);
            WireError::InvalidData(format!("Invalid UTF-8: {}", e))
        })
    }

    //=== Read state ===//

    pub(crate) fn mark(&self) -> ReadMark {
        ReadMark {
            rpos: self.rpos,
            read_bit_pos: self.read_bit_pos,
            read_bit_val: self.read_bit_val,
        }
    }

    pub(crate) fn rewind(&mut self, mark: ReadMark) {
        self.rpos = mark.rpos;
        self.read_bit_pos = mark.read_bit_pos;
        self.read_bit_val = mark.read_bit_val;
    }

    /// Drop any partially consumed bit byte on the read side
    ///
    /// Called by every byte-aligned read, mirroring the writer's flush.
    pub fn reset_bit_reader(&mut self) {
        self.read_bit_pos = NO_PENDING_BITS;
        self.read_bit_val = 0;
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully written buffer over `bytes`, positioned for reading from the start
impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        let mut buf = Self::with_capacity(0);
        buf.wpos = bytes.len();
        buf.storage = bytes;
        buf
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl From<Bytes> for ByteBuffer {
    fn from(bytes: Bytes) -> Self {
        Self::from(bytes.to_vec())
    }
}

fn underrun(pos: usize, size: usize, total: usize) -> WireError {
    tracing::error!(pos, size, total, "attempted to get value past end of ByteBuffer");
    WireError::BufferUnderrun { pos, size, total }
}
