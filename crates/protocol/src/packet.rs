//! # Packet
//!
//! A [`ByteBuffer`] tagged with a message-type identifier.
//!
//! All byte-level work is delegated to the embedded buffer (the packet
//! dereferences to it); the packet itself only owns the tag, the lifecycle
//! (`initialize`) and payload compression.
//!
//! ## Compressed Layout
//!
//! ```text
//! [uncompressed size: u32 LE][compressed payload]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use wirebuf_core::Opcode;
//! use wirebuf_protocol::{Packet, PacketCompressor};
//!
//! const SMSG_UPDATE_OBJECT: Opcode = Opcode::new(0x00A9);
//! const SMSG_COMPRESSED_UPDATE_OBJECT: Opcode = Opcode::new(0x01F6);
//!
//! let mut packet = Packet::new(SMSG_UPDATE_OBJECT);
//! packet.append(1u32)?;
//! packet.pack_identifier(0xF130_0000_0000_0042u64)?;
//! packet.compress(SMSG_COMPRESSED_UPDATE_OBJECT, &PacketCompressor::default())?;
//!
//! assert_eq!(packet.tag(), SMSG_COMPRESSED_UPDATE_OBJECT);
//! # Ok::<(), wirebuf_core::WireError>(())
//! ```

use std::ops::{Deref, DerefMut};

use wirebuf_config::{WireConfig, DEFAULT_PACKET_RESERVE};
use wirebuf_core::{Opcode, Result, WireError};

use crate::buffer::ByteBuffer;
use crate::compression::Compressor;
use crate::dump::DiagnosticSink;

/// Size of the uncompressed-length prefix of a compressed packet
pub const COMPRESSED_SIZE_PREFIX: usize = 4;

/// Tagged wire message
#[derive(Debug, Clone, PartialEq)]
pub struct Packet<T = Opcode> {
    tag: T,
    buffer: ByteBuffer,
}

impl<T: Copy> Packet<T> {
    /// Create a packet with the default reserve (200 bytes)
    pub fn new(tag: T) -> Self {
        Self::with_capacity(tag, DEFAULT_PACKET_RESERVE)
    }

    pub fn with_capacity(tag: T, reserve: usize) -> Self {
        Self { tag, buffer: ByteBuffer::with_capacity(reserve) }
    }

    pub fn from_config(tag: T, config: &WireConfig) -> Self {
        let buffer = ByteBuffer::with_capacity(config.packet_reserve)
            .with_headroom(config.growth_headroom);
        Self { tag, buffer }
    }

    /// Wrap an existing buffer
    pub fn from_buffer(tag: T, buffer: ByteBuffer) -> Self {
        Self { tag, buffer }
    }

    pub fn tag(&self) -> T {
        self.tag
    }

    pub fn set_tag(&mut self, tag: T) {
        self.tag = tag;
    }

    /// Reuse the packet for a new message: reset the buffer to `size_hint`
    /// bytes and set the tag
    pub fn initialize(&mut self, tag: T, size_hint: usize) {
        self.tag = tag;
        self.buffer.reset(size_hint);
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> ByteBuffer {
        self.buffer
    }

    pub fn into_parts(self) -> (T, ByteBuffer) {
        (self.tag, self.buffer)
    }

    /// Replace the payload with its compressed form and retag the packet
    ///
    /// Pending bits are flushed first. An empty payload is left untouched,
    /// tag included.
    pub fn compress<C: Compressor + ?Sized>(&mut self, tag: T, compressor: &C) -> Result<()> {
        self.buffer.finish()?;
        let size = self.buffer.write_pos();
        if size == 0 {
            return Ok(());
        }

        let uncompressed = u32::try_from(size).map_err(|_| {
            WireError::Compression(format!("payload of {} bytes is too large to compress", size))
        })?;
        let compressed = compressor.compress(self.buffer.contents())?;

        tracing::debug!(from = size, to = compressed.len(), "compressed packet payload");

        self.buffer.reset(compressed.len() + COMPRESSED_SIZE_PREFIX);
        self.buffer.append(uncompressed)?;
        self.buffer.append_bytes(&compressed)?;
        self.tag = tag;
        Ok(())
    }

    /// Inverse of [`compress`](Self::compress): inflate the payload and retag
    ///
    /// Rejects payloads that claim to inflate past `max_size` before running
    /// the decompressor. The decompressor is capped at the claimed size, so a
    /// payload that inflates further is rejected without being fully
    /// inflated; a shorter one fails the size check. The packet is unchanged
    /// on failure.
    pub fn decompress<C: Compressor + ?Sized>(
        &mut self,
        tag: T,
        compressor: &C,
        max_size: usize,
    ) -> Result<()> {
        if self.buffer.write_pos() < COMPRESSED_SIZE_PREFIX {
            return Err(WireError::Compression(
                "compressed packet is missing its size prefix".into(),
            ));
        }
        let claimed = self.buffer.read_at::<u32>(0)? as usize;
        if claimed > max_size {
            tracing::warn!(claimed, max_size, "rejected oversized compressed packet");
            return Err(WireError::Compression(format!(
                "compressed packet claims {} bytes (limit {})",
                claimed, max_size
            )));
        }

        let inflated =
            compressor.decompress(&self.buffer.contents()[COMPRESSED_SIZE_PREFIX..], claimed)?;
        if inflated.len() != claimed {
            return Err(WireError::Compression(format!(
                "inflated {} bytes, expected {}",
                inflated.len(),
                claimed
            )));
        }

        tracing::debug!(from = self.buffer.write_pos(), to = claimed, "decompressed packet payload");

        self.buffer.reset(inflated.len());
        self.buffer.append_bytes(&inflated)?;
        self.tag = tag;
        Ok(())
    }

    /// Hex dump through `sink` when `config` enables packet dumps
    pub fn dump(&self, config: &WireConfig, sink: &dyn DiagnosticSink) {
        if config.dump_packets {
            self.buffer.hexlike(sink);
        }
    }
}

impl<T: Copy + Default> Default for Packet<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Deref for Packet<T> {
    type Target = ByteBuffer;

    fn deref(&self) -> &ByteBuffer {
        &self.buffer
    }
}

impl<T> DerefMut for Packet<T> {
    fn deref_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::PacketCompressor;
    use std::cell::RefCell;
    use tracing::Level;
    use wirebuf_core::CompressionType;

    const SMSG_MONSTER_MOVE: Opcode = Opcode::new(0x00DD);
    const SMSG_COMPRESSED_MOVES: Opcode = Opcode::new(0x02FB);

    /// Reverses the payload; enough to see the packet treats it as opaque
    struct ReverseCompressor;

    impl Compressor for ReverseCompressor {
        fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().rev().copied().collect())
        }

        fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
            if data.len() > limit {
                return Err(WireError::Compression("too large".into()));
            }
            self.compress(data)
        }
    }

    #[derive(Default)]
    struct CountingSink(RefCell<usize>);

    impl DiagnosticSink for CountingSink {
        fn enabled(&self, _level: Level) -> bool {
            true
        }

        fn emit(&self, _level: Level, _message: &str) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_new_packet() {
        let packet = Packet::new(SMSG_MONSTER_MOVE);
        assert_eq!(packet.tag(), SMSG_MONSTER_MOVE);
        assert_eq!(packet.capacity(), 200);
        assert!(packet.is_empty());

        let unknown: Packet = Packet::default();
        assert_eq!(unknown.tag(), Opcode::UNKNOWN);
    }

    #[test]
    fn test_delegates_to_buffer() {
        let mut packet = Packet::with_capacity(SMSG_MONSTER_MOVE, 4);
        packet.pack_identifier(0x42u64).unwrap();
        packet.pack_position(1.0, 1.0, 1.0).unwrap();
        packet.append_str("walk").unwrap();

        assert_eq!(packet.read_packed_identifier().unwrap(), 0x42);
        packet.read_skip_of::<u32>().unwrap();
        assert_eq!(packet.read_string().unwrap(), "walk");
    }

    #[test]
    fn test_initialize_resets_buffer() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        packet.append(7u64).unwrap();
        packet.write_bit(true).unwrap();

        packet.initialize(SMSG_COMPRESSED_MOVES, 16);
        assert_eq!(packet.tag(), SMSG_COMPRESSED_MOVES);
        assert_eq!(packet.capacity(), 16);
        assert_eq!(packet.write_pos(), 0);
        assert_eq!(packet.pending_bits(), 0);
    }

    #[test]
    fn test_compress_layout_with_opaque_compressor() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        packet.append_bytes(&[1, 2, 3]).unwrap();
        packet.compress(SMSG_COMPRESSED_MOVES, &ReverseCompressor).unwrap();

        assert_eq!(packet.tag(), SMSG_COMPRESSED_MOVES);
        assert_eq!(packet.contents(), &[3, 0, 0, 0, 3, 2, 1]);
    }

    #[test]
    fn test_compress_flushes_pending_bits() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        packet.write_bit(true).unwrap();
        packet.compress(SMSG_COMPRESSED_MOVES, &ReverseCompressor).unwrap();
        assert_eq!(packet.contents(), &[1, 0, 0, 0, 0x80]);
    }

    #[test]
    fn test_compress_empty_payload_is_noop() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        packet.compress(SMSG_COMPRESSED_MOVES, &ReverseCompressor).unwrap();
        assert_eq!(packet.tag(), SMSG_MONSTER_MOVE);
        assert!(packet.is_empty());
    }

    #[test]
    fn test_zlib_compress_roundtrip() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        for i in 0..100u32 {
            packet.append(i % 4).unwrap();
        }
        let original = packet.contents().to_vec();

        let zlib = PacketCompressor::new(CompressionType::Zlib, 6);
        packet.compress(SMSG_COMPRESSED_MOVES, &zlib).unwrap();
        assert!(packet.write_pos() < original.len());
        assert_eq!(packet.read::<u32>().unwrap(), 400);

        packet.decompress(SMSG_MONSTER_MOVE, &zlib, 1024).unwrap();
        assert_eq!(packet.tag(), SMSG_MONSTER_MOVE);
        assert_eq!(packet.contents(), &original[..]);
        assert_eq!(packet.read_pos(), 0);
    }

    #[test]
    fn test_decompress_rejects_oversized_claim() {
        let mut packet = Packet::new(SMSG_COMPRESSED_MOVES);
        packet.append(u32::MAX).unwrap();
        packet.append_bytes(&[0xFF; 8]).unwrap();
        let before = packet.clone();

        let err = packet
            .decompress(SMSG_MONSTER_MOVE, &PacketCompressor::default(), 1 << 20)
            .unwrap_err();
        assert!(matches!(err, WireError::Compression(_)));
        assert_eq!(packet, before);
    }

    #[test]
    fn test_decompress_caps_output_at_claimed_size() {
        // Small claim in front of a payload that inflates to 4 MiB
        let inflated = vec![0u8; 4 << 20];
        let zlib = PacketCompressor::default();
        let mut packet = Packet::new(SMSG_COMPRESSED_MOVES);
        packet.append(10u32).unwrap();
        packet.append_bytes(&zlib.compress(&inflated).unwrap()).unwrap();
        let before = packet.clone();

        let err = packet.decompress(SMSG_MONSTER_MOVE, &zlib, 1024).unwrap_err();
        assert!(matches!(err, WireError::Compression(_)));
        assert_eq!(packet, before);
    }

    #[test]
    fn test_decompress_rejects_missing_prefix_and_size_mismatch() {
        let mut short = Packet::new(SMSG_COMPRESSED_MOVES);
        short.append(1u16).unwrap();
        assert!(short.decompress(SMSG_MONSTER_MOVE, &ReverseCompressor, 64).is_err());

        let mut lying = Packet::new(SMSG_COMPRESSED_MOVES);
        lying.append(10u32).unwrap();
        lying.append_bytes(&[1, 2, 3]).unwrap();
        assert!(lying.decompress(SMSG_MONSTER_MOVE, &ReverseCompressor, 64).is_err());
        assert_eq!(lying.tag(), SMSG_COMPRESSED_MOVES);
    }

    #[test]
    fn test_from_config() {
        let config = WireConfig {
            packet_reserve: 32,
            growth_headroom: 0,
            ..WireConfig::default()
        };
        let mut packet = Packet::from_config(SMSG_MONSTER_MOVE, &config);
        assert_eq!(packet.capacity(), 32);
        packet.append_bytes(&[0; 40]).unwrap();
        assert_eq!(packet.capacity(), 40);
    }

    #[test]
    fn test_dump_respects_config() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        packet.append(1u8).unwrap();
        let sink = CountingSink::default();

        packet.dump(&WireConfig::default(), &sink);
        assert_eq!(*sink.0.borrow(), 0);

        let config = WireConfig { dump_packets: true, ..WireConfig::default() };
        packet.dump(&config, &sink);
        assert_eq!(*sink.0.borrow(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut packet = Packet::new(SMSG_MONSTER_MOVE);
        packet.append(5u32).unwrap();
        let mut copy = packet.clone();
        copy.set_tag(SMSG_COMPRESSED_MOVES);
        copy.put(0, 6u32).unwrap();

        assert_eq!(packet.tag(), SMSG_MONSTER_MOVE);
        assert_eq!(packet.read::<u32>().unwrap(), 5);
        assert_eq!(copy.read::<u32>().unwrap(), 6);
    }

    #[test]
    fn test_custom_tag_type() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        enum Msg {
            Ping,
            Pong,
        }

        let mut packet = Packet::with_capacity(Msg::Ping, 8);
        packet.append(1u8).unwrap();
        packet.initialize(Msg::Pong, 8);
        assert_eq!(packet.tag(), Msg::Pong);
        let (tag, buffer) = packet.into_parts();
        assert_eq!(tag, Msg::Pong);
        assert!(buffer.is_empty());
    }
}
