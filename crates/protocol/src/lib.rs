//! # Wirebuf Protocol Library
//!
//! Binary wire-format buffer shared by every client/server message, with
//! exact byte-level layout.
//!
//! ## Architecture
//!
//! ### 1. Wire Types ([`wire`])
//! Sealed [`WireType`] trait for the fixed-width values the buffer can carry:
//! `u8`..`u64`, `i8`..`i64`, `f32`, `f64` and `bool`, all little-endian.
//!
//! ### 2. Byte Buffer ([`buffer`])
//! [`ByteBuffer`]: growable store with independent read/write cursors.
//! - Typed append / read / positional read / in-place patch
//! - Raw bytes, buffers and zero-terminated strings
//! - Bit packing, MSB first ([`buffer::bits`])
//! - Packed identifiers and positions ([`buffer::packing`])
//!
//! ### 3. Packets ([`packet`])
//! [`Packet`]: a buffer plus a message-type tag, with lifecycle
//! (`initialize`) and payload compression.
//!
//! ### 4. Compression ([`compression`])
//! [`Compressor`] seam with a zlib / bzip2 implementation.
//!
//! ### 5. Diagnostics ([`dump`])
//! Hex, text and decimal dumps through an injected [`DiagnosticSink`].
//!
//! ## Usage Example
//!
//! ```rust
//! use wirebuf_core::Opcode;
//! use wirebuf_protocol::Packet;
//!
//! let mut packet = Packet::new(Opcode::new(0x0095));
//! packet.append(0u16)?; // length, patched below
//! packet.pack_identifier(0x0000_0000_0000_1F40u64)?;
//! packet.write_bit(true)?;
//! packet.write_bits(5, 3)?;
//! packet.append_str("Hello")?;
//! let len = (packet.write_pos() - 2) as u16;
//! packet.put(0, len)?;
//!
//! assert_eq!(packet.read::<u16>()?, len);
//! assert_eq!(packet.read_packed_identifier()?, 0x1F40);
//! assert!(packet.read_bit()?);
//! assert_eq!(packet.read_bits(3)?, 5);
//! assert_eq!(packet.read_string()?, "Hello");
//! # Ok::<(), wirebuf_core::WireError>(())
//! ```

pub mod buffer;
pub mod compression;
pub mod dump;
pub mod packet;
pub mod wire;

// Re-export commonly used items
pub use buffer::ByteBuffer;
pub use compression::{Compressor, PacketCompressor};
pub use dump::{DiagnosticSink, TracingSink};
pub use packet::Packet;
pub use wire::WireType;
pub use wirebuf_core::{CompressionType, ObjectGuid, Opcode, Position, Result, WireError};
