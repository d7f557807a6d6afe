//! Compact encodings for identifiers and positions
//!
//! ## Packed identifier
//!
//! ```text
//! [mask: u8][byte i for every set bit i, ascending]
//! ```
//!
//! Bit `i` of the mask is set iff byte `i` (least significant first) of the
//! 64-bit identifier is nonzero. Zero bytes are omitted, so the encoding is
//! 1 to 9 bytes long.
//!
//! ## Packed position
//!
//! A single little-endian `u32` laid out `[z:10][y:11][x:11]`, each field the
//! coordinate divided by 0.25, truncated and masked. See [`Position::packed`].

use wirebuf_core::{ObjectGuid, Position, Result};

use super::ByteBuffer;

/// Longest packed identifier: mask plus all 8 bytes
pub const MAX_PACKED_IDENTIFIER_SIZE: usize = 9;

/// Encode an identifier into its packed form
pub fn pack_identifier_bytes(id: u64) -> ([u8; MAX_PACKED_IDENTIFIER_SIZE], usize) {
    let mut packed = [0u8; MAX_PACKED_IDENTIFIER_SIZE];
    let mut size = 1;
    for (i, byte) in id.to_le_bytes().into_iter().enumerate() {
        if byte != 0 {
            packed[0] |= 1 << i;
            packed[size] = byte;
            size += 1;
        }
    }
    (packed, size)
}

impl ByteBuffer {
    /// Append an identifier in packed form
    pub fn pack_identifier(&mut self, id: impl Into<u64>) -> Result<()> {
        let (packed, size) = pack_identifier_bytes(id.into());
        self.append_bytes(&packed[..size])
    }

    /// Read a packed identifier
    ///
    /// On underrun the read cursor is restored to the mask byte.
    pub fn read_packed_identifier(&mut self) -> Result<u64> {
        let mark = self.mark();
        let mask = self.read::<u8>()?;
        let mut id = 0u64;
        for i in 0..8 {
            if mask & (1 << i) == 0 {
                continue;
            }
            match self.read::<u8>() {
                Ok(byte) => id |= (byte as u64) << (i * 8),
                Err(e) => {
                    self.rewind(mark);
                    return Err(e);
                }
            }
        }
        Ok(id)
    }

    /// Read a packed identifier as an [`ObjectGuid`]
    pub fn read_packed_guid(&mut self) -> Result<ObjectGuid> {
        self.read_packed_identifier().map(ObjectGuid::new)
    }

    /// Append three coordinates as one packed `u32`
    pub fn pack_position(&mut self, x: f32, y: f32, z: f32) -> Result<()> {
        self.append_position(Position::new(x, y, z))
    }

    pub fn append_position(&mut self, position: Position) -> Result<()> {
        self.append(position.packed())
    }
}
