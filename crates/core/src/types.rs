//! Core type definitions

use serde::{Deserialize, Serialize};

/// Message-type identifier carried by a packet (16-bit unsigned)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Placeholder tag for packets that have not been assigned a type yet
    pub const UNKNOWN: Opcode = Opcode(0);

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for Opcode {
    fn from(id: u16) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// 64-bit object identifier, usually sparse (most high bytes are zero)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectGuid(pub u64);

impl ObjectGuid {
    pub const EMPTY: ObjectGuid = ObjectGuid(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Bitmask with bit `i` set iff byte `i` (least significant first) is nonzero
    pub fn byte_mask(&self) -> u8 {
        self.0
            .to_le_bytes()
            .iter()
            .enumerate()
            .filter(|(_, b)| **b != 0)
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    /// Size of the packed form: one mask byte plus every nonzero byte
    pub fn packed_size(&self) -> usize {
        1 + self.byte_mask().count_ones() as usize
    }
}

impl From<u64> for ObjectGuid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ObjectGuid> for u64 {
    fn from(guid: ObjectGuid) -> Self {
        guid.0
    }
}

/// Compression method used for packet payloads
///
/// Serialized by its lowercase name, matching the `compression` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    None = 0,
    #[default]
    Zlib = 1,
    Bzip2 = 2,
}

impl CompressionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Zlib),
            2 => Some(Self::Bzip2),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "zlib" | "deflate" => Some(Self::Zlib),
            "bzip2" | "bz2" => Some(Self::Bzip2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Bzip2 => "bzip2",
        }
    }
}
