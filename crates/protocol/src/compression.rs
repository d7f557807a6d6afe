//! Compression layer for packet payloads

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use wirebuf_config::{WireConfig, DEFAULT_COMPRESSION_LEVEL};
use wirebuf_core::{CompressionType, Result, WireError};

/// Opaque payload transform used by [`Packet::compress`](crate::Packet::compress)
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Inflate `data`, failing as soon as the output would exceed `limit` bytes
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>>;
}

/// zlib / bzip2 compressor with a fixed level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketCompressor {
    pub method: CompressionType,
    pub level: u32,
}

impl PacketCompressor {
    pub fn new(method: CompressionType, level: u32) -> Self {
        Self { method, level: level.min(9) }
    }

    pub fn from_config(config: &WireConfig) -> Self {
        Self::new(config.compression, config.compression_level)
    }
}

impl Default for PacketCompressor {
    fn default() -> Self {
        Self::new(CompressionType::Zlib, DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Compressor for PacketCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        compress_with_level(data, self.method, self.level)
    }

    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>> {
        decompress(data, self.method, limit)
    }
}

/// Compress data using the specified method at the default level
pub fn compress(data: &[u8], method: CompressionType) -> Result<Vec<u8>> {
    compress_with_level(data, method, DEFAULT_COMPRESSION_LEVEL)
}

/// Compress data using the specified method and level (0-9)
pub fn compress_with_level(data: &[u8], method: CompressionType, level: u32) -> Result<Vec<u8>> {
    match method {
        CompressionType::None => Ok(data.to_vec()),
        CompressionType::Zlib => {
            let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(level));
            encoder.write_all(data).map_err(compression_error)?;
            encoder.finish().map_err(compression_error)
        }
        CompressionType::Bzip2 => {
            // bzip2 block sizes run 1-9
            let level = level.clamp(1, 9);
            let mut compressed = Vec::new();
            {
                let mut encoder = bzip2::write::BzEncoder::new(
                    &mut compressed,
                    bzip2::Compression::new(level),
                );
                encoder.write_all(data).map_err(compression_error)?;
                encoder.finish().map_err(compression_error)?;
            }
            Ok(compressed)
        }
    }
}

/// Decompress data using the specified method
///
/// Output is capped at `limit` bytes; the decoder stops one byte past the
/// limit so an oversized stream is never fully inflated.
pub fn decompress(data: &[u8], method: CompressionType, limit: usize) -> Result<Vec<u8>> {
    match method {
        CompressionType::None => {
            check_limit(data.len(), limit)?;
            Ok(data.to_vec())
        }
        CompressionType::Zlib => read_bounded(ZlibDecoder::new(data), limit),
        CompressionType::Bzip2 => read_bounded(bzip2::read::BzDecoder::new(data), limit),
    }
}

fn read_bounded<R: Read>(decoder: R, limit: usize) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    decoder
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut decompressed)
        .map_err(compression_error)?;
    check_limit(decompressed.len(), limit)?;
    Ok(decompressed)
}

fn check_limit(size: usize, limit: usize) -> Result<()> {
    if size > limit {
        tracing::warn!(limit, "decompressed payload exceeds limit");
        return Err(WireError::Compression(format!(
            "decompressed payload exceeds {} bytes",
            limit
        )));
    }
    Ok(())
}

fn compression_error(err: std::io::Error) -> WireError {
    WireError::Compression(err.to_string())
}
