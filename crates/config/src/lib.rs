//! Wirebuf Configuration Management
//!
//! Loads buffer, packet and compression defaults from a `key = value`
//! options file (`#` starts a comment line).
//!
//! ```text
//! # wire.txt
//! initial_capacity = 10
//! growth_headroom = 10
//! packet_reserve = 200
//! compression = zlib
//! compression_level = 1
//! max_decompressed_size = 16777216
//! dump_packets = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use wirebuf_core::{CompressionType, Result, WireError};

/// Initial capacity of a freshly created buffer
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;
/// Extra bytes allocated on every growth to amortize small appends
pub const DEFAULT_GROWTH_HEADROOM: usize = 10;
/// Capacity reserved for a new packet
pub const DEFAULT_PACKET_RESERVE: usize = 200;
/// zlib/bzip2 level used for packet compression
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 1;
/// Largest payload a compressed packet may claim to inflate to (16 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

/// Wire buffer configuration
///
/// Also (de)serializable with serde so it can be embedded in a host
/// application's own config; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Capacity of a new buffer (from "initial_capacity" option)
    pub initial_capacity: usize,
    /// Headroom added past the requested size on growth (from "growth_headroom" option)
    pub growth_headroom: usize,
    /// Capacity reserved for a new packet (from "packet_reserve" option)
    pub packet_reserve: usize,
    /// Payload compression method (from "compression" option: none, zlib, bzip2)
    pub compression: CompressionType,
    /// Compression level, 0-9 (from "compression_level" option)
    pub compression_level: u32,
    /// Upper bound on the inflated size of a compressed packet (from "max_decompressed_size" option)
    pub max_decompressed_size: usize,
    /// Emit hex dumps of packets through the diagnostic sink (from "dump_packets" option)
    pub dump_packets: bool,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            growth_headroom: DEFAULT_GROWTH_HEADROOM,
            packet_reserve: DEFAULT_PACKET_RESERVE,
            compression: CompressionType::Zlib,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            dump_packets: false,
        }
    }
}

impl WireConfig {
    /// Load configuration from an options file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded wire configuration");
        Ok(config)
    }

    /// Parse options file content
    ///
    /// Unknown keys and malformed values are skipped with a warning; the
    /// affected option keeps its default. A line without `=` is an error.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(WireError::Config(format!(
                    "line {}: expected `key = value`, got `{}`",
                    index + 1,
                    line
                )));
            };

            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim();
            config.parse_option(key, value);
        }

        config.validate()?;
        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key.to_ascii_lowercase().as_str() {
            "initial_capacity" => {
                self.initial_capacity = parse_or(key, value, DEFAULT_INITIAL_CAPACITY);
            }
            "growth_headroom" => {
                self.growth_headroom = parse_or(key, value, DEFAULT_GROWTH_HEADROOM);
            }
            "packet_reserve" => {
                self.packet_reserve = parse_or(key, value, DEFAULT_PACKET_RESERVE);
            }
            "compression" => {
                self.compression = CompressionType::from_name(value).unwrap_or_else(|| {
                    tracing::warn!(key, value, "unknown compression method, using zlib");
                    CompressionType::Zlib
                });
            }
            "compression_level" => {
                self.compression_level = parse_or(key, value, DEFAULT_COMPRESSION_LEVEL);
            }
            "max_decompressed_size" => {
                self.max_decompressed_size = parse_or(key, value, DEFAULT_MAX_DECOMPRESSED_SIZE);
            }
            "dump_packets" => {
                self.dump_packets = parse_or(key, value, false);
            }
            _ => {
                tracing::warn!(key, value, "unknown wire config option");
            }
        }
    }

    /// Check option ranges
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(WireError::Config(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        if self.max_decompressed_size == 0 {
            return Err(WireError::Config("max_decompressed_size must be nonzero".into()));
        }
        Ok(())
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Wire configuration:");
        tracing::info!("  Initial capacity: {} bytes", self.initial_capacity);
        tracing::info!("  Growth headroom: {} bytes", self.growth_headroom);
        tracing::info!("  Packet reserve: {} bytes", self.packet_reserve);
        tracing::info!(
            "  Compression: {} (level {})",
            self.compression.as_str(),
            self.compression_level
        );
        tracing::info!("  Max decompressed size: {} bytes", self.max_decompressed_size);
        tracing::info!("  Dump packets: {}", self.dump_packets);
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: &str, default: T) -> T {
    value.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value, "malformed wire config value, using default");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WireConfig::default();
        assert_eq!(config.initial_capacity, 10);
        assert_eq!(config.growth_headroom, 10);
        assert_eq!(config.packet_reserve, 200);
        assert_eq!(config.compression, CompressionType::Zlib);
        assert!(!config.dump_packets);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_options() {
        let content = "\
# wire options
initial_capacity = 64
growth_headroom=32
packet_reserve = 512

compression = bzip2
compression_level = 9
dump_packets = true
";
        let config = WireConfig::parse(content).unwrap();
        assert_eq!(config.initial_capacity, 64);
        assert_eq!(config.growth_headroom, 32);
        assert_eq!(config.packet_reserve, 512);
        assert_eq!(config.compression, CompressionType::Bzip2);
        assert_eq!(config.compression_level, 9);
        assert!(config.dump_packets);
    }

    #[test]
    fn test_malformed_value_keeps_default() {
        let config = WireConfig::parse("packet_reserve = lots\nfancy_option = 1").unwrap();
        assert_eq!(config.packet_reserve, DEFAULT_PACKET_RESERVE);
    }

    #[test]
    fn test_missing_separator_is_error() {
        let err = WireConfig::parse("initial_capacity 10").unwrap_err();
        assert!(matches!(err, WireError::Config(_)));
    }

    #[test]
    fn test_out_of_range_level_rejected() {
        assert!(WireConfig::parse("compression_level = 12").is_err());
        assert!(WireConfig::parse("max_decompressed_size = 0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "compression = none").unwrap();
        writeln!(file, "growth_headroom = 0").unwrap();

        let config = WireConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.compression, CompressionType::None);
        assert_eq!(config.growth_headroom, 0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = WireConfig::load_from_file(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, WireError::Io(_)));
    }

    #[test]
    fn test_serde_embedding() {
        let config: WireConfig =
            serde_json::from_str(r#"{"compression": "bzip2", "packet_reserve": 64}"#).unwrap();
        assert_eq!(config.compression, CompressionType::Bzip2);
        assert_eq!(config.packet_reserve, 64);
        assert_eq!(config.growth_headroom, DEFAULT_GROWTH_HEADROOM);

        let json = serde_json::to_string(&WireConfig::default()).unwrap();
        assert!(json.contains(r#""compression":"zlib""#));
        let back: WireConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WireConfig::default());
    }
}
