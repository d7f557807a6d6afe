//! Position types for world objects

/// Quantization step used by the packed position encoding
pub const PACKED_POSITION_STEP: f32 = 0.25;

const X_MASK: u32 = 0x7FF;
const Y_MASK: u32 = 0x7FF;
const Z_MASK: u32 = 0x3FF;

/// World-space position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pack into a single word laid out as `[z:10][y:11][x:11]` (MSB to LSB).
    ///
    /// Each coordinate is divided by [`PACKED_POSITION_STEP`], truncated toward
    /// zero and masked to its field width. Negative and out-of-range values wrap.
    /// There is no inverse.
    pub fn packed(self) -> u32 {
        let x = quantize(self.x) & X_MASK;
        let y = quantize(self.y) & Y_MASK;
        let z = quantize(self.z) & Z_MASK;
        x | (y << 11) | (z << 22)
    }
}

#[inline]
fn quantize(coord: f32) -> u32 {
    // `as i32` truncates toward zero; the cast to u32 keeps the two's complement bits
    (coord / PACKED_POSITION_STEP) as i32 as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        // x = 1.0 -> 4, y = 2.0 -> 8, z = 0.5 -> 2
        let packed = Position::new(1.0, 2.0, 0.5).packed();
        assert_eq!(packed & 0x7FF, 4);
        assert_eq!((packed >> 11) & 0x7FF, 8);
        assert_eq!(packed >> 22, 2);
    }

    #[test]
    fn test_pack_truncates() {
        // 0.74 / 0.25 = 2.96 -> 2
        assert_eq!(Position::new(0.74, 0.0, 0.0).packed(), 2);
    }

    #[test]
    fn test_pack_masks_overflow() {
        // 600.0 / 0.25 = 2400 = 0x960, masked to 11 bits = 0x160
        assert_eq!(Position::new(600.0, 0.0, 0.0).packed(), 0x160);
        // z field is only 10 bits wide: 256.0 / 0.25 = 1024 wraps to 0
        assert_eq!(Position::new(0.0, 0.0, 256.0).packed() >> 22, 0);
    }

    #[test]
    fn test_pack_negative_wraps() {
        // -0.25 -> -1 -> all ones in the x field only
        assert_eq!(Position::new(-0.25, 0.0, 0.0).packed(), 0x7FF);
    }
}
