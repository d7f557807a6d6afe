//! Fixed-width wire types
//!
//! Every value that can be appended to or read from a [`ByteBuffer`](crate::ByteBuffer)
//! implements [`WireType`]. The wire byte order is little-endian regardless of
//! the host; the trait is sealed so only the integer, float and bool types
//! below can be used.

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width value with a little-endian wire representation
pub trait WireType: sealed::Sealed + Copy + Sized {
    /// Encoded width in bytes
    const SIZE: usize;

    /// Write the wire representation into `out` (exactly `SIZE` bytes)
    fn to_wire(self, out: &mut [u8]);

    /// Decode from exactly `SIZE` bytes
    fn from_wire(bytes: &[u8]) -> Self;
}

macro_rules! impl_wire_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl WireType for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn to_wire(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn from_wire(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_wire_type!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl sealed::Sealed for bool {}

/// One byte, `1` for true. Any nonzero byte decodes as true.
impl WireType for bool {
    const SIZE: usize = 1;

    #[inline]
    fn to_wire(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    #[inline]
    fn from_wire(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}
