/// The byte order of multi-byte elements.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Endianness {
    /// Little endian.
    Little,
    /// Big endian.
    Big,
}

impl Endianness {
    /// The native endianness of the target.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;

    /// The native endianness of the target.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Returns true if this is the native endianness of the target.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == Self::NATIVE
    }
}
