/// Security strengths a SHA-256 Hash_DRBG can be instantiated at
/// (SP 800-57 Part 1, SP 800-90A Table 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityStrength {
    Bits112,
    Bits128,
    Bits192,
    Bits256,
}

impl SecurityStrength {
    /// Highest strength SHA-256 supports.
    pub const MAX: SecurityStrength = SecurityStrength::Bits256;

    /// Strength in bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::Bits112 => 112,
            Self::Bits128 => 128,
            Self::Bits192 => 192,
            Self::Bits256 => 256,
        }
    }

    /// Smallest supported strength that is at least `requested` bits.
    ///
    /// Returns `None` when `requested` exceeds [`SecurityStrength::MAX`].
    pub fn for_request(requested: u32) -> Option<Self> {
        [Self::Bits112, Self::Bits128, Self::Bits192, Self::Bits256]
            .into_iter()
            .find(|s| s.bits() >= requested)
    }
}
