use num_enum::{FromPrimitive, IntoPrimitive};

/// Type of number, bits 6..4 of the address type octet.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOfNumber {
    #[num_enum(default)]
    Unknown = 0b000,
    International = 0b001,
    National = 0b010,
    NetworkSpecific = 0b011,
    SubscriberNumber = 0b100,
    Alphanumeric = 0b101,
    Abbreviated = 0b110,
    Reserved = 0b111,
}

impl TypeOfNumber {
    /// Extract the type of number from an address type octet.
    pub fn from_type_octet(octet: u8) -> Self {
        Self::from((octet >> 4) & 0b111)
    }
}
