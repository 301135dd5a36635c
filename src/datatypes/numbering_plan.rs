use num_enum::FromPrimitive;

/// Numbering plan identification, bits 3..0 of the address type octet.
#[derive(FromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumberingPlan {
    Unknown = 0b0000,
    Isdn = 0b0001,
    Data = 0b0011,
    Telex = 0b0100,
    ServiceCentreSpecific1 = 0b0101,
    ServiceCentreSpecific2 = 0b0110,
    National = 0b1000,
    Private = 0b1001,
    Ermes = 0b1010,
    #[num_enum(catch_all)]
    Reserved(u8),
}

impl NumberingPlan {
    /// Extract the numbering plan from an address type octet.
    pub fn from_type_octet(octet: u8) -> Self {
        Self::from(octet & 0b1111)
    }
}
