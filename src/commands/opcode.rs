//! Instruction bytes

/// nRF905 SPI instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// WC: write configuration memory
    WriteConfig = 0x00,
    /// RC: read configuration memory
    ReadConfig = 0x10,
    /// WTP: write TX payload
    WriteTxPayload = 0x20,
    /// RTP: read back TX payload
    ReadTxPayload = 0x21,
    /// WTA: write TX address
    WriteTxAddress = 0x22,
    /// RTA: read back TX address
    ReadTxAddress = 0x23,
    /// RRP: read RX payload
    ReadRxPayload = 0x24,
}

impl Opcode {
    /// Instruction byte as it goes on the wire
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Instruction byte with a configuration memory offset folded in.
    ///
    /// Only WC and RC take an offset; other instructions ignore it.
    pub fn with_offset(self, offset: u8) -> u8 {
        match self {
            Self::WriteConfig | Self::ReadConfig => self.byte() | (offset & 0x0F),
            _ => self.byte(),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode.byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_only_apply_to_config_instructions() {
        assert_eq!(Opcode::WriteConfig.with_offset(0), 0x00);
        assert_eq!(Opcode::ReadConfig.with_offset(3), 0x13);
        assert_eq!(Opcode::ReadConfig.with_offset(0x1F), 0x1F);
        assert_eq!(Opcode::WriteTxAddress.with_offset(3), 0x22);
        assert_eq!(u8::from(Opcode::ReadRxPayload), 0x24);
    }
}
