//! Configuration register image
//!
//! The nRF905 keeps its whole RF setup in a single 10-byte configuration
//! memory. [`ConfigRegister`] holds an in-memory image of that memory and
//! exposes typed accessors for every field:
//!
//! | Byte | Bits | Field                                   |
//! |------|------|-----------------------------------------|
//! | 0    | 7:0  | CH_NO\[7:0\]                            |
//! | 1    | 5    | AUTO_RETRAN                             |
//! | 1    | 4    | RX_RED_PWR                              |
//! | 1    | 3:2  | PA_PWR                                  |
//! | 1    | 1    | HFREQ_PLL                               |
//! | 1    | 0    | CH_NO\[8\]                              |
//! | 2    | 6:4  | TX_AFW                                  |
//! | 2    | 2:0  | RX_AFW                                  |
//! | 3    | 5:0  | RX_PW                                   |
//! | 4    | 5:0  | TX_PW                                   |
//! | 5-8  |      | RX_ADDRESS (byte 5 is the least significant) |
//! | 9    | 7    | CRC_MODE                                |
//! | 9    | 6    | CRC_EN                                  |
//! | 9    | 5:3  | XOF                                     |
//! | 9    | 2    | UP_CLK_EN                               |
//! | 9    | 1:0  | UP_CLK_FREQ                             |
//!
//! The image is kept as raw bytes so that reading it back from the module is
//! lossless and a read-after-write check is a plain byte comparison.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Size of the configuration memory in bytes
pub const CONFIG_LEN: usize = 10;

/// Size of the module's TX and RX payload buffers
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Widest supported RX/TX address
pub const MAX_ADDRESS_LEN: usize = 4;

/// Highest channel number representable in CH_NO
pub const MAX_CHANNEL: u16 = 0x1FF;

const PA_PWR_SHIFT: u8 = 2;
const PA_PWR_MASK: u8 = 0b11 << PA_PWR_SHIFT;
const XOF_SHIFT: u8 = 3;
const XOF_MASK: u8 = 0b111 << XOF_SHIFT;
const UP_CLK_FREQ_MASK: u8 = 0b11;
const TX_AFW_SHIFT: u8 = 4;
const AFW_MASK: u8 = 0b111;
const PW_MASK: u8 = 0b0011_1111;

/// Error returned when a length or width is outside what the module supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength(pub usize);

/// Error returned when a channel number does not fit in 9 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannel(pub u16);

bitflags! {
    /// Single-bit fields of configuration byte 1
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RfFlags: u8 {
        /// Ninth bit of the channel number
        const CH_NO_8 = 1 << 0;
        /// PLL runs at twice the base frequency (868/915 MHz bands)
        const HFREQ_PLL = 1 << 1;
        /// Reduced current in RX mode, at the cost of sensitivity
        const RX_RED_PWR = 1 << 4;
        /// Retransmit the TX register contents while CE stays high
        const AUTO_RETRAN = 1 << 5;
    }
}

bitflags! {
    /// Single-bit fields of configuration byte 9
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClockFlags: u8 {
        /// Drive the crystal-derived clock on the UP_CLK pin
        const UP_CLK_EN = 1 << 2;
        /// CRC check and generation enabled
        const CRC_EN = 1 << 6;
        /// 16-bit CRC when set, 8-bit CRC when clear
        const CRC_MODE = 1 << 7;
    }
}

/// Output power of the PA (PA_PWR)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputPower {
    /// -10 dBm
    Minus10Dbm = 0,
    /// -2 dBm
    Minus2Dbm = 1,
    /// +6 dBm
    Plus6Dbm = 2,
    /// +10 dBm
    Plus10Dbm = 3,
}

impl OutputPower {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Minus10Dbm,
            1 => Self::Minus2Dbm,
            2 => Self::Plus6Dbm,
            _ => Self::Plus10Dbm,
        }
    }
}

/// CRC configuration (CRC_EN + CRC_MODE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcMode {
    /// No CRC
    Disabled,
    /// 8-bit CRC
    Crc8,
    /// 16-bit CRC
    Crc16,
}

/// Crystal oscillator frequency (XOF)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrystalFrequency {
    Mhz4 = 0,
    Mhz8 = 1,
    Mhz12 = 2,
    Mhz16 = 3,
    Mhz20 = 4,
}

/// Frequency of the UP_CLK output (UP_CLK_FREQ)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockOutput {
    Mhz4 = 0,
    Mhz2 = 1,
    Mhz1 = 2,
    Khz500 = 3,
}

/// nRF905 configuration memory (offset 0x00)
///
/// Read with the RC instruction and written with the WC instruction. The
/// default value is the reference image used by the firmware this driver
/// grew out of:
///
/// - channel 0x076 with HFREQ_PLL set (868.4 MHz)
/// - +10 dBm output, no auto-retransmit, normal RX current
/// - 4-byte TX and RX addresses, RX address `CC CC CC CC`
/// - 32-byte payloads in both directions
/// - 8-bit CRC, 16 MHz crystal, clock output disabled
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigRegister {
    bytes: [u8; CONFIG_LEN],
}

impl Default for ConfigRegister {
    fn default() -> Self {
        Self {
            bytes: [0x76, 0x0E, 0x44, 0x20, 0x20, 0xCC, 0xCC, 0xCC, 0xCC, 0x58],
        }
    }
}

impl ConfigRegister {
    /// Wraps a raw register image, e.g. one read back from the module
    pub const fn from_raw(bytes: [u8; CONFIG_LEN]) -> Self {
        Self { bytes }
    }

    /// Raw register image in wire order
    pub fn as_bytes(&self) -> &[u8; CONFIG_LEN] {
        &self.bytes
    }

    fn rf_flags(&self) -> RfFlags {
        RfFlags::from_bits_retain(self.bytes[1])
    }

    fn set_rf_flag(&mut self, flag: RfFlags, value: bool) {
        let mut flags = self.rf_flags();
        flags.set(flag, value);
        self.bytes[1] = flags.bits();
    }

    fn clock_flags(&self) -> ClockFlags {
        ClockFlags::from_bits_retain(self.bytes[9])
    }

    fn set_clock_flag(&mut self, flag: ClockFlags, value: bool) {
        let mut flags = self.clock_flags();
        flags.set(flag, value);
        self.bytes[9] = flags.bits();
    }

    /// 9-bit channel number, CH_NO
    pub fn channel(&self) -> u16 {
        let high = if self.rf_flags().contains(RfFlags::CH_NO_8) {
            0x100
        } else {
            0
        };
        high | u16::from(self.bytes[0])
    }

    /// Sets the channel number. The low byte lands in byte 0, bit 8 in byte 1.
    pub fn set_channel(&mut self, channel: u16) -> Result<(), InvalidChannel> {
        if channel > MAX_CHANNEL {
            return Err(InvalidChannel(channel));
        }
        self.bytes[0] = (channel & 0xFF) as u8;
        self.set_rf_flag(RfFlags::CH_NO_8, channel & 0x100 != 0);
        Ok(())
    }

    /// Whether the PLL is in the 868/915 MHz (doubled) range
    pub fn hfreq_pll(&self) -> bool {
        self.rf_flags().contains(RfFlags::HFREQ_PLL)
    }

    /// Selects the 868/915 MHz PLL range (HFREQ_PLL)
    pub fn set_hfreq_pll(&mut self, enabled: bool) {
        self.set_rf_flag(RfFlags::HFREQ_PLL, enabled);
    }

    /// Carrier frequency in kHz: (422.4 + CH_NO / 10) * (1 + HFREQ_PLL) MHz
    pub fn frequency_khz(&self) -> u32 {
        let base = 422_400 + u32::from(self.channel()) * 100;
        if self.hfreq_pll() {
            base * 2
        } else {
            base
        }
    }

    /// Output power (PA_PWR)
    pub fn output_power(&self) -> OutputPower {
        OutputPower::from_bits((self.bytes[1] & PA_PWR_MASK) >> PA_PWR_SHIFT)
    }

    /// Sets PA_PWR, leaving the other byte 1 bits untouched
    pub fn set_output_power(&mut self, power: OutputPower) {
        self.bytes[1] = (self.bytes[1] & !PA_PWR_MASK) | ((power as u8) << PA_PWR_SHIFT);
    }

    /// Whether RX runs in reduced-current mode (RX_RED_PWR)
    pub fn reduced_rx_power(&self) -> bool {
        self.rf_flags().contains(RfFlags::RX_RED_PWR)
    }

    /// Trades RX sensitivity for lower current
    pub fn set_reduced_rx_power(&mut self, enabled: bool) {
        self.set_rf_flag(RfFlags::RX_RED_PWR, enabled);
    }

    /// Whether the TX payload is resent while CE stays high (AUTO_RETRAN)
    pub fn auto_retransmit(&self) -> bool {
        self.rf_flags().contains(RfFlags::AUTO_RETRAN)
    }

    /// Enables or disables AUTO_RETRAN
    pub fn set_auto_retransmit(&mut self, enabled: bool) {
        self.set_rf_flag(RfFlags::AUTO_RETRAN, enabled);
    }

    /// TX address width in bytes (TX_AFW)
    pub fn tx_address_width(&self) -> u8 {
        (self.bytes[2] >> TX_AFW_SHIFT) & AFW_MASK
    }

    /// Sets TX_AFW. Transmits must then supply exactly `width` address bytes.
    ///
    /// # Errors
    /// * `InvalidLength` - `width` outside 1..=4
    pub fn set_tx_address_width(&mut self, width: u8) -> Result<(), InvalidLength> {
        check_address_len(usize::from(width))?;
        self.bytes[2] = (self.bytes[2] & !(AFW_MASK << TX_AFW_SHIFT)) | (width << TX_AFW_SHIFT);
        Ok(())
    }

    /// RX address width in bytes (RX_AFW)
    pub fn rx_address_width(&self) -> u8 {
        self.bytes[2] & AFW_MASK
    }

    /// RX address, `rx_address_width()` bytes long, least significant first
    pub fn rx_address(&self) -> &[u8] {
        let width = usize::from(self.rx_address_width()).min(MAX_ADDRESS_LEN);
        &self.bytes[5..5 + width]
    }

    /// Sets the RX address and makes RX_AFW match its length.
    ///
    /// Unused address bytes are left untouched.
    pub fn set_rx_address(&mut self, address: &[u8]) -> Result<(), InvalidLength> {
        check_address_len(address.len())?;
        self.bytes[5..5 + address.len()].copy_from_slice(address);
        self.bytes[2] = (self.bytes[2] & !AFW_MASK) | address.len() as u8;
        Ok(())
    }

    /// RX payload width in bytes (RX_PW)
    pub fn rx_payload_width(&self) -> u8 {
        self.bytes[3] & PW_MASK
    }

    /// Sets RX_PW, the number of bytes RRP clocks out.
    ///
    /// # Errors
    /// * `InvalidLength` - `width` outside 1..=32
    pub fn set_rx_payload_width(&mut self, width: u8) -> Result<(), InvalidLength> {
        check_payload_len(usize::from(width))?;
        self.bytes[3] = width;
        Ok(())
    }

    /// TX payload width in bytes (TX_PW)
    pub fn tx_payload_width(&self) -> u8 {
        self.bytes[4] & PW_MASK
    }

    /// Sets TX_PW, the largest payload a transmit accepts.
    ///
    /// # Errors
    /// * `InvalidLength` - `width` outside 1..=32
    pub fn set_tx_payload_width(&mut self, width: u8) -> Result<(), InvalidLength> {
        check_payload_len(usize::from(width))?;
        self.bytes[4] = width;
        Ok(())
    }

    /// CRC mode from CRC_EN and CRC_MODE
    pub fn crc(&self) -> CrcMode {
        let flags = self.clock_flags();
        match (
            flags.contains(ClockFlags::CRC_EN),
            flags.contains(ClockFlags::CRC_MODE),
        ) {
            (false, _) => CrcMode::Disabled,
            (true, false) => CrcMode::Crc8,
            (true, true) => CrcMode::Crc16,
        }
    }

    /// Sets CRC_EN and CRC_MODE together
    pub fn set_crc(&mut self, mode: CrcMode) {
        self.set_clock_flag(ClockFlags::CRC_EN, mode != CrcMode::Disabled);
        self.set_clock_flag(ClockFlags::CRC_MODE, mode == CrcMode::Crc16);
    }

    /// Crystal frequency. Reserved XOF codes read back as `None`.
    pub fn crystal(&self) -> Option<CrystalFrequency> {
        match (self.bytes[9] & XOF_MASK) >> XOF_SHIFT {
            0 => Some(CrystalFrequency::Mhz4),
            1 => Some(CrystalFrequency::Mhz8),
            2 => Some(CrystalFrequency::Mhz12),
            3 => Some(CrystalFrequency::Mhz16),
            4 => Some(CrystalFrequency::Mhz20),
            _ => None,
        }
    }

    /// Sets XOF. Must match the crystal fitted on the board.
    pub fn set_crystal(&mut self, crystal: CrystalFrequency) {
        self.bytes[9] = (self.bytes[9] & !XOF_MASK) | ((crystal as u8) << XOF_SHIFT);
    }

    /// UP_CLK output frequency, `None` when the output is disabled
    pub fn clock_output(&self) -> Option<ClockOutput> {
        if !self.clock_flags().contains(ClockFlags::UP_CLK_EN) {
            return None;
        }
        Some(match self.bytes[9] & UP_CLK_FREQ_MASK {
            0 => ClockOutput::Mhz4,
            1 => ClockOutput::Mhz2,
            2 => ClockOutput::Mhz1,
            _ => ClockOutput::Khz500,
        })
    }

    /// Enables UP_CLK at `output`, or disables it with `None`.
    ///
    /// Disabling keeps the previous UP_CLK_FREQ bits.
    pub fn set_clock_output(&mut self, output: Option<ClockOutput>) {
        self.set_clock_flag(ClockFlags::UP_CLK_EN, output.is_some());
        if let Some(output) = output {
            self.bytes[9] = (self.bytes[9] & !UP_CLK_FREQ_MASK) | output as u8;
        }
    }
}

/// Read-after-write check: `true` when the module holds exactly what was written
pub fn verify(written: &ConfigRegister, read_back: &ConfigRegister) -> bool {
    written.bytes == read_back.bytes
}

fn check_address_len(len: usize) -> Result<(), InvalidLength> {
    if (1..=MAX_ADDRESS_LEN).contains(&len) {
        Ok(())
    } else {
        Err(InvalidLength(len))
    }
}

fn check_payload_len(len: usize) -> Result<(), InvalidLength> {
    if (1..=MAX_PAYLOAD_LEN).contains(&len) {
        Ok(())
    } else {
        Err(InvalidLength(len))
    }
}

impl FromByteArray for ConfigRegister {
    type Error = Infallible;
    type Array = [u8; CONFIG_LEN];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { bytes })
    }
}

impl ToByteArray for ConfigRegister {
    type Error = Infallible;
    type Array = [u8; CONFIG_LEN];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_image_matches_reference() {
        let config = ConfigRegister::default();
        assert_eq!(
            config.as_bytes(),
            &[0x76, 0x0E, 0x44, 0x20, 0x20, 0xCC, 0xCC, 0xCC, 0xCC, 0x58]
        );
        assert_eq!(config.channel(), 0x076);
        assert!(config.hfreq_pll());
        assert_eq!(config.output_power(), OutputPower::Plus10Dbm);
        assert!(!config.auto_retransmit());
        assert!(!config.reduced_rx_power());
        assert_eq!(config.tx_address_width(), 4);
        assert_eq!(config.rx_address_width(), 4);
        assert_eq!(config.rx_address(), &[0xCC; 4]);
        assert_eq!(config.rx_payload_width(), 32);
        assert_eq!(config.tx_payload_width(), 32);
        assert_eq!(config.crc(), CrcMode::Crc8);
        assert_eq!(config.crystal(), Some(CrystalFrequency::Mhz16));
        assert_eq!(config.clock_output(), None);
        assert_eq!(config.frequency_khz(), 868_400);
    }

    #[test]
    fn channel_ninth_bit_lives_in_byte_one() {
        let mut config = ConfigRegister::default();
        config.set_channel(0x13E).unwrap();
        assert_eq!(config.as_bytes()[0], 0x3E);
        assert_eq!(config.as_bytes()[1], 0x0F);
        assert_eq!(config.channel(), 0x13E);
        assert_eq!(config.frequency_khz(), 908_400);

        config.set_channel(0x076).unwrap();
        assert_eq!(config.as_bytes()[1], 0x0E);

        assert_eq!(config.set_channel(0x200), Err(InvalidChannel(0x200)));
        assert_eq!(config.channel(), 0x076);
    }

    #[test]
    fn power_and_flags_do_not_clobber_neighbours() {
        let mut config = ConfigRegister::default();
        config.set_output_power(OutputPower::Minus10Dbm);
        config.set_auto_retransmit(true);
        config.set_reduced_rx_power(true);
        assert_eq!(config.as_bytes()[1], 0b0011_0010);
        assert_eq!(config.output_power(), OutputPower::Minus10Dbm);
        assert!(config.hfreq_pll());

        config.set_hfreq_pll(false);
        assert_eq!(config.frequency_khz(), 434_200);
    }

    #[test]
    fn rx_address_width_follows_address() {
        let mut config = ConfigRegister::default();
        config.set_rx_address(&[0xE7]).unwrap();
        assert_eq!(config.rx_address_width(), 1);
        assert_eq!(config.tx_address_width(), 4);
        assert_eq!(config.rx_address(), &[0xE7]);

        config.set_rx_address(&[1, 2, 3, 4]).unwrap();
        assert_eq!(config.as_bytes()[2], 0x44);
        assert_eq!(config.rx_address(), &[1, 2, 3, 4]);

        assert_eq!(config.set_rx_address(&[]), Err(InvalidLength(0)));
        assert_eq!(config.set_rx_address(&[0; 5]), Err(InvalidLength(5)));
        assert_eq!(config.set_tx_address_width(0), Err(InvalidLength(0)));
    }

    #[test]
    fn payload_widths_are_bounded_by_buffer() {
        let mut config = ConfigRegister::default();
        config.set_rx_payload_width(8).unwrap();
        config.set_tx_payload_width(16).unwrap();
        assert_eq!(config.rx_payload_width(), 8);
        assert_eq!(config.tx_payload_width(), 16);
        assert_eq!(config.set_rx_payload_width(33), Err(InvalidLength(33)));
        assert_eq!(config.set_tx_payload_width(0), Err(InvalidLength(0)));
    }

    #[test]
    fn crc_and_clock_fields() {
        let mut config = ConfigRegister::default();
        config.set_crc(CrcMode::Crc16);
        assert_eq!(config.as_bytes()[9], 0xD8);
        config.set_crc(CrcMode::Disabled);
        assert_eq!(config.crc(), CrcMode::Disabled);

        config.set_crystal(CrystalFrequency::Mhz20);
        assert_eq!(config.crystal(), Some(CrystalFrequency::Mhz20));

        config.set_clock_output(Some(ClockOutput::Khz500));
        assert_eq!(config.clock_output(), Some(ClockOutput::Khz500));
        config.set_clock_output(None);
        assert_eq!(config.clock_output(), None);
    }

    #[test]
    fn verify_compares_every_byte() {
        let written = ConfigRegister::default();
        assert!(verify(&written, &ConfigRegister::from_raw(*written.as_bytes())));

        let mut raw = *written.as_bytes();
        raw[9] ^= 0x01;
        assert!(!verify(&written, &ConfigRegister::from_raw(raw)));
    }
}
