//! Construction-time configuration
//!
//! Everything board- or deployment-specific is collected here and handed to
//! [`crate::Nrf905::new`]: the pin handles, the frequency table, payload
//! widths, the DR input pull and the mode-change timings.

use crate::mode::Timing;
use crate::registers::{Band, ConfigRegister, FrequencyTable, InvalidLength};

/// Pull resistor the board should configure on the DR input
///
/// The driver never configures pins itself; board bring-up reads this from
/// the profile when it sets up the DR pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputPull {
    #[default]
    None,
    Up,
    Down,
}

/// Control and status pins of the module
///
/// CSN is not listed: it belongs to the `SpiDevice`.
pub struct Pins<CE, TXEN, PWR, DR> {
    /// TRX_CE output
    pub ce: CE,
    /// TX_EN output
    pub txen: TXEN,
    /// PWR_UP output
    pub pwr: PWR,
    /// Data Ready input
    pub dr: DR,
}

/// Driver configuration profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Profile {
    /// Band to channel lookup used by [`crate::Nrf905::configure`]
    pub table: FrequencyTable,
    /// RX_PW written by `configure`, 1 to 32 bytes
    pub rx_payload_width: u8,
    /// TX_PW written by `configure`, 1 to 32 bytes
    pub tx_payload_width: u8,
    /// Pull the board should apply to DR.
    ///
    /// Informational only: the driver takes DR as an already configured
    /// `InputPin` and never reads this field.
    pub dr_pull: InputPull,
    /// Settling delays for mode changes
    pub timing: Timing,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            table: FrequencyTable::STANDARD,
            rx_payload_width: 32,
            tx_payload_width: 32,
            dr_pull: InputPull::None,
            timing: Timing::default(),
        }
    }
}

impl Profile {
    /// Register image for `band` with this profile's payload widths applied
    pub fn config_for(&self, band: Band) -> Result<ConfigRegister, InvalidLength> {
        let mut config = self.table.config_for(band);
        config.set_rx_payload_width(self.rx_payload_width)?;
        config.set_tx_payload_width(self.tx_payload_width)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_builds_reference_image() {
        let config = Profile::default().config_for(Band::Us).unwrap();
        assert_eq!(
            config.as_bytes(),
            &[0x3E, 0x0F, 0x44, 0x20, 0x20, 0xCC, 0xCC, 0xCC, 0xCC, 0x58]
        );
    }

    #[test]
    fn payload_widths_come_from_profile() {
        let profile = Profile {
            rx_payload_width: 4,
            tx_payload_width: 8,
            dr_pull: InputPull::Down,
            ..Profile::default()
        };
        let config = profile.config_for(Band::Europe).unwrap();
        assert_eq!(config.rx_payload_width(), 4);
        assert_eq!(config.tx_payload_width(), 8);

        let broken = Profile {
            tx_payload_width: 40,
            ..Profile::default()
        };
        assert_eq!(broken.config_for(Band::Europe), Err(InvalidLength(40)));
    }
}
