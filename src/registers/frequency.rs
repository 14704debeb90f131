//! Regional frequency bands
//!
//! Each band maps to a 9-bit CH_NO value. The tables assume HFREQ_PLL is
//! already set in the register image, which is the case for the default
//! [`ConfigRegister`].

use super::config::{ConfigRegister, InvalidChannel, MAX_CHANNEL};

/// Number of entries in a [`FrequencyTable`]
pub const BAND_COUNT: usize = 10;

/// Error returned when a band index is outside the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidBand(pub u8);

/// Regional frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    /// 908.42 MHz
    Us = 0,
    /// 868.42 MHz
    Europe = 1,
    /// 868.42 MHz
    Africa = 2,
    /// 868.42 MHz
    China = 3,
    /// 919.82 MHz
    HongKong = 4,
    /// 853.42 MHz
    Japan = 5,
    /// 921.42 MHz
    Australia = 6,
    /// 921.42 MHz
    NewZealand = 7,
    /// 921.42 MHz
    Brazil = 8,
    /// 896.00 MHz
    Russia = 9,
}

impl Band {
    /// Every band, in table order
    pub const ALL: [Band; BAND_COUNT] = [
        Band::Us,
        Band::Europe,
        Band::Africa,
        Band::China,
        Band::HongKong,
        Band::Japan,
        Band::Australia,
        Band::NewZealand,
        Band::Brazil,
        Band::Russia,
    ];

    /// Position of the band in a [`FrequencyTable`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Band {
    type Error = InvalidBand;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Band::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(InvalidBand(value))
    }
}

/// Band to CH_NO lookup table
///
/// Bit 0x100 of an entry is the ninth channel bit, carried into byte 1 of
/// the register image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyTable {
    channels: [u16; BAND_COUNT],
}

impl FrequencyTable {
    /// Table shipped with the reference firmware
    pub const STANDARD: FrequencyTable = FrequencyTable {
        channels: [
            0x13E, 0x076, 0x076, 0x076, 0x177, 0x02B, 0x17F, 0x17F, 0x17F, 0x100,
        ],
    };

    /// Builds a custom table. Every entry must fit in CH_NO.
    pub fn new(channels: [u16; BAND_COUNT]) -> Result<Self, InvalidChannel> {
        match channels.iter().find(|&&channel| channel > MAX_CHANNEL) {
            Some(&channel) => Err(InvalidChannel(channel)),
            None => Ok(Self { channels }),
        }
    }

    /// Channel number for `band`
    pub fn channel(&self, band: Band) -> u16 {
        self.channels[band.index()]
    }

    /// Channel number for a raw band index
    pub fn lookup(&self, index: u8) -> Result<u16, InvalidBand> {
        Band::try_from(index).map(|band| self.channel(band))
    }

    /// Default register image with the channel of `band` merged in
    pub fn config_for(&self, band: Band) -> ConfigRegister {
        let mut config = ConfigRegister::default();
        let stored = config.set_channel(self.channel(band));
        // entries are validated on construction
        debug_assert!(stored.is_ok());
        config
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Builds the default register image for a raw band index using the
/// standard table.
///
/// Fails without producing an image if `band` is outside the table.
pub fn build_config(band: u8) -> Result<ConfigRegister, InvalidBand> {
    let band = Band::try_from(band)?;
    Ok(FrequencyTable::STANDARD.config_for(band))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_band_merges_channel_into_default_image() {
        for band in Band::ALL {
            let entry = FrequencyTable::STANDARD.channel(band);
            let config = build_config(band as u8).unwrap();
            let bytes = config.as_bytes();

            assert_eq!(bytes[0], (entry & 0xFF) as u8);
            assert_eq!(bytes[1] & 0x01 != 0, entry & 0x100 != 0);
            assert_eq!(bytes[1] & !0x01, 0x0E);
            assert_eq!(&bytes[2..], &ConfigRegister::default().as_bytes()[2..]);
        }
    }

    #[test]
    fn out_of_range_band_is_rejected() {
        assert_eq!(build_config(10), Err(InvalidBand(10)));
        assert_eq!(build_config(0xFF), Err(InvalidBand(0xFF)));
        assert_eq!(FrequencyTable::STANDARD.lookup(10), Err(InvalidBand(10)));
    }

    #[test]
    fn band_frequencies_match_region() {
        let khz = |band: Band| FrequencyTable::STANDARD.config_for(band).frequency_khz();
        assert_eq!(khz(Band::Us), 908_400);
        assert_eq!(khz(Band::Europe), 868_400);
        assert_eq!(khz(Band::HongKong), 919_800);
        assert_eq!(khz(Band::Japan), 853_400);
        assert_eq!(khz(Band::Australia), 921_400);
        assert_eq!(khz(Band::Russia), 896_000);
    }

    #[test]
    fn custom_table_is_validated() {
        let mut channels = [0x076; BAND_COUNT];
        assert!(FrequencyTable::new(channels).is_ok());
        channels[3] = 0x200;
        assert_eq!(FrequencyTable::new(channels), Err(InvalidChannel(0x200)));
    }

    #[test]
    fn band_round_trips_through_index() {
        for (index, band) in Band::ALL.iter().enumerate() {
            assert_eq!(Band::try_from(index as u8), Ok(*band));
            assert_eq!(band.index(), index);
        }
    }
}
