//! Packet sessions
//!
//! [`Nrf905`] combines the bus layer, the mode controller and the DR input
//! into the two operations the module exists for: receiving one packet and
//! transmitting one packet.
//!
//! # Receive
//! 1. Standby (powering up if needed), then RX mode
//! 2. Wait for DR
//! 3. Clock out RX_PW bytes with RRP
//! 4. Back to standby
//!
//! [`Nrf905::receive`] waits for DR in a busy loop with no timeout and no
//! yield point. It only returns once a packet arrives or a pin/bus error
//! occurs. Callers that need a bound use [`Nrf905::receive_bounded`], or
//! drive the steps themselves with [`Nrf905::start_receive`],
//! [`Nrf905::poll_ready`] and [`Nrf905::finish_receive`].
//!
//! # Transmit
//! 1. Standby (powering up if needed)
//! 2. WTP with the payload, then WTA with the address, as two transactions
//! 3. TX mode, CE pulsed for the TX window
//! 4. Back to standby
//!
//! Failures abort the session and are reported as a [`SessionError`] naming
//! the step. Nothing is retried; the next session starts over from standby.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::commands::{Address, Opcode, Packet};
use crate::device::Device;
use crate::error::{Error, SessionError, SessionStep};
use crate::mode::{ModeController, ModeState};
use crate::profile::{Pins, Profile};
use crate::registers::{verify, Band, ConfigRegister, InvalidLength, MAX_ADDRESS_LEN};

/// nRF905 driver
pub struct Nrf905<SPI, CE, TXEN, PWR, DR, DELAY> {
    device: Device<SPI>,
    mode: ModeController<CE, TXEN, PWR>,
    dr: DR,
    delay: DELAY,
    profile: Profile,
    config: ConfigRegister,
}

impl<SPI, CE, TXEN, PWR, DR, DELAY> Nrf905<SPI, CE, TXEN, PWR, DR, DELAY>
where
    SPI: SpiDevice,
    CE: OutputPin,
    TXEN: OutputPin,
    PWR: OutputPin,
    DR: InputPin,
    DELAY: DelayNs,
{
    /// Creates the driver. The module is assumed to be powered down and
    /// nothing is sent until the first operation.
    pub fn new(spi: SPI, pins: Pins<CE, TXEN, PWR, DR>, delay: DELAY, profile: Profile) -> Self {
        Self {
            device: Device::new(spi),
            mode: ModeController::new(pins.ce, pins.txen, pins.pwr, profile.timing),
            dr: pins.dr,
            delay,
            profile,
            config: ConfigRegister::default(),
        }
    }

    /// Releases the SPI device, pins and delay
    pub fn release(self) -> (SPI, Pins<CE, TXEN, PWR, DR>, DELAY) {
        let (ce, txen, pwr) = self.mode.release();
        let pins = Pins {
            ce,
            txen,
            pwr,
            dr: self.dr,
        };
        (self.device.release(), pins, self.delay)
    }

    /// Current operating mode as tracked by the driver
    pub fn mode(&self) -> ModeState {
        self.mode.state()
    }

    /// Profile the driver was created with
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Register image last written to the module
    pub fn config(&self) -> &ConfigRegister {
        &self.config
    }

    /// Powers the module up and waits for the crystal to start
    pub fn power_on(&mut self) -> Result<(), Error<SPI::Error>> {
        self.mode.power_on(&mut self.delay)?;
        Ok(())
    }

    /// Builds the register image for `band`, writes it and checks it was
    /// stored.
    ///
    /// # Errors
    /// * `Error::ConfigMismatch` - read-back differs from the written image
    pub fn configure(&mut self, band: Band) -> Result<ConfigRegister, Error<SPI::Error>> {
        let config = self.profile.config_for(band)?;
        self.write_config(config)?;
        self.verify_config()?;
        Ok(config)
    }

    /// [`configure`](Nrf905::configure) with a raw band index
    ///
    /// # Errors
    /// * `Error::InvalidBand` - index outside the frequency table, nothing sent
    pub fn configure_index(&mut self, band: u8) -> Result<ConfigRegister, Error<SPI::Error>> {
        let band = Band::try_from(band)?;
        self.configure(band)
    }

    /// Writes a register image with WC
    pub fn write_config(&mut self, config: ConfigRegister) -> Result<(), Error<SPI::Error>> {
        self.mode.ensure_standby(&mut self.delay)?;
        self.device.write_register(config)?;
        self.config = config;
        Ok(())
    }

    /// Reads the module's register image with RC
    pub fn read_config(&mut self) -> Result<ConfigRegister, Error<SPI::Error>> {
        self.mode.ensure_standby(&mut self.delay)?;
        self.device.read_register()
    }

    /// Reads the register image back and compares it with the last write
    pub fn verify_config(&mut self) -> Result<(), Error<SPI::Error>> {
        let read = self.read_config()?;
        if verify(&self.config, &read) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("config mismatch: wrote {}, read {}", self.config, read);
            Err(Error::ConfigMismatch {
                written: self.config,
                read,
            })
        }
    }

    /// Single non-blocking check of DR
    pub fn poll_ready(&mut self) -> Result<bool, Error<SPI::Error>> {
        self.dr.is_high().map_err(|_| Error::Pin)
    }

    /// Puts the module in RX mode, from whatever state it is in
    pub fn start_receive(&mut self) -> Result<(), SessionError<SPI::Error>> {
        self.mode
            .ensure_standby(&mut self.delay)
            .map_err(SessionError::at(SessionStep::Standby))?;
        self.mode
            .enter_receive(&mut self.delay)
            .map_err(SessionError::at(SessionStep::EnterReceive))
    }

    /// Reads the buffered packet and returns to standby.
    ///
    /// Call once DR is high.
    pub fn finish_receive(&mut self) -> Result<Packet, SessionError<SPI::Error>> {
        let width = usize::from(self.config.rx_payload_width());
        let mut packet = Packet::empty();
        self.device
            .send_command(Opcode::ReadRxPayload, &[], packet.buffer_mut(width))
            .map_err(SessionError::at(SessionStep::ReadPayload))?;
        self.mode
            .return_to_standby()
            .map_err(SessionError::at(SessionStep::ReturnToStandby))?;

        #[cfg(feature = "defmt")]
        defmt::debug!("rx: {=[u8]:x}", packet.as_slice());
        Ok(packet)
    }

    /// Receives one packet, busy-waiting on DR for as long as it takes.
    ///
    /// This blocks forever if no packet ever arrives.
    pub fn receive(&mut self) -> Result<Packet, SessionError<SPI::Error>> {
        self.start_receive()?;
        while !self
            .poll_ready()
            .map_err(SessionError::at(SessionStep::PollReady))?
        {}
        self.finish_receive()
    }

    /// Receives one packet, checking DR at most `max_polls` times with
    /// `poll_interval_us` between checks.
    ///
    /// On timeout the module is returned to standby.
    ///
    /// # Errors
    /// * `Error::Timeout` at `SessionStep::PollReady` - DR never asserted
    pub fn receive_bounded(
        &mut self,
        max_polls: u32,
        poll_interval_us: u32,
    ) -> Result<Packet, SessionError<SPI::Error>> {
        self.start_receive()?;
        for _ in 0..max_polls {
            if self
                .poll_ready()
                .map_err(SessionError::at(SessionStep::PollReady))?
            {
                return self.finish_receive();
            }
            self.delay.delay_us(poll_interval_us);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("rx: no packet after {=u32} polls", max_polls);
        self.mode
            .return_to_standby()
            .map_err(SessionError::at(SessionStep::ReturnToStandby))?;
        Err(SessionError {
            step: SessionStep::PollReady,
            cause: Error::Timeout,
        })
    }

    /// Transmits one packet to `address`.
    ///
    /// `payload` is written as-is and may be shorter than TX_PW. `address` is
    /// least significant byte first and must be exactly TX_AFW bytes long,
    /// since the module sends TX_AFW address bytes regardless of how many
    /// were written.
    pub fn transmit(
        &mut self,
        payload: &[u8],
        address: &[u8],
    ) -> Result<(), SessionError<SPI::Error>> {
        let payload = Packet::new(payload).map_err(SessionError::at(SessionStep::Prepare))?;
        let address = Address::new(address).map_err(SessionError::at(SessionStep::Prepare))?;
        if payload.len() > usize::from(self.config.tx_payload_width()) {
            return Err(SessionError {
                step: SessionStep::Prepare,
                cause: Error::InvalidLength(payload.len()),
            });
        }
        if address.len() != usize::from(self.config.tx_address_width()) {
            return Err(SessionError {
                step: SessionStep::Prepare,
                cause: Error::InvalidLength(address.len()),
            });
        }

        self.mode
            .ensure_standby(&mut self.delay)
            .map_err(SessionError::at(SessionStep::Standby))?;
        self.device
            .send_command(Opcode::WriteTxPayload, &payload, &mut [])
            .map_err(SessionError::at(SessionStep::WritePayload))?;
        self.device
            .send_command(Opcode::WriteTxAddress, &address, &mut [])
            .map_err(SessionError::at(SessionStep::WriteAddress))?;
        self.mode
            .enter_transmit(&mut self.delay)
            .map_err(SessionError::at(SessionStep::EnterTransmit))?;
        self.mode
            .pulse_ce(&mut self.delay)
            .map_err(SessionError::at(SessionStep::Pulse))?;
        self.mode
            .return_to_standby()
            .map_err(SessionError::at(SessionStep::ReturnToStandby))?;

        #[cfg(feature = "defmt")]
        defmt::debug!("tx: {=[u8]:x} -> {=[u8]:x}", payload.as_slice(), address.as_slice());
        Ok(())
    }

    /// Reads the TX payload register back with RTP
    pub fn read_tx_payload(&mut self) -> Result<Packet, Error<SPI::Error>> {
        self.mode.ensure_standby(&mut self.delay)?;
        let width = usize::from(self.config.tx_payload_width());
        let mut packet = Packet::empty();
        self.device
            .send_command(Opcode::ReadTxPayload, &[], packet.buffer_mut(width))?;
        Ok(packet)
    }

    /// Reads the TX address register back with RTA
    pub fn read_tx_address(&mut self) -> Result<Address, Error<SPI::Error>> {
        self.mode.ensure_standby(&mut self.delay)?;
        let width = usize::from(self.config.tx_address_width());
        if width == 0 || width > MAX_ADDRESS_LEN {
            return Err(InvalidLength(width).into());
        }
        let mut raw = [0u8; MAX_ADDRESS_LEN];
        self.device
            .send_command(Opcode::ReadTxAddress, &[], &mut raw[..width])?;
        Ok(Address::new(&raw[..width])?)
    }
}
