//! nRF905 SPI interface
//!
//! This module provides the bus layer of the driver: framing of nRF905
//! instructions over SPI. It supports both synchronous and asynchronous
//! operations.
//!
//! The interface is built around the `Device<SPI>` struct which wraps an SPI
//! device and provides methods for:
//! - Sending a raw instruction with outgoing and incoming data
//! - Reading and writing the configuration register
//!
//! Chip select is owned by the `SpiDevice` implementation. Every method
//! issues exactly one SPI transaction, so CSN stays asserted for the
//! instruction byte and all of its data, and no other transfer can be
//! interleaved with it.
//!
//! # Example
//! ```no_run
//! use nrf905::{Device, ConfigRegister};
//!
//! # fn example<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> Result<(), nrf905::Error<SPI::Error>> {
//! let mut device = Device::new(spi);
//!
//! device.write_register(ConfigRegister::default())?;
//! let read_back: ConfigRegister = device.read_register()?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::spi::Operation;
use regiface::{ByteArray, ReadableRegister, WritableRegister};

use crate::commands::Opcode;
use crate::error::Error;

/// Bus-level interface to the nRF905.
///
/// This struct wraps an SPI device and frames nRF905 instructions on it.
/// It has no notion of the module's operating mode; see [`crate::Nrf905`]
/// for that.
pub struct Device<SPI> {
    spi: SPI,
}

impl<SPI> Device<SPI> {
    /// Creates a new Device instance wrapping the provided SPI device.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal::spi::SpiDevice,
{
    /// Sends one instruction.
    ///
    /// Writes the opcode followed by `out`, then clocks `input.len()` bytes
    /// back into `input`. Empty `out` or `input` are skipped.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn send_command(
        &mut self,
        opcode: Opcode,
        out: &[u8],
        input: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.send_raw(opcode.byte(), out, input)
    }

    fn send_raw(
        &mut self,
        header: u8,
        out: &[u8],
        input: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("spi: {=u8:#x} out={=usize} in={=usize}", header, out.len(), input.len());

        let header = [header];
        let result = match (out.is_empty(), input.is_empty()) {
            (true, true) => self.spi.transaction(&mut [Operation::Write(&header)]),
            (false, true) => self
                .spi
                .transaction(&mut [Operation::Write(&header), Operation::Write(out)]),
            (true, false) => self
                .spi
                .transaction(&mut [Operation::Write(&header), Operation::Read(input)]),
            (false, false) => self.spi.transaction(&mut [
                Operation::Write(&header),
                Operation::Write(out),
                Operation::Read(input),
            ]),
        };
        result.map_err(Error::Bus)
    }

    /// Reads a register from configuration memory.
    ///
    /// # Type Parameters
    /// * `R` - Register type whose id is its offset into configuration memory
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn read_register<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8, Error = Infallible>,
    {
        let mut raw_value = R::Array::new();
        self.send_raw(
            Opcode::ReadConfig.with_offset(R::id()),
            &[],
            raw_value.as_mut(),
        )?;
        Ok(infallible(R::from_bytes(raw_value)))
    }

    /// Writes a register to configuration memory.
    ///
    /// # Errors
    /// * `Error::Bus` - SPI communication failed
    pub fn write_register<R>(&mut self, register: R) -> Result<(), Error<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = infallible(register.to_bytes());
        self.send_raw(
            Opcode::WriteConfig.with_offset(R::id()),
            raw_value.as_ref(),
            &mut [],
        )
    }
}

impl<SPI> Device<SPI>
where
    SPI: embedded_hal_async::spi::SpiDevice,
{
    /// Asynchronously sends one instruction.
    ///
    /// This is the async version of [`send_command`](Device::send_command).
    pub async fn send_command_async(
        &mut self,
        opcode: Opcode,
        out: &[u8],
        input: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        self.send_raw_async(opcode.byte(), out, input).await
    }

    async fn send_raw_async(
        &mut self,
        header: u8,
        out: &[u8],
        input: &mut [u8],
    ) -> Result<(), Error<SPI::Error>> {
        use embedded_hal_async::spi::Operation;

        let header = [header];
        let result = match (out.is_empty(), input.is_empty()) {
            (true, true) => self.spi.transaction(&mut [Operation::Write(&header)]).await,
            (false, true) => {
                self.spi
                    .transaction(&mut [Operation::Write(&header), Operation::Write(out)])
                    .await
            }
            (true, false) => {
                self.spi
                    .transaction(&mut [Operation::Write(&header), Operation::Read(input)])
                    .await
            }
            (false, false) => {
                self.spi
                    .transaction(&mut [
                        Operation::Write(&header),
                        Operation::Write(out),
                        Operation::Read(input),
                    ])
                    .await
            }
        };
        result.map_err(Error::Bus)
    }

    /// Asynchronously reads a register from configuration memory.
    ///
    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async<R>(&mut self) -> Result<R, Error<SPI::Error>>
    where
        R: ReadableRegister<IdType = u8, Error = Infallible>,
    {
        let mut raw_value = R::Array::new();
        self.send_raw_async(
            Opcode::ReadConfig.with_offset(R::id()),
            &[],
            raw_value.as_mut(),
        )
        .await?;
        Ok(infallible(R::from_bytes(raw_value)))
    }

    /// Asynchronously writes a register to configuration memory.
    ///
    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async<R>(&mut self, register: R) -> Result<(), Error<SPI::Error>>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = infallible(register.to_bytes());
        self.send_raw_async(
            Opcode::WriteConfig.with_offset(R::id()),
            raw_value.as_ref(),
            &mut [],
        )
        .await
    }
}
