#![cfg_attr(not(test), no_std)]
//! nRF905 Radio Driver
//!
//! This crate provides a type-safe interface for the Nordic nRF905
//! single-chip 433/868/915 MHz transceiver. The nRF905 is a half-duplex
//! GFSK radio with a hardware packet engine: preamble, address matching and
//! CRC are handled on chip, and the host only exchanges raw payloads over SPI.
//!
//! # Features
//! - Frequency bands: 433, 868 and 915 MHz, selected by a 9-bit channel
//!   number and the HFREQ_PLL bit
//! - Output power: -10 to +10 dBm
//! - Payloads up to 32 bytes, addresses of 1 to 4 bytes
//! - 8- or 16-bit CRC generated and checked by the module
//! - Data Ready (DR) pin raised once a valid packet is buffered
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`registers`]: the 10-byte configuration register image
//!   - Typed accessors for every field
//!   - Regional band to channel lookup
//!
//! - [`commands`]: the SPI instruction set
//!   - Instruction bytes
//!   - Payload and address buffers
//!
//! - [`device`]: bus layer
//!   - Frames one instruction per SPI transaction, sync and async
//!
//! - [`mode`]: operating mode state machine
//!   - Drives PWR_UP, TRX_CE and TX_EN with the required settling delays
//!   - Rejects transitions the module does not support
//!
//! - [`radio`]: receive and transmit sessions
//!
//! # Usage
//! Bring-up follows a fixed sequence:
//!
//! 1. Create an [`Nrf905`] from an SPI device, the control [`Pins`], a delay
//!    and a [`Profile`]
//! 2. Call [`Nrf905::configure`] with a [`Band`]; this powers the module up,
//!    writes the register image and reads it back
//! 3. Call [`Nrf905::receive`] or [`Nrf905::transmit`] for each packet
//!
//! # Important Notes
//! - Power-up takes 2 s for the crystal to start
//! - RX and TX can only be entered from standby, never from each other
//! - [`Nrf905::receive`] busy-waits on DR with no timeout
//! - CSN is owned by the `SpiDevice`; every instruction is one transaction
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}, spi::SpiDevice};
//! use nrf905::{Band, Nrf905, Pins, Profile};
//!
//! fn run<SPI, CE, TXEN, PWR, DR, D>(spi: SPI, pins: Pins<CE, TXEN, PWR, DR>, delay: D)
//! where
//!     SPI: SpiDevice,
//!     CE: OutputPin,
//!     TXEN: OutputPin,
//!     PWR: OutputPin,
//!     DR: InputPin,
//!     D: DelayNs,
//! {
//!     let mut radio = Nrf905::new(spi, pins, delay, Profile::default());
//!     if radio.configure(Band::Europe).is_err() {
//!         return;
//!     }
//!     let _ = radio.transmit(b"hello", &[0xCC, 0xCC, 0xCC, 0xCC]);
//!     if let Ok(packet) = radio.receive() {
//!         let _bytes: &[u8] = &packet;
//!     }
//! }
//! ```

pub mod commands;
pub mod device;
pub mod error;
pub mod mode;
pub mod profile;
pub mod radio;
pub mod registers;

pub use commands::*;
pub use device::Device;
pub use error::{Error, SessionError, SessionStep};
pub use mode::{ModeController, ModeError, ModeState, Timing};
pub use profile::{InputPull, Pins, Profile};
pub use radio::Nrf905;
pub use registers::*;
