//! SPI instruction set
//!
//! Every exchange with the nRF905 is a single SPI transaction framed by CSN:
//! one instruction byte followed by zero or more data bytes in either
//! direction. The instruction set is small and closed:
//!
//! | Instruction | Byte        | Data                                |
//! |-------------|-------------|-------------------------------------|
//! | WC          | 0x00 + off  | register image from `off`, MOSI     |
//! | RC          | 0x10 + off  | register image from `off`, MISO     |
//! | WTP         | 0x20        | TX payload, MOSI                    |
//! | RTP         | 0x21        | TX payload, MISO                    |
//! | WTA         | 0x22        | TX address, MOSI                    |
//! | RTA         | 0x23        | TX address, MISO                    |
//! | RRP         | 0x24        | RX payload, MISO                    |
//!
//! # Important Notes
//! - Configuration and TX register instructions are issued in standby or
//!   power-down with CE low; RRP is issued while still in RX mode, once DR
//!   is high
//! - TX payload and TX address must both be written before CE is pulsed
//! - Reading the RX payload clears DR once the last byte is clocked out

mod opcode;
mod payload;

pub use opcode::*;
pub use payload::*;
