//! Payload and address buffers
//!
//! Both are fixed-capacity, stack-allocated byte buffers sized to the
//! module's registers. They carry raw bytes only: preamble and CRC are
//! added and stripped by the module itself.

use core::ops::Deref;

use crate::registers::{InvalidLength, MAX_ADDRESS_LEN, MAX_PAYLOAD_LEN};

/// Payload of a single packet, 1 to 32 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    data: [u8; MAX_PAYLOAD_LEN],
    len: u8,
}

impl Packet {
    pub fn new(bytes: &[u8]) -> Result<Self, InvalidLength> {
        if bytes.is_empty() || bytes.len() > MAX_PAYLOAD_LEN {
            return Err(InvalidLength(bytes.len()));
        }
        let mut data = [0; MAX_PAYLOAD_LEN];
        data[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            data,
            len: bytes.len() as u8,
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }

    pub(crate) fn buffer_mut(&mut self, len: usize) -> &mut [u8] {
        self.len = len.min(MAX_PAYLOAD_LEN) as u8;
        &mut self.data[..usize::from(self.len)]
    }

    pub(crate) fn empty() -> Self {
        Self {
            data: [0; MAX_PAYLOAD_LEN],
            len: 0,
        }
    }
}

impl Deref for Packet {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// TX address, 1 to 4 bytes, least significant byte first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address {
    bytes: [u8; MAX_ADDRESS_LEN],
    len: u8,
}

impl Address {
    pub fn new(bytes: &[u8]) -> Result<Self, InvalidLength> {
        if bytes.is_empty() || bytes.len() > MAX_ADDRESS_LEN {
            return Err(InvalidLength(bytes.len()));
        }
        let mut buf = [0; MAX_ADDRESS_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len() as u8,
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl Deref for Address {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<[u8; MAX_ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; MAX_ADDRESS_LEN]) -> Self {
        Self {
            bytes,
            len: MAX_ADDRESS_LEN as u8,
        }
    }
}
