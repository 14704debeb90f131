//! Driver errors

use crate::mode::{ModeError, ModeState};
use crate::registers::{ConfigRegister, InvalidBand, InvalidChannel, InvalidLength};

/// Error type for all driver operations
///
/// `E` is the error type of the SPI device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Band index outside the frequency table
    InvalidBand(u8),
    /// Channel number does not fit in CH_NO
    InvalidChannel(u16),
    /// Payload or address length outside what the module accepts
    InvalidLength(usize),
    /// SPI transfer failed
    Bus(E),
    /// A control pin could not be driven or read
    Pin,
    /// Mode change not allowed from the current state
    InvalidTransition { from: ModeState, to: ModeState },
    /// Configuration read back from the module differs from what was written
    ConfigMismatch {
        written: ConfigRegister,
        read: ConfigRegister,
    },
    /// DR did not assert within the polling budget
    Timeout,
}

impl<E> From<InvalidBand> for Error<E> {
    fn from(err: InvalidBand) -> Self {
        Self::InvalidBand(err.0)
    }
}

impl<E> From<InvalidChannel> for Error<E> {
    fn from(err: InvalidChannel) -> Self {
        Self::InvalidChannel(err.0)
    }
}

impl<E> From<InvalidLength> for Error<E> {
    fn from(err: InvalidLength) -> Self {
        Self::InvalidLength(err.0)
    }
}

impl<E> From<ModeError> for Error<E> {
    fn from(err: ModeError) -> Self {
        match err {
            ModeError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            ModeError::Pin => Self::Pin,
        }
    }
}

/// Step of a receive or transmit session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionStep {
    /// Bringing the module to standby before the session starts
    Standby,
    /// Entering RX mode
    EnterReceive,
    /// Waiting for DR
    PollReady,
    /// Clocking out the RX payload
    ReadPayload,
    /// Validating the caller's payload and address
    Prepare,
    /// Writing the TX payload
    WritePayload,
    /// Writing the TX address
    WriteAddress,
    /// Entering TX mode
    EnterTransmit,
    /// Pulsing CE to send the packet
    Pulse,
    /// Returning to standby after RX or TX
    ReturnToStandby,
}

/// Failure of a receive or transmit session, tagged with the step it
/// happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionError<E> {
    pub step: SessionStep,
    pub cause: Error<E>,
}

impl<E> SessionError<E> {
    pub(crate) fn at<C: Into<Error<E>>>(step: SessionStep) -> impl FnOnce(C) -> Self {
        move |cause| Self {
            step,
            cause: cause.into(),
        }
    }
}
