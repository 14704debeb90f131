//! Operating mode control
//!
//! The nRF905 operating mode is set by three pins:
//!
//! | Mode       | PWR_UP | TRX_CE | TX_EN |
//! |------------|--------|--------|-------|
//! | Power-down | 0      | x      | x     |
//! | Standby    | 1      | 0      | x     |
//! | Receive    | 1      | 1      | 0     |
//! | Transmit   | 1      | x      | 1     |
//!
//! [`ModeController`] owns these pins and allows only the transitions below.
//! Each transition waits for the PLL to settle before returning.
//!
//! | From               | Event               | To       | Settle   |
//! |--------------------|---------------------|----------|----------|
//! | PowerDown          | `power_on`          | Standby  | 2 s      |
//! | Standby            | `enter_receive`     | Receive  | 650 µs   |
//! | Standby            | `enter_transmit`    | Transmit | 650 µs   |
//! | Receive / Transmit | `return_to_standby` | Standby  | none     |
//!
//! Transmit mode is entered with CE low; the packet goes out when CE is
//! pulsed with [`ModeController::pulse_ce`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Operating mode of the module as driven by this controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeState {
    PowerDown,
    Standby,
    Receive,
    Transmit,
}

/// Error raised by the mode controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeError {
    /// Requested transition is not in the transition table
    InvalidTransition { from: ModeState, to: ModeState },
    /// Driving a control pin failed
    Pin,
}

/// Settling delays for mode changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Crystal start-up after PWR_UP goes high
    pub power_up_ms: u32,
    /// Standby to RX/TX, PLL lock time
    pub settle_us: u32,
    /// Length of the CE pulse that sends one packet
    pub tx_pulse_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            power_up_ms: 2000,
            settle_us: 650,
            tx_pulse_ms: 10,
        }
    }
}

/// Owner of the PWR_UP, TRX_CE and TX_EN pins
pub struct ModeController<CE, TXEN, PWR> {
    ce: CE,
    txen: TXEN,
    pwr: PWR,
    state: ModeState,
    timing: Timing,
}

impl<CE, TXEN, PWR> ModeController<CE, TXEN, PWR>
where
    CE: OutputPin,
    TXEN: OutputPin,
    PWR: OutputPin,
{
    /// Takes the control pins. No pin is touched; the module is assumed to
    /// be powered down.
    pub fn new(ce: CE, txen: TXEN, pwr: PWR, timing: Timing) -> Self {
        Self {
            ce,
            txen,
            pwr,
            state: ModeState::PowerDown,
            timing,
        }
    }

    /// Releases the pins as `(ce, txen, pwr)`
    pub fn release(self) -> (CE, TXEN, PWR) {
        (self.ce, self.txen, self.pwr)
    }

    pub fn state(&self) -> ModeState {
        self.state
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    fn check(&self, allowed: &[ModeState], to: ModeState) -> Result<(), ModeError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("mode: rejected {} -> {}", self.state, to);
            Err(ModeError::InvalidTransition {
                from: self.state,
                to,
            })
        }
    }

    fn enter(&mut self, to: ModeState) {
        #[cfg(feature = "defmt")]
        defmt::debug!("mode: {} -> {}", self.state, to);
        self.state = to;
    }

    /// PowerDown -> Standby
    pub fn power_on(&mut self, delay: &mut impl DelayNs) -> Result<(), ModeError> {
        self.check(&[ModeState::PowerDown], ModeState::Standby)?;
        self.pwr.set_high().map_err(|_| ModeError::Pin)?;
        self.ce.set_low().map_err(|_| ModeError::Pin)?;
        self.txen.set_low().map_err(|_| ModeError::Pin)?;
        delay.delay_ms(self.timing.power_up_ms);
        self.enter(ModeState::Standby);
        Ok(())
    }

    /// Standby -> Receive
    pub fn enter_receive(&mut self, delay: &mut impl DelayNs) -> Result<(), ModeError> {
        self.check(&[ModeState::Standby], ModeState::Receive)?;
        self.txen.set_low().map_err(|_| ModeError::Pin)?;
        self.ce.set_high().map_err(|_| ModeError::Pin)?;
        delay.delay_us(self.timing.settle_us);
        self.enter(ModeState::Receive);
        Ok(())
    }

    /// Standby -> Transmit
    pub fn enter_transmit(&mut self, delay: &mut impl DelayNs) -> Result<(), ModeError> {
        self.check(&[ModeState::Standby], ModeState::Transmit)?;
        self.txen.set_high().map_err(|_| ModeError::Pin)?;
        self.ce.set_low().map_err(|_| ModeError::Pin)?;
        delay.delay_us(self.timing.settle_us);
        self.enter(ModeState::Transmit);
        Ok(())
    }

    /// Receive/Transmit -> Standby
    pub fn return_to_standby(&mut self) -> Result<(), ModeError> {
        self.check(
            &[ModeState::Receive, ModeState::Transmit],
            ModeState::Standby,
        )?;
        self.ce.set_low().map_err(|_| ModeError::Pin)?;
        self.txen.set_low().map_err(|_| ModeError::Pin)?;
        self.enter(ModeState::Standby);
        Ok(())
    }

    /// Brings the module to Standby from any state, powering it up if needed
    pub fn ensure_standby(&mut self, delay: &mut impl DelayNs) -> Result<(), ModeError> {
        match self.state {
            ModeState::PowerDown => self.power_on(delay),
            ModeState::Standby => Ok(()),
            ModeState::Receive | ModeState::Transmit => self.return_to_standby(),
        }
    }

    /// Raises CE for one TX pulse window, then lowers it again.
    ///
    /// Only valid in Transmit mode. The module stays in Transmit.
    pub fn pulse_ce(&mut self, delay: &mut impl DelayNs) -> Result<(), ModeError> {
        if self.state != ModeState::Transmit {
            return Err(ModeError::InvalidTransition {
                from: self.state,
                to: ModeState::Transmit,
            });
        }
        self.ce.set_high().map_err(|_| ModeError::Pin)?;
        delay.delay_ms(self.timing.tx_pulse_ms);
        self.ce.set_low().map_err(|_| ModeError::Pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::{CheckedDelay, NoopDelay, Transaction as DelayTransaction};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    type Controller = ModeController<PinMock, PinMock, PinMock>;

    fn controller(ce: &[PinTransaction], txen: &[PinTransaction], pwr: &[PinTransaction]) -> Controller {
        ModeController::new(
            PinMock::new(ce),
            PinMock::new(txen),
            PinMock::new(pwr),
            Timing::default(),
        )
    }

    fn done(controller: Controller) {
        let (mut ce, mut txen, mut pwr) = controller.release();
        ce.done();
        txen.done();
        pwr.done();
    }

    #[test]
    fn power_on_drives_pins_and_waits_for_oscillator() {
        let mut mode = controller(
            &[PinTransaction::set(PinState::Low)],
            &[PinTransaction::set(PinState::Low)],
            &[PinTransaction::set(PinState::High)],
        );
        let mut delay = CheckedDelay::new(&[DelayTransaction::delay_ms(2000)]);

        mode.power_on(&mut delay).unwrap();
        assert_eq!(mode.state(), ModeState::Standby);

        delay.done();
        done(mode);
    }

    #[test]
    fn receive_and_transmit_settle_for_pll_lock() {
        let mut mode = controller(
            &[
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
            ],
            &[
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
            ],
            &[PinTransaction::set(PinState::High)],
        );
        let mut delay = CheckedDelay::new(&[
            DelayTransaction::delay_ms(2000),
            DelayTransaction::delay_us(650),
            DelayTransaction::delay_us(650),
        ]);

        mode.power_on(&mut delay).unwrap();
        mode.enter_receive(&mut delay).unwrap();
        assert_eq!(mode.state(), ModeState::Receive);
        mode.return_to_standby().unwrap();
        mode.enter_transmit(&mut delay).unwrap();
        assert_eq!(mode.state(), ModeState::Transmit);
        mode.return_to_standby().unwrap();
        assert_eq!(mode.state(), ModeState::Standby);

        delay.done();
        done(mode);
    }

    #[test]
    fn direct_receive_transmit_switch_is_rejected() {
        let mut mode = controller(
            &[
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
            ],
            &[
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
            ],
            &[PinTransaction::set(PinState::High)],
        );
        let mut delay = NoopDelay::new();

        mode.power_on(&mut delay).unwrap();
        mode.enter_receive(&mut delay).unwrap();
        assert_eq!(
            mode.enter_transmit(&mut delay),
            Err(ModeError::InvalidTransition {
                from: ModeState::Receive,
                to: ModeState::Transmit
            })
        );
        assert_eq!(mode.state(), ModeState::Receive);

        mode.return_to_standby().unwrap();
        mode.enter_transmit(&mut delay).unwrap();
        assert_eq!(
            mode.enter_receive(&mut delay),
            Err(ModeError::InvalidTransition {
                from: ModeState::Transmit,
                to: ModeState::Receive
            })
        );

        done(mode);
    }

    #[test]
    fn transitions_outside_table_touch_no_pins() {
        let mut mode = controller(&[], &[], &[]);
        let mut delay = NoopDelay::new();

        assert!(mode.enter_receive(&mut delay).is_err());
        assert!(mode.enter_transmit(&mut delay).is_err());
        assert_eq!(
            mode.return_to_standby(),
            Err(ModeError::InvalidTransition {
                from: ModeState::PowerDown,
                to: ModeState::Standby
            })
        );
        assert!(mode.pulse_ce(&mut delay).is_err());
        assert_eq!(mode.state(), ModeState::PowerDown);

        done(mode);
    }

    #[test]
    fn power_on_twice_is_rejected() {
        let mut mode = controller(
            &[PinTransaction::set(PinState::Low)],
            &[PinTransaction::set(PinState::Low)],
            &[PinTransaction::set(PinState::High)],
        );
        let mut delay = NoopDelay::new();

        mode.power_on(&mut delay).unwrap();
        assert!(mode.power_on(&mut delay).is_err());
        mode.ensure_standby(&mut delay).unwrap();

        done(mode);
    }

    #[test]
    fn pulse_raises_ce_for_the_tx_window() {
        let mut mode = controller(
            &[
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
                PinTransaction::set(PinState::Low),
            ],
            &[
                PinTransaction::set(PinState::Low),
                PinTransaction::set(PinState::High),
            ],
            &[PinTransaction::set(PinState::High)],
        );
        let mut delay = CheckedDelay::new(&[
            DelayTransaction::delay_ms(2000),
            DelayTransaction::delay_us(650),
            DelayTransaction::delay_ms(10),
        ]);

        mode.power_on(&mut delay).unwrap();
        mode.enter_transmit(&mut delay).unwrap();
        mode.pulse_ce(&mut delay).unwrap();
        assert_eq!(mode.state(), ModeState::Transmit);

        delay.done();
        done(mode);
    }
}
