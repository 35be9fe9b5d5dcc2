//! Prescaler and `OCRnA` calculation for timers running in CTC mode.
//!
//! Timer0 and Timer2 are 8 bits wide, the others 16. Timer2 has the richer
//! prescaler set (`clk/32` and `clk/128` in addition), so use it if an 8-bit
//! timer is needed and accuracy matters.

#[cfg(feature = "defmt")]
use defmt::Format;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::error::CalcError;

/// Every prescaler divisor, ordered per timer family.
const PRESCALERS: [u16; 12] = [1, 8, 64, 256, 1024, 1, 8, 32, 64, 128, 256, 1024];

#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimerId {
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Timer4,
    Timer5,
}

impl TimerId {
    pub const ALL: [TimerId; 6] = [
        TimerId::Timer0,
        TimerId::Timer1,
        TimerId::Timer2,
        TimerId::Timer3,
        TimerId::Timer4,
        TimerId::Timer5,
    ];

    /// Counter width in bits.
    pub const fn bits(self) -> u8 {
        match self {
            TimerId::Timer0 | TimerId::Timer2 => 8,
            TimerId::Timer1 | TimerId::Timer3 | TimerId::Timer4 | TimerId::Timer5 => 16,
        }
    }

    /// Largest value the compare register can hold.
    pub const fn max_count(self) -> u16 {
        match self.bits() {
            8 => u8::MAX as u16,
            _ => u16::MAX,
        }
    }

    /// Prescaler divisors available to this timer, in `CS` bit order.
    pub fn prescalers(self) -> &'static [u16] {
        match self {
            TimerId::Timer2 => &PRESCALERS[5..12],
            _ => &PRESCALERS[0..5],
        }
    }
}

/// Raw timer number as used in register names (`TCCR2B` is timer 2).
impl TryFrom<u8> for TimerId {
    type Error = CalcError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TimerId::ALL
            .get(id as usize)
            .copied()
            .ok_or(CalcError::OutOfRange)
    }
}

/// A prescaler and compare value that produce the requested frequency.
#[cfg_attr(feature = "defmt", derive(Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerSetting {
    pub timer: TimerId,
    /// Index into [`TimerId::prescalers`], starting at 0 for every timer.
    pub prescaler_index: u8,
    /// Value for `OCRnA`.
    pub counter: u16,
}

impl TimerSetting {
    pub(crate) fn new(timer: TimerId, prescaler_index: u8, counter: u16) -> Self {
        Self {
            timer,
            prescaler_index,
            counter,
        }
    }

    pub fn prescaler(&self) -> u16 {
        self.timer.prescalers()[self.prescaler_index as usize]
    }

    /// `CSn2:0` field. Zero stops the timer, so the first prescaler is 1.
    pub fn cs_bits(&self) -> u8 {
        self.prescaler_index + 1
    }

    /// Compare-match frequency this setting produces with `clock_hz`.
    pub fn achieved_frequency(&self, clock_hz: u32) -> u32 {
        let ticks = u32::from(self.prescaler()) * (u32::from(self.counter) + 1);
        clock_hz / ticks
    }
}

impl ClockConfig {
    /// Find the smallest prescaler for which `target_freq` fits the timer's
    /// compare register.
    pub fn solve_timer(&self, target_freq: u32, timer: TimerId) -> Result<TimerSetting, CalcError> {
        if target_freq == 0 {
            return Err(CalcError::OutOfRange);
        }

        let divided = self.clock_hz() / target_freq;
        let max = u32::from(timer.max_count());

        timer
            .prescalers()
            .iter()
            .enumerate()
            .find_map(|(index, &prescaler)| {
                // A zero quotient has no counter value at all
                let counter = (divided / u32::from(prescaler)).checked_sub(1)?;
                (counter <= max).then(|| TimerSetting::new(timer, index as u8, counter as u16))
            })
            .ok_or(CalcError::OutOfRange)
    }
}

/// [`ClockConfig::solve_timer`] against the build-time clock.
pub fn solve_timer(target_freq: u32, timer: TimerId) -> Result<TimerSetting, CalcError> {
    ClockConfig::BUILD.solve_timer(target_freq, timer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK: ClockConfig = ClockConfig::new(16_000_000);

    #[test]
    fn zero_frequency_is_rejected() {
        for timer in TimerId::ALL {
            assert_eq!(CLOCK.solve_timer(0, timer), Err(CalcError::OutOfRange));
        }
    }

    #[test]
    fn first_prescaler_is_index_zero() {
        let setting = CLOCK.solve_timer(100_000, TimerId::Timer0).unwrap();
        assert_eq!(setting.prescaler_index, 0);
        assert_eq!(setting.counter, 159);
        assert_eq!(setting.prescaler(), 1);
        assert_eq!(setting.achieved_frequency(16_000_000), 100_000);
    }

    #[test]
    fn timer2_index_is_relative_to_its_own_range() {
        let setting = CLOCK.solve_timer(100_000, TimerId::Timer2).unwrap();
        assert_eq!(setting.prescaler_index, 0);
        assert_eq!(setting.cs_bits(), 1);

        // Timer0 has to skip clk/32 that Timer2 can use
        let timer0 = CLOCK.solve_timer(1000, TimerId::Timer0).unwrap();
        assert_eq!((timer0.prescaler_index, timer0.counter), (2, 249));
        assert_eq!(timer0.prescaler(), 64);

        let timer2 = CLOCK.solve_timer(1000, TimerId::Timer2).unwrap();
        assert_eq!((timer2.prescaler_index, timer2.counter), (3, 249));
        assert_eq!(timer2.prescaler(), 64);
        assert_eq!(timer2.cs_bits(), 4);

        let timer2 = CLOCK.solve_timer(2000, TimerId::Timer2).unwrap();
        assert_eq!(timer2.prescaler(), 32);
        assert_eq!(timer2.counter, 249);
    }

    #[test]
    fn wide_timers_share_the_short_range() {
        for timer in [TimerId::Timer1, TimerId::Timer3, TimerId::Timer4, TimerId::Timer5] {
            let setting = CLOCK.solve_timer(30, timer).unwrap();
            assert_eq!((setting.prescaler_index, setting.counter), (2, 8332));
        }
    }

    #[test]
    fn too_slow_for_an_8_bit_timer() {
        assert_eq!(CLOCK.solve_timer(60, TimerId::Timer0), Err(CalcError::OutOfRange));
        assert_eq!(CLOCK.solve_timer(60, TimerId::Timer2), Err(CalcError::OutOfRange));
        let setting = CLOCK.solve_timer(61, TimerId::Timer2).unwrap();
        assert_eq!((setting.prescaler(), setting.counter), (1024, 255));
    }

    #[test]
    fn too_slow_for_a_16_bit_timer() {
        let fast = ClockConfig::new(80_000_000);
        assert_eq!(fast.solve_timer(1, TimerId::Timer1), Err(CalcError::OutOfRange));
        let setting = fast.solve_timer(2, TimerId::Timer1).unwrap();
        assert_eq!((setting.prescaler(), setting.counter), (1024, 39061));
    }

    #[test]
    fn faster_than_the_clock() {
        assert_eq!(CLOCK.solve_timer(20_000_000, TimerId::Timer0), Err(CalcError::OutOfRange));
        let setting = CLOCK.solve_timer(16_000_000, TimerId::Timer1).unwrap();
        assert_eq!((setting.prescaler_index, setting.counter), (0, 0));
    }

    #[test]
    fn raw_timer_ids() {
        assert_eq!(TimerId::try_from(2), Ok(TimerId::Timer2));
        assert_eq!(TimerId::try_from(5), Ok(TimerId::Timer5));
        assert_eq!(TimerId::try_from(6), Err(CalcError::OutOfRange));
    }

    #[test]
    fn widths() {
        assert_eq!(TimerId::Timer0.max_count(), 255);
        assert_eq!(TimerId::Timer2.max_count(), 255);
        assert_eq!(TimerId::Timer4.max_count(), 65535);
        assert_eq!(TimerId::Timer2.prescalers().len(), 7);
        assert_eq!(TimerId::Timer5.prescalers(), &[1, 8, 64, 256, 1024]);
    }
}
