//! `UBRRn` calculation for the asynchronous USART.

use crate::config::ClockConfig;
use crate::error::CalcError;

/// `UBRRn` is 12 bits wide.
pub const UBRR_MAX: u16 = 4095;

const fn multiplier(double_speed: bool) -> u32 {
    // U2Xn halves the sample clock divider
    if double_speed {
        8
    } else {
        16
    }
}

/// Baud rate the USART actually runs at for a given `UBRRn` value.
pub fn achieved_baud(clock_hz: u32, ubrr: u16, double_speed: bool) -> u32 {
    let divisor = u64::from(multiplier(double_speed)) * (u64::from(ubrr) + 1);
    (u64::from(clock_hz) / divisor) as u32
}

/// Relative difference between `achieved` and `baud`, in permille (rounded down).
pub fn error_permille(achieved: u32, baud: u32) -> u32 {
    if baud == 0 {
        return 0;
    }
    (u64::from(achieved.abs_diff(baud)) * 1000 / u64::from(baud)) as u32
}

impl ClockConfig {
    /// Find the `UBRRn` value whose baud rate is closest to `baud`.
    ///
    /// The truncated estimate is compared with its neighbour only, which is
    /// enough because the achieved baud rate falls as the divisor grows.
    /// When a margin is configured, a result outside it is rejected.
    pub fn solve_baud(&self, baud: u32, double_speed: bool) -> Result<i16, CalcError> {
        if baud == 0 {
            return Err(CalcError::OutOfRange);
        }

        let clock = self.clock_hz();
        let quotient = u64::from(clock) / (u64::from(baud) * u64::from(multiplier(double_speed)));
        let first = quotient
            .checked_sub(1)
            .filter(|&ubrr| ubrr <= u64::from(UBRR_MAX))
            .ok_or(CalcError::OutOfRange)? as u16;

        let achieved = achieved_baud(clock, first, double_speed);
        if achieved == baud {
            return Ok(first as i16);
        }

        let first_diff = achieved.abs_diff(baud);
        let second = if achieved > baud {
            first.checked_add(1).filter(|&ubrr| ubrr <= UBRR_MAX)
        } else {
            first.checked_sub(1)
        };

        let (ubrr, diff) = match second {
            Some(second) => {
                let second_diff = achieved_baud(clock, second, double_speed).abs_diff(baud);
                if second_diff < first_diff {
                    (second, second_diff)
                } else {
                    (first, first_diff)
                }
            }
            None => (first, first_diff),
        };

        if let Some(margin) = self.baud_margin() {
            if u64::from(diff) > margin.max_deviation(baud) {
                return Err(CalcError::OutOfRange);
            }
        }

        Ok(ubrr as i16)
    }
}

/// [`ClockConfig::solve_baud`] against the build-time configuration.
pub fn solve_baud(baud: u32, double_speed: bool) -> Result<i16, CalcError> {
    ClockConfig::BUILD.solve_baud(baud, double_speed)
}
