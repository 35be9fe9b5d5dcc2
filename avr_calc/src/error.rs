use thiserror_no_std::Error;

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::timer::TimerSetting;

/// Every calculation either fits the target register or fails with this.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// Zero input, unknown timer, no prescaler fits, divisor wider than the
    /// register, or baud error above the configured margin.
    #[error("value out of range")]
    OutOfRange,
}

impl CalcError {
    /// Value returned in place of a register value at a raw (C-style) boundary.
    pub const SENTINEL: i8 = -1;
}

/// `UBRRn` value, or [`CalcError::SENTINEL`].
pub fn raw_ubrr(result: Result<i16, CalcError>) -> i16 {
    result.unwrap_or(CalcError::SENTINEL as i16)
}

/// `CSn2:0` clock-select bits, or [`CalcError::SENTINEL`].
pub fn raw_cs_bits(result: Result<TimerSetting, CalcError>) -> i8 {
    match result {
        Ok(setting) => setting.cs_bits() as i8,
        Err(_) => CalcError::SENTINEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimerId;

    #[test]
    fn sentinel_replaces_errors() {
        assert_eq!(raw_ubrr(Err(CalcError::OutOfRange)), -1);
        assert_eq!(raw_ubrr(Ok(103)), 103);
        assert_eq!(raw_cs_bits(Err(CalcError::OutOfRange)), -1);
    }

    #[test]
    fn raw_cs_bits_are_one_based() {
        let setting = TimerSetting::new(TimerId::Timer2, 3, 249);
        assert_eq!(raw_cs_bits(Ok(setting)), 4);
    }
}
