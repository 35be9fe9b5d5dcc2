//! Build-time clock configuration.
//!
//! `F_CPU` is the system clock in Hz and `UART_MAX_ERR_PERMILLE` the largest
//! baud error accepted by [`ClockConfig::solve_baud`](crate::ClockConfig::solve_baud),
//! in tenths of a percent. Both are read from the environment at compile time;
//! `build.rs` fills in 16 MHz and 2.5% when they are not set.

#[cfg(feature = "defmt")]
use defmt::Format;

/// System clock in Hz, parsed from the `F_CPU` environment variable.
/// Compilation fails if it is not a valid decimal number or is zero.
pub const F_CPU: u32 = parse_decimal(env!("F_CPU"));

/// Maximum baud error in permille, parsed from `UART_MAX_ERR_PERMILLE`.
pub const UART_MAX_ERR_PERMILLE: u16 = {
    let permille = parse_decimal(env!("UART_MAX_ERR_PERMILLE"));
    assert!(permille <= 1000, "UART_MAX_ERR_PERMILLE must be at most 1000");
    permille as u16
};

const _: () = assert!(F_CPU > 0, "F_CPU must be greater than zero");

/// Statically parse a decimal string into a u32.
const fn parse_decimal(string: &'static str) -> u32 {
    let mut bytes = string.as_bytes();
    assert!(!bytes.is_empty());
    let mut res: u32 = 0;
    while let [byte, rest @ ..] = bytes {
        bytes = rest;
        let digit = match byte {
            b'0'..=b'9' => (*byte - b'0') as u32,
            b'_' => continue,
            _ => panic!("Clock configuration is not a valid decimal number"),
        };
        res = match res.checked_mul(10) {
            Some(res) => match res.checked_add(digit) {
                Some(res) => res,
                None => panic!("Clock configuration does not fit in 32 bits"),
            },
            None => panic!("Clock configuration does not fit in 32 bits"),
        };
    }
    res
}

/// Largest accepted deviation between requested and achieved baud rate.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ErrorMargin {
    permille: u16,
}

impl ErrorMargin {
    /// The build-time margin, `UART_MAX_ERR_PERMILLE`.
    pub const DEFAULT: ErrorMargin = ErrorMargin::from_permille(UART_MAX_ERR_PERMILLE);

    /// 25 permille is 2.5%.
    pub const fn from_permille(permille: u16) -> Self {
        Self { permille }
    }

    pub const fn permille(self) -> u16 {
        self.permille
    }

    /// Largest absolute baud difference inside the margin for `baud`.
    pub const fn max_deviation(self, baud: u32) -> u64 {
        baud as u64 * self.permille as u64 / 1000
    }
}

/// Clock and tolerance the solvers work against.
#[cfg_attr(feature = "defmt", derive(Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    clock_hz: u32,
    baud_margin: Option<ErrorMargin>,
}

impl ClockConfig {
    /// `F_CPU`, with margin checking as selected by the `uart-error-check` feature.
    pub const BUILD: ClockConfig = ClockConfig::new(F_CPU);

    /// Margin checking follows the `uart-error-check` feature.
    ///
    /// # Panics
    /// If `clock_hz` is zero. In a const context this fails the build instead.
    pub const fn new(clock_hz: u32) -> Self {
        assert!(clock_hz > 0, "clock frequency must be greater than zero");
        let baud_margin = if cfg!(feature = "uart-error-check") {
            Some(ErrorMargin::DEFAULT)
        } else {
            None
        };
        Self { clock_hz, baud_margin }
    }

    pub const fn with_error_margin(mut self, margin: ErrorMargin) -> Self {
        self.baud_margin = Some(margin);
        self
    }

    pub const fn without_error_check(mut self) -> Self {
        self.baud_margin = None;
        self
    }

    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub const fn baud_margin(&self) -> Option<ErrorMargin> {
        self.baud_margin
    }
}
