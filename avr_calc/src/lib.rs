//! # AVR register calculator
//!
//! Computes register values for 8-bit AVR parts from a target frequency and
//! the system clock:
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`timer`] | Prescaler (`CSn2:0`) and `OCRnA` values for CTC mode |
//! | [`uart`] | `UBRRn` for a baud rate, with optional error margin check |
//! | [`round`] | Rounding a byte to the nearest multiple of another |
//! | [`config`] | Build-time `F_CPU` and error margin, [`ClockConfig`] |
//!
//! Nothing here touches hardware; callers write the results to the registers
//! themselves. Everything is pure and safe to call from interrupt handlers.
//!
//! The free functions use [`ClockConfig::BUILD`]. Set `F_CPU` (Hz) in the
//! environment when building to match the board:
//!
//! ```bash
//! F_CPU=8000000 cargo build
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod config;
pub mod error;
pub mod round;
pub mod timer;
pub mod uart;

pub use config::{ClockConfig, ErrorMargin, F_CPU};
pub use error::{raw_cs_bits, raw_ubrr, CalcError};
pub use round::{round_sat, round_wrap};
pub use timer::{solve_timer, TimerId, TimerSetting};
pub use uart::{achieved_baud, solve_baud};
