//! Round a byte to the nearest multiple of another, half up.
//!
//! The two variants differ only when rounding up passes 255:
//! [`round_wrap`] lets the result wrap around (usually to 0) while
//! [`round_sat`] falls back to the nearest smaller multiple.

/// `x + y/2` rounded down to a multiple of `y`, before any overflow handling.
fn round_up_wide(x: u8, y: u8) -> u16 {
    let t = u16::from(x) + u16::from(y / 2);
    t - t % u16::from(y)
}

/// Round `x` to the nearest multiple of `y`, wrapping on overflow.
///
/// `round_wrap(255, 10)` is 0. A zero `y` gives 0.
pub fn round_wrap(x: u8, y: u8) -> u8 {
    if y == 0 {
        return 0;
    }
    let t = round_up_wide(x, y);
    match u8::try_from(t) {
        Ok(t) => t,
        Err(_) => (t as u8) / y * y,
    }
}

/// Round `x` to the nearest multiple of `y`, saturating on overflow.
///
/// `round_sat(255, 10)` is 250. A zero `y` gives 0.
pub fn round_sat(x: u8, y: u8) -> u8 {
    if y == 0 {
        return 0;
    }
    u8::try_from(round_up_wide(x, y)).unwrap_or(x / y * y)
}
