//! Numeric policy: lenient parsing and fixed-precision rounding.
//!
//! Every fractional value the server puts on the wire (timer readings,
//! payout shares, bet averages) goes through [`Precision::apply`], so
//! cumulative floating-point error stays bounded no matter how many rounds
//! a room plays.

/// Decimal precision for each kind of published value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Countdown readings, in seconds.
    Timer,
    /// Mean of the other players' bets (display only).
    Average,
    /// A winner's share of the loser's bet.
    Share,
}

impl Precision {
    /// Number of decimal places kept.
    pub const fn places(self) -> u32 {
        match self {
            Self::Timer => 2,
            Self::Average => 3,
            Self::Share => 6,
        }
    }

    /// Rounds `value` to this precision.
    pub fn apply(self, value: f64) -> f64 {
        round_to(value, self.places())
    }
}

/// Rounds half away from zero at `places` decimal places.
///
/// Non-finite input is returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Parses the longest numeric prefix of `input`, ignoring leading
/// whitespace: `"7.5 coins"` is `7.5`, `"abc"` is `None`.
///
/// Returns `Some(±inf)` for `"Infinity"` and for literals that overflow
/// `f64`; callers treat non-finite values as invalid.
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    let negative = bytes.first() == Some(&b'-');
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
