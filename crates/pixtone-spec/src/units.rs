//! Exact numbers with optional SI-prefixed units.
//!
//! Values such as `"220 Hz"`, `"10 kHz"`, `"0.7"`, or `"1/3 s"` are parsed into
//! exact rationals and converted into a target unit without ever passing
//! through floating point. Only two base units exist: `Hz` for frequencies and
//! `s` for durations.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use num_rational::Ratio;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::UnitError;


/// Exact rational number used for every user-facing quantity.
pub type Rational = Ratio<i128>;

/// A number followed by an optional unit, e.g. `10 kHz` or `1/3s`.
const QUANTITY_PATTERN: &str = r"^\s*([0-9./]+)\s*(\S*)\s*$";

/// Units that may carry an SI prefix.
const BASE_UNITS: &[&str] = &["Hz", "s"];

/// SI prefixes and their power-of-ten exponents.
const PREFIXES: &[(char, i32)] = &[
    ('y', -24),
    ('z', -21),
    ('a', -18),
    ('f', -15),
    ('p', -12),
    ('n', -9),
    ('μ', -6),
    ('u', -6),
    ('m', -3),
    ('k', 3),
    ('M', 6),
    ('G', 9),
    ('T', 12),
    ('P', 15),
    ('E', 18),
    ('Z', 21),
    ('Y', 24),
];

static QUANTITY_REGEX: OnceLock<Regex> = OnceLock::new();

fn quantity_regex() -> &'static Regex {
    QUANTITY_REGEX.get_or_init(|| Regex::new(QUANTITY_PATTERN).expect("invalid regex pattern"))
}

/// Parses an unsigned exact number: `10`, `0.25`, `.5`, `10.`, or `3/4`.
///
/// Returns `None` for anything else, including a zero denominator.
pub fn parse_number(text: &str) -> Option<Rational> {
    let text = text.trim();

    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_digits(numer)?;
        let denom = parse_digits(denom)?;
        if denom == 0 {
            return None;
        }
        return Some(Rational::new(numer, denom));
    }

    if let Some((whole, frac)) = text.split_once('.') {
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        let whole = if whole.is_empty() {
            0
        } else {
            parse_digits(whole)?
        };
        if frac.is_empty() {
            return Some(Rational::from_integer(whole));
        }
        let scale = 10i128.checked_pow(u32::try_from(frac.len()).ok()?)?;
        let numer = whole.checked_mul(scale)?.checked_add(parse_digits(frac)?)?;
        return Some(Rational::new(numer, scale));
    }

    parse_digits(text).map(Rational::from_integer)
}

fn parse_digits(text: &str) -> Option<i128> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parses `text` and converts it into `target_unit`.
///
/// A bare number is taken to already be in `target_unit`. The target may
/// itself be prefixed, so `parse_quantity("1.5 s", "ms")` yields `1500`.
///
/// # Errors
/// * [`UnitError::Malformed`] if the text is not a number with an optional unit
/// * [`UnitError::UnknownUnit`] if a unit or prefix is not recognized
/// * [`UnitError::Incompatible`] if the unit measures another quantity
/// * [`UnitError::OutOfRange`] if the converted value overflows
pub fn parse_quantity(text: &str, target_unit: &str) -> Result<Rational, UnitError> {
    let malformed = || UnitError::Malformed {
        input: text.to_string(),
    };
    let caps = quantity_regex().captures(text).ok_or_else(malformed)?;
    let value = parse_number(&caps[1]).ok_or_else(malformed)?;

    let unit = &caps[2];
    if unit.is_empty() {
        return Ok(value);
    }

    let (found_base, found_exp) = split_unit(unit)?;
    let (target_base, target_exp) = split_unit(target_unit)?;
    if found_base != target_base {
        return Err(UnitError::Incompatible {
            found: unit.to_string(),
            expected: target_unit.to_string(),
        });
    }

    rescale(value, found_exp - target_exp).ok_or_else(|| UnitError::OutOfRange {
        input: text.to_string(),
    })
}

/// Parses a plain number that must not carry a unit (e.g. a gain).
pub fn parse_scalar(text: &str) -> Result<Rational, UnitError> {
    let malformed = || UnitError::Malformed {
        input: text.to_string(),
    };
    let caps = quantity_regex().captures(text).ok_or_else(malformed)?;
    if !caps[2].is_empty() {
        return Err(UnitError::UnexpectedUnit {
            input: text.to_string(),
        });
    }
    parse_number(&caps[1]).ok_or_else(malformed)
}

/// Converts an exact rational to the nearest `f64`.
pub fn to_f64(value: Rational) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// Formats a rational the way status lines show it: exact when integral,
/// otherwise `~` followed by two decimals.
pub fn approx(value: Rational) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("~{:.2}", to_f64(value))
    }
}

/// Splits a unit into its base and power-of-ten exponent (`kHz` -> `Hz`, 3).
fn split_unit(unit: &str) -> Result<(&str, i32), UnitError> {
    if BASE_UNITS.contains(&unit) {
        return Ok((unit, 0));
    }

    let mut chars = unit.chars();
    if let Some(first) = chars.next() {
        let rest = chars.as_str();
        if let Some(exp) = prefix_exponent(first) {
            if BASE_UNITS.contains(&rest) {
                return Ok((rest, exp));
            }
        }
    }

    Err(UnitError::UnknownUnit {
        unit: unit.to_string(),
    })
}

fn prefix_exponent(prefix: char) -> Option<i32> {
    PREFIXES
        .iter()
        .find(|(c, _)| *c == prefix)
        .map(|(_, exp)| *exp)
}

fn rescale(value: Rational, exp: i32) -> Option<Rational> {
    let factor = 10i128.checked_pow(exp.unsigned_abs())?;
    if exp >= 0 {
        Some(Rational::new(value.numer().checked_mul(factor)?, *value.denom()))
    } else {
        Some(Rational::new(*value.numer(), value.denom().checked_mul(factor)?))
    }
}

/// Declares an exact quantity newtype that parses from and serializes to a
/// unit string.
macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Rational);

        impl $name {
            /// Unit the value is expressed in.
            pub const UNIT: &'static str = $unit;

            /// Wraps an exact value already expressed in this unit.
            pub fn new(value: Rational) -> Self {
                Self(value)
            }

            /// Wraps an integral value.
            pub fn from_integer(value: i128) -> Self {
                Self(Rational::from_integer(value))
            }

            /// Returns the exact value.
            pub fn value(&self) -> Rational {
                self.0
            }

            /// Returns the value as a float.
            pub fn to_f64(&self) -> f64 {
                to_f64(self.0)
            }

            /// Returns true if the value is strictly greater than zero.
            pub fn is_positive(&self) -> bool {
                self.0 > Rational::from_integer(0)
            }

            /// Formats the value for status lines (`10 ms`, `~3.33 ms`).
            pub fn approx(&self) -> String {
                format!("{} {}", approx(self.0), $unit)
            }
        }

        impl FromStr for $name {
            type Err = UnitError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                parse_quantity(text, $unit).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $unit)
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnitError;

            fn try_from(text: String) -> Result<Self, Self::Error> {
                text.parse()
            }
        }

        impl From<$name> for String {
            fn from(quantity: $name) -> String {
                quantity.to_string()
            }
        }
    };
}

quantity!(
    /// An exact duration in milliseconds.
    Millis,
    "ms"
);

quantity!(
    /// An exact frequency in hertz.
    Hertz,
    "Hz"
);
