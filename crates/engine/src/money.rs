use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// Monetary epsilon used to treat near-zero remainders as fully settled.
pub const TOLERANCE: f64 = 0.005;

/// Largest magnitude in cents a stored amount may take. Up to here every cent
/// is still exact as an `f64` in major units.
const MAX_CENTS: i64 = 9_000_000_000_000_000;

/// Rounds `value` to 2 decimals.
///
/// Non-finite input (`NaN`, `±inf`) yields `0.0`, so a bad number can never
/// propagate into a stored balance.
///
/// ```rust
/// use engine::round2;
///
/// assert_eq!(round2(10.456), 10.46);
/// assert_eq!(round2(f64::NAN), 0.0);
/// ```
#[must_use]
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Signed money amount represented as **integer cents**.
///
/// Every balance and amount in the document goes through this type, so a
/// stored value always has exactly 2 decimals. On the wire (the persisted
/// JSON document) it is a plain number in major units, e.g. `1500.25`.
///
/// Because the representation is exact, the settlement tolerance of
/// [`TOLERANCE`] collapses to integer comparisons: a remainder is settled
/// once it is `<= 0` cents.
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::from_major(12.345_1);
/// assert_eq!(amount.cents(), 1235);
/// assert_eq!(amount.to_string(), "LKR 12.35");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(MAX_CENTS);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates an amount from a major-unit float, rounding to 2 decimals.
    /// Non-finite input becomes zero.
    #[must_use]
    pub fn from_major(value: f64) -> Self {
        Self((round2(value) * 100.0).round() as i64)
    }

    /// Like [`Money::from_major`], but `None` for non-finite input or
    /// anything beyond [`Money::MAX`].
    #[must_use]
    pub fn try_from_major(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > MAX_CENTS as f64 {
            return None;
        }
        Some(Self::from_major(value))
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the value in major units (e.g. `12.35`).
    #[must_use]
    pub fn as_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `true` once an outstanding amount is within [`TOLERANCE`] of zero.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        self.0 <= 0
    }

    /// Tolerance-aware equality.
    #[must_use]
    pub fn approx_eq(self, other: Money) -> bool {
        (self.as_major() - other.as_major()).abs() < TOLERANCE
    }

    /// `None` when the sum leaves `-MAX..=MAX`.
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_add(rhs.0)
            .filter(|cents| cents.abs() <= MAX_CENTS)
            .map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.checked_add(-rhs)
    }

    /// Splits the amount in `parts` equal shares, rounded to cents.
    #[must_use]
    pub fn split(self, parts: u32) -> Money {
        if parts == 0 {
            return Money::ZERO;
        }
        Money::from_major(self.as_major() / f64::from(parts))
    }

    /// Multiplies the amount by an integer count.
    #[must_use]
    pub fn times(self, count: u32) -> Money {
        Money(self.0.saturating_mul(i64::from(count)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, digit) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{sign}LKR {grouped}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

/// Totals saturate instead of overflowing.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| Money(acc.0.saturating_add(m.0)))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::try_from_major(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {value}")))
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` as decimal separator, `,` as thousands separator and an
    /// optional leading `+`/`-`. Rejects more than 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::Validation(format!("invalid amount: {s}"));

        let trimmed = s.trim();
        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim().replace(',', "");
        if rest.is_empty() {
            return Err(EngineError::Validation("empty amount".to_string()));
        }

        let (units_str, cents_str) = match rest.split_once('.') {
            Some((units, cents)) => (units, Some(cents)),
            None => (rest.as_str(), None),
        };

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| invalid())?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::Validation("too many decimals".to_string())),
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .filter(|v| *v <= MAX_CENTS)
            .ok_or_else(|| EngineError::Validation("amount too large".to_string()))?;

        Ok(Money(sign * total))
    }
}
