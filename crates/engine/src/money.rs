use std::{fmt, ops::Neg, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Signed money amount represented as **integer minor units** (cents).
///
/// Every monetary value in the engine (debits, credits, user-entered
/// magnitudes) is a `Money`; floating point never touches an amount.
///
/// The domain is symmetric, `-i64::MAX..=i64::MAX`, so [`Neg`] and
/// [`Money::abs`] never overflow. Addition and subtraction are checked.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(-12_34);
/// assert_eq!(amount.cents(), -1234);
/// assert_eq!(amount.abs(), Money::new(1234));
/// assert_eq!(-amount, Money::new(1234));
/// assert_eq!(amount.to_string(), "-12.34");
/// ```
///
/// Parsing operator input (accepts `.` or `,`; digits past the second decimal
/// are truncated):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("50".parse::<Money>().unwrap().cents(), 5000);
/// assert_eq!("10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert_eq!("12.349".parse::<Money>().unwrap().cents(), 1234);
/// assert!("twelve".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(i64::MAX);
    pub const MIN: Money = Money(-i64::MAX);

    /// Creates an amount from integer minor units.
    ///
    /// `i64::MIN` has no positive counterpart and saturates to [`Money::MIN`].
    /// Use [`Money::try_from`] to reject it instead.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        if cents == i64::MIN {
            Self::MIN
        } else {
            Self(cents)
        }
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` when the result leaves the domain).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_add(rhs.0)
            .and_then(|v| Money::try_from(v).ok())
    }

    /// Checked subtraction (returns `None` when the result leaves the domain).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_sub(rhs.0)
            .and_then(|v| Money::try_from(v).ok())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl TryFrom<i64> for Money {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == i64::MIN {
            return Err(ValidationError::InvalidAmount(
                "amount out of range".to_string(),
            ));
        }
        Ok(Self(value))
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Converts a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// Fractional digits beyond the second are dropped, never rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidAmount(format!("\"{}\" is not a number", s.trim()));
        let overflow = || ValidationError::InvalidAmount("amount out of range".to_string());

        let trimmed = s.trim();
        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.replace(',', ".");
        let (units_str, frac_str) = match rest.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (rest.as_str(), ""),
        };

        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if units_str.is_empty() || !is_digits(units_str) || !is_digits(frac_str) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| overflow())?;
        let cents: i64 = frac_str
            .chars()
            .chain(std::iter::repeat('0'))
            .take(2)
            .try_fold(0i64, |acc, c| {
                c.to_digit(10).map(|d| acc * 10 + i64::from(d))
            })
            .ok_or_else(invalid)?;

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}
