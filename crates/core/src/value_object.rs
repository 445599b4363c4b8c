//! Value objects: equality by value, not identity.

use core::iter::Sum;
use core::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two service selections with the same
/// flags are the same selection, two amounts with the same cents are the
/// same amount. They are cheap to copy and compared field by field.
///
/// Example:
/// - `Money(61490)` is a value object
/// - a tire record keyed by its part number is an entity
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Non-negative currency amount held as integer cents.
///
/// All fee and price arithmetic happens on cents so that totals are exact and
/// reproducible; conversion to text always renders two decimals.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "MoneyRepr", into = "String")]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Convert a floating point amount (e.g. from a config file) to cents,
    /// rounding half away from zero.
    pub fn from_f64(value: f64) -> DomainResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::validation(format!(
                "amount {value} must be a non-negative number"
            )));
        }
        Ok(Self((value * 100.0).round() as u64))
    }

    /// Parse an amount as it appears in price lists.
    ///
    /// Accepts `100`, `100.5`, `99,95`, `1.234,50`, `1,234.50` and an
    /// optional `€`/`EUR` suffix. A single separator followed by exactly three
    /// digits is read as a thousands separator. More than two decimals are
    /// rounded half-up to the cent.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let mut text = raw.trim();
        for suffix in ["€", "EUR", "eur"] {
            if let Some(stripped) = text.strip_suffix(suffix) {
                text = stripped.trim_end();
            }
        }
        if text.is_empty() {
            return Err(DomainError::validation("amount is empty"));
        }
        if text.starts_with('-') {
            return Err(DomainError::validation(format!(
                "amount '{raw}' cannot be negative"
            )));
        }
        let text = text.strip_prefix('+').unwrap_or(text);

        let (int_part, frac_part) = split_decimal(text);
        let invalid = || DomainError::validation(format!("'{raw}' is not a valid amount"));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        let frac = frac_part.as_bytes();
        let mut cents = 0u64;
        for i in 0..2 {
            cents = cents * 10 + frac.get(i).map(|b| u64::from(b - b'0')).unwrap_or(0);
        }
        if frac.get(2).is_some_and(|b| *b >= b'5') {
            cents += 1;
        }

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Self)
            .ok_or_else(invalid)
    }

    /// `self * quantity`, saturating at `u64::MAX` cents.
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }
}

fn split_decimal(text: &str) -> (String, String) {
    let strip = |s: &str| s.chars().filter(|c| *c != ',' && *c != '.').collect::<String>();

    let decimal_at = match (text.rfind(','), text.rfind('.')) {
        (Some(c), Some(d)) => Some(c.max(d)),
        (Some(i), None) | (None, Some(i)) => {
            let sep = &text[i..=i];
            let occurrences = text.matches(sep).count();
            let digits_after = text.len() - i - 1;
            (occurrences == 1 && digits_after != 3).then_some(i)
        }
        (None, None) => None,
    };

    match decimal_at {
        Some(i) => (strip(&text[..i]), text[i + 1..].to_string()),
        None => (strip(text), String::new()),
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::str::FromStr for Money {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Wire representation: config files may hold `25`, `25.0` or `"25,00"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<MoneyRepr> for Money {
    type Error = DomainError;

    fn try_from(value: MoneyRepr) -> Result<Self, Self::Error> {
        match value {
            MoneyRepr::Number(n) => Money::from_f64(n),
            MoneyRepr::Text(s) => Money::parse(&s),
        }
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_common_price_list_formats() {
        assert_eq!(Money::parse("100").unwrap(), Money::from_cents(10_000));
        assert_eq!(Money::parse("100.5").unwrap(), Money::from_cents(10_050));
        assert_eq!(Money::parse("99,95").unwrap(), Money::from_cents(9_995));
        assert_eq!(Money::parse("1.234,50").unwrap(), Money::from_cents(123_450));
        assert_eq!(Money::parse("1,234.50").unwrap(), Money::from_cents(123_450));
        assert_eq!(Money::parse("1.234").unwrap(), Money::from_cents(123_400));
        assert_eq!(Money::parse(" 39,90 € ").unwrap(), Money::from_cents(3_990));
        assert_eq!(Money::parse("55 EUR").unwrap(), Money::from_cents(5_500));
        assert_eq!(Money::parse(",5").unwrap(), Money::from_cents(50));
    }

    #[test]
    fn rounds_extra_decimals_half_up() {
        assert_eq!(Money::parse("89.8999").unwrap(), Money::from_cents(8_990));
        assert_eq!(Money::parse("0.0049").unwrap(), Money::from_cents(0));
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(matches!(
            Money::parse("-5").unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("").is_err());
        assert!(Money::parse("1.2.3,4x").is_err());
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money::from_cents(61_490).to_string(), "614.90");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn arithmetic_is_exact() {
        let fee = Money::from_cents(3_000);
        assert_eq!(fee.times(4), Money::from_cents(12_000));
        let total: Money = [Money::from_cents(995), Money::from_cents(5)].into_iter().sum();
        assert_eq!(total, Money::from_cents(1_000));
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("25").unwrap();
        let from_float: Money = serde_json::from_str("9.95").unwrap();
        let from_text: Money = serde_json::from_str("\"39,90\"").unwrap();
        assert_eq!(from_number, Money::from_cents(2_500));
        assert_eq!(from_float, Money::from_cents(995));
        assert_eq!(from_text, Money::from_cents(3_990));
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"39.90\"");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: rendering then parsing an amount gives the same cents back.
        #[test]
        fn display_parses_back(cents in 0u64..10_000_000_000u64) {
            let money = Money::from_cents(cents);
            prop_assert_eq!(Money::parse(&money.to_string()).unwrap(), money);
        }
    }
}
