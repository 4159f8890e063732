use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::LedgerError;
use super::Decimal;

/// Number of decimal places in one major currency unit (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// An exact monetary amount, stored as a signed count of minor units.
///
/// Balances and transaction amounts never touch binary floating point:
/// every conversion into `Money` either lands exactly on a minor unit or fails
/// with [`LedgerError::InvalidAmount`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor_units(units: i64) -> Self {
        Self(units)
    }

    /// Builds an amount from whole major units, e.g. `from_major_units(5)` is `5.00`.
    pub fn from_major_units(units: i64) -> Result<Self, LedgerError> {
        units
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .map(Self)
            .ok_or_else(|| LedgerError::invalid_amount(units, "amount out of range"))
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Rejects zero and negative amounts.
    pub fn ensure_positive(self) -> Result<Self, LedgerError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(LedgerError::invalid_amount(self, "amount must be positive"))
        }
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_neg(self) -> Option<Money> {
        self.0.checked_neg().map(Self)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > MINOR_UNIT_SCALE {
            return Err(LedgerError::invalid_amount(
                value,
                "amount has a fractional minor unit",
            ));
        }
        value
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .and_then(|scaled| scaled.to_i64())
            .map(Self)
            .ok_or_else(|| LedgerError::invalid_amount(value, "amount out of range"))
    }
}

impl TryFrom<f64> for Money {
    type Error = LedgerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(LedgerError::invalid_amount(value, "amount is not finite"));
        }
        let decimal = Decimal::from_f64(value)
            .ok_or_else(|| LedgerError::invalid_amount(value, "amount out of range"))?;
        Money::try_from(decimal)
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `from_str_exact` refuses to round digits beyond what a Decimal can hold.
        let decimal = Decimal::from_str_exact(s.trim())
            .map_err(|_| LedgerError::invalid_amount(s, "not an exact decimal number"))?;
        Money::try_from(decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Read the text as written; letting the format infer a number would
        // route it through f64 first.
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_decimal_is_exact() {
        assert_eq!(Money::try_from(dec!(100.5)).unwrap(), Money::from_minor_units(10050));
        assert_eq!(Money::try_from(dec!(0.01)).unwrap(), Money::from_minor_units(1));
        assert_eq!(Money::try_from(dec!(100000)).unwrap(), Money::from_minor_units(10_000_000));
    }

    #[test]
    fn test_trailing_zeros_are_not_sub_unit() {
        assert_eq!(Money::try_from(dec!(1.2000)).unwrap(), Money::from_minor_units(120));
    }

    #[test]
    fn test_rejects_fractional_cent() {
        let err = Money::try_from(dec!(1.005)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn test_rejects_non_finite_floats() {
        assert!(Money::try_from(f64::NAN).is_err());
        assert!(Money::try_from(f64::INFINITY).is_err());
        assert!(Money::try_from(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_float_without_drift() {
        assert_eq!(Money::try_from(0.1).unwrap(), Money::from_minor_units(10));
        assert_eq!(Money::try_from(200_000.0).unwrap(), Money::from_major_units(200_000).unwrap());
    }

    #[test]
    fn test_parse_and_display() {
        let money: Money = " 42.5 ".parse().unwrap();
        assert_eq!(money.to_string(), "42.50");
        assert_eq!(Money::from_minor_units(-5).to_string(), "-0.05");
        assert!("abc".parse::<Money>().is_err());
    }

    #[test]
    fn test_parse_keeps_every_digit() {
        let large: Money = "12345678901234567.89".parse().unwrap();
        assert_eq!(large, Money::from_minor_units(1_234_567_890_123_456_789));
        assert_eq!(large.to_string(), "12345678901234567.89");

        for sub_unit in ["0.0100000000000000001", "0.010000000000000000000000000000001"] {
            let err = sub_unit.parse::<Money>().unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount { .. }), "{sub_unit}");
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct Row {
        amount: Money,
    }

    fn read_rows(input: &str) -> Vec<Result<Row, csv::Error>> {
        csv::Reader::from_reader(input.as_bytes())
            .deserialize()
            .collect()
    }

    #[test]
    fn test_deserialize_from_csv_is_exact() {
        let rows = read_rows("amount\n12345678901234567.89\n0.0100000000000000001\n7.5");

        assert_eq!(
            rows[0].as_ref().unwrap().amount,
            Money::from_minor_units(1_234_567_890_123_456_789)
        );
        assert!(rows[1].is_err());
        assert_eq!(rows[2].as_ref().unwrap().amount, Money::from_minor_units(750));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(Money::from_minor_units(1).ensure_positive().is_ok());
        assert!(Money::ZERO.ensure_positive().is_err());
        assert!(Money::from_minor_units(-500).ensure_positive().is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_minor_units(700);
        let b = Money::from_minor_units(300);
        assert_eq!(a.checked_add(b), Some(Money::from_minor_units(1000)));
        assert_eq!(b.checked_sub(a), Some(Money::from_minor_units(-400)));
        assert_eq!(Money::from_minor_units(i64::MAX).checked_add(b), None);
        assert_eq!(Money::from_minor_units(i64::MIN).checked_neg(), None);
        assert!(Money::from_major_units(i64::MAX).is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Money::from_minor_units(1) > Money::ZERO);
        assert!(Money::from_minor_units(-1).is_negative());
    }
}
