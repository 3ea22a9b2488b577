//! Money represented as a whole number of taka.
//!
//! The cafeteria prices everything in whole currency units, so the amount is
//! a plain `i64`. Arithmetic on refund percentages floors toward zero.

use serde::{Deserialize, Serialize};

/// A monetary amount in whole taka.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a money amount from a whole number of taka.
    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in whole taka.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the given percentage of this amount, floored.
    ///
    /// `Money::new(500).percent(40)` is `Money::new(200)`;
    /// `Money::new(501).percent(40)` floors to `Money::new(200)`.
    pub fn percent(&self, pct: u32) -> Money {
        Money(self.0 * i64::from(pct) / 100)
    }

    /// Returns the smaller of the two amounts.
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tk {}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_arithmetic() {
        let a = Money::new(200);
        let b = Money::new(40);

        assert_eq!((a + b).amount(), 240);
        assert_eq!((a - b).amount(), 160);
    }

    #[test]
    fn money_percent_floors() {
        assert_eq!(Money::new(500).percent(40), Money::new(200));
        assert_eq!(Money::new(501).percent(40), Money::new(200));
        assert_eq!(Money::new(1).percent(40), Money::zero());
        assert_eq!(Money::new(0).percent(40), Money::zero());
    }

    #[test]
    fn money_min() {
        assert_eq!(Money::new(100).min(Money::new(240)), Money::new(100));
        assert_eq!(Money::new(240).min(Money::new(100)), Money::new(100));
    }

    #[test]
    fn money_comparison() {
        assert!(Money::new(100).is_positive());
        assert!(Money::zero().is_zero());
        assert!(Money::new(240) > Money::new(100));
    }

    #[test]
    fn money_serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&Money::new(240)).unwrap(), "240");
        let back: Money = serde_json::from_str("240").unwrap();
        assert_eq!(back, Money::new(240));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::new(240).to_string(), "Tk 240");
    }
}
