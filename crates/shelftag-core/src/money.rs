//! # Money Module
//!
//! Provides the `Money` type for handling prices safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Floating point cannot represent most decimal prices exactly:           │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                     │
//! │                                                                         │
//! │  A catalog that stores 12.35 as f64 and exports it back to CSV can      │
//! │  drift by a cent after an import/export round trip. Storing the         │
//! │  smallest currency unit as i64 makes the round trip exact:             │
//! │                                                                         │
//! │    "1,250.50" ──parse──► 125050 ──display──► "1,250.50"                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shelftag_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! assert_eq!(price.to_string(), "10.99");
//!
//! // Text from forms or CSV files
//! let parsed: Money = "1,250.5".parse().unwrap();
//! assert_eq!(parsed.cents(), 125050);
//! assert_eq!(parsed.plain(), "1250.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: negative values are representable so the store's
///   defense-in-depth check has something to reject
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Parses decimal text such as `"12"`, `"12.5"`, `"1,250.50"`.
    ///
    /// ## Rules
    /// - Surrounding whitespace and `,` thousands separators are ignored
    /// - An optional leading `+` or `-` sign
    /// - Any number of fraction digits; rounded half-up to two places
    ///
    /// ## Example
    /// ```rust
    /// use shelftag_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12.345").unwrap().cents(), 1235);
    /// assert_eq!(Money::parse("-3").unwrap().cents(), -300);
    /// assert!(Money::parse("12.3.4").is_err());
    /// assert!(Money::parse("abc").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Money, ParseMoneyError> {
        text.parse()
    }

    /// Formats without thousands separators (`1250.50`).
    ///
    /// Used for CSV export so the value re-imports without quoting issues.
    pub fn plain(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Error returned when text is not a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoneyError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    NotANumber(String),

    #[error("'{0}' is too large")]
    Overflow(String),
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let not_a_number = || ParseMoneyError::NotANumber(s.trim().to_string());
        let overflow = || ParseMoneyError::Overflow(s.trim().to_string());

        let (negative, unsigned) = match cleaned.as_bytes()[0] {
            b'-' => (true, &cleaned[1..]),
            b'+' => (false, &cleaned[1..]),
            _ => (false, cleaned.as_str()),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(not_a_number());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(not_a_number());
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }
        cents = cents.checked_mul(100).ok_or_else(overflow)?;

        let mut fraction_digits = fraction.bytes().map(|d| i64::from(d - b'0'));
        let tenths = fraction_digits.next().unwrap_or(0);
        let hundredths = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().map(|d| d >= 5).unwrap_or(false);

        cents = cents
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display with thousands grouping: `1,250.50`.
///
/// ## Note
/// The currency label ("DA") is added by the printing layer, which owns
/// the configured currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.major().abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}{}.{:02}", sign, grouped, self.minor())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(125050).to_string(), "1,250.50");
        assert_eq!(Money::from_cents(123456789).to_string(), "1,234,567.89");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_plain_has_no_grouping() {
        assert_eq!(Money::from_cents(125050).plain(), "1250.50");
        assert_eq!(Money::from_cents(7).plain(), "0.07");
    }

    #[test]
    fn test_parse_accepts_common_shapes() {
        assert_eq!(Money::parse("12").unwrap().cents(), 1200);
        assert_eq!(Money::parse(" 12.5 ").unwrap().cents(), 1250);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse(".5").unwrap().cents(), 50);
        assert_eq!(Money::parse("7.").unwrap().cents(), 700);
        assert_eq!(Money::parse("1,250.50").unwrap().cents(), 125050);
        assert_eq!(Money::parse("+3").unwrap().cents(), 300);
        assert_eq!(Money::parse("-3.25").unwrap().cents(), -325);
    }

    #[test]
    fn test_parse_rounds_half_up() {
        assert_eq!(Money::parse("12.345").unwrap().cents(), 1235);
        assert_eq!(Money::parse("12.344").unwrap().cents(), 1234);
        assert_eq!(Money::parse("0.999").unwrap().cents(), 100);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), Err(ParseMoneyError::Empty));
        assert_eq!(Money::parse("   "), Err(ParseMoneyError::Empty));
        assert!(matches!(Money::parse("abc"), Err(ParseMoneyError::NotANumber(_))));
        assert!(matches!(Money::parse("1.2.3"), Err(ParseMoneyError::NotANumber(_))));
        assert!(matches!(Money::parse("."), Err(ParseMoneyError::NotANumber(_))));
        assert!(matches!(Money::parse("1e5"), Err(ParseMoneyError::NotANumber(_))));
        assert!(matches!(
            Money::parse("99999999999999999999"),
            Err(ParseMoneyError::Overflow(_))
        ));
    }

    #[test]
    fn test_display_parse_agree() {
        let original = Money::from_cents(98765432);
        let reparsed = Money::parse(&original.to_string()).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_cents(1).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(Money::from_cents(-1).is_negative());
    }
}
