use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Which kind of entity an import produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Order,
}

impl EntityKind {
    // Column / field holding related product names
    pub fn relation_key(&self) -> Option<&'static str> {
        match self {
            EntityKind::Product => None,
            EntityKind::Order => Some("products"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Order => "order",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("'{0}' is not a decimal number")]
    Invalid(String),

    #[error("'{0}' has more than 2 decimal places")]
    TooPrecise(String),

    #[error("'{0}' has more than 8 digits")]
    TooLarge(String),
}

/// Money amount stored as cents: at most 8 digits, 2 of them decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Price(i64);

impl Price {
    const MAX_WHOLE_DIGITS: usize = 6;

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        let invalid = || PriceError::Invalid(raw.to_string());

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(PriceError::TooPrecise(raw.to_string()));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > Self::MAX_WHOLE_DIGITS {
            return Err(PriceError::TooLarge(raw.to_string()));
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let cents = whole * 100 + frac;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub discount: u16,
    pub archived: bool,
    pub created_by: Option<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub products: Vec<u64>,
    pub promocode: String,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
}

// Product payload before it gets an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub discount: u16,
    pub archived: bool,
    pub created_by: Option<u64>,
}

// Order payload before it gets an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: u64,
    pub promocode: String,
    pub delivery_address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewEntity {
    Product(NewProduct),
    Order(NewOrder),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> Result<Price, PriceError> {
        s.parse()
    }

    #[test]
    fn parses_common_amounts() {
        assert_eq!(price("12.50").unwrap().cents(), 1250);
        assert_eq!(price("12.5").unwrap().cents(), 1250);
        assert_eq!(price("7").unwrap().cents(), 700);
        assert_eq!(price(".99").unwrap().cents(), 99);
        assert_eq!(price(" 0 ").unwrap().cents(), 0);
        assert_eq!(price("-3.05").unwrap().cents(), -305);
        assert_eq!(price("999999.99").unwrap().cents(), 99_999_999);
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(matches!(price(""), Err(PriceError::Invalid(_))));
        assert!(matches!(price("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(price("1.2.3"), Err(PriceError::Invalid(_))));
        assert!(matches!(price("1.234"), Err(PriceError::TooPrecise(_))));
        assert!(matches!(price("1000000"), Err(PriceError::TooLarge(_))));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Price::from_cents(1250).to_string(), "12.50");
        assert_eq!(Price::from_cents(7).to_string(), "0.07");
        assert_eq!(Price::from_cents(-305).to_string(), "-3.05");
        assert_eq!(serde_json::to_string(&Price::from_cents(100)).unwrap(), "\"1.00\"");
    }

    #[test]
    fn relation_key_only_for_orders() {
        assert_eq!(EntityKind::Order.relation_key(), Some("products"));
        assert_eq!(EntityKind::Product.relation_key(), None);
    }
}
