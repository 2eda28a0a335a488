use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Cents;

pub type ApartmentId = i64;

/// Every generated charge carries the same common-expense amount (100.00).
pub const CHARGE_AMOUNT_CENTS: Cents = 10_000;

/// A calendar month, always within 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(u32);

impl Month {
    pub fn new(value: u32) -> Option<Self> {
        (1..=12).contains(&value).then_some(Self(value))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// January through December, in order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }
}

impl TryFrom<u32> for Month {
    type Error = InvalidMonth;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Month::new(value).ok_or(InvalidMonth(value))
    }
}

impl From<Month> for u32 {
    fn from(month: Month) -> Self {
        month.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMonth(pub u32);

impl fmt::Display for InvalidMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month must be between 1 and 12, got {}", self.0)
    }
}

impl std::error::Error for InvalidMonth {}

/// A billing period, rendered as `YYYY-MM` with a zero-padded month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// The periods a generation request targets: the single month when given,
    /// otherwise all twelve months of the year.
    pub fn for_year(year: i32, month: Option<Month>) -> Vec<Period> {
        match month {
            Some(month) => vec![Period::new(year, month)],
            None => Month::all().map(|m| Period::new(year, m)).collect(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month.number())
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.trim().split_once('-').ok_or(ParsePeriodError)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(ParsePeriodError);
        }
        let year: i32 = year.parse().map_err(|_| ParsePeriodError)?;
        let month: u32 = month.parse().map_err(|_| ParsePeriodError)?;
        let month = Month::new(month).ok_or(ParsePeriodError)?;
        Ok(Period::new(year, month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePeriodError;

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid period, expected YYYY-MM")
    }
}

impl std::error::Error for ParsePeriodError {}

/// Identity of a charge. The period is kept as the caller supplied it so that a
/// lookup for a malformed period simply finds nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChargeKey {
    pub apartment_id: ApartmentId,
    pub period: String,
}

impl ChargeKey {
    pub fn new(apartment_id: ApartmentId, period: impl Into<String>) -> Self {
        Self {
            apartment_id,
            period: period.into(),
        }
    }

    /// Store key: `"{apartment_id}-{period}"`, e.g. `"101-2024-03"`.
    pub fn doc_key(&self) -> String {
        format!("{}-{}", self.apartment_id, self.period)
    }
}

impl fmt::Display for ChargeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.doc_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Unpaid,
    /// Terminal: a paid charge never returns to unpaid.
    Paid,
}

impl ChargeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Unpaid => "unpaid",
            ChargeStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(ChargeStatus::Unpaid),
            "paid" => Some(ChargeStatus::Paid),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, ChargeStatus::Paid)
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monthly common-expense charge for one apartment.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRecord {
    pub apartment_id: ApartmentId,
    pub period: String,
    pub amount_cents: Cents,
    pub paid: bool,
    /// Set exactly when `paid` is true.
    pub payment_date: Option<NaiveDate>,
}

impl ChargeRecord {
    /// A fresh, unpaid charge for the standard amount.
    pub fn new(apartment_id: ApartmentId, period: Period) -> Self {
        Self {
            apartment_id,
            period: period.to_string(),
            amount_cents: CHARGE_AMOUNT_CENTS,
            paid: false,
            payment_date: None,
        }
    }

    pub fn key(&self) -> ChargeKey {
        ChargeKey::new(self.apartment_id, self.period.clone())
    }

    pub fn status(&self) -> ChargeStatus {
        if self.paid {
            ChargeStatus::Paid
        } else {
            ChargeStatus::Unpaid
        }
    }

    /// Apply the Unpaid -> Paid transition. Returns false, leaving the record
    /// untouched, when the charge was already paid.
    pub fn mark_paid(&mut self, payment_date: NaiveDate) -> bool {
        if self.paid {
            return false;
        }
        self.paid = true;
        self.payment_date = Some(payment_date);
        true
    }
}
