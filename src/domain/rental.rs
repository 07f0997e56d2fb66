use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Cents, VehicleId};

pub type CustomerId = i64;
pub type RentalId = i64;

/// A customer record, created when a rental opens. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

/// A rental row. State machine is one-way: open (return_date None) to
/// closed (return_date set), nothing further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rental {
    pub id: RentalId,
    pub vehicle_id: VehicleId,
    pub customer_id: CustomerId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: Cents,
    pub return_date: Option<NaiveDate>,
}

impl Rental {
    /// True while the vehicle is still out.
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// The computed side of a rental before it is persisted: agreed dates and
/// total cost. Pure arithmetic so the quote shown to the operator and the
/// row written to the store can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalTerms {
    pub days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: Cents,
}

impl RentalTerms {
    /// Compute end date and total cost for a rental starting on `start_date`.
    /// `total_cost = rate_per_day * days`, exact in integer cents.
    pub fn compute(
        rate_per_day: Cents,
        days: i64,
        start_date: NaiveDate,
    ) -> Result<Self, TermsError> {
        if days <= 0 {
            return Err(TermsError::NonPositiveDays(days));
        }
        if rate_per_day < 0 {
            return Err(TermsError::NegativeRate(rate_per_day));
        }

        let total_cost = rate_per_day
            .checked_mul(days)
            .ok_or(TermsError::Overflow)?;
        let span = Duration::try_days(days).ok_or(TermsError::Overflow)?;
        let end_date = start_date
            .checked_add_signed(span)
            .ok_or(TermsError::Overflow)?;

        Ok(Self {
            days,
            start_date,
            end_date,
            total_cost,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermsError {
    NonPositiveDays(i64),
    NegativeRate(Cents),
    Overflow,
}

impl std::fmt::Display for TermsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermsError::NonPositiveDays(days) => {
                write!(f, "rental days must be positive, got {}", days)
            }
            TermsError::NegativeRate(rate) => {
                write!(f, "daily rate must not be negative, got {} cents", rate)
            }
            TermsError::Overflow => write!(f, "rental terms overflow"),
        }
    }
}

impl std::error::Error for TermsError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_compute_terms() {
        let terms = RentalTerms::compute(5000, 3, date("2024-06-01")).unwrap();

        assert_eq!(terms.days, 3);
        assert_eq!(terms.start_date, date("2024-06-01"));
        assert_eq!(terms.end_date, date("2024-06-04"));
        assert_eq!(terms.total_cost, 15000); // $50.00 * 3 = $150.00 exactly
    }

    #[test]
    fn test_compute_terms_crosses_month_boundary() {
        let terms = RentalTerms::compute(4550, 5, date("2024-01-29")).unwrap();

        assert_eq!(terms.end_date, date("2024-02-03"));
        assert_eq!(terms.total_cost, 22750);
    }

    #[test]
    fn test_zero_days_rejected() {
        let result = RentalTerms::compute(5000, 0, date("2024-06-01"));
        assert_eq!(result, Err(TermsError::NonPositiveDays(0)));
    }

    #[test]
    fn test_negative_days_rejected() {
        let result = RentalTerms::compute(5000, -2, date("2024-06-01"));
        assert_eq!(result, Err(TermsError::NonPositiveDays(-2)));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result = RentalTerms::compute(-100, 3, date("2024-06-01"));
        assert_eq!(result, Err(TermsError::NegativeRate(-100)));
    }

    #[test]
    fn test_cost_overflow_rejected() {
        let result = RentalTerms::compute(Cents::MAX, 2, date("2024-06-01"));
        assert_eq!(result, Err(TermsError::Overflow));
    }

    #[test]
    fn test_day_count_overflow_rejected() {
        // A modest rate keeps the cost in range; the day count itself is
        // beyond what the calendar arithmetic can represent.
        let result = RentalTerms::compute(5000, 200_000_000_000, date("2024-06-01"));
        assert_eq!(result, Err(TermsError::Overflow));
    }

    #[test]
    fn test_rental_is_open() {
        let mut rental = Rental {
            id: 1,
            vehicle_id: 1,
            customer_id: 1,
            start_date: date("2024-06-01"),
            end_date: date("2024-06-04"),
            total_cost: 15000,
            return_date: None,
        };
        assert!(rental.is_open());

        rental.return_date = Some(date("2024-06-03"));
        assert!(!rental.is_open());
    }
}
