use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::vehicle::Vehicle;

/// Passenger fare class
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PassengerCategory {
    #[default]
    Adult,
    Student,
}

impl fmt::Display for PassengerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassengerCategory::Adult => f.write_str("adult"),
            PassengerCategory::Student => f.write_str("student"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown passenger category: {0}")]
pub struct UnknownCategory(pub String);

/// A fare that does not fit in a `Decimal`, e.g. from a corrupt seat price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Fare amount out of range")]
pub struct FareOverflow;

impl FromStr for PassengerCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adult" => Ok(PassengerCategory::Adult),
            "student" => Ok(PassengerCategory::Student),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Fare rules of one vehicle: a base price per seat and a student discount.
///
/// The discount percentage is used as delivered by the backend. Values outside
/// [0, 100] are not clamped; they are logged so they show up in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareCalculator {
    base_price: Decimal,
    discount_percent: Decimal,
}

impl FareCalculator {
    pub fn new(base_price: Decimal, discount_percent: Decimal) -> Self {
        if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
            tracing::warn!(
                "Student discount {}% is outside [0, 100]; using it unchanged",
                discount_percent
            );
        }
        Self { base_price, discount_percent }
    }

    pub fn for_vehicle(vehicle: &Vehicle) -> Self {
        Self::new(vehicle.price_per_seat, vehicle.student_discount)
    }

    /// Price of a single seat for the given category
    pub fn unit_price(&self, category: PassengerCategory) -> Result<Decimal, FareOverflow> {
        match category {
            PassengerCategory::Adult => Ok(self.base_price),
            PassengerCategory::Student => self
                .discount_percent
                .checked_div(Decimal::ONE_HUNDRED)
                .and_then(|share| Decimal::ONE.checked_sub(share))
                .and_then(|factor| self.base_price.checked_mul(factor))
                .ok_or(FareOverflow),
        }
    }

    /// Sum of unit prices; empty input totals zero.
    pub fn total<I>(&self, categories: I) -> Result<Decimal, FareOverflow>
    where
        I: IntoIterator<Item = PassengerCategory>,
    {
        categories.into_iter().try_fold(Decimal::ZERO, |sum, category| {
            sum.checked_add(self.unit_price(category)?).ok_or(FareOverflow)
        })
    }
}

/// Total fare for a selection on `vehicle`, one category per selected seat.
pub fn compute_total<I>(vehicle: &Vehicle, categories: I) -> Result<Decimal, FareOverflow>
where
    I: IntoIterator<Item = PassengerCategory>,
{
    FareCalculator::for_vehicle(vehicle).total(categories)
}
