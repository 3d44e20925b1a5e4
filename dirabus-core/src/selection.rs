use dirabus_catalog::{compute_total, PassengerCategory, Seat, SeatId, Vehicle};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::{CoreError, CoreResult};

/// Result of a toggle attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    Rejected(ToggleRejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRejection {
    UnknownSeat,
    Occupied,
    Reserved,
}

/// Seats the passenger intends to book, each tagged with a fare category.
///
/// `order` and the keys of `categories` always hold the same seat ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    order: Vec<SeatId>,
    categories: HashMap<SeatId, PassengerCategory>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a seat between unselected and selected.
    ///
    /// Seats that are occupied or reserved are rejected whatever their current
    /// membership. Selecting tags the seat as adult; deselecting drops its tag.
    pub fn toggle(&mut self, seat: &Seat) -> ToggleOutcome {
        if !seat.available {
            return ToggleOutcome::Rejected(ToggleRejection::Occupied);
        }
        if seat.reserved {
            return ToggleOutcome::Rejected(ToggleRejection::Reserved);
        }

        if self.categories.remove(&seat.id).is_some() {
            self.order.retain(|id| id != &seat.id);
            ToggleOutcome::Deselected
        } else {
            self.order.push(seat.id.clone());
            self.categories.insert(seat.id.clone(), PassengerCategory::Adult);
            ToggleOutcome::Selected
        }
    }

    /// Change the fare category of a selected seat. Membership is untouched.
    pub fn set_category(&mut self, seat_id: &SeatId, category: PassengerCategory) -> CoreResult<()> {
        let entry = self.categories.get_mut(seat_id)
            .ok_or_else(|| CoreError::SeatNotSelected(seat_id.to_string()))?;
        *entry = category;
        Ok(())
    }

    pub fn contains(&self, seat_id: &SeatId) -> bool {
        self.categories.contains_key(seat_id)
    }

    pub fn category(&self, seat_id: &SeatId) -> Option<PassengerCategory> {
        self.categories.get(seat_id).copied()
    }

    /// Selected seat ids in the order they were picked
    pub fn seat_ids(&self) -> &[SeatId] {
        &self.order
    }

    pub fn entries(&self) -> impl Iterator<Item = (&SeatId, PassengerCategory)> + '_ {
        self.order.iter().filter_map(move |id| self.categories.get(id).map(|c| (id, *c)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.categories.clear();
    }

    /// Fare for the current selection on `vehicle`
    pub fn total(&self, vehicle: &Vehicle) -> CoreResult<Decimal> {
        Ok(compute_total(vehicle, self.categories.values().copied())?)
    }
}
