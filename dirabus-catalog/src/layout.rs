use serde::{Deserialize, Serialize};

use crate::seat::Seat;

/// Seats per row: two seats, the aisle, two seats.
pub const SEATS_PER_ROW: usize = 4;

const SEATS_PER_SIDE: usize = SEATS_PER_ROW / 2;

/// Visual state of a seat in the seat map
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Occupied,
    Reserved,
    Selected,
    Available,
}

/// Map a seat and its selection flag to a status.
///
/// Occupied and reserved win over selected: a seat that stopped being bookable
/// after it was picked must not look selected.
pub fn seat_status(seat: &Seat, selected: bool) -> SeatStatus {
    if !seat.available {
        SeatStatus::Occupied
    } else if seat.reserved {
        SeatStatus::Reserved
    } else if selected {
        SeatStatus::Selected
    } else {
        SeatStatus::Available
    }
}

/// One display row of the seat map, split at the aisle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatRow<'a> {
    pub left: &'a [Seat],
    pub right: &'a [Seat],
}

impl<'a> SeatRow<'a> {
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn seats(&self) -> impl Iterator<Item = &'a Seat> {
        let (left, right) = (self.left, self.right);
        left.iter().chain(right.iter())
    }
}

/// Chunk seats, in the order given, into rows of [`SEATS_PER_ROW`]. The last
/// row may be short; its seats fill the left side first.
pub fn partition_rows(seats: &[Seat]) -> Vec<SeatRow<'_>> {
    seats
        .chunks(SEATS_PER_ROW)
        .map(|row| {
            let (left, right) = row.split_at(row.len().min(SEATS_PER_SIDE));
            SeatRow { left, right }
        })
        .collect()
}
