use std::fmt::Write;

use chrono::NaiveDate;
use dirabus_catalog::{Route, Seat, SeatStatus, Station, Vehicle};
use dirabus_core::{AdminStats, Booking, BookingDraft, BookingStatus, SeatSession};
use rust_decimal::Decimal;

pub const LEGEND: &str = "[ ] available  [*] selected  [x] occupied  [r] reserved";

pub fn money(currency: &str, amount: Decimal) -> String {
    format!("{} {}", currency, amount.round_dp(2).normalize())
}

fn glyph(status: SeatStatus) -> char {
    match status {
        SeatStatus::Available => ' ',
        SeatStatus::Selected => '*',
        SeatStatus::Occupied => 'x',
        SeatStatus::Reserved => 'r',
    }
}

fn seat_cell(session: &SeatSession, seat: &Seat) -> String {
    format!("[{}{:>3}]", glyph(session.status_of(seat)), seat.label)
}

/// Seat map of the active bus, front to back, two seats either side of the aisle.
pub fn seat_map(session: &SeatSession) -> String {
    let Some(vehicle) = session.vehicle() else {
        return "No bus selected".to_string();
    };

    let mut out = format!("Bus {} ({})\n", vehicle.plate_number, vehicle.id);
    if session.is_loading() {
        out.push_str("Loading seats...");
        return out;
    }
    if let Some(error) = session.load_error() {
        let _ = write!(out, "Could not load seats: {}", error);
        return out;
    }
    if session.seats().is_empty() {
        out.push_str("No seats available for this bus");
        return out;
    }

    out.push_str("Front\n");
    for row in session.rows() {
        let left: Vec<String> = row.left.iter().map(|s| seat_cell(session, s)).collect();
        let right: Vec<String> = row.right.iter().map(|s| seat_cell(session, s)).collect();
        let _ = writeln!(out, "  {:<13}   {}", left.join(" "), right.join(" ").trim_end());
    }
    out.push_str("Back\n");
    out.push_str(LEGEND);
    out
}

/// Selected seats in pick order with their fares, then the total.
pub fn summary(session: &SeatSession, currency: &str) -> String {
    let selection = session.selection();
    if selection.is_empty() {
        return "No seats selected".to_string();
    }

    let mut out = String::from("Selected seats:\n");
    for (seat_id, category) in selection.entries() {
        let label = session.seat(seat_id).map(|s| s.label.as_str()).unwrap_or(seat_id.as_str());
        let price = match session.unit_price(category) {
            Ok(price) => money(currency, price),
            Err(e) => format!("unavailable ({})", e),
        };
        let _ = writeln!(out, "  Seat {} ({}): {}", label, category, price);
    }
    match session.total() {
        Ok(total) => {
            let _ = write!(out, "Total: {}", money(currency, total));
        }
        Err(e) => {
            let _ = write!(out, "Total: unavailable ({})", e);
        }
    }
    out
}

pub fn routes(routes: &[Route]) -> String {
    if routes.is_empty() {
        return "No routes".to_string();
    }
    routes
        .iter()
        .map(|r| {
            format!(
                "{:>4}  {}  ({} -> {}, {} km, {} min)",
                r.id, r.name, r.start_location, r.end_location, r.distance, r.estimated_duration
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stations(stations: &[Station]) -> String {
    if stations.is_empty() {
        return "No stations".to_string();
    }
    stations
        .iter()
        .map(|s| format!("{:>3}. {}  ({:.4}, {:.4})", s.order, s.name, s.latitude, s.longitude))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn buses(buses: &[Vehicle], currency: &str) -> String {
    if buses.is_empty() {
        return "No buses".to_string();
    }
    buses
        .iter()
        .map(|b| {
            let times = match (&b.departure_time, &b.arrival_time) {
                (Some(dep), Some(arr)) => format!("{}-{}", dep, arr),
                (Some(dep), None) => dep.clone(),
                _ => "-".to_string(),
            };
            format!(
                "{:>4}  {:<10} {:<17} {:>3}/{:<3} seats  {}  student -{}%  {:?}",
                b.id,
                b.plate_number,
                times,
                b.available_seats,
                b.capacity,
                money(currency, b.price_per_seat),
                b.student_discount.normalize(),
                b.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn draft(draft: &BookingDraft, currency: &str) -> String {
    let mut out = format!(
        "Booking for bus {} on {}, total {}\n",
        draft.vehicle_id,
        draft.travel_date,
        money(currency, draft.total)
    );
    for (n, (seat, passenger)) in draft.seats.iter().zip(draft.passengers()).enumerate() {
        let name = if passenger.name.is_empty() { "<missing>" } else { passenger.name.as_str() };
        let _ = writeln!(out, "  {}. Seat {} ({}): {}", n + 1, seat.label, seat.category, name);
    }
    out.push_str("Fill in with: passenger <n> <name>|<phone>|<email>, then book");
    out
}

fn booking_line(booking: &Booking, currency: &str) -> String {
    let date = booking
        .travel_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let bus = booking
        .vehicle_id
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>5}  {:<14} bus {:<5} {}  {} seat(s)  {}  {}",
        booking.id,
        booking.receipt_id,
        bus,
        date,
        booking.seats.len(),
        money(currency, booking.total_price),
        booking.status
    )
}

pub fn bookings(bookings: &[Booking], currency: &str) -> String {
    if bookings.is_empty() {
        return "No bookings".to_string();
    }
    bookings
        .iter()
        .map(|b| booking_line(b, currency))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Passenger view: upcoming trips (travel date today or later, not
/// cancelled) first, then past ones.
pub fn passenger_bookings(bookings: &[Booking], today: NaiveDate, currency: &str) -> String {
    if bookings.is_empty() {
        return "No bookings".to_string();
    }
    let (upcoming, past): (Vec<&Booking>, Vec<&Booking>) = bookings.iter().partition(|b| {
        b.status != BookingStatus::Cancelled && b.travel_date.is_some_and(|date| date >= today)
    });

    let mut out = String::new();
    for (title, group) in [("Upcoming", upcoming), ("Past", past)] {
        let _ = writeln!(out, "{} ({})", title, group.len());
        for booking in group {
            let _ = writeln!(out, "{}", booking_line(booking, currency));
        }
    }
    out.trim_end().to_string()
}

pub fn receipt(booking: &Booking, currency: &str) -> String {
    let mut out = format!("Receipt {}\n{}\n", booking.receipt_id, booking_line(booking, currency));
    if let Some(at) = booking.booked_at {
        let _ = writeln!(out, "Booked at {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    for passenger in &booking.passengers {
        let seat = passenger.seat_number.as_deref().unwrap_or("-");
        let _ = writeln!(out, "  Seat {}: {} ({})", seat, passenger.name, passenger.passenger_type);
    }
    out.trim_end().to_string()
}

pub fn stats(stats: &AdminStats, currency: &str) -> String {
    format!(
        "Users: {}\nBookings: {}\nRevenue: {}\nActive buses: {}\nActive routes: {}",
        stats.total_users,
        stats.total_bookings,
        money(currency, stats.total_revenue),
        stats.active_buses,
        stats.active_routes
    )
}
