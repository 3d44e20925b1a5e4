use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use dirabus_catalog::{PassengerCategory, SeatId, Vehicle, VehicleId};
use dirabus_core::{
    load_seats, Booking, BookingDraft, BookingStatus, BusLocation, FetchTicket, SeatLoad, SeatSession,
    ToggleOutcome, ToggleRejection,
};

use crate::command::{Command, HELP};
use crate::error::CommandError;
use crate::render;
use crate::state::AppState;

type SeatsFetched = (FetchTicket, SeatLoad);

/// Buses of the last `buses` listing and the date they were listed for
struct BusListing {
    travel_date: NaiveDate,
    buses: Vec<Vehicle>,
}

enum Reply {
    Text(String),
    Quit,
}

enum Event {
    Line(Option<String>),
    Seats(SeatsFetched),
}

/// Terminal session: seat selection state plus what the dashboards last
/// fetched. Owned by the input loop; seat fetches run on spawned tasks and
/// report back over a channel.
struct Session {
    state: AppState,
    seats: SeatSession,
    seats_tx: mpsc::UnboundedSender<SeatsFetched>,
    listing: Option<BusListing>,
    travel_date: Option<NaiveDate>,
    draft: Option<BookingDraft>,
    conductor_bookings: Vec<Booking>,
}

impl Session {
    fn new(state: AppState, seats_tx: mpsc::UnboundedSender<SeatsFetched>) -> Self {
        Self {
            state,
            seats: SeatSession::new(),
            seats_tx,
            listing: None,
            travel_date: None,
            draft: None,
            conductor_bookings: Vec::new(),
        }
    }

    fn currency(&self) -> &str {
        &self.state.currency
    }

    /// Make `vehicle` active and fetch its seats in the background.
    fn start_seat_fetch(&mut self, vehicle: Vehicle) {
        let ticket = self.seats.select_vehicle(vehicle);
        let source = Arc::clone(&self.state.seats);
        let credentials = self.state.credentials.clone();
        let tx = self.seats_tx.clone();

        tokio::spawn(async move {
            let load = load_seats(source.as_ref(), &credentials, &ticket.vehicle_id).await;
            // Receiver is gone only when the session has ended.
            let _ = tx.send((ticket, load));
        });
    }

    /// Returns the seat map when the fetch belonged to the active bus.
    fn apply_seats(&mut self, (ticket, load): SeatsFetched) -> Option<String> {
        if self.seats.apply_seats(&ticket, load) {
            Some(render::seat_map(&self.seats))
        } else {
            None
        }
    }

    /// Wait until the active bus's seats are in. Seat commands act on loaded
    /// seats only.
    async fn settle(&mut self, rx: &mut mpsc::UnboundedReceiver<SeatsFetched>) {
        while self.seats.is_loading() {
            match rx.recv().await {
                Some(fetched) => {
                    self.apply_seats(fetched);
                }
                None => break,
            }
        }
    }

    fn require_vehicle(&self) -> Result<&Vehicle, CommandError> {
        self.seats.vehicle().ok_or_else(|| {
            CommandError::Precondition("No bus selected; use 'bus <id>' after 'buses <route> <date>'".to_string())
        })
    }

    async fn handle(
        &mut self,
        command: Command,
        rx: &mut mpsc::UnboundedReceiver<SeatsFetched>,
    ) -> Result<Reply, CommandError> {
        let state = self.state.clone();
        let credentials = &state.credentials;

        let text = match command {
            Command::Routes => render::routes(&state.catalog.list_routes(credentials).await?),
            Command::Stations(route) => render::stations(&state.catalog.list_stations(credentials, &route).await?),
            Command::Buses { route, date } => {
                let buses = state.catalog.list_buses(credentials, &route, date).await?;
                let text = render::buses(&buses, self.currency());
                self.listing = Some(BusListing {
                    travel_date: date,
                    buses,
                });
                text
            }
            Command::Bus(id) => self.select_bus(&id)?,
            Command::Seat(id) => {
                self.settle(rx).await;
                self.toggle_seat(&id)?
            }
            Command::Category { seat, category } => {
                self.settle(rx).await;
                self.set_category(&seat, category)?
            }
            Command::Show => {
                self.settle(rx).await;
                self.require_vehicle()?;
                format!(
                    "{}\n{}",
                    render::seat_map(&self.seats),
                    render::summary(&self.seats, self.currency())
                )
            }
            Command::Confirm => {
                self.settle(rx).await;
                self.confirm()?
            }
            Command::Passenger { index, name, phone, email } => {
                let draft = self.draft.as_mut().ok_or_else(no_draft)?;
                draft.set_passenger(index, name, phone, email)?;
                render::draft(draft, &self.state.currency)
            }
            Command::Book => self.book().await?,
            Command::Bookings => {
                let bookings = state.bookings.list_user_bookings(credentials).await?;
                render::passenger_bookings(&bookings, Local::now().date_naive(), self.currency())
            }
            Command::Receipt(id) => {
                render::receipt(&state.bookings.get_receipt(credentials, &id).await?, self.currency())
            }
            Command::ConductorBuses => {
                render::buses(&state.conductor.list_assigned_buses(credentials).await?, self.currency())
            }
            Command::ConductorBookings => {
                self.conductor_bookings = state.conductor.list_bookings(credentials).await?;
                render::bookings(&self.conductor_bookings, self.currency())
            }
            Command::Locate { bus, latitude, longitude } => {
                let location = BusLocation::new(latitude, longitude)?;
                state.conductor.update_location(credentials, &bus, &location).await?;
                info!("Reported location of bus {}", bus);
                format!("Location of bus {} updated", bus)
            }
            Command::Status { booking, status } => self.change_status(&booking, status).await?,
            Command::Stats => render::stats(&state.admin.stats(credentials).await?, self.currency()),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn select_bus(&mut self, id: &VehicleId) -> Result<String, CommandError> {
        let listing = self.listing.as_ref().ok_or_else(|| {
            CommandError::Precondition("List buses first with 'buses <route> <YYYY-MM-DD>'".to_string())
        })?;
        let vehicle = listing
            .buses
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| CommandError::Precondition(format!("Bus {} is not in the last listing", id)))?;

        self.travel_date = Some(listing.travel_date);
        self.draft = None;
        let text = format!("Loading seats for bus {} ({})...", vehicle.plate_number, vehicle.id);
        self.start_seat_fetch(vehicle);
        Ok(text)
    }

    fn toggle_seat(&mut self, id: &SeatId) -> Result<String, CommandError> {
        self.require_vehicle()?;
        let label = self
            .seats
            .seat(id)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| id.to_string());

        let headline = match self.seats.toggle(id) {
            ToggleOutcome::Selected => format!("Seat {} selected (adult)", label),
            ToggleOutcome::Deselected => format!("Seat {} deselected", label),
            ToggleOutcome::Rejected(ToggleRejection::Occupied) => format!("Seat {} is already booked", label),
            ToggleOutcome::Rejected(ToggleRejection::Reserved) => format!("Seat {} is reserved", label),
            ToggleOutcome::Rejected(ToggleRejection::UnknownSeat) => {
                format!("Seat {} does not exist on this bus", label)
            }
        };
        Ok(format!("{}\n{}", headline, render::summary(&self.seats, self.currency())))
    }

    fn set_category(&mut self, id: &SeatId, category: PassengerCategory) -> Result<String, CommandError> {
        self.require_vehicle()?;
        self.seats.set_category(id, category)?;
        Ok(render::summary(&self.seats, self.currency()))
    }

    fn confirm(&mut self) -> Result<String, CommandError> {
        let travel_date = self.travel_date.ok_or_else(|| {
            CommandError::Precondition("No travel date; list buses first".to_string())
        })?;
        let draft = self
            .seats
            .confirm(|confirmed| BookingDraft::new(confirmed, travel_date))?;
        let text = render::draft(&draft, self.currency());
        self.draft = Some(draft);
        Ok(text)
    }

    async fn book(&mut self) -> Result<String, CommandError> {
        let draft = self.draft.as_ref().ok_or_else(no_draft)?;
        let request = draft.to_request()?;

        let booking = match self.state.bookings.create_booking(&self.state.credentials, &request).await {
            Ok(booking) => booking,
            Err(e) => {
                error!("Booking for bus {} failed: {}", request.bus, e);
                return Err(e.into());
            }
        };
        info!("Booking {} created with receipt {}", booking.id, booking.receipt_id);
        self.draft = None;

        // Booked seats are no longer free; refresh the map.
        if let Some(vehicle) = self.seats.vehicle().cloned() {
            self.start_seat_fetch(vehicle);
        }

        Ok(format!(
            "Booking {} created. Receipt {}, total {} ({})",
            booking.id,
            booking.receipt_id,
            render::money(self.currency(), booking.total_price),
            booking.status
        ))
    }

    async fn change_status(&mut self, booking_id: &str, next: BookingStatus) -> Result<String, CommandError> {
        let booking = self
            .conductor_bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| {
                CommandError::Precondition(format!(
                    "Booking {} not found; run 'conductor bookings' first",
                    booking_id
                ))
            })?;

        let status = booking.status.transition(next)?;
        self.state
            .conductor
            .update_booking_status(&self.state.credentials, booking_id, status)
            .await?;
        booking.status = status;
        info!("Booking {} is now {}", booking_id, status);
        Ok(format!("Booking {} is now {}", booking_id, status))
    }
}

fn no_draft() -> CommandError {
    CommandError::Precondition("Nothing to book; select seats and 'confirm' first".to_string())
}

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

/// Read commands from `input` line by line until EOF or `quit`, writing
/// results to `output`.
pub async fn run<R, W>(state: AppState, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (seats_tx, mut seats_rx) = mpsc::unbounded_channel();
    let mut session = Session::new(state, seats_tx);
    let mut lines = input.lines();

    write_block(&mut output, "dirabus: type 'help' for commands").await?;

    loop {
        let event = tokio::select! {
            biased;
            Some(fetched) = seats_rx.recv() => Event::Seats(fetched),
            line = lines.next_line() => Event::Line(line?),
        };

        match event {
            Event::Seats(fetched) => {
                if let Some(map) = session.apply_seats(fetched) {
                    write_block(&mut output, &map).await?;
                }
            }
            Event::Line(None) => break,
            Event::Line(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let result = match line.parse::<Command>() {
                    Ok(command) => session.handle(command, &mut seats_rx).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(Reply::Text(text)) => write_block(&mut output, &text).await?,
                    Ok(Reply::Quit) => break,
                    Err(e) => {
                        warn!("Command failed: {}", e);
                        write_block(&mut output, &format!("error: {}", e)).await?;
                    }
                }
            }
        }
    }

    Ok(())
}
