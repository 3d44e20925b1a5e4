use std::str::FromStr;

use chrono::NaiveDate;
use dirabus_catalog::{PassengerCategory, RouteId, SeatId, VehicleId};
use dirabus_core::BookingStatus;

use crate::error::CommandError;

pub const HELP: &str = "\
Browsing
  routes                                  list routes
  stations <route>                        stations of a route
  buses <route> <YYYY-MM-DD>              buses on a route for a travel date
Seat selection
  bus <id>                                pick a bus from the last listing
  seat <id>                               select or deselect a seat
  student <id> | adult <id>               fare category of a selected seat
  show                                    seat map and fare summary
  confirm                                 confirm the selection
Booking
  passenger <n> <name>|<phone>|<email>    details of passenger n
  book                                    submit the booking
  bookings                                your bookings
  receipt <id>                            booking receipt
Conductor
  conductor buses | conductor bookings    assigned buses and their bookings
  locate <bus> <lat> <lon>                report bus position
  status <booking> <status>               pending, confirmed, cancelled or completed
Admin
  stats                                   dashboard totals
  help | quit";

/// One line of terminal input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Routes,
    Stations(RouteId),
    Buses { route: RouteId, date: NaiveDate },
    Bus(VehicleId),
    Seat(SeatId),
    Category { seat: SeatId, category: PassengerCategory },
    Show,
    Confirm,
    /// `index` is zero-based; the user types it one-based.
    Passenger { index: usize, name: String, phone: String, email: String },
    Book,
    Bookings,
    Receipt(String),
    ConductorBuses,
    ConductorBookings,
    Locate { bus: VehicleId, latitude: f64, longitude: f64 },
    Status { booking: String, status: BookingStatus },
    Stats,
    Help,
    Quit,
}

fn parse_passenger(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "passenger <n> <name>|<phone>|<email>";

    let (index, details) = rest.split_once(char::is_whitespace).ok_or(CommandError::Usage(USAGE))?;
    let index = match index.parse::<usize>() {
        Ok(n) if n >= 1 => n - 1,
        _ => return Err(CommandError::Usage(USAGE)),
    };

    let fields: Vec<&str> = details.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [name, phone, email] => Ok(Command::Passenger {
            index,
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
        }),
        _ => Err(CommandError::Usage(USAGE)),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("routes", _) => Ok(Command::Routes),
            ("stations", [route]) => Ok(Command::Stations(RouteId::from(*route))),
            ("stations", _) => Err(CommandError::Usage("stations <route>")),
            ("buses", [route, date]) => {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| CommandError::Usage("buses <route> <YYYY-MM-DD>"))?;
                Ok(Command::Buses {
                    route: RouteId::from(*route),
                    date,
                })
            }
            ("buses", _) => Err(CommandError::Usage("buses <route> <YYYY-MM-DD>")),
            ("bus", [id]) => Ok(Command::Bus(VehicleId::from(*id))),
            ("bus", _) => Err(CommandError::Usage("bus <id>")),
            ("seat", [id]) => Ok(Command::Seat(SeatId::from(*id))),
            ("seat", _) => Err(CommandError::Usage("seat <id>")),
            ("student" | "adult", [id]) => Ok(Command::Category {
                seat: SeatId::from(*id),
                category: if name.eq_ignore_ascii_case("student") {
                    PassengerCategory::Student
                } else {
                    PassengerCategory::Adult
                },
            }),
            ("student" | "adult", _) => Err(CommandError::Usage("student <id> | adult <id>")),
            ("show", _) => Ok(Command::Show),
            ("confirm", _) => Ok(Command::Confirm),
            ("passenger", _) => parse_passenger(rest),
            ("book", _) => Ok(Command::Book),
            ("bookings", _) => Ok(Command::Bookings),
            ("receipt", [id]) => Ok(Command::Receipt(id.to_string())),
            ("receipt", _) => Err(CommandError::Usage("receipt <id>")),
            ("conductor", ["buses"]) => Ok(Command::ConductorBuses),
            ("conductor", ["bookings"]) => Ok(Command::ConductorBookings),
            ("conductor", _) => Err(CommandError::Usage("conductor buses | conductor bookings")),
            ("locate", [bus, lat, lon]) => {
                let usage = || CommandError::Usage("locate <bus> <lat> <lon>");
                Ok(Command::Locate {
                    bus: VehicleId::from(*bus),
                    latitude: lat.parse().map_err(|_| usage())?,
                    longitude: lon.parse().map_err(|_| usage())?,
                })
            }
            ("locate", _) => Err(CommandError::Usage("locate <bus> <lat> <lon>")),
            ("status", [booking, status]) => Ok(Command::Status {
                booking: booking.to_string(),
                status: status.parse()?,
            }),
            ("status", _) => Err(CommandError::Usage("status <booking> <status>")),
            ("stats", _) => Ok(Command::Stats),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit", _) => Ok(Command::Quit),
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_browsing() {
        assert_eq!("routes".parse::<Command>().unwrap(), Command::Routes);
        assert_eq!(
            "buses 1 2026-10-20".parse::<Command>().unwrap(),
            Command::Buses {
                route: RouteId::from("1"),
                date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            }
        );
        assert!(matches!("buses 1 tomorrow".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_parse_seat_commands() {
        assert_eq!("  SEAT 12 ".parse::<Command>().unwrap(), Command::Seat(SeatId::from("12")));
        assert_eq!(
            "student 12".parse::<Command>().unwrap(),
            Command::Category {
                seat: SeatId::from("12"),
                category: PassengerCategory::Student,
            }
        );
        assert!(matches!("seat".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_parse_passenger() {
        let cmd = "passenger 2 Jane Doe | +255987654321 | jane@example.com"
            .parse::<Command>()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Passenger {
                index: 1,
                name: "Jane Doe".to_string(),
                phone: "+255987654321".to_string(),
                email: "jane@example.com".to_string(),
            }
        );
        assert!("passenger 0 A|B|C".parse::<Command>().is_err());
        assert!("passenger 1 A|B".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_conductor_commands() {
        assert_eq!(
            "locate 3 -6.1659 39.2026".parse::<Command>().unwrap(),
            Command::Locate {
                bus: VehicleId::from("3"),
                latitude: -6.1659,
                longitude: 39.2026,
            }
        );
        assert_eq!(
            "status 31 completed".parse::<Command>().unwrap(),
            Command::Status {
                booking: "31".to_string(),
                status: BookingStatus::Completed,
            }
        );
        assert!(matches!("status 31 boarding".parse::<Command>(), Err(CommandError::Core(_))));
        assert!(matches!("conductor".parse::<Command>(), Err(CommandError::Usage(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!("fly".parse::<Command>(), Err(CommandError::Unknown(ref c)) if c == "fly"));
    }
}
