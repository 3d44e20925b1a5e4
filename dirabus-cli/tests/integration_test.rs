use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use dirabus_catalog::VehicleId;
use dirabus_cli::{run, AppState};
use dirabus_core::load_seats;
use dirabus_shared::Credentials;
use dirabus_store::app_config::ApiConfig;
use dirabus_store::ApiClient;

/// Requests the stub backend received
#[derive(Clone, Default)]
struct Recorded {
    bookings: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    status_updates: Arc<Mutex<Vec<(String, Value)>>>,
    locations: Arc<Mutex<Vec<Value>>>,
}

async fn seats(Path(bus): Path<String>) -> (StatusCode, Json<Value>) {
    match bus.as_str() {
        // camelCase inside the envelope
        "1" => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Seats retrieved",
                "data": [
                    {"id": "11", "busId": "1", "seatNumber": "1", "isAvailable": true, "isReserved": false},
                    {"id": "12", "busId": "1", "seatNumber": "2", "isAvailable": true, "isReserved": false},
                    {"id": "13", "busId": "1", "seatNumber": "3", "isAvailable": false, "isReserved": false},
                    {"id": "14", "busId": "1", "seatNumber": "4", "isAvailable": true, "isReserved": true}
                ]
            })),
        ),
        // snake_case, bare list, integer ids, one record without a flag
        "2" => (
            StatusCode::OK,
            Json(json!([
                {"id": 21, "bus": 2, "seat_number": 1, "is_available": true, "is_reserved": false},
                {"id": 22, "bus": 2, "seat_number": 2, "is_reserved": false}
            ])),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"}))),
    }
}

async fn buses_on_route(
    Path(route): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    if route != "1" || query.get("date").map(String::as_str) != Some("2026-10-20") {
        return Json(json!([]));
    }
    Json(json!([
        {"id": 1, "plate_number": "T123ABC", "route": 1, "capacity": 4, "available_seats": 2,
         "price_per_seat": "5000.00", "student_discount": "20.00",
         "departure_time": "08:00:00", "arrival_time": "08:45:00", "status": "active"},
        {"id": 9, "plate_number": "T999XYZ", "route": 1, "capacity": 40,
         "price_per_seat": "4500.00", "status": "active"}
    ]))
}

async fn create_booking(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let response = json!({
        "success": true,
        "message": "Booking created successfully",
        "data": {
            "id": 31,
            "bus": body["bus"].clone(),
            "travel_date": body["travel_date"].clone(),
            "seats": body["seats"].clone(),
            "total_price": "9000.00",
            "passenger_info": body["passenger_info"].clone(),
            "status": "confirmed",
            "booking_date": "2026-10-19T09:30:00Z",
            "receipt_id": "RCP-TEST0001"
        }
    });
    recorded.bookings.lock().unwrap().push((auth, body));
    (StatusCode::CREATED, Json(response))
}

async fn conductor_bookings() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            {"id": 5, "bus": 1, "travel_date": "2026-10-18", "seats": [11], "total_price": "5000.00",
             "status": "completed", "receipt_id": "RCP-5", "passenger_info": []},
            {"id": 6, "bus": 1, "travel_date": "2026-10-20", "seats": [12], "total_price": "4000.00",
             "status": "pending", "receipt_id": "RCP-6", "passenger_info": []}
        ]
    }))
}

async fn update_status(
    State(recorded): State<Recorded>,
    Path(booking): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.status_updates.lock().unwrap().push((booking, body));
    Json(json!({"success": true, "message": "Booking status updated"}))
}

async fn update_location(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    recorded.locations.lock().unwrap().push(body);
    Json(json!({"success": true, "message": "Location updated"}))
}

async fn admin_stats() -> Json<Value> {
    Json(json!({
        "stats": {"totalUsers": 1250, "totalBookings": 3420, "totalRevenue": 12500000,
                  "activeBuses": 45, "activeRoutes": 12},
        "chartData": [{"month": "Jan", "bookings": 245, "revenue": 980000}]
    }))
}

/// Serve the stub backend on an ephemeral port and return its API base URL.
async fn spawn_backend(recorded: Recorded) -> String {
    let app = Router::new()
        .route("/api/buses/{bus}/seats/", get(seats))
        .route("/api/buses/route/{route}/", get(buses_on_route))
        .route("/api/bookings/", post(create_booking))
        .route("/api/conductor/bookings/", get(conductor_bookings))
        .route("/api/bookings/{booking}/status/", put(update_status))
        .route("/api/buses/{bus}/location/", put(update_location))
        .route("/api/admin/stats/", get(admin_stats))
        .with_state(recorded);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    })
    .unwrap()
}

async fn run_script(base_url: &str, script: &str) -> String {
    let state = AppState::new(client(base_url), Credentials::bearer("tok-test"), "TSh");
    let mut output = Vec::new();
    run(state, script.as_bytes(), &mut output).await.unwrap();
    String::from_utf8(output).unwrap()
}

#[tokio::test]
async fn test_seat_listing_normalized_from_both_shapes() {
    let base_url = spawn_backend(Recorded::default()).await;
    let api = client(&base_url);
    let credentials = Credentials::anonymous();

    let camel = load_seats(&api, &credentials, &VehicleId::from("1")).await;
    assert!(!camel.is_error());
    let labels: Vec<&str> = camel.seats.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "2", "3", "4"]);
    assert!(!camel.seats[2].available);
    assert!(camel.seats[3].reserved);

    let snake = load_seats(&api, &credentials, &VehicleId::from("2")).await;
    assert_eq!(snake.seats.len(), 2);
    assert_eq!(snake.seats[0].id.as_str(), "21");
    assert!(snake.seats[0].is_selectable());
    // no availability flag: fail closed
    assert!(!snake.seats[1].available);
}

#[tokio::test]
async fn test_seat_fetch_failure_is_empty_list_with_error() {
    let base_url = spawn_backend(Recorded::default()).await;
    let api = client(&base_url);

    let load = load_seats(&api, &Credentials::anonymous(), &VehicleId::from("9")).await;
    assert!(load.seats.is_empty());
    let error = load.error.unwrap();
    assert!(error.contains("500"), "unexpected error text: {}", error);

    let output = run_script(&base_url, "buses 1 2026-10-20\nbus 9\nshow\n").await;
    assert!(output.contains("Could not load seats"), "{}", output);
}

#[tokio::test]
async fn test_select_confirm_and_book() {
    let recorded = Recorded::default();
    let base_url = spawn_backend(recorded.clone()).await;

    let script = "\
buses 1 2026-10-20
bus 1
seat 11
seat 12
student 12
seat 13
seat 14
show
confirm
passenger 1 John Doe|+255123456789|john@example.com
book
passenger 2 Jane Doe|+255987654321|jane@example.com
book
quit
";
    let output = run_script(&base_url, script).await;

    assert!(output.contains("T123ABC"), "{}", output);
    assert!(output.contains("Seat 1 selected (adult)"));
    assert!(output.contains("Seat 3 is already booked"));
    assert!(output.contains("Seat 4 is reserved"));
    assert!(output.contains("Seat 2 (student): TSh 4000"));
    assert!(output.contains("Total: TSh 9000"));
    // first `book` runs before passenger 2 is filled in
    assert!(output.contains("error: Validation failed: Passenger 2"));
    assert!(output.contains("Booking 31 created. Receipt RCP-TEST0001"));

    let bookings = recorded.bookings.lock().unwrap();
    assert_eq!(bookings.len(), 1);
    let (auth, body) = &bookings[0];
    assert_eq!(auth.as_deref(), Some("Bearer tok-test"));
    assert_eq!(body["bus"], "1");
    assert_eq!(body["travel_date"], "2026-10-20");
    assert_eq!(body["seats"], json!(["11", "12"]));
    let total: Decimal = body["total_price"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, dec!(9000));
    assert_eq!(body["passenger_info"][0]["passengerType"], "adult");
    assert_eq!(body["passenger_info"][1]["passengerType"], "student");
    assert_eq!(body["passenger_info"][1]["email"], "jane@example.com");
}

#[tokio::test]
async fn test_switching_bus_discards_selection() {
    let base_url = spawn_backend(Recorded::default()).await;

    let script = "\
buses 1 2026-10-20
bus 1
seat 11
bus 9
bus 1
confirm
";
    let output = run_script(&base_url, script).await;
    assert!(output.contains("Seat 1 selected (adult)"));
    assert!(output.contains("error: No seats selected"), "{}", output);
}

#[tokio::test]
async fn test_bus_requires_listing() {
    let base_url = spawn_backend(Recorded::default()).await;

    let output = run_script(&base_url, "bus 1\nbuses 1 2026-10-21\nbus 1\n").await;
    assert!(output.contains("error: List buses first"));
    assert!(output.contains("No buses"));
    assert!(output.contains("error: Bus 1 is not in the last listing"));
}

#[tokio::test]
async fn test_booking_status_transitions_checked_before_calling_backend() {
    let recorded = Recorded::default();
    let base_url = spawn_backend(recorded.clone()).await;

    let script = "\
status 6 confirmed
conductor bookings
status 5 pending
status 6 confirmed
status 6 confirmed
";
    let output = run_script(&base_url, script).await;

    assert!(output.contains("error: Booking 6 not found"));
    assert!(output.contains("Invalid booking status transition from completed to pending"));
    assert!(output.contains("Booking 6 is now confirmed"));
    assert!(output.contains("Invalid booking status transition from confirmed to confirmed"));

    let updates = recorded.status_updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "6");
    assert_eq!(updates[0].1["status"], "confirmed");
}

#[tokio::test]
async fn test_location_validated_client_side() {
    let recorded = Recorded::default();
    let base_url = spawn_backend(recorded.clone()).await;

    let output = run_script(&base_url, "locate 1 95 39.2\nlocate 1 -6.1659 39.2026\n").await;

    assert!(output.contains("Latitude 95 out of range"));
    assert!(output.contains("Location of bus 1 updated"));
    let locations = recorded.locations.lock().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["latitude"], json!(-6.1659));
}

#[tokio::test]
async fn test_admin_stats() {
    let base_url = spawn_backend(Recorded::default()).await;

    let output = run_script(&base_url, "stats\n").await;
    assert!(output.contains("Users: 1250"));
    assert!(output.contains("Revenue: TSh 12500000"));
}
