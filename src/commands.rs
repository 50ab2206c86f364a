use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ApiClient;
use crate::models::{AttendanceRecord, Direction, NewVehicle};
use crate::services::proximity::{self, Coordinates};
use crate::services::qr_generator::{self, PassQr};
use crate::services::registration_resolver::{self, PassStatus};
use crate::services::scan_session::{ScanSession, ScanState};

/// Runs the guard scanner until stdin closes or `:quit`.
///
/// Each payload line is handed to the session on its own task, the way a
/// camera keeps delivering frames; the session drops frames that arrive
/// while a scan is in flight.
pub async fn handle_scan(client: ApiClient, direction: Direction, ack: bool) -> anyhow::Result<()> {
    let session = Arc::new(ScanSession::new(client, direction).with_operator_ack(ack));

    tracing::info!(session_id = %session.id(), direction = %direction, "Scanner ready");
    println!("Scanning ({}). Paste QR payloads, or :entry / :exit / :ack / :records / :quit", direction);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = Vec::new();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match ConsoleInput::parse(&line) {
            ConsoleInput::Quit => break,
            ConsoleInput::SetDirection(direction) => {
                session.set_direction(direction);
                println!("Direction set to {}", direction);
            }
            ConsoleInput::Ack => {
                if !session.acknowledge() {
                    println!("Nothing to acknowledge (state: {:?})", session.state());
                }
            }
            ConsoleInput::Records => print_records(&session.records()),
            ConsoleInput::Unknown(command) => {
                println!("Unknown command: {} (try :entry, :exit, :ack, :records, :quit)", command)
            }
            ConsoleInput::Payload => {
                let session = Arc::clone(&session);
                in_flight.push(tokio::spawn(async move {
                    match session.on_decoded(&line).await {
                        Some(result) => {
                            println!("{}", result);
                            if session.state() == ScanState::AwaitingOperatorAck {
                                println!("(type :ack to resume scanning)");
                            }
                        }
                        None => tracing::debug!("Frame ignored while busy"),
                    }
                }));
                in_flight.retain(|task| !task.is_finished());
            }
        }
    }

    for task in in_flight {
        task.await.context("Scan task panicked")?;
    }

    println!("Session recorded {} scan(s)", session.records().len());
    Ok(())
}

/// One line typed into the scanner console
#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput {
    Quit,
    SetDirection(Direction),
    Ack,
    Records,
    Unknown(String),
    /// Anything not starting with ':' is a decoded QR payload
    Payload,
}

impl ConsoleInput {
    fn parse(line: &str) -> Self {
        let command = line.trim();
        if !command.starts_with(':') {
            return ConsoleInput::Payload;
        }

        match command {
            ":quit" => ConsoleInput::Quit,
            ":ack" => ConsoleInput::Ack,
            ":records" => ConsoleInput::Records,
            other => match other[1..].parse::<Direction>() {
                Ok(direction) => ConsoleInput::SetDirection(direction),
                Err(_) => ConsoleInput::Unknown(other.to_string()),
            },
        }
    }
}

pub async fn handle_vehicles(client: &ApiClient, user_id: i64) -> anyhow::Result<()> {
    let vehicles = client.vehicles_for_user(user_id).await?;
    if vehicles.is_empty() {
        println!("No vehicles found");
        return Ok(());
    }

    let now = Utc::now();
    for vehicle in &vehicles {
        let status = match registration_resolver::pass_status(vehicle, now) {
            PassStatus::Current(reg) => format!(
                "valid until {}",
                reg.valid_until_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default()
            ),
            PassStatus::Expired => "expired - apply for a new pass".to_string(),
            PassStatus::Unregistered => "no pass - apply for a school year pass".to_string(),
        };
        println!(
            "#{:<5} {:<24} {:<12} {}",
            vehicle.id,
            vehicle.display_name(),
            vehicle.plate_number,
            status
        );
    }
    Ok(())
}

pub async fn handle_vehicle_add(client: &ApiClient, vehicle: &NewVehicle) -> anyhow::Result<()> {
    let created = client.create_vehicle(vehicle).await?;
    println!(
        "Vehicle #{} added: {} ({})",
        created.id,
        created.display_name(),
        created.plate_number
    );
    println!("Apply for a pass with: gatepass register --vehicle {}", created.id);
    Ok(())
}

pub async fn handle_pass(client: &ApiClient, vehicle_id: i64, out: Option<&Path>) -> anyhow::Result<()> {
    let vehicle = client.vehicle(vehicle_id).await?;
    let pass = PassQr::for_vehicle(&vehicle, Utc::now());

    println!("{}", vehicle.display_name());

    let code = match pass.payload() {
        Some(code) => code,
        None => {
            println!("Vehicle registration is expired or invalid.");
            return Ok(());
        }
    };

    println!("Pass code: {}", code);

    if let Some(path) = out {
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

        let bytes = if is_png {
            qr_generator::generate_qr_png(code)?
        } else {
            qr_generator::generate_qr_svg(code)?.into_bytes()
        };

        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("QR code saved to {}", path.display());
    }

    Ok(())
}

pub async fn handle_register(client: &ApiClient, vehicle_id: i64) -> anyhow::Result<()> {
    let registration = client.register_vehicle(vehicle_id).await?;
    println!(
        "Registration #{} created, valid until {}",
        registration.id,
        registration.valid_until.as_deref().unwrap_or("unknown")
    );
    Ok(())
}

pub async fn handle_records(client: &ApiClient, vehicle_id: i64) -> anyhow::Result<()> {
    let records = client.records_for_vehicle(vehicle_id).await?;
    print_records(&records);
    Ok(())
}

pub fn handle_near(lat: &str, lon: &str, terminal_lat: &str, terminal_lon: &str) -> anyhow::Result<()> {
    let current = Coordinates::parse(lat, lon)
        .with_context(|| format!("Invalid current position: {}, {}", lat, lon))?;
    let terminal = Coordinates::parse(terminal_lat, terminal_lon)
        .with_context(|| format!("Invalid terminal position: {}, {}", terminal_lat, terminal_lon))?;

    println!("{}", describe_proximity(current, terminal));
    Ok(())
}

fn describe_proximity(current: Coordinates, terminal: Coordinates) -> String {
    let distance = proximity::haversine_meters(current, terminal);
    if proximity::is_nearby(current, terminal, proximity::VEHICLE_MARKER_RADIUS_M) {
        format!("{:.0} m from the terminal: vehicle is at the marker", distance)
    } else {
        format!("{:.0} m from the terminal", distance)
    }
}

fn print_records(records: &[AttendanceRecord]) {
    if records.is_empty() {
        println!("No records found");
        return;
    }

    for record in records {
        println!(
            "{}  {:<5}  {}",
            record.recorded_at.format("%Y-%m-%d %H:%M"),
            record.direction.as_str(),
            record.vehicle_summary().label()
        );
    }
}
