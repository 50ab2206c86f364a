use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepass::cli::{Cli, Commands, VehicleAction};
use gatepass::{commands, ApiClient, Config, NewVehicle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatepass=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }
    tracing::debug!(api_base_url = %config.api_base_url, "Configuration loaded");

    let client = ApiClient::new(&config)?;

    match cli.command {
        Commands::Scan { direction, ack } => {
            commands::handle_scan(client, direction, ack || config.require_scan_ack).await?
        }
        Commands::Vehicles { user } => commands::handle_vehicles(&client, user).await?,
        Commands::Vehicle {
            action:
                VehicleAction::Add {
                    user,
                    plate,
                    make,
                    model,
                    year,
                    color,
                    vehicle_type,
                    registered,
                },
        } => {
            let vehicle = NewVehicle {
                user_id: user,
                plate_number: plate,
                make,
                model,
                year,
                color,
                vehicle_type,
                is_registered: registered,
            };
            commands::handle_vehicle_add(&client, &vehicle).await?
        }
        Commands::Pass { vehicle, out } => {
            commands::handle_pass(&client, vehicle, out.as_deref()).await?
        }
        Commands::Register { vehicle } => commands::handle_register(&client, vehicle).await?,
        Commands::Records { vehicle } => commands::handle_records(&client, vehicle).await?,
        Commands::Near {
            lat,
            lon,
            terminal_lat,
            terminal_lon,
        } => commands::handle_near(&lat, &lon, &terminal_lat, &terminal_lon)?,
    }

    Ok(())
}
