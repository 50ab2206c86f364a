// Library exports for testing and modular access

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use api::ApiClient;
pub use config::Config;
pub use models::{
    AttendanceRecord, Direction, NewVehicle, Vehicle, VehicleRegistration, VehicleSummary,
    VehicleType,
};
pub use services::registration_resolver::current_registration;
pub use services::scan_processor::{submit_scan, FailureReason, RejectReason, ScanResult};
pub use services::scan_session::{ScanSession, ScanState};
