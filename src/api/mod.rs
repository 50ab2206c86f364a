// API module - Backend API bindings

pub mod client;
pub mod envelope;
pub mod records;
pub mod registrations;
pub mod scan;
pub mod vehicles;

pub use client::ApiClient;
pub use envelope::{ApiEnvelope, EnvelopeStatus};
pub use scan::ScanRequest;
