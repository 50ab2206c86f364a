// Services module - Business logic

pub mod proximity;
pub mod qr_generator;
pub mod registration_resolver;
pub mod scan_processor;
pub mod scan_session;
