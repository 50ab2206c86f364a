// Models module - Backend API entity representations

pub mod attendance_record;
pub mod registration;
pub mod vehicle;

pub use attendance_record::{AttendanceRecord, Direction};
pub use registration::VehicleRegistration;
pub use vehicle::{NewVehicle, Vehicle, VehicleSummary, VehicleType};
