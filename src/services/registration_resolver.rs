use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::models::{Vehicle, VehicleRegistration};

/// Selects the current registration of a vehicle.
///
/// A registration qualifies when its `valid_until` parses and is at or
/// after `now`. Among qualifying registrations the latest `valid_until`
/// wins; equal expiries resolve to the lowest `id`. Unparseable rows are
/// skipped.
pub fn current_registration(
    registrations: &[VehicleRegistration],
    now: DateTime<Utc>,
) -> Option<&VehicleRegistration> {
    let mut skipped = 0usize;

    let current = registrations
        .iter()
        .filter_map(|reg| match reg.valid_until_at() {
            Some(until) => Some((until, reg)),
            None => {
                skipped += 1;
                None
            }
        })
        .filter(|(until, _)| *until >= now)
        .max_by(|(a_until, a), (b_until, b)| match a_until.cmp(b_until) {
            // Reversed so the lower id compares as the greater element
            Ordering::Equal => b.id.cmp(&a.id),
            other => other,
        })
        .map(|(_, reg)| reg);

    if skipped > 0 {
        tracing::debug!(skipped, "Ignored registrations with unparseable valid_until");
    }

    current
}

/// What the vehicle list should offer for one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus<'a> {
    /// Holds a valid pass; its QR code can be shown
    Current(&'a VehicleRegistration),
    /// Has registrations, none of them current
    Expired,
    /// Never registered
    Unregistered,
}

impl<'a> PassStatus<'a> {
    pub fn current(&self) -> Option<&'a VehicleRegistration> {
        match self {
            PassStatus::Current(reg) => Some(reg),
            _ => None,
        }
    }

    /// Whether the owner may apply for a new pass
    pub fn can_apply(&self) -> bool {
        !matches!(self, PassStatus::Current(_))
    }
}

pub fn pass_status(vehicle: &Vehicle, now: DateTime<Utc>) -> PassStatus<'_> {
    if vehicle.vehicle_registration.is_empty() {
        return PassStatus::Unregistered;
    }

    match current_registration(&vehicle.vehicle_registration, now) {
        Some(reg) => PassStatus::Current(reg),
        None => PassStatus::Expired,
    }
}
