use reqwest::Method;
use serde::Serialize;

use crate::api::client::ApiClient;
use crate::error::Result;
use crate::models::VehicleRegistration;

#[derive(Debug, Serialize)]
struct RegistrationRequest {
    vehicle_id: i64,
}

impl ApiClient {
    /// Applies for a new pass, `POST /vehicle-registration`
    #[tracing::instrument(skip(self))]
    pub async fn register_vehicle(&self, vehicle_id: i64) -> Result<VehicleRegistration> {
        let url = self.endpoint("/vehicle-registration")?;

        let registration: VehicleRegistration = self
            .send_envelope(
                self.request(Method::POST, url)
                    .json(&RegistrationRequest { vehicle_id }),
            )
            .await?
            .into_data()?;

        tracing::info!(
            registration_id = registration.id,
            valid_until = ?registration.valid_until,
            "Vehicle registration created"
        );

        Ok(registration)
    }
}
