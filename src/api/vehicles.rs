use reqwest::Method;

use crate::api::client::ApiClient;
use crate::error::Result;
use crate::models::{NewVehicle, Vehicle};

impl ApiClient {
    /// Vehicles owned by a user, with their registration history
    #[tracing::instrument(skip(self))]
    pub async fn vehicles_for_user(&self, user_id: i64) -> Result<Vec<Vehicle>> {
        let url = self.endpoint(&format!("/vehicle/{}/user", user_id))?;

        let vehicles: Vec<Vehicle> = self
            .send_envelope(self.request(Method::GET, url))
            .await?
            .into_data()?;

        tracing::info!(count = vehicles.len(), "Fetched vehicles");

        Ok(vehicles)
    }

    /// Adds a vehicle for its owner, `POST /vehicle`
    #[tracing::instrument(skip(self, vehicle), fields(plate_number = %vehicle.plate_number))]
    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle> {
        let url = self.endpoint("/vehicle")?;

        let created: Vehicle = self
            .send_envelope(self.request(Method::POST, url).json(vehicle))
            .await?
            .into_data()?;

        tracing::info!(vehicle_id = created.id, "Vehicle created");

        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub async fn vehicle(&self, vehicle_id: i64) -> Result<Vehicle> {
        let url = self.endpoint(&format!("/vehicle/{}", vehicle_id))?;

        self.send_envelope(self.request(Method::GET, url))
            .await?
            .into_data()
    }
}
