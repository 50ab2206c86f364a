use reqwest::Method;

use crate::api::client::ApiClient;
use crate::error::Result;
use crate::models::AttendanceRecord;

impl ApiClient {
    /// Attendance history of one vehicle, `GET /record/vehicle/{id}`
    #[tracing::instrument(skip(self))]
    pub async fn records_for_vehicle(&self, vehicle_id: i64) -> Result<Vec<AttendanceRecord>> {
        let url = self.endpoint(&format!("/record/vehicle/{}", vehicle_id))?;

        let records: Vec<AttendanceRecord> = self
            .send_envelope(self.request(Method::GET, url))
            .await?
            .into_data()?;

        tracing::info!(count = records.len(), "Fetched attendance records");

        Ok(records)
    }
}
