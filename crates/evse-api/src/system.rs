// Reachability and telemetry endpoints.

use std::time::Duration;

use tracing::debug;

use crate::client::EvseClient;
use crate::error::Error;
use crate::models::StatusResponse;

impl EvseClient {
    /// Health check.
    ///
    /// `GET /api/ping`
    ///
    /// Any 2xx counts as reachable; the body is ignored. `bound` caps the
    /// whole request independently of the client's transport timeout.
    pub async fn ping(&self, bound: Duration) -> Result<(), Error> {
        let url = self.api_url("ping")?;
        self.get_status_only(url, bound).await
    }

    /// Live telemetry snapshot.
    ///
    /// `GET /api/status`
    pub async fn get_status(&self) -> Result<StatusResponse, Error> {
        let url = self.api_url("status")?;
        debug!("fetching device status");
        self.get(url).await
    }
}
