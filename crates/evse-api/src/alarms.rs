// Alarm log endpoints.

use tracing::debug;

use crate::client::EvseClient;
use crate::error::Error;
use crate::models::{Ack, AlarmEntry};

impl EvseClient {
    /// Read the alarm log in device (chronological) order.
    ///
    /// `GET /api/alarms`
    pub async fn list_alarms(&self) -> Result<Vec<AlarmEntry>, Error> {
        let url = self.api_url("alarms")?;
        debug!("listing alarm records");
        self.get(url).await
    }

    /// Clear the whole alarm log.
    ///
    /// `DELETE /api/alarms`
    pub async fn clear_alarms(&self) -> Result<Ack, Error> {
        let url = self.api_url("alarms")?;
        debug!("clearing alarm records");
        self.delete(url).await
    }
}
