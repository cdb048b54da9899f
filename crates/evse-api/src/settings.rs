// Protection threshold endpoints.

use tracing::debug;

use crate::client::EvseClient;
use crate::error::Error;
use crate::models::{Ack, ConfigPayload, ConfigResponse};

impl EvseClient {
    /// Read the thresholds stored on the device.
    ///
    /// `GET /api/config`
    pub async fn get_config(&self) -> Result<ConfigResponse, Error> {
        let url = self.api_url("config")?;
        debug!("fetching device config");
        self.get(url).await
    }

    /// Write new thresholds.
    ///
    /// `POST /api/config` with integer fields. The caller branches on
    /// [`Ack::success`]; a `false` flag is not an `Err`.
    pub async fn set_config(&self, payload: &ConfigPayload) -> Result<Ack, Error> {
        let url = self.api_url("config")?;
        debug!(?payload, "saving device config");
        self.post(url, payload).await
    }
}
